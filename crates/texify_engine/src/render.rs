use lopdf::Document;

use crate::RenderedPage;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DocumentLoadError {
    #[error("failed to parse document: {0}")]
    Parse(String),
    #[error("document has no pages")]
    Empty,
    #[error("no document loaded")]
    NotLoaded,
    #[error("page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },
    #[error("failed to render page {page}: {message}")]
    Render { page: u32, message: String },
}

/// Paginated-document capability: parse once, then render pages on demand.
pub trait DocumentRenderer: Send {
    /// Parses `bytes` and returns the page count, replacing any loaded document.
    fn load(&mut self, bytes: &[u8]) -> Result<u32, DocumentLoadError>;

    /// Renders `page` (1-based, `1..=page_count`).
    fn render_page(&self, page: u32) -> Result<RenderedPage, DocumentLoadError>;

    fn unload(&mut self);

    fn page_count(&self) -> Option<u32>;
}

/// Renders PDF pages as their extracted text, for terminal display.
#[derive(Default)]
pub struct PdfRenderer {
    loaded: Option<LoadedPdf>,
}

struct LoadedPdf {
    document: Document,
    page_count: u32,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentRenderer for PdfRenderer {
    fn load(&mut self, bytes: &[u8]) -> Result<u32, DocumentLoadError> {
        self.loaded = None;
        let document =
            Document::load_mem(bytes).map_err(|e| DocumentLoadError::Parse(e.to_string()))?;
        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(DocumentLoadError::Empty);
        }
        self.loaded = Some(LoadedPdf {
            document,
            page_count,
        });
        Ok(page_count)
    }

    fn render_page(&self, page: u32) -> Result<RenderedPage, DocumentLoadError> {
        let loaded = self.loaded.as_ref().ok_or(DocumentLoadError::NotLoaded)?;
        if page == 0 || page > loaded.page_count {
            return Err(DocumentLoadError::PageOutOfRange {
                page,
                total: loaded.page_count,
            });
        }
        let text = loaded
            .document
            .extract_text(&[page])
            .map_err(|e| DocumentLoadError::Render {
                page,
                message: e.to_string(),
            })?;
        Ok(RenderedPage {
            number: page,
            total: loaded.page_count,
            text,
        })
    }

    fn unload(&mut self) {
        self.loaded = None;
    }

    fn page_count(&self) -> Option<u32> {
        self.loaded.as_ref().map(|loaded| loaded.page_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, dictionary, Dictionary, Object, Stream};

    // Helper to create a simple PDF with N pages
    fn create_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("Page {}", i + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            page_ids.push(page_id);
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn load_reports_page_count() {
        let mut renderer = PdfRenderer::new();
        assert_eq!(renderer.load(&create_test_pdf(3)), Ok(3));
        assert_eq!(renderer.page_count(), Some(3));
    }

    #[test]
    fn render_returns_page_text() {
        let mut renderer = PdfRenderer::new();
        renderer.load(&create_test_pdf(2)).unwrap();
        let page = renderer.render_page(2).unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.total, 2);
        assert!(page.text.contains("Page 2"), "got {:?}", page.text);
    }

    #[test]
    fn render_rejects_out_of_range_pages() {
        let mut renderer = PdfRenderer::new();
        renderer.load(&create_test_pdf(1)).unwrap();
        assert_eq!(
            renderer.render_page(0),
            Err(DocumentLoadError::PageOutOfRange { page: 0, total: 1 })
        );
        assert_eq!(
            renderer.render_page(2),
            Err(DocumentLoadError::PageOutOfRange { page: 2, total: 1 })
        );
    }

    #[test]
    fn garbage_fails_to_load_and_clears_previous_document() {
        let mut renderer = PdfRenderer::new();
        renderer.load(&create_test_pdf(1)).unwrap();
        assert!(matches!(
            renderer.load(b"definitely not a pdf"),
            Err(DocumentLoadError::Parse(_))
        ));
        assert_eq!(renderer.page_count(), None);
        assert_eq!(renderer.render_page(1), Err(DocumentLoadError::NotLoaded));
    }
}
