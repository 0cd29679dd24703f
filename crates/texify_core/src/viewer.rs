/// Page tracking for the displayed compiled document.
///
/// `total_pages` is `None` until a document finished loading; navigation is a
/// no-op until then. Once known, `current_page` always lies in `1..=total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    current_page: u32,
    total_pages: Option<u32>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: None,
        }
    }
}

impl ViewerState {
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Starts displaying a document with `total` pages at page 1.
    pub(crate) fn open(&mut self, total: u32) {
        debug_assert!(total > 0);
        self.current_page = 1;
        self.total_pages = Some(total.max(1));
    }

    /// Clamps a requested page into the document bounds.
    pub fn clamp(&self, requested: u32) -> Option<u32> {
        self.total_pages.map(|total| requested.clamp(1, total))
    }

    /// Moves to `requested` (clamped). Returns the new page if it changed.
    pub(crate) fn go_to(&mut self, requested: u32) -> Option<u32> {
        let target = self.clamp(requested)?;
        if target == self.current_page {
            return None;
        }
        self.current_page = target;
        Some(target)
    }

    pub(crate) fn next(&mut self) -> Option<u32> {
        self.go_to(self.current_page.saturating_add(1))
    }

    pub(crate) fn previous(&mut self) -> Option<u32> {
        self.go_to(self.current_page.saturating_sub(1))
    }
}
