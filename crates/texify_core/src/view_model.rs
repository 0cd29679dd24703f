use crate::{DocumentStatus, DownloadArtifact, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    pub current: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub workflow: WorkflowState,
    pub processing: bool,
    pub original_name: Option<String>,
    pub size_bytes: u64,
    pub content: String,
    pub source_text: Option<String>,
    /// Source text is shown in place of a document that is not displayed.
    pub show_source_fallback: bool,
    pub attempts_used: Option<u32>,
    pub source_download: Option<DownloadArtifact>,
    pub compiled_download: Option<DownloadArtifact>,
    pub document: DocumentStatus,
    pub page: Option<PageView>,
    pub warning: Option<String>,
    pub dirty: bool,
}
