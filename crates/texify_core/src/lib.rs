//! Texify core: pure conversion-workflow state machine and view-model helpers.
mod artifact;
mod effect;
mod filename;
mod msg;
mod state;
mod update;
mod view_model;
mod viewer;
mod warning;

pub use artifact::{ArtifactEvent, ArtifactStore, Blob};
pub use effect::Effect;
pub use filename::{derive_name, DEFAULT_STEM};
pub use msg::Msg;
pub use state::{
    AppState, ArtifactKind, CompiledOutcome, ConversionResult, DocumentStatus, DownloadArtifact,
    InputDocument, ReadId, RequestId, WorkflowState, EMPTY_CONTENT_PLACEHOLDER,
};
pub use update::update;
pub use view_model::{AppViewModel, PageView};
pub use viewer::ViewerState;
pub use warning::{
    WarningState, WarningToken, COMPILATION_FAILED_LABEL, CONVERSION_FAILED_LABEL,
    DOCUMENT_LOAD_FAILED_MESSAGE, DOWNLOAD_FAILED_LABEL, FILE_READ_FAILED_LABEL,
    PAGE_RENDER_FAILED_LABEL, WARNING_DISMISS_DELAY,
};
