//! Texify engine: IO pipeline and effect execution.
mod backend;
mod decode;
mod engine;
mod input;
mod persist;
mod render;
mod settings;
mod timer;
mod types;

pub use backend::{ConversionBackend, ReqwestBackend};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use engine::{EngineEvents, EngineHandle};
pub use input::{is_supported_input, read_input_file, FileReadError, SUPPORTED_EXTENSIONS};
pub use persist::{ensure_download_dir, DownloadWriter, PersistError};
pub use render::{DocumentLoadError, DocumentRenderer, PdfRenderer};
pub use settings::{BackendSettings, EngineConfig, API_URL_ENV, DEFAULT_BASE_URL};
pub use timer::HideScheduler;
pub use types::{
    Compilation, ConversionError, ConversionResponse, EngineEvent, FailureKind, HealthStatus,
    HideToken, LoadedInput, ReadId, RenderedPage, RequestId,
};
