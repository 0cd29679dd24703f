use std::path::PathBuf;

use bytes::Bytes;

use crate::{ConversionResult, ReadId, RequestId, WarningToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a local file to load as input.
    FileSelected { path: PathBuf },
    /// Engine finished reading and decoding a selected file.
    FileLoaded {
        read_id: ReadId,
        original_name: Option<String>,
        size_bytes: u64,
        content: String,
    },
    /// Engine could not read or decode a selected file.
    FileReadFailed { read_id: ReadId, message: String },
    /// User edited the input text.
    ContentEdited(String),
    /// User clicked Convert.
    ConvertClicked,
    /// Backend exchange completed; `Err` carries a transport-level message.
    ConversionFinished {
        request_id: RequestId,
        outcome: Result<ConversionResult, String>,
    },
    /// Compiled document bytes were retrieved from the backend.
    DocumentFetched { request_id: RequestId, bytes: Bytes },
    DocumentFetchFailed { request_id: RequestId, message: String },
    /// Viewer parsed the compiled document.
    DocumentLoaded { request_id: RequestId, page_count: u32 },
    DocumentLoadFailed { request_id: RequestId, message: String },
    NextPage,
    PreviousPage,
    GoToPage(u32),
    /// The viewer could not draw `page` of the displayed document.
    PageRenderFailed { page: u32, message: String },
    DownloadSourceClicked,
    DownloadCompiledClicked,
    /// An artifact was written to disk.
    ArtifactSaved { filename: String, path: PathBuf },
    ArtifactSaveFailed { filename: String, message: String },
    /// User closed the warning popup.
    WarningDismissed,
    /// Auto-hide timer fired.
    WarningExpired { token: WarningToken },
    /// Session teardown: release every live artifact.
    Shutdown,
}
