use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::{ReadId, RequestId, WarningToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReadFile { read_id: ReadId, path: PathBuf },
    RequestConversion { request_id: RequestId, text: String },
    FetchDocument { request_id: RequestId, location: Url },
    LoadDocument { request_id: RequestId, bytes: Bytes },
    /// Page number is already clamped to the loaded document.
    RenderPage { page: u32 },
    /// Drop whatever document the viewer currently holds.
    UnloadDocument,
    /// Fire `Msg::WarningExpired { token }` after `delay`, replacing any
    /// previously scheduled hide.
    ScheduleWarningHide { token: WarningToken, delay: Duration },
    SaveArtifact {
        filename: String,
        mime: String,
        bytes: Bytes,
    },
}
