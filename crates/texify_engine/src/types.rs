use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use url::Url;

use crate::{DocumentLoadError, FileReadError, PersistError};

pub type ReadId = u64;
pub type RequestId = u64;
pub type HideToken = u64;

/// Normalized body of a successful `/convert` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResponse {
    pub source_text: String,
    pub compilation: Compilation,
    pub attempts_used: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compilation {
    Succeeded { document: Url },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedInput {
    pub original_name: Option<String>,
    pub size_bytes: u64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub number: u32,
    pub total: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    FileRead {
        read_id: ReadId,
        result: Result<LoadedInput, FileReadError>,
    },
    ConversionCompleted {
        request_id: RequestId,
        result: Result<ConversionResponse, ConversionError>,
    },
    DocumentFetched {
        request_id: RequestId,
        result: Result<Bytes, ConversionError>,
    },
    DocumentLoaded {
        request_id: RequestId,
        result: Result<u32, DocumentLoadError>,
    },
    PageRendered {
        page: u32,
        result: Result<RenderedPage, DocumentLoadError>,
    },
    HideElapsed { token: HideToken },
    HealthChecked(Result<HealthStatus, ConversionError>),
    ArtifactSaved {
        filename: String,
        result: Result<PathBuf, PersistError>,
    },
}

/// A failed exchange with the conversion service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConversionError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// No response: connection refused, DNS, reset.
    Network,
    Timeout,
    HttpStatus(u16),
    /// 2xx with a body that is not the expected JSON.
    InvalidResponse,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
