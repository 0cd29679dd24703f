use std::path::Path;

use texify_logging::texify_debug;

use crate::decode::{decode_text, DecodeError};
use crate::LoadedInput;

/// Extensions accepted for upload (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum FileReadError {
    #[error("unsupported file type '{0}' (expected .txt or .md)")]
    UnsupportedType(String),
    #[error("{path}: {message}")]
    Io { path: String, message: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

/// Reads a local text file and decodes it for editing and conversion.
pub async fn read_input_file(path: &Path) -> Result<LoadedInput, FileReadError> {
    if !is_supported_input(path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Err(FileReadError::UnsupportedType(name));
    }

    let bytes = tokio::fs::read(path).await.map_err(|err| FileReadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let decoded = decode_text(&bytes)?;
    texify_debug!(
        "Read {:?} ({} bytes, {})",
        path,
        bytes.len(),
        decoded.encoding_label
    );

    Ok(LoadedInput {
        original_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        size_bytes: bytes.len() as u64,
        content: decoded.text,
    })
}
