use bytes::Bytes;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use texify_logging::{texify_debug, texify_info, texify_warn};
use url::Url;

use crate::{
    BackendSettings, Compilation, ConversionError, ConversionResponse, FailureKind, HealthStatus,
};

const MISSING_DOCUMENT_REASON: &str = "no compiled document was returned";
const UNKNOWN_COMPILATION_ERROR: &str = "Unknown compilation error";

/// The conversion service: one request/response exchange per conversion, no retries.
#[async_trait::async_trait]
pub trait ConversionBackend: Send + Sync {
    async fn request_conversion(&self, text: &str) -> Result<ConversionResponse, ConversionError>;

    /// Downloads the compiled document at a location returned by a conversion.
    async fn fetch_document(&self, location: &Url) -> Result<Bytes, ConversionError>;

    async fn health(&self) -> Result<HealthStatus, ConversionError>;
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct ConvertBody {
    latex_content: String,
    compilation: CompilationBody,
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    attempts_used: Option<u32>,
}

#[derive(Deserialize)]
struct CompilationBody {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    base: String,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, ConversionError> {
        let base = settings.base_url.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|err| {
            ConversionError::new(
                FailureKind::InvalidUrl,
                format!("invalid backend address '{}': {err}", settings.base_url),
            )
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ConversionError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Resolves a document location the way the service hands it out: either
    /// absolute, or a path relative to the base address.
    pub fn resolve_location(&self, location: &str) -> Result<Url, ConversionError> {
        if let Ok(absolute) = Url::parse(location) {
            if absolute.has_host() {
                return Ok(absolute);
            }
        }
        Url::parse(&self.endpoint(location)).map_err(|err| {
            ConversionError::new(
                FailureKind::InvalidResponse,
                format!("invalid compiled document location '{location}': {err}"),
            )
        })
    }

    fn normalize(&self, body: ConvertBody) -> ConversionResponse {
        let compilation = if body.compilation.success {
            match body.pdf_url.as_deref().filter(|url| !url.is_empty()) {
                Some(location) => match self.resolve_location(location) {
                    Ok(document) => Compilation::Succeeded { document },
                    Err(err) => Compilation::Failed {
                        reason: err.message,
                    },
                },
                None => Compilation::Failed {
                    reason: MISSING_DOCUMENT_REASON.to_string(),
                },
            }
        } else {
            Compilation::Failed {
                reason: body
                    .compilation
                    .error
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or_else(|| UNKNOWN_COMPILATION_ERROR.to_string()),
            }
        };
        ConversionResponse {
            source_text: body.latex_content,
            compilation,
            attempts_used: body.attempts_used,
        }
    }
}

#[async_trait::async_trait]
impl ConversionBackend for ReqwestBackend {
    async fn request_conversion(&self, text: &str) -> Result<ConversionResponse, ConversionError> {
        let url = self.endpoint("convert");
        texify_info!("POST {} (chars={})", url, text.chars().count());

        let response = self
            .client
            .post(&url)
            .json(&ConvertRequest { text })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: ConvertBody = serde_json::from_slice(&body).map_err(|err| {
            texify_warn!("Unparsable conversion response: {}", err);
            ConversionError::new(
                FailureKind::InvalidResponse,
                format!("invalid response from conversion service: {err}"),
            )
        })?;
        if let Some(attempts) = parsed.attempts_used {
            texify_debug!("Conversion used {} server-side attempt(s)", attempts);
        }
        Ok(self.normalize(parsed))
    }

    async fn fetch_document(&self, location: &Url) -> Result<Bytes, ConversionError> {
        texify_info!("GET {}", location);
        let max_bytes = self.settings.max_document_bytes;
        let response = self
            .client
            .get(location.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(bytes))
    }

    async fn health(&self) -> Result<HealthStatus, ConversionError> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        let parsed: HealthBody = serde_json::from_slice(&body).map_err(|err| {
            ConversionError::new(
                FailureKind::InvalidResponse,
                format!("invalid health response: {err}"),
            )
        })?;
        Ok(HealthStatus {
            status: parsed.status,
            message: parsed.message,
        })
    }
}

/// Non-2xx: the service's `error` field if present, else a generic message.
fn status_error(status: reqwest::StatusCode, body: &[u8]) -> ConversionError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    ConversionError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ConversionError {
    ConversionError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "compiled document too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ConversionError {
    if err.is_timeout() {
        return ConversionError::new(FailureKind::Timeout, format!("request timed out: {err}"));
    }
    ConversionError::new(
        FailureKind::Network,
        format!("could not reach conversion service: {err}"),
    )
}
