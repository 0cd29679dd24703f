use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding [`DEFAULT_BASE_URL`].
pub const API_URL_ENV: &str = "TEXIFY_API_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Conversion runs a model plus several LaTeX passes server-side.
    pub request_timeout: Duration,
    pub max_document_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(180),
            max_document_bytes: 50 * 1024 * 1024,
        }
    }
}

impl BackendSettings {
    /// Defaults with the base address taken from `TEXIFY_API_URL` when set.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(base) = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            settings.base_url = base.trim().to_string();
        }
        settings
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub backend: BackendSettings,
    /// Where downloaded artifacts are written.
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(backend: BackendSettings, download_dir: PathBuf) -> Self {
        Self {
            backend,
            download_dir,
        }
    }
}
