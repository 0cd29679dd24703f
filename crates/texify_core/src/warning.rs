use std::time::Duration;

/// How long a warning stays visible unless dismissed or replaced.
pub const WARNING_DISMISS_DELAY: Duration = Duration::from_secs(5);

pub const COMPILATION_FAILED_LABEL: &str = "LaTeX compilation failed: ";
pub const CONVERSION_FAILED_LABEL: &str = "Conversion failed: ";
pub const FILE_READ_FAILED_LABEL: &str = "Could not read file: ";
pub const DOWNLOAD_FAILED_LABEL: &str = "Download failed: ";
pub const DOCUMENT_LOAD_FAILED_MESSAGE: &str = "Error loading PDF document";
pub const PAGE_RENDER_FAILED_LABEL: &str = "Could not render page ";

/// Identifies one `show()`; a hide timer only acts on the token it was
/// scheduled for.
pub type WarningToken = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WarningState {
    visible: bool,
    message: String,
    token: WarningToken,
}

impl WarningState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Replaces any current warning and returns the token for its hide timer.
    pub(crate) fn show(&mut self, message: impl Into<String>) -> WarningToken {
        self.token += 1;
        self.visible = true;
        self.message = message.into();
        self.token
    }

    /// Returns true if the warning was visible.
    pub(crate) fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    /// Timer callback; ignored unless `token` belongs to the latest `show()`.
    pub(crate) fn expire(&mut self, token: WarningToken) -> bool {
        token == self.token && self.hide()
    }
}
