use bytes::Bytes;
use texify_logging::{texify_debug, texify_info, texify_warn};
use url::Url;

use crate::artifact::ArtifactStore;
use crate::filename::derive_name;
use crate::view_model::{AppViewModel, PageView};
use crate::viewer::ViewerState;
use crate::warning::{WarningState, WARNING_DISMISS_DELAY};
use crate::Effect;

pub type ReadId = u64;
pub type RequestId = u64;

/// Written into the input when Convert is clicked with nothing to convert.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "Please enter or select file content first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// No content.
    #[default]
    Idle,
    /// Content present, nothing in flight.
    Ready,
    /// Conversion request in flight.
    Converting,
    /// Conversion and compilation succeeded.
    Viewing,
    /// Source text was generated but compilation failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputDocument {
    /// `None` when the content was typed rather than loaded from a file.
    pub original_name: Option<String>,
    pub content: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledOutcome {
    Succeeded { document: Url },
    Failed { reason: String },
}

/// Normalized result of one conversion exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source_text: String,
    pub compiled: CompiledOutcome,
    /// Server-side attempts spent, when the backend reports it.
    pub attempts_used: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Source,
    Compiled,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Source => ".tex",
            ArtifactKind::Compiled => ".pdf",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ArtifactKind::Source => "text/plain",
            ArtifactKind::Compiled => "application/pdf",
        }
    }
}

/// Lifecycle of the compiled document behind a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Absent,
    Fetching,
    Loading,
    Displayed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    input: InputDocument,
    workflow: WorkflowState,
    next_id: u64,
    pending_read: Option<ReadId>,
    /// Present exactly while a conversion request is in flight.
    in_flight: Option<RequestId>,
    /// Request whose result is currently displayed.
    displayed_request: Option<RequestId>,
    result: Option<ConversionResult>,
    source_artifact: Option<DownloadArtifact>,
    compiled_artifact: Option<DownloadArtifact>,
    artifacts: ArtifactStore,
    viewer: ViewerState,
    document: DocumentStatus,
    warning: WarningState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let source_text = self.result.as_ref().map(|r| r.source_text.clone());
        let page = self.viewer.total_pages().map(|total| PageView {
            current: self.viewer.current_page(),
            total,
        });
        AppViewModel {
            workflow: self.workflow,
            processing: self.is_processing(),
            original_name: self.input.original_name.clone(),
            size_bytes: self.input.size_bytes,
            content: self.input.content.clone(),
            show_source_fallback: source_text.is_some()
                && self.document != DocumentStatus::Displayed,
            source_text,
            attempts_used: self.result.as_ref().and_then(|r| r.attempts_used),
            source_download: self.source_artifact.clone(),
            compiled_download: self.compiled_artifact.clone(),
            document: self.document,
            page,
            warning: self
                .warning
                .is_visible()
                .then(|| self.warning.message().to_string()),
            dirty: self.dirty,
        }
    }

    pub fn workflow(&self) -> WorkflowState {
        self.workflow
    }

    /// The processing flag: true strictly while a conversion is in flight.
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// True while a selected file is being read and has not been superseded.
    pub fn is_reading(&self) -> bool {
        self.pending_read.is_some()
    }

    pub fn content(&self) -> &str {
        &self.input.content
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    pub fn warning(&self) -> &WarningState {
        &self.warning
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn begin_read(&mut self) -> Option<ReadId> {
        if self.workflow == WorkflowState::Converting {
            texify_debug!("File selection ignored while converting");
            return None;
        }
        let read_id = self.allocate_id();
        self.pending_read = Some(read_id);
        Some(read_id)
    }

    /// Consumes the pending read if `read_id` is the one being awaited.
    pub(crate) fn finish_read(&mut self, read_id: ReadId) -> bool {
        if self.pending_read == Some(read_id) {
            self.pending_read = None;
            true
        } else {
            texify_debug!("Discarding stale file read {}", read_id);
            false
        }
    }

    /// Replaces the input wholesale, retiring everything derived from the old one.
    pub(crate) fn replace_input(&mut self, input: InputDocument) -> Vec<Effect> {
        let effects = self.retire_outputs();
        self.warning.hide();
        self.input = input;
        self.sync_workflow_with_content();
        self.mark_dirty();
        effects
    }

    pub(crate) fn edit_content(&mut self, text: String) {
        if self.workflow == WorkflowState::Converting {
            texify_debug!("Edit ignored while converting");
            return;
        }
        self.input.content = text;
        self.sync_workflow_with_content();
        self.mark_dirty();
    }

    fn sync_workflow_with_content(&mut self) {
        self.workflow = if self.input.content.is_empty() {
            WorkflowState::Idle
        } else {
            WorkflowState::Ready
        };
    }

    /// Starts a conversion of the current content, if allowed.
    pub(crate) fn begin_conversion(&mut self) -> Vec<Effect> {
        if let Some(request_id) = self.in_flight {
            texify_debug!("Convert ignored: request {} still in flight", request_id);
            return Vec::new();
        }
        if self.input.content.is_empty() {
            self.input.content = EMPTY_CONTENT_PLACEHOLDER.to_string();
            self.sync_workflow_with_content();
            self.mark_dirty();
            return Vec::new();
        }

        if let Some(read_id) = self.pending_read.take() {
            texify_info!("Abandoning file read {} in favour of conversion", read_id);
        }
        let mut effects = self.retire_outputs();
        self.warning.hide();
        let request_id = self.allocate_id();
        self.in_flight = Some(request_id);
        self.displayed_request = Some(request_id);
        self.workflow = WorkflowState::Converting;
        self.mark_dirty();
        texify_info!(
            "Conversion request {} started (chars={})",
            request_id,
            self.input.content.chars().count()
        );
        effects.push(Effect::RequestConversion {
            request_id,
            text: self.input.content.clone(),
        });
        effects
    }

    pub(crate) fn finish_conversion(
        &mut self,
        request_id: RequestId,
        outcome: Result<ConversionResult, String>,
    ) -> Vec<Effect> {
        if self.in_flight != Some(request_id) {
            texify_warn!("Discarding response for stale conversion request {}", request_id);
            return Vec::new();
        }
        self.in_flight = None;
        self.mark_dirty();

        let result = match outcome {
            Ok(result) => result,
            Err(message) => {
                texify_warn!("Conversion request {} failed: {}", request_id, message);
                self.displayed_request = None;
                self.sync_workflow_with_content();
                return vec![self.show_warning(format!(
                    "{}{message}",
                    crate::CONVERSION_FAILED_LABEL
                ))];
            }
        };

        let mut effects = Vec::new();
        self.source_artifact = Some(self.create_artifact(
            ArtifactKind::Source,
            Bytes::from(result.source_text.clone()),
        ));
        match &result.compiled {
            CompiledOutcome::Succeeded { document } => {
                texify_info!("Conversion request {} compiled; fetching {}", request_id, document);
                self.workflow = WorkflowState::Viewing;
                self.document = DocumentStatus::Fetching;
                effects.push(Effect::FetchDocument {
                    request_id,
                    location: document.clone(),
                });
            }
            CompiledOutcome::Failed { reason } => {
                texify_warn!("Conversion request {} compile failed: {}", request_id, reason);
                self.workflow = WorkflowState::Failed;
                effects.push(self.show_warning(format!(
                    "{}{reason}",
                    crate::COMPILATION_FAILED_LABEL
                )));
            }
        }
        self.result = Some(result);
        effects
    }

    fn awaits_document(&self, request_id: RequestId, expected: DocumentStatus) -> bool {
        let current = self.displayed_request == Some(request_id) && self.document == expected;
        if !current {
            texify_debug!(
                "Discarding document event for request {} (document {:?})",
                request_id,
                self.document
            );
        }
        current
    }

    pub(crate) fn document_fetched(&mut self, request_id: RequestId, bytes: Bytes) -> Vec<Effect> {
        if !self.awaits_document(request_id, DocumentStatus::Fetching) {
            return Vec::new();
        }
        self.compiled_artifact = Some(self.create_artifact(ArtifactKind::Compiled, bytes.clone()));
        self.document = DocumentStatus::Loading;
        self.mark_dirty();
        vec![Effect::LoadDocument { request_id, bytes }]
    }

    pub(crate) fn document_loaded(&mut self, request_id: RequestId, page_count: u32) -> Vec<Effect> {
        if !self.awaits_document(request_id, DocumentStatus::Loading) {
            return Vec::new();
        }
        if page_count == 0 {
            return self.document_failed(request_id, "document has no pages");
        }
        self.viewer.open(page_count);
        self.document = DocumentStatus::Displayed;
        self.mark_dirty();
        vec![Effect::RenderPage {
            page: self.viewer.current_page(),
        }]
    }

    /// Fetch or load failure; the source text stays visible as fallback.
    pub(crate) fn document_failed(&mut self, request_id: RequestId, message: &str) -> Vec<Effect> {
        let pending = matches!(
            self.document,
            DocumentStatus::Fetching | DocumentStatus::Loading
        );
        if self.displayed_request != Some(request_id) || !pending {
            texify_debug!("Discarding document failure for request {}", request_id);
            return Vec::new();
        }
        texify_warn!("Document for request {} failed: {}", request_id, message);
        self.document = DocumentStatus::Failed;
        self.viewer.reset();
        self.mark_dirty();
        vec![
            Effect::UnloadDocument,
            self.show_warning(crate::DOCUMENT_LOAD_FAILED_MESSAGE),
        ]
    }

    pub(crate) fn navigate(
        &mut self,
        step: impl FnOnce(&mut ViewerState) -> Option<u32>,
    ) -> Vec<Effect> {
        if self.document != DocumentStatus::Displayed {
            return Vec::new();
        }
        match step(&mut self.viewer) {
            Some(page) => {
                self.mark_dirty();
                vec![Effect::RenderPage { page }]
            }
            None => Vec::new(),
        }
    }

    /// The document stays open; only the page that failed is reported.
    pub(crate) fn page_render_failed(&mut self, page: u32, message: &str) -> Vec<Effect> {
        if self.document != DocumentStatus::Displayed || self.viewer.current_page() != page {
            texify_debug!("Discarding render failure for page {} of a stale view", page);
            return Vec::new();
        }
        texify_warn!("Rendering page {} failed: {}", page, message);
        vec![self.show_warning(format!(
            "{}{page}: {message}",
            crate::PAGE_RENDER_FAILED_LABEL
        ))]
    }

    pub(crate) fn download(&self, kind: ArtifactKind) -> Vec<Effect> {
        let artifact = match kind {
            ArtifactKind::Source => self.source_artifact.as_ref(),
            ArtifactKind::Compiled => self.compiled_artifact.as_ref(),
        };
        let Some(artifact) = artifact else {
            texify_debug!("No {:?} artifact to download", kind);
            return Vec::new();
        };
        match self.artifacts.get(&artifact.url) {
            Some(blob) => vec![Effect::SaveArtifact {
                filename: artifact.filename.clone(),
                mime: blob.mime.clone(),
                bytes: blob.data.clone(),
            }],
            None => {
                texify_warn!("Artifact {} is no longer live", artifact.url);
                Vec::new()
            }
        }
    }

    pub(crate) fn show_warning(&mut self, message: impl Into<String>) -> Effect {
        let token = self.warning.show(message);
        self.mark_dirty();
        Effect::ScheduleWarningHide {
            token,
            delay: WARNING_DISMISS_DELAY,
        }
    }

    pub(crate) fn dismiss_warning(&mut self) {
        if self.warning.hide() {
            self.mark_dirty();
        }
    }

    pub(crate) fn expire_warning(&mut self, token: crate::WarningToken) {
        if self.warning.expire(token) {
            self.mark_dirty();
        }
    }

    pub(crate) fn shutdown(&mut self) -> Vec<Effect> {
        self.pending_read = None;
        self.dismiss_warning();
        self.retire_outputs()
    }

    fn create_artifact(&mut self, kind: ArtifactKind, bytes: Bytes) -> DownloadArtifact {
        let url = self.artifacts.create(bytes, kind.mime());
        let filename = derive_name(self.input.original_name.as_deref(), kind.extension());
        texify_debug!("Created {:?} artifact {} as {}", kind, url, filename);
        DownloadArtifact { url, filename }
    }

    /// Revokes both artifacts and clears the result and viewer.
    fn retire_outputs(&mut self) -> Vec<Effect> {
        for artifact in [self.source_artifact.take(), self.compiled_artifact.take()]
            .into_iter()
            .flatten()
        {
            self.artifacts.revoke(&artifact.url);
        }
        self.result = None;
        self.displayed_request = None;
        self.viewer.reset();
        let had_document = std::mem::take(&mut self.document) != DocumentStatus::Absent;
        self.mark_dirty();
        if had_document {
            vec![Effect::UnloadDocument]
        } else {
            Vec::new()
        }
    }
}
