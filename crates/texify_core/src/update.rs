use texify_logging::texify_info;

use crate::state::InputDocument;
use crate::{AppState, ArtifactKind, Effect, Msg, ViewerState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected { path } => match state.begin_read() {
            Some(read_id) => vec![Effect::ReadFile { read_id, path }],
            None => Vec::new(),
        },
        Msg::FileLoaded {
            read_id,
            original_name,
            size_bytes,
            content,
        } => {
            if !state.finish_read(read_id) {
                return (state, Vec::new());
            }
            state.replace_input(InputDocument {
                original_name,
                content,
                size_bytes,
            })
        }
        Msg::FileReadFailed { read_id, message } => {
            if !state.finish_read(read_id) {
                return (state, Vec::new());
            }
            vec![state.show_warning(format!("{}{message}", crate::FILE_READ_FAILED_LABEL))]
        }
        Msg::ContentEdited(text) => {
            state.edit_content(text);
            Vec::new()
        }
        Msg::ConvertClicked => state.begin_conversion(),
        Msg::ConversionFinished {
            request_id,
            outcome,
        } => state.finish_conversion(request_id, outcome),
        Msg::DocumentFetched { request_id, bytes } => state.document_fetched(request_id, bytes),
        Msg::DocumentLoaded {
            request_id,
            page_count,
        } => state.document_loaded(request_id, page_count),
        Msg::DocumentFetchFailed {
            request_id,
            message,
        }
        | Msg::DocumentLoadFailed {
            request_id,
            message,
        } => state.document_failed(request_id, &message),
        Msg::NextPage => state.navigate(ViewerState::next),
        Msg::PreviousPage => state.navigate(ViewerState::previous),
        Msg::GoToPage(page) => state.navigate(|viewer| viewer.go_to(page)),
        Msg::PageRenderFailed { page, message } => state.page_render_failed(page, &message),
        Msg::DownloadSourceClicked => state.download(ArtifactKind::Source),
        Msg::DownloadCompiledClicked => state.download(ArtifactKind::Compiled),
        Msg::ArtifactSaved { filename, path } => {
            texify_info!("Saved {} to {:?}", filename, path);
            Vec::new()
        }
        Msg::ArtifactSaveFailed { filename, message } => vec![state.show_warning(format!(
            "{}{filename}: {message}",
            crate::DOWNLOAD_FAILED_LABEL
        ))],
        Msg::WarningDismissed => {
            state.dismiss_warning();
            Vec::new()
        }
        Msg::WarningExpired { token } => {
            state.expire_warning(token);
            Vec::new()
        }
        Msg::Shutdown => state.shutdown(),
    };

    (state, effects)
}
