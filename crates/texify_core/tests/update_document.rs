mod common;

use common::{compiled, hide_token, init_logging, select_file, start_conversion};
use pretty_assertions::assert_eq;
use texify_core::{
    update, AppState, DocumentStatus, Effect, Msg, WorkflowState, DOCUMENT_LOAD_FAILED_MESSAGE,
    WARNING_DISMISS_DELAY,
};

fn converted(pages: u32) -> AppState {
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    common::convert_and_display(state, "\\documentclass{article}", pages)
}

#[test]
fn paging_clamps_to_document_bounds() {
    init_logging();
    let state = converted(3);

    let (state, effects) = update(state, Msg::PreviousPage);
    assert!(effects.is_empty());
    assert_eq!(state.viewer().current_page(), 1);

    let (state, effects) = update(state, Msg::NextPage);
    assert_eq!(effects, vec![Effect::RenderPage { page: 2 }]);

    let (state, effects) = update(state, Msg::GoToPage(99));
    assert_eq!(effects, vec![Effect::RenderPage { page: 3 }]);

    let (state, effects) = update(state, Msg::NextPage);
    assert!(effects.is_empty());
    assert_eq!(state.viewer().current_page(), 3);

    let (state, effects) = update(state, Msg::GoToPage(0));
    assert_eq!(effects, vec![Effect::RenderPage { page: 1 }]);
    assert_eq!(state.view().page.map(|p| (p.current, p.total)), Some((1, 3)));
}

#[test]
fn document_load_failure_warns_and_falls_back_to_source() {
    init_logging();
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    let (state, request_id) = start_conversion(state);
    let (state, _) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Ok(compiled("\\documentclass{article}")),
        },
    );
    let (state, _) = update(
        state,
        Msg::DocumentFetched {
            request_id,
            bytes: bytes::Bytes::from_static(b"not a pdf"),
        },
    );

    let (state, effects) = update(
        state,
        Msg::DocumentLoadFailed {
            request_id,
            message: "invalid file header".to_string(),
        },
    );
    let view = state.view();

    assert!(matches!(
        effects.as_slice(),
        [Effect::UnloadDocument, Effect::ScheduleWarningHide { .. }]
    ));
    assert_eq!(view.workflow, WorkflowState::Viewing);
    assert_eq!(view.document, DocumentStatus::Failed);
    assert_eq!(view.warning.as_deref(), Some(DOCUMENT_LOAD_FAILED_MESSAGE));
    assert!(view.show_source_fallback);
    assert_eq!(view.page, None);
    // The fetched bytes still back a compiled download.
    assert!(view.compiled_download.is_some());

    let (_state, effects) = update(state, Msg::NextPage);
    assert!(effects.is_empty());
}

#[test]
fn document_fetch_failure_leaves_only_source_artifact() {
    init_logging();
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    let (state, request_id) = start_conversion(state);
    let (state, _) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Ok(compiled("src")),
        },
    );

    let (state, _) = update(
        state,
        Msg::DocumentFetchFailed {
            request_id,
            message: "http status 404".to_string(),
        },
    );
    let view = state.view();

    assert_eq!(view.document, DocumentStatus::Failed);
    assert!(view.compiled_download.is_none());
    assert!(view.source_download.is_some());
    assert_eq!(view.warning.as_deref(), Some(DOCUMENT_LOAD_FAILED_MESSAGE));
}

#[test]
fn empty_document_counts_as_load_failure() {
    init_logging();
    let state = converted(0);
    assert_eq!(state.view().document, DocumentStatus::Failed);
    assert_eq!(state.view().page, None);
}

#[test]
fn late_document_events_for_retired_request_are_discarded() {
    init_logging();
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    let (state, request_id) = start_conversion(state);
    let (state, _) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Ok(compiled("src")),
        },
    );
    // A new file retires the result while the document is still being fetched.
    let (state, _) = select_file(state, "other.txt", "other");

    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::DocumentFetched {
            request_id,
            bytes: bytes::Bytes::from_static(b"%PDF-1.7"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert_eq!(state.artifacts().live_count(), 0);
}

#[test]
fn stale_warning_timer_does_not_hide_newer_warning() {
    init_logging();
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    let (state, request_id) = start_conversion(state);
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Err("connection refused".to_string()),
        },
    );
    let first = hide_token(&effects);

    let (state, request_id) = start_conversion(state);
    assert_eq!(state.view().warning, None);
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Err("timed out".to_string()),
        },
    );
    let second = hide_token(&effects);
    assert_ne!(first, second);

    let (state, _) = update(state, Msg::WarningExpired { token: first });
    assert_eq!(
        state.view().warning.as_deref(),
        Some("Conversion failed: timed out")
    );

    let (state, _) = update(state, Msg::WarningExpired { token: second });
    assert_eq!(state.view().warning, None);
}

#[test]
fn manual_dismissal_then_timer_is_harmless() {
    init_logging();
    let (state, _) = select_file(AppState::new(), "report.txt", "text");
    let (state, request_id) = start_conversion(state);
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Err("connection refused".to_string()),
        },
    );
    let token = hide_token(&effects);

    let (mut state, _) = update(state, Msg::WarningDismissed);
    assert_eq!(state.view().warning, None);
    state.consume_dirty();

    let (mut state, effects) = update(state, Msg::WarningExpired { token });
    assert!(effects.is_empty());
    assert_eq!(state.view().warning, None);
    assert!(!state.consume_dirty());
}

#[test]
fn page_render_failure_warns_and_keeps_document_open() {
    init_logging();
    let state = converted(3);
    let (state, _) = update(state, Msg::NextPage);

    let (mut state, effects) = update(
        state,
        Msg::PageRenderFailed {
            page: 2,
            message: "failed to render page 2: bad font".to_string(),
        },
    );
    assert!(state.consume_dirty());
    let token = hide_token(&effects);
    assert_eq!(
        effects,
        vec![Effect::ScheduleWarningHide {
            token,
            delay: WARNING_DISMISS_DELAY,
        }]
    );

    let view = state.view();
    assert_eq!(
        view.warning.as_deref(),
        Some("Could not render page 2: failed to render page 2: bad font")
    );
    assert_eq!(view.document, DocumentStatus::Displayed);
    assert_eq!(view.page.map(|p| (p.current, p.total)), Some((2, 3)));

    let (_, effects) = update(state, Msg::NextPage);
    assert_eq!(effects, vec![Effect::RenderPage { page: 3 }]);
}

#[test]
fn render_failure_for_a_page_no_longer_shown_is_ignored() {
    init_logging();
    let state = converted(3);
    let (state, _) = update(state, Msg::GoToPage(3));

    let (state, effects) = update(
        state,
        Msg::PageRenderFailed {
            page: 1,
            message: "late".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().warning, None);
}
