#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use texify_core::{
    update, AppState, CompiledOutcome, ConversionResult, Effect, Msg, RequestId, WarningToken,
};
use url::Url;

pub const PDF_LOCATION: &str = "http://localhost:5000/files/out.pdf";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(texify_logging::initialize_for_tests);
}

pub fn select_file(state: AppState, name: &str, content: &str) -> (AppState, Vec<Effect>) {
    let (state, effects) = update(
        state,
        Msg::FileSelected {
            path: PathBuf::from(name),
        },
    );
    let read_id = match effects.as_slice() {
        [Effect::ReadFile { read_id, .. }] => *read_id,
        other => panic!("expected a single ReadFile effect, got {other:?}"),
    };
    update(
        state,
        Msg::FileLoaded {
            read_id,
            original_name: Some(name.to_string()),
            size_bytes: content.len() as u64,
            content: content.to_string(),
        },
    )
}

pub fn start_conversion(state: AppState) -> (AppState, RequestId) {
    let (state, effects) = update(state, Msg::ConvertClicked);
    let request_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::RequestConversion { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("RequestConversion effect");
    (state, request_id)
}

pub fn compiled(source: &str) -> ConversionResult {
    ConversionResult {
        source_text: source.to_string(),
        compiled: CompiledOutcome::Succeeded {
            document: Url::parse(PDF_LOCATION).unwrap(),
        },
        attempts_used: Some(1),
    }
}

pub fn compile_failed(source: &str, reason: &str) -> ConversionResult {
    ConversionResult {
        source_text: source.to_string(),
        compiled: CompiledOutcome::Failed {
            reason: reason.to_string(),
        },
        attempts_used: Some(4),
    }
}

/// Runs a full successful conversion including document fetch and load.
pub fn convert_and_display(state: AppState, source: &str, pages: u32) -> AppState {
    let (state, request_id) = start_conversion(state);
    let (state, _) = update(
        state,
        Msg::ConversionFinished {
            request_id,
            outcome: Ok(compiled(source)),
        },
    );
    let (state, _) = update(
        state,
        Msg::DocumentFetched {
            request_id,
            bytes: bytes::Bytes::from_static(b"%PDF-1.7"),
        },
    );
    let (state, _) = update(
        state,
        Msg::DocumentLoaded {
            request_id,
            page_count: pages,
        },
    );
    state
}

pub fn hide_token(effects: &[Effect]) -> WarningToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ScheduleWarningHide { token, .. } => Some(*token),
            _ => None,
        })
        .expect("ScheduleWarningHide effect")
}
