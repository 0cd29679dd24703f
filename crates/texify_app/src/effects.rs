use std::sync::mpsc;
use std::thread;

use texify_core::{CompiledOutcome, ConversionResult, Effect, Msg};
use texify_engine::{
    Compilation, ConversionResponse, DocumentLoadError, EngineEvent, EngineHandle, HealthStatus,
    RenderedPage,
};
use texify_logging::{texify_debug, texify_info, texify_warn};

use crate::shell::ShellCommand;

/// Everything the session loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Core(Msg),
    /// Page text for the viewer; kept outside the core state.
    PageRendered {
        page: u32,
        result: Result<RenderedPage, DocumentLoadError>,
    },
    Health(Result<HealthStatus, String>),
    Command(ShellCommand),
    InputClosed,
}

/// Executes core effects on the engine and feeds engine events back as
/// [`AppEvent`]s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(event_tx);
        runner
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ReadFile { read_id, path } => {
                    texify_info!("ReadFile read_id={} path={:?}", read_id, path);
                    self.engine.read_file(read_id, path);
                }
                Effect::RequestConversion { request_id, text } => {
                    texify_info!(
                        "RequestConversion request_id={} bytes={}",
                        request_id,
                        text.len()
                    );
                    self.engine.convert(request_id, text);
                }
                Effect::FetchDocument {
                    request_id,
                    location,
                } => {
                    self.engine.fetch_document(request_id, location);
                }
                Effect::LoadDocument { request_id, bytes } => {
                    self.engine.load_document(request_id, bytes);
                }
                Effect::RenderPage { page } => self.engine.render_page(page),
                Effect::UnloadDocument => self.engine.unload_document(),
                Effect::ScheduleWarningHide { token, delay } => {
                    self.engine.schedule_hide(token, delay);
                }
                Effect::SaveArtifact {
                    filename,
                    mime,
                    bytes,
                } => {
                    texify_debug!("Saving {} ({}, {} bytes)", filename, mime, bytes.len());
                    self.engine.save(filename, bytes);
                }
            }
        }
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let events = self.engine.events();
        thread::spawn(move || {
            while let Some(event) = events.recv() {
                if event_tx.send(translate(event)).is_err() {
                    break;
                }
            }
        });
    }
}

pub fn translate(event: EngineEvent) -> AppEvent {
    match event {
        EngineEvent::FileRead { read_id, result } => AppEvent::Core(match result {
            Ok(input) => Msg::FileLoaded {
                read_id,
                original_name: input.original_name,
                size_bytes: input.size_bytes,
                content: input.content,
            },
            Err(err) => {
                texify_warn!("File read {} failed: {}", read_id, err);
                Msg::FileReadFailed {
                    read_id,
                    message: err.to_string(),
                }
            }
        }),
        EngineEvent::ConversionCompleted { request_id, result } => {
            AppEvent::Core(Msg::ConversionFinished {
                request_id,
                outcome: result.map(to_result).map_err(|err| err.to_string()),
            })
        }
        EngineEvent::DocumentFetched { request_id, result } => AppEvent::Core(match result {
            Ok(bytes) => Msg::DocumentFetched { request_id, bytes },
            Err(err) => Msg::DocumentFetchFailed {
                request_id,
                message: err.to_string(),
            },
        }),
        EngineEvent::DocumentLoaded { request_id, result } => AppEvent::Core(match result {
            Ok(page_count) => Msg::DocumentLoaded {
                request_id,
                page_count,
            },
            Err(err) => Msg::DocumentLoadFailed {
                request_id,
                message: err.to_string(),
            },
        }),
        EngineEvent::PageRendered { page, result } => AppEvent::PageRendered { page, result },
        EngineEvent::HideElapsed { token } => AppEvent::Core(Msg::WarningExpired { token }),
        EngineEvent::ArtifactSaved { filename, result } => AppEvent::Core(match result {
            Ok(path) => Msg::ArtifactSaved { filename, path },
            Err(err) => Msg::ArtifactSaveFailed {
                filename,
                message: err.to_string(),
            },
        }),
        EngineEvent::HealthChecked(result) => {
            AppEvent::Health(result.map_err(|err| err.to_string()))
        }
    }
}

fn to_result(response: ConversionResponse) -> ConversionResult {
    ConversionResult {
        source_text: response.source_text,
        compiled: match response.compilation {
            Compilation::Succeeded { document } => CompiledOutcome::Succeeded { document },
            Compilation::Failed { reason } => CompiledOutcome::Failed { reason },
        },
        attempts_used: response.attempts_used,
    }
}
