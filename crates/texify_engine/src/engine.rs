use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use texify_logging::{texify_debug, texify_warn};
use url::Url;

use crate::backend::{ConversionBackend, ReqwestBackend};
use crate::input::read_input_file;
use crate::persist::DownloadWriter;
use crate::render::{DocumentLoadError, DocumentRenderer, PdfRenderer};
use crate::timer::HideScheduler;
use crate::{ConversionError, EngineConfig, EngineEvent, HideToken, ReadId, RequestId};

enum EngineCommand {
    ReadFile { read_id: ReadId, path: PathBuf },
    Convert { request_id: RequestId, text: String },
    FetchDocument { request_id: RequestId, location: Url },
    LoadDocument { request_id: RequestId, bytes: Bytes },
    RenderPage { page: u32 },
    UnloadDocument,
    ScheduleHide { token: HideToken, delay: Duration },
    Save { filename: String, bytes: Bytes },
    CheckHealth,
}

/// Renderer plus a generation that `UnloadDocument` bumps, so a parse that
/// finishes after the document was retired is not installed.
struct ViewerSlot {
    generation: u64,
    renderer: Box<dyn DocumentRenderer>,
}

struct Worker {
    backend: Arc<dyn ConversionBackend>,
    viewer: Arc<Mutex<ViewerSlot>>,
    hide: HideScheduler,
    downloads: DownloadWriter,
    event_tx: mpsc::Sender<EngineEvent>,
}

/// Handle to the background IO runtime. Commands are fire-and-forget; every
/// result comes back as an [`EngineEvent`].
///
/// The runtime thread stops once every handle is dropped. Readers that must
/// not keep it alive take an [`EngineEvents`] instead.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    events: EngineEvents,
}

/// Receiving side of the engine; holds no command sender.
#[derive(Clone)]
pub struct EngineEvents {
    rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.rx.lock().ok()?.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ConversionError> {
        let backend = Arc::new(ReqwestBackend::new(config.backend.clone())?);
        Ok(Self::with_parts(
            backend,
            Box::new(PdfRenderer::new()),
            config.download_dir,
        ))
    }

    pub fn with_parts(
        backend: Arc<dyn ConversionBackend>,
        renderer: Box<dyn DocumentRenderer>,
        download_dir: PathBuf,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Arc::new(Worker {
            backend,
            viewer: Arc::new(Mutex::new(ViewerSlot {
                generation: 0,
                renderer,
            })),
            hide: HideScheduler::new(),
            downloads: DownloadWriter::new(download_dir),
            event_tx,
        });

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    texify_warn!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.dispatch(runtime.handle(), command);
            }
            texify_debug!("All engine handles dropped; stopping runtime");
            worker.hide.cancel();
        });

        Self {
            cmd_tx,
            events: EngineEvents {
                rx: Arc::new(Mutex::new(event_rx)),
            },
        }
    }

    pub fn read_file(&self, read_id: ReadId, path: PathBuf) {
        self.send(EngineCommand::ReadFile { read_id, path });
    }

    pub fn convert(&self, request_id: RequestId, text: String) {
        self.send(EngineCommand::Convert { request_id, text });
    }

    pub fn fetch_document(&self, request_id: RequestId, location: Url) {
        self.send(EngineCommand::FetchDocument {
            request_id,
            location,
        });
    }

    pub fn load_document(&self, request_id: RequestId, bytes: Bytes) {
        self.send(EngineCommand::LoadDocument { request_id, bytes });
    }

    pub fn render_page(&self, page: u32) {
        self.send(EngineCommand::RenderPage { page });
    }

    pub fn unload_document(&self) {
        self.send(EngineCommand::UnloadDocument);
    }

    pub fn schedule_hide(&self, token: HideToken, delay: Duration) {
        self.send(EngineCommand::ScheduleHide { token, delay });
    }

    pub fn save(&self, filename: String, bytes: Bytes) {
        self.send(EngineCommand::Save { filename, bytes });
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    pub fn events(&self) -> EngineEvents {
        self.events.clone()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.events.recv_timeout(timeout)
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            texify_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl Worker {
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }

    fn dispatch(self: &Arc<Self>, runtime: &tokio::runtime::Handle, command: EngineCommand) {
        match command {
            EngineCommand::ReadFile { read_id, path } => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let result = read_input_file(&path).await;
                    worker.emit(EngineEvent::FileRead { read_id, result });
                });
            }
            EngineCommand::Convert { request_id, text } => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let result = worker.backend.request_conversion(&text).await;
                    worker.emit(EngineEvent::ConversionCompleted { request_id, result });
                });
            }
            EngineCommand::FetchDocument {
                request_id,
                location,
            } => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let result = worker.backend.fetch_document(&location).await;
                    worker.emit(EngineEvent::DocumentFetched { request_id, result });
                });
            }
            EngineCommand::LoadDocument { request_id, bytes } => {
                let generation = self.viewer.lock().map(|slot| slot.generation).unwrap_or(0);
                let worker = self.clone();
                runtime.spawn_blocking(move || {
                    let result = worker.load_document(generation, &bytes);
                    worker.emit(EngineEvent::DocumentLoaded { request_id, result });
                });
            }
            EngineCommand::RenderPage { page } => {
                let worker = self.clone();
                runtime.spawn_blocking(move || {
                    let result = match worker.viewer.lock() {
                        Ok(slot) => slot.renderer.render_page(page),
                        Err(_) => Err(DocumentLoadError::NotLoaded),
                    };
                    worker.emit(EngineEvent::PageRendered { page, result });
                });
            }
            EngineCommand::UnloadDocument => {
                if let Ok(mut slot) = self.viewer.lock() {
                    slot.generation += 1;
                    slot.renderer.unload();
                }
            }
            EngineCommand::ScheduleHide { token, delay } => {
                let event_tx = self.event_tx.clone();
                self.hide.schedule(runtime, token, delay, move |token| {
                    let _ = event_tx.send(EngineEvent::HideElapsed { token });
                });
            }
            EngineCommand::Save { filename, bytes } => {
                let worker = self.clone();
                runtime.spawn_blocking(move || {
                    let result = worker.downloads.save(&filename, &bytes);
                    worker.emit(EngineEvent::ArtifactSaved { filename, result });
                });
            }
            EngineCommand::CheckHealth => {
                let worker = self.clone();
                runtime.spawn(async move {
                    let result = worker.backend.health().await;
                    worker.emit(EngineEvent::HealthChecked(result));
                });
            }
        }
    }

    fn load_document(&self, generation: u64, bytes: &[u8]) -> Result<u32, DocumentLoadError> {
        let mut slot = self
            .viewer
            .lock()
            .map_err(|_| DocumentLoadError::Parse("viewer unavailable".into()))?;
        if slot.generation != generation {
            texify_debug!("Skipping load of a document retired before parsing");
            return Err(DocumentLoadError::NotLoaded);
        }
        slot.renderer.load(bytes)
    }
}
