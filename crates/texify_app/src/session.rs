use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use texify_core::{update, AppState, DocumentStatus, Msg};
use texify_engine::{EngineHandle, RenderedPage};
use texify_logging::{texify_debug, texify_info};

use crate::effects::{AppEvent, EffectRunner};
use crate::render;
use crate::shell::{self, ShellCommand};

pub struct BatchOptions {
    pub save: bool,
    pub show_pages: bool,
    /// Upper bound for each wait on the engine.
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { filename: String, path: PathBuf },
    Failed { filename: String, message: String },
}

/// Owns the core state and drives it from engine and shell events.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    page: Option<RenderedPage>,
    /// Latest page the renderer failed on, with the reason.
    render_failure: Option<(u32, String)>,
    saves: Vec<SaveOutcome>,
}

impl Session {
    pub fn start(engine: EngineHandle) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine, event_tx.clone()),
            event_tx,
            event_rx,
            page: None,
            render_failure: None,
            saves: Vec::new(),
        }
    }

    /// Runs one message through `update`, executes its effects and reports
    /// whether the view changed.
    fn apply(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);
        let dirty = state.consume_dirty();
        if state.viewer().total_pages().is_none() {
            self.page = None;
            self.render_failure = None;
        }
        self.state = state;
        dirty
    }

    fn handle(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Core(msg) => {
                match &msg {
                    Msg::ArtifactSaved { filename, path } => self.saves.push(SaveOutcome::Saved {
                        filename: filename.clone(),
                        path: path.clone(),
                    }),
                    Msg::ArtifactSaveFailed { filename, message } => {
                        self.saves.push(SaveOutcome::Failed {
                            filename: filename.clone(),
                            message: message.clone(),
                        })
                    }
                    _ => {}
                }
                self.apply(msg)
            }
            AppEvent::PageRendered {
                result: Ok(page), ..
            } => {
                let viewer = self.state.viewer();
                if viewer.total_pages() == Some(page.total) && viewer.current_page() == page.number
                {
                    self.page = Some(page);
                    true
                } else {
                    texify_debug!("Dropping render of page {} for a stale view", page.number);
                    false
                }
            }
            AppEvent::PageRendered {
                page,
                result: Err(err),
            } => {
                let viewer = self.state.viewer();
                if viewer.total_pages().is_some() && viewer.current_page() == page {
                    self.page = None;
                    self.render_failure = Some((page, err.to_string()));
                }
                self.apply(Msg::PageRenderFailed {
                    page,
                    message: err.to_string(),
                })
            }
            AppEvent::Health(result) => {
                texify_info!("Health check: {:?}", result);
                false
            }
            AppEvent::Command(command) => match command.into_msg() {
                Some(msg) => self.apply(msg),
                None => false,
            },
            AppEvent::InputClosed => false,
        }
    }

    /// Processes events until `done` holds or `timeout` runs out.
    fn pump_until(&mut self, timeout: Duration, done: impl Fn(&Self) -> bool) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while !done(self) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.handle(event);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    bail!("timed out after {}s waiting for the engine", timeout.as_secs())
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => bail!("engine stopped unexpectedly"),
            }
        }
        Ok(())
    }

    fn document_settled(&self) -> bool {
        !self.state.is_processing()
            && !matches!(
                self.state.view().document,
                DocumentStatus::Fetching | DocumentStatus::Loading
            )
    }

    /// True once `number` was either rendered or reported as failed.
    fn page_settled(&self, number: u32) -> bool {
        self.page.as_ref().map(|page| page.number) == Some(number)
            || self.render_failure.as_ref().map(|(page, _)| *page) == Some(number)
    }

    /// Loads `path`, converts it, and reports. Exits non-zero when no LaTeX
    /// source came back.
    pub fn convert_file(mut self, path: PathBuf, options: &BatchOptions) -> Result<ExitCode> {
        self.apply(Msg::FileSelected { path });
        self.pump_until(options.timeout, |s| !s.state.is_reading())?;
        if self.state.content().is_empty() {
            let view = self.state.view();
            bail!(view.warning.unwrap_or_else(|| "the file is empty".to_string()));
        }

        self.apply(Msg::ConvertClicked);
        self.pump_until(options.timeout, Session::document_settled)?;
        let view = self.state.view();
        println!("{}", render::report(&view));

        if options.show_pages {
            if let Some(total) = view.page.map(|page| page.total) {
                for number in 1..=total {
                    if number > 1 {
                        self.apply(Msg::GoToPage(number));
                    }
                    self.pump_until(options.timeout, |s| s.page_settled(number))?;
                    match (&self.page, &self.render_failure) {
                        (Some(page), _) if page.number == number => {
                            println!("\n{}", render::page(page))
                        }
                        (_, Some((failed, message))) if *failed == number => {
                            eprintln!("Could not render page {number}: {message}")
                        }
                        _ => {}
                    }
                }
            }
        }

        if options.save {
            self.apply(Msg::DownloadSourceClicked);
            self.apply(Msg::DownloadCompiledClicked);
            let expected = [&view.source_download, &view.compiled_download]
                .iter()
                .filter(|artifact| artifact.is_some())
                .count();
            self.pump_until(options.timeout, |s| s.saves.len() >= expected)?;
            for outcome in &self.saves {
                match outcome {
                    SaveOutcome::Saved { path, .. } => println!("Saved {}", path.display()),
                    SaveOutcome::Failed { filename, message } => {
                        eprintln!("Could not save {filename}: {message}")
                    }
                }
            }
        }

        let produced_source = view.source_download.is_some();
        self.apply(Msg::Shutdown);
        Ok(if produced_source {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    pub fn run_shell(mut self, initial: Option<PathBuf>) -> Result<ExitCode> {
        shell::spawn_stdin_reader(self.event_tx.clone());
        println!("{}", shell::HELP);
        if let Some(path) = initial {
            self.apply(Msg::FileSelected { path });
        }

        while let Ok(event) = self.event_rx.recv() {
            let fresh_page = matches!(event, AppEvent::PageRendered { result: Ok(_), .. });
            match event {
                AppEvent::Command(ShellCommand::Quit) | AppEvent::InputClosed => break,
                AppEvent::Command(ShellCommand::Status) => {
                    println!("{}", render::report(&self.state.view()));
                    if let Some(page) = &self.page {
                        println!("\n{}", render::page(page));
                    }
                }
                AppEvent::Command(ShellCommand::Help) => println!("{}", shell::HELP),
                event => {
                    if !self.handle(event) {
                        continue;
                    }
                    match (&self.page, fresh_page) {
                        (Some(page), true) => println!("{}", render::page(page)),
                        _ => println!("{}", render::status_line(&self.state.view())),
                    }
                }
            }
        }

        self.apply(Msg::Shutdown);
        texify_info!(
            "Session closed with {} live artifacts",
            self.state.artifacts().live_count()
        );
        Ok(ExitCode::SUCCESS)
    }
}
