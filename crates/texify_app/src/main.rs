mod cli;
mod effects;
mod render;
mod session;
mod shell;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use texify_engine::{BackendSettings, EngineConfig, EngineEvent, EngineHandle};
use texify_logging::{texify_error, texify_info, LogDestination};

use cli::{Cli, Command};
use session::{BatchOptions, Session};

/// Extra time a batch run waits beyond the request timeout, covering the
/// document fetch and parse that follow the conversion.
const BATCH_GRACE: Duration = Duration::from_secs(60);

fn main() -> ExitCode {
    let cli = Cli::parse();
    texify_logging::initialize(LogDestination::File, cli.log_level, &cli.log_file);
    texify_info!("texify {} starting", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            texify_error!("{:#}", err);
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = cli.backend_settings();
    texify_info!("Using conversion service at {}", settings.base_url);

    match cli.command {
        Command::Health => health(settings),
        Command::Convert {
            file,
            out,
            show_pages,
        } => {
            let options = BatchOptions {
                save: out.is_some(),
                show_pages,
                timeout: settings.request_timeout + BATCH_GRACE,
            };
            let session = start_session(settings, out.unwrap_or_else(|| PathBuf::from(".")))?;
            session.convert_file(file, &options)
        }
        Command::Shell { file, out } => {
            let session = start_session(settings, out)?;
            session.run_shell(file)
        }
    }
}

fn start_session(settings: BackendSettings, download_dir: PathBuf) -> Result<Session> {
    let engine = EngineHandle::new(EngineConfig::new(settings, download_dir))
        .context("failed to start the conversion engine")?;
    Ok(Session::start(engine))
}

fn health(settings: BackendSettings) -> Result<ExitCode> {
    let timeout = settings.connect_timeout + settings.request_timeout;
    let engine = EngineHandle::new(EngineConfig::new(settings, PathBuf::from(".")))
        .context("failed to start the conversion engine")?;
    engine.check_health();

    match engine.recv_timeout(timeout) {
        Some(EngineEvent::HealthChecked(Ok(status))) => {
            match status.message {
                Some(message) => println!("{}: {}", status.status, message),
                None => println!("{}", status.status),
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(EngineEvent::HealthChecked(Err(err))) => {
            bail!("conversion service is unreachable: {err}")
        }
        _ => bail!("no health response within {}s", timeout.as_secs()),
    }
}
