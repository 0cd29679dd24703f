use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use texify_engine::BackendSettings;

#[derive(Debug, Parser)]
#[command(
    name = "texify",
    version,
    about = "Convert plain text into LaTeX and preview the compiled PDF"
)]
pub struct Cli {
    /// Base address of the conversion service.
    #[arg(long, env = "TEXIFY_API_URL", global = true)]
    pub api_url: Option<String>,

    /// One of off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info", global = true, value_parser = parse_level)]
    pub log_level: LevelFilter,

    #[arg(long, default_value = "texify.log", global = true)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert one file and report the outcome.
    Convert {
        file: PathBuf,
        /// Save the .tex and .pdf artifacts into this directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the text of every compiled page.
        #[arg(long)]
        show_pages: bool,
    },
    /// Interactive session: load, edit, convert, page through, save.
    Shell {
        file: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Ask the conversion service whether it is up.
    Health,
}

fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse()
        .map_err(|_| format!("unknown log level '{value}'"))
}

impl Cli {
    pub fn backend_settings(&self) -> BackendSettings {
        let mut settings = BackendSettings::from_env();
        if let Some(url) = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
        {
            settings.base_url = url.to_string();
        }
        settings
    }
}
