use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use texify_core::Msg;
use texify_logging::texify_debug;

use crate::effects::AppEvent;

pub const HELP: &str = "\
Commands:
  open <path>     load a .txt or .md file
  edit <text>     replace the input text (\\n inserts a line break)
  convert         send the input for conversion
  next | prev     move through the compiled pages
  page <n>        jump to page n
  save-tex        save the LaTeX source
  save-pdf        save the compiled PDF
  dismiss         close the current warning
  status          show the full session state
  help            show this list
  quit            leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Edit(String),
    Convert,
    Next,
    Previous,
    Page(u32),
    SaveSource,
    SaveCompiled,
    Dismiss,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    /// The core message this command stands for; `None` for commands the
    /// shell answers itself.
    pub fn into_msg(self) -> Option<Msg> {
        match self {
            ShellCommand::Open(path) => Some(Msg::FileSelected { path }),
            ShellCommand::Edit(text) => Some(Msg::ContentEdited(text)),
            ShellCommand::Convert => Some(Msg::ConvertClicked),
            ShellCommand::Next => Some(Msg::NextPage),
            ShellCommand::Previous => Some(Msg::PreviousPage),
            ShellCommand::Page(page) => Some(Msg::GoToPage(page)),
            ShellCommand::SaveSource => Some(Msg::DownloadSourceClicked),
            ShellCommand::SaveCompiled => Some(Msg::DownloadCompiledClicked),
            ShellCommand::Dismiss => Some(Msg::WarningDismissed),
            ShellCommand::Status | ShellCommand::Help | ShellCommand::Quit => None,
        }
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "open" if rest.is_empty() => return Err("usage: open <path>".to_string()),
        "open" => ShellCommand::Open(PathBuf::from(rest)),
        "edit" => ShellCommand::Edit(rest.replace("\\n", "\n")),
        "convert" => ShellCommand::Convert,
        "next" | "n" => ShellCommand::Next,
        "prev" | "p" => ShellCommand::Previous,
        "page" => match rest.parse::<u32>() {
            Ok(page) => ShellCommand::Page(page),
            Err(_) => return Err("usage: page <number>".to_string()),
        },
        "save-tex" => ShellCommand::SaveSource,
        "save-pdf" => ShellCommand::SaveCompiled,
        "dismiss" => ShellCommand::Dismiss,
        "status" => ShellCommand::Status,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

/// Reads stdin on its own thread, forwarding parsed commands.
pub fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if event_tx.send(AppEvent::Command(command)).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(message) => eprintln!("{message}"),
            }
        }
        texify_debug!("stdin closed");
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}
