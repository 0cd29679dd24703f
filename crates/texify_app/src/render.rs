use std::fmt::Write as _;

use texify_core::{AppViewModel, DocumentStatus, WorkflowState};
use texify_engine::RenderedPage;

/// One-line summary printed after every state change in the shell.
pub fn status_line(view: &AppViewModel) -> String {
    let mut line = format!("[{}]", workflow_label(view.workflow));
    match &view.original_name {
        Some(name) => {
            let _ = write!(line, " {} ({} bytes)", name, format_with_commas(view.size_bytes));
        }
        None if !view.content.is_empty() => {
            let _ = write!(line, " typed input ({} chars)", view.content.chars().count());
        }
        None => line.push_str(" no input"),
    }
    if view.processing {
        line.push_str(" | converting...");
    }
    if view.document != DocumentStatus::Absent {
        let _ = write!(line, " | pdf: {}", document_label(view.document));
        if let Some(page) = view.page {
            let _ = write!(line, " {}/{}", page.current, page.total);
        }
    }
    if let Some(warning) = &view.warning {
        let _ = write!(line, " | ! {warning}");
    }
    line
}

/// Multi-line report used by `status` and at the end of a batch run.
pub fn report(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "State:     {}", workflow_label(view.workflow));
    let input = match &view.original_name {
        Some(name) => format!("{} ({} bytes)", name, format_with_commas(view.size_bytes)),
        None if view.content.is_empty() => "(empty)".to_string(),
        None => format!("typed text, {} chars", view.content.chars().count()),
    };
    let _ = writeln!(out, "Input:     {input}");
    if let Some(attempts) = view.attempts_used {
        let _ = writeln!(out, "Attempts:  {attempts}");
    }
    if let Some(source) = &view.source_download {
        let _ = writeln!(out, "LaTeX:     {}", source.filename);
    }
    if let Some(compiled) = &view.compiled_download {
        let _ = writeln!(out, "PDF:       {}", compiled.filename);
    }
    if view.document != DocumentStatus::Absent {
        let _ = write!(out, "Document:  {}", document_label(view.document));
        match view.page {
            Some(page) => {
                let _ = writeln!(out, ", page {} of {}", page.current, page.total);
            }
            None => out.push('\n'),
        }
    }
    if let Some(warning) = &view.warning {
        let _ = writeln!(out, "Warning:   {warning}");
    }
    if view.show_source_fallback {
        if let Some(source) = &view.source_text {
            let _ = writeln!(out, "\n{source}");
        }
    }
    out.trim_end().to_string()
}

pub fn page(rendered: &RenderedPage) -> String {
    format!(
        "--- page {} / {} ---\n{}",
        rendered.number,
        rendered.total,
        rendered.text.trim_end()
    )
}

fn workflow_label(workflow: WorkflowState) -> &'static str {
    match workflow {
        WorkflowState::Idle => "Idle",
        WorkflowState::Ready => "Ready",
        WorkflowState::Converting => "Converting",
        WorkflowState::Viewing => "Viewing",
        WorkflowState::Failed => "Failed",
    }
}

fn document_label(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Absent => "none",
        DocumentStatus::Fetching => "fetching",
        DocumentStatus::Loading => "loading",
        DocumentStatus::Displayed => "displayed",
        DocumentStatus::Failed => "unavailable",
    }
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
