/// Stem used when the content was typed rather than loaded from a file.
pub const DEFAULT_STEM: &str = "output";

const MAX_STEM_CHARS: usize = 80;

/// Derives a download filename: `{stem}{extension}` where `stem` is the
/// original name without its last extension.
///
/// The stem is made filesystem-safe, so `"report.txt"` becomes `"report.tex"`
/// for `extension == ".tex"` and a missing name falls back to [`DEFAULT_STEM`].
pub fn derive_name(original_name: Option<&str>, extension: &str) -> String {
    let stem = original_name
        .map(strip_extension)
        .map(sanitize_stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string());
    format!("{stem}{extension}")
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() && !name[idx + 1..].contains(['/', '\\']) => {
            &name[..idx]
        }
        _ => name,
    }
}

fn sanitize_stem(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut prev_replaced = false;
    for c in input.chars() {
        if is_forbidden(c) {
            // Collapse runs of forbidden characters into one underscore.
            if !prev_replaced {
                cleaned.push('_');
            }
            prev_replaced = true;
        } else {
            cleaned.push(c);
            prev_replaced = false;
        }
    }

    let mut stem: String = cleaned
        .trim_matches(|c: char| c == '.' || c.is_whitespace())
        .chars()
        .take(MAX_STEM_CHARS)
        .collect();
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
