use once_cell::sync::Lazy;
use regex::Regex;

static ASSIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").expect("valid regex"));
static COLON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.*)$").expect("valid regex"));

/// One `KEY=VALUE` pair lifted out of a dotenv file or pasted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEnvVar {
    pub key: String,
    pub value: String,
}

impl ParsedEnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parse dotenv / YAML-ish `KEY: VALUE` text.
///
/// Returns `None` when nothing but blanks and comments remain, or when fewer
/// than half of the remaining lines look like assignments.
pub fn parse_env_text(text: &str) -> Option<Vec<ParsedEnvVar>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if lines.is_empty() {
        return None;
    }

    let parsed: Vec<ParsedEnvVar> = lines.iter().filter_map(|line| parse_line(line)).collect();

    if parsed.len() * 2 < lines.len() {
        log::debug!(
            "Rejecting input as env content: {} of {} lines parsed",
            parsed.len(),
            lines.len()
        );
        return None;
    }

    Some(parsed)
}

/// Paste handler: single-line pastes are left to the normal paste path.
pub fn parse_env_from_paste(pasted: &str) -> Option<Vec<ParsedEnvVar>> {
    if !pasted.contains('\n') {
        return None;
    }
    parse_env_text(pasted)
}

/// Clipboard read: empty clipboards carry no data.
pub fn parse_env_from_clipboard(text: &str) -> Option<Vec<ParsedEnvVar>> {
    if text.trim().is_empty() {
        return None;
    }
    parse_env_text(text)
}

fn parse_line(line: &str) -> Option<ParsedEnvVar> {
    let cleaned = line.strip_prefix("export ").unwrap_or(line);
    let caps = ASSIGN_RE
        .captures(cleaned)
        .or_else(|| COLON_RE.captures(cleaned))?;

    let key = caps.get(1)?.as_str();
    let value = strip_quotes(caps.get(2).map_or("", |m| m.as_str()).trim());
    Some(ParsedEnvVar::new(key, value))
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
