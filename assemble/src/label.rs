//! Label recognition for the start of a line.

use crate::AsmError;
use regex::Regex;
use std::sync::OnceLock;

/// `INTRODUCER` must be the first character of a line defining a label.
pub const INTRODUCER: char = ':';

/// Longest allowed label.
pub const MAX_LABEL: usize = 8;

const LABEL_LINE: &str = r"^:([A-Za-z][A-Za-z0-9_]{0,7})\s+(\S.*)$";
const LABEL_NAME: &str = r"^[A-Za-z][A-Za-z0-9_]{0,7}$";

fn compile(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => {
            panic!("Error parsing regex {pattern} - {err}");
        }
    })
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compile(&RE, LABEL_LINE)
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compile(&RE, LABEL_NAME)
}

/// `is_label_name` returns true if `s` is a syntactically valid label
/// (without the introducer).
#[must_use]
pub fn is_label_name(s: &str) -> bool {
    name_re().is_match(s)
}

/// `extract_label` splits a leading label off a normalized line. Lines which
/// don't start with the introducer come back whole with no label.
///
/// # Errors
/// A line starting with the introducer which doesn't form a valid label
/// followed by whitespace and an instruction. The specific error is chosen
/// in this order: leading digit, leading underscore, too long, nothing
/// following, anything else.
pub fn extract_label(line: &str) -> Result<(Option<String>, &str), AsmError> {
    let Some(body) = line.strip_prefix(INTRODUCER) else {
        return Ok((None, line));
    };
    if let Some(caps) = line_re().captures(line) {
        if let (Some(name), Some(rest)) = (caps.get(1), caps.get(2)) {
            return Ok((Some(name.as_str().to_ascii_uppercase()), rest.as_str()));
        }
    }

    let end = body.find(char::is_whitespace).unwrap_or(body.len());
    let (name, rest) = body.split_at(end);
    let label = name.to_string();
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => return Err(AsmError::LabelStartsWithDigit(label)),
        Some('_') => return Err(AsmError::LabelStartsWithUnderscore(label)),
        Some(_) => {}
        None => return Err(AsmError::InvalidLabel(line.to_string())),
    }
    if name.chars().count() > MAX_LABEL {
        return Err(AsmError::LabelTooLong(label));
    }
    if rest.trim().is_empty() {
        return Err(AsmError::LabelAlone(label));
    }
    Err(AsmError::InvalidLabel(line.to_string()))
}
