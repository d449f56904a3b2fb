//! Text literal handling for PC and BC.

use crate::AsmError;

/// `CARET` marks control characters (A^ is 0x01) and escapes itself (^^).
pub const CARET: u8 = b'^';

/// `unquote` returns the text between a matched pair of single or double
/// quotes. The whole token must be the quoted span.
///
/// # Errors
/// `AsmError::InvalidText` if `token` isn't a complete quoted span.
pub fn unquote(token: &str) -> Result<&str, AsmError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open @ ('"' | '\'')), Some(close)) if open == close => {
            Ok(&token[1..token.len() - 1])
        }
        _ => Err(AsmError::InvalidText(token.to_string())),
    }
}

/// `transform` encodes literal text into the bytes the interpreter expects.
/// Scanning left to right:
///
/// - an uppercase letter or @ followed by ^ becomes that character - 64
/// - ^^ becomes a single ^
/// - anything else is copied
///
/// The last byte produced always has bit 7 set to mark the end of the text.
/// Empty text produces no bytes.
///
/// # Errors
/// `AsmError::TextOutOfRange` for characters above U+00FF.
pub fn transform(text: &str) -> Result<Vec<u8>, AsmError> {
    let src = text
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| AsmError::TextOutOfRange(c)))
        .collect::<Result<Vec<u8>, _>>()?;

    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        let next = src.get(i + 1).copied();
        match (b, next) {
            (b'@'..=b'Z', Some(CARET)) => {
                out.push(b - 64);
                i += 2;
            }
            (CARET, Some(CARET)) => {
                out.push(CARET);
                i += 2;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
    }
    if let Some(last) = out.last_mut() {
        *last |= 0x80;
    }
    Ok(out)
}
