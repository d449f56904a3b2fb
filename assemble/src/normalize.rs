//! Line cleanup and tokenizing shared by both passes.

/// `COMMENT` starts a comment which runs to end of line.
/// NOTE: It's honored even inside quoted text. `PC "A//B"` loses everything
///       from the // on.
pub const COMMENT: &str = "//";

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// `normalize` drops any comment, trims the line and upper cases everything
/// outside quotes. Quoted text is preserved exactly. Returns None for lines
/// which end up empty.
#[must_use]
pub fn normalize(line: &str) -> Option<String> {
    let line = match line.find(COMMENT) {
        Some(pos) => &line[..pos],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut quote = None;
    let out = line
        .chars()
        .map(|c| match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                c
            }
            None => {
                if is_quote(c) {
                    quote = Some(c);
                }
                c.to_ascii_uppercase()
            }
        })
        .collect();
    Some(out)
}

/// `split_first` splits off the first whitespace delimited field,
/// returning it and the trimmed remainder.
#[must_use]
pub fn split_first(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

/// `tokenize` splits on whitespace except inside quoted spans which stay
/// part of the token they appear in.
#[must_use]
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut quote = None;
    for (pos, c) in line.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&line[s..pos]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(pos);
        }
        if is_quote(c) {
            quote = Some(c);
        }
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }
    tokens
}
