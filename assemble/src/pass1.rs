use crate::label::extract_label;
use crate::normalize::normalize;
use crate::statement::parse;
use crate::{AsmError, Diagnostic, LabelEntry, Labels, END};
use log::{debug, trace};

/// `Pass1Output` is everything pass 1 learns about a source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pass1Output {
    /// Every label defined, fixed at the address counter where it appeared.
    pub labels: Labels,
    /// One entry per failing line, in line order.
    pub diagnostics: Vec<Diagnostic>,
    /// The address counter after the last line.
    pub org: u32,
    // The text this ran over so pass 2 can refuse anything else.
    source: String,
}

impl Pass1Output {
    fn new(source: &str) -> Self {
        Self {
            labels: Labels::default(),
            diagnostics: Vec::new(),
            org: 0,
            source: source.to_string(),
        }
    }

    /// Number of diagnostics. Pass 2 only runs when this is 0.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.diagnostics.len()
    }

    /// `matches` returns true if this was computed from `source`.
    #[must_use]
    pub fn matches(&self, source: &str) -> bool {
        self.source == source
    }

    fn error(&mut self, line_num: usize, error: AsmError) {
        trace!("pass 1 line {line_num}: {error}");
        self.diagnostics.push(Diagnostic { line_num, error });
    }

    // line processes a single source line. Any failure records a diagnostic
    // and leaves the address counter alone. A duplicate label is reported
    // but the rest of the line is still sized.
    fn line(mut self, line_num: usize, raw: &str) -> Self {
        let Some(line) = normalize(raw) else {
            return self;
        };
        let (label, rest) = match extract_label(&line) {
            Ok(v) => v,
            Err(e) => {
                self.error(line_num, e);
                return self;
            }
        };
        if let Some(label) = label {
            match u16::try_from(self.org) {
                Ok(org) => {
                    if let Err(e) = self.labels.insert(label, LabelEntry { line_num, org }) {
                        self.error(line_num, e);
                    }
                }
                Err(_) => {
                    let address = self.org;
                    self.error(line_num, AsmError::ImageOverflow { address, size: 0 });
                }
            }
        }
        let size = match parse(rest).and_then(|s| s.size(self.org)) {
            Ok(size) => size,
            Err(e) => {
                self.error(line_num, e);
                return self;
            }
        };
        if self.org + size > END {
            let address = self.org;
            self.error(line_num, AsmError::ImageOverflow { address, size });
            return self;
        }
        trace!("pass 1 line {line_num}: {:04X} +{size} {rest}", self.org);
        self.org += size;
        self
    }
}

/// `pass1` walks `source` building the label dictionary and computing
/// the final address counter without emitting anything. Branch and jump
/// targets aren't resolved here since forward references are legal.
#[must_use]
pub fn pass1(source: &str) -> Pass1Output {
    let out = source
        .lines()
        .enumerate()
        .fold(Pass1Output::new(source), |acc, (n, line)| acc.line(n + 1, line));
    debug!(
        "pass 1: {} label(s), {} error(s), final address {:04X}",
        out.labels.len(),
        out.errors(),
        out.org
    );
    out
}
