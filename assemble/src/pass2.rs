use crate::label::extract_label;
use crate::normalize::normalize;
use crate::statement::{encode, parse, Statement};
use crate::{AsmError, Diagnostic, Labels, Pass1Output, Pass2Error, END};
use log::{debug, trace};
use std::fmt::Write;
use tinyil::prelude::*;

/// `Pass2Output` is the result of emitting a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pass2Output {
    /// The full 64k image. Anything not written is zero.
    pub image: Image,
    /// One entry per failing line, in line order.
    pub diagnostics: Vec<Diagnostic>,
    /// The address counter after the last line.
    pub org: u32,
    /// A listing of every line which assembled.
    pub listing: String,
}

impl Pass2Output {
    /// Number of diagnostics.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.diagnostics.len()
    }

    fn error(&mut self, line_num: usize, error: AsmError) {
        trace!("pass 2 line {line_num}: {error}");
        self.diagnostics.push(Diagnostic { line_num, error });
    }

    fn list(&mut self, bytes: &[u8], label: Option<&str>, rest: &str) {
        let hex = bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let label = label.unwrap_or("");
        // Writing into a String can't fail.
        let _ = writeln!(self.listing, "{:04X} {hex:<9} {label:<8} {rest}", self.org);
    }

    fn line(mut self, line_num: usize, raw: &str, labels: &Labels) -> Self {
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
        // A line which failed earlier in this pass didn't advance the counter.
        // Labels realign it to where pass 1 put them so later lines still
        // land at their recorded addresses.
        if let Some(label) = &label {
            let Some(e) = labels.get(label) else {
                self.error(line_num, AsmError::MissingLabelEntry(label.clone()));
                return self;
            };
            self.org = u32::from(e.org);
        }
        let stmt = match parse(rest) {
            Ok(s) => s,
            Err(e) => {
                self.error(line_num, e);
                return self;
            }
        };
        let bytes = match &stmt {
            Statement::Org(_) => match stmt.size(self.org) {
                Ok(size) => {
                    self.list(&[], label.as_deref(), rest);
                    self.org += size;
                    return self;
                }
                Err(e) => {
                    self.error(line_num, e);
                    return self;
                }
            },
            Statement::Op(inst, op) => match encode(*inst, op, self.org, labels) {
                Ok(b) => b,
                Err(e) => {
                    self.error(line_num, e);
                    return self;
                }
            },
        };
        if !self.image.store(self.org, &bytes) {
            // Lines are short so this fits.
            #[allow(clippy::cast_possible_truncation)]
            let size = bytes.len() as u32;
            let address = self.org;
            self.error(line_num, AsmError::ImageOverflow { address, size });
            return self;
        }
        trace!("pass 2 line {line_num}: {:04X} {bytes:02X?}", self.org);
        self.list(&bytes, label.as_deref(), rest);
        // store succeeded so this is at most END.
        self.org += u32::try_from(bytes.len()).unwrap_or(END);
        self
    }
}

/// `pass2` walks `source` again emitting bytes using the labels from
/// `pass1`, which is only read.
///
/// # Errors
/// Refuses to run if `pass1` reported errors or was computed from a
/// different source text. Problems with individual lines are returned as
/// diagnostics in `Pass2Output` instead.
pub fn pass2(source: &str, pass1: &Pass1Output) -> Result<Pass2Output, Pass2Error> {
    if pass1.errors() != 0 {
        return Err(Pass2Error::Pass1Errors(pass1.errors()));
    }
    if !pass1.matches(source) {
        return Err(Pass2Error::StaleSource);
    }
    let init = Pass2Output {
        image: Image::new(),
        diagnostics: Vec::new(),
        org: 0,
        listing: String::new(),
    };
    let out = source
        .lines()
        .enumerate()
        .fold(init, |acc, (n, line)| acc.line(n + 1, line, &pass1.labels));
    debug!(
        "pass 2: {} error(s), final address {:04X}",
        out.errors(),
        out.org
    );
    Ok(out)
}
