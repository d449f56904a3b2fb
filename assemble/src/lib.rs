//! `assemble` provides methods for processing a list of input
//! lines of Tiny BASIC IL into a binary 64k image.
//!
//! Assembly is two passes. Pass 1 sizes every line and builds the label
//! dictionary. Pass 2 takes that dictionary read-only and emits bytes.
//! Each pass visits every line and collects a diagnostic per failing line
//! so one run reports everything wrong with a file.
//!
//! Source format, one statement per line:
//!
//! ```text
//! :LABEL  MNEMONIC operand   // comment
//! ```

use ahash::AHashMap;
use color_eyre::eyre::{eyre, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::Write;
use std::fs::read;
use std::path::Path;
use tinyil::prelude::*;

mod error;
pub mod expr;
pub mod label;
pub mod normalize;
mod pass1;
mod pass2;
mod session;
mod statement;
pub mod text;

pub use error::{AsmError, Diagnostic, ErrorKind, Pass2Error};
pub use pass1::{pass1, Pass1Output};
pub use pass2::{pass2, Pass2Output};
pub use session::{Session, SessionState};
pub use statement::{HERE, ORG};


// One past the last address in an image.
pub(crate) const END: u32 = 0x1_0000;

/// `LabelEntry` records where a label was defined and the address it
/// refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LabelEntry {
    /// 1 based line number of the definition.
    #[serde(rename = "line")]
    pub line_num: usize,
    /// Address counter value at the definition.
    pub org: u16,
}

/// `Labels` is the label dictionary built by pass 1. Names are unique and
/// stored uppercased. Once built it's only read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    map: AHashMap<String, LabelEntry>,
}

impl Labels {
    /// Look up a label by (uppercased) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LabelEntry> {
        self.map.get(name)
    }

    /// Number of labels defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if no labels were defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// `sorted` returns every label ordered by address and then name.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &LabelEntry)> {
        let mut v: Vec<_> = self.map.iter().map(|(k, e)| (k.as_str(), e)).collect();
        v.sort_by(|a, b| a.1.org.cmp(&b.1.org).then(a.0.cmp(b.0)));
        v
    }

    /// `table` renders the labels one per line with their address in both
    /// decimal and hex.
    #[must_use]
    pub fn table(&self) -> String {
        let mut out = String::new();
        for (name, e) in self.sorted() {
            // Writing into a String can't fail.
            let _ = writeln!(out, "{name:<8} {:>5}  ${:04X}", e.org, e.org);
        }
        out
    }

    // insert adds a new label. Existing labels are never overwritten.
    pub(crate) fn insert(&mut self, name: String, entry: LabelEntry) -> Result<(), AsmError> {
        if let Some(prev) = self.map.get(&name) {
            return Err(AsmError::DuplicateLabel {
                label: name,
                line: prev.line_num,
            });
        }
        self.map.insert(name, entry);
        Ok(())
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.sorted();
        let mut m = serializer.serialize_map(Some(sorted.len()))?;
        for (name, e) in sorted {
            m.serialize_entry(name, e)?;
        }
        m.end()
    }
}

/// Assembly defines the output from a complete assemble.
#[derive(Debug)]
pub struct Assembly {
    /// The label dictionary from pass 1.
    pub labels: Labels,
    /// The binary image. Always 64k.
    pub bin: Image,
    /// The address counter after the last line.
    pub org: u32,
    /// A listing of the translated input.
    pub listing: String,
}

/// `report` folds the diagnostics from a pass into a single error, one line
/// per diagnostic followed by a count.
#[must_use]
pub fn report(pass: &str, diagnostics: &[Diagnostic]) -> color_eyre::Report {
    let mut errors = String::new();
    for d in diagnostics {
        let _ = writeln!(errors, "{d}");
    }
    let _ = write!(errors, "{pass}: {} error(s)", diagnostics.len());
    eyre!(errors)
}

/// `assemble` runs both passes over `source`.
///
/// # Errors
/// If either pass reports diagnostics they're all returned in one error.
pub fn assemble(source: &str) -> Result<Assembly> {
    let p1 = pass1(source);
    if !p1.diagnostics.is_empty() {
        return Err(report("pass 1", &p1.diagnostics));
    }
    let p2 = pass2(source, &p1)?;
    if !p2.diagnostics.is_empty() {
        return Err(report("pass 2", &p2.diagnostics));
    }
    Ok(Assembly {
        labels: p1.labels,
        bin: p2.image,
        org: p2.org,
        listing: p2.listing,
    })
}

/// `read_source` loads a file mapping each byte to the character with the
/// same code (latin-1) so text literals stay 8 bit clean.
///
/// # Errors
/// Any error reading the file.
pub fn read_source<P: AsRef<Path>>(filename: P) -> Result<String> {
    let bytes = read(filename)?;
    Ok(bytes.iter().map(|b| char::from(*b)).collect())
}

/// `assemble_file` reads `filename` and assembles it.
///
/// # Errors
/// Any error reading the file or assembling it.
pub fn assemble_file<P: AsRef<Path>>(filename: P) -> Result<Assembly> {
    assemble(&read_source(filename)?)
}
