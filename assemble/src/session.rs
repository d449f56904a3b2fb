use crate::{pass1, pass2, Pass1Output, Pass2Error, Pass2Output};
use strum_macros::Display;

/// `SessionState` tracks where a `Session` is in the assembly sequence.
///
/// Idle -> Pass1Running -> Pass1Clean | Pass1Errored
/// Pass1Clean -> Pass2Running -> Pass2Done
///
/// Editing the source from any state returns to Idle.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum SessionState {
    /// No pass 1 result for the current source.
    #[default]
    Idle,
    /// Pass 1 is in progress.
    Pass1Running,
    /// Pass 1 finished with no diagnostics.
    Pass1Clean,
    /// Pass 1 finished with diagnostics. Pass 2 can't run.
    Pass1Errored,
    /// Pass 2 is in progress.
    Pass2Running,
    /// Pass 2 finished. Its diagnostics (if any) are in the output.
    Pass2Done,
}

/// `Session` owns a source text and the results of assembling it so a
/// front end can't run pass 2 against stale or failed pass 1 output.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) source: String,
    state: SessionState,
    pass1: Option<Pass1Output>,
    pass2: Option<Pass2Output>,
}

impl Session {
    /// Start a session for `source`.
    #[must_use]
    pub fn new<S: Into<String>>(source: S) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `edit` replaces the source which discards any previous results.
    pub fn edit<S: Into<String>>(&mut self, source: S) {
        self.source = source.into();
        self.state = SessionState::Idle;
        self.pass1 = None;
        self.pass2 = None;
    }

    /// `run_pass1` runs pass 1 over the current source. Any pass 2 result
    /// is discarded.
    pub fn run_pass1(&mut self) -> &Pass1Output {
        self.state = SessionState::Pass1Running;
        self.pass2 = None;
        let out = pass1(&self.source);
        self.state = if out.errors() == 0 {
            SessionState::Pass1Clean
        } else {
            SessionState::Pass1Errored
        };
        self.pass1.insert(out)
    }

    /// `run_pass2` runs pass 2 using the pass 1 result.
    ///
    /// # Errors
    /// Only allowed directly after a clean pass 1. If pass 2 refuses to
    /// run the session stays in `Pass1Clean`.
    pub fn run_pass2(&mut self) -> Result<&Pass2Output, Pass2Error> {
        let p1 = match (self.state, self.pass1.as_ref()) {
            (SessionState::Pass1Clean, Some(p1)) => p1,
            (SessionState::Pass1Errored, Some(p1)) => {
                return Err(Pass2Error::Pass1Errors(p1.errors()));
            }
            (state, _) => return Err(Pass2Error::NotReady(state)),
        };
        self.state = SessionState::Pass2Running;
        match pass2(&self.source, p1) {
            Ok(out) => {
                self.state = SessionState::Pass2Done;
                Ok(self.pass2.insert(out))
            }
            Err(e) => {
                self.state = SessionState::Pass1Clean;
                Err(e)
            }
        }
    }

    /// The last pass 1 result, if still valid.
    #[must_use]
    pub fn pass1(&self) -> Option<&Pass1Output> {
        self.pass1.as_ref()
    }

    /// The last pass 2 result, if still valid.
    #[must_use]
    pub fn pass2(&self) -> Option<&Pass2Output> {
        self.pass2.as_ref()
    }
}
