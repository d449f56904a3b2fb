use crate::session::SessionState;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use strum_macros::Display;
use thiserror::Error;

/// `ErrorKind` groups line level errors into the categories a front end
/// reports them under.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed, duplicate or undefined labels.
    Label,
    /// Expressions which don't parse or don't produce an integer.
    Expression,
    /// Operand values outside what the encoding can hold.
    OperandRange,
    /// Anything not in the instruction table.
    UnknownMnemonic,
    /// Operands of the wrong shape for the instruction.
    Syntax,
    /// Pass 2 disagreeing with what pass 1 recorded.
    Internal,
}

/// `AsmError` defines every condition which can make a single source line
/// fail to assemble.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum AsmError {
    /// Label body begins with a digit.
    #[error("invalid label {0} - can't begin with a digit")]
    LabelStartsWithDigit(String),

    /// Label body begins with an underscore.
    #[error("invalid label {0} - can't begin with an underscore")]
    LabelStartsWithUnderscore(String),

    /// Label body is longer than 8 characters.
    #[error("invalid label {0} - exceeds 8 characters")]
    LabelTooLong(String),

    /// A label with nothing after it.
    #[error("invalid label {0} - must be followed by an instruction")]
    LabelAlone(String),

    /// Anything else wrong with a label.
    #[error("invalid label format - {0}")]
    InvalidLabel(String),

    /// A label defined twice.
    #[error("can't redefine label {label}. Already defined at line {line}")]
    DuplicateLabel {
        /// The label name.
        label: String,
        /// Line of the original definition.
        line: usize,
    },

    /// A label referenced but never defined.
    #[error("label {0} was never defined")]
    UndefinedLabel(String),

    /// A jump/branch target which isn't a label, * or an expression.
    #[error("invalid target - {0}")]
    InvalidTarget(String),

    /// An expression which didn't evaluate to an integer.
    #[error("invalid expression - {0}")]
    InvalidExpression(String),

    /// Not a mnemonic or directive.
    #[error("invalid opcode - {0}")]
    UnknownMnemonic(String),

    /// An instruction which needs an operand didn't get one.
    #[error("{0} requires an operand")]
    MissingOperand(String),

    /// An instruction got more than it takes.
    #[error("{mnemonic} doesn't take operand - {operand}")]
    UnexpectedOperand {
        /// The instruction.
        mnemonic: String,
        /// The extra text.
        operand: String,
    },

    /// SX with something other than a single octal digit.
    #[error("SX requires a single digit 0-7 - {0}")]
    InvalidStackOffset(String),

    /// Text which isn't enclosed in a matched pair of quotes.
    #[error("invalid quoted text - {0}")]
    InvalidText(String),

    /// PC/BC with "".
    #[error("{0} requires non-empty text")]
    EmptyText(String),

    /// A text character with no 8 bit representation.
    #[error("character {0:?} can't be represented in 8 bits")]
    TextOutOfRange(char),

    /// .ORG moving the address counter backwards.
    #[error("ORG value {org:#06X} is less than current address {current:#06X}")]
    OrgBackwards {
        /// The requested value.
        org: i64,
        /// The address counter at the directive.
        current: u32,
    },

    /// .ORG outside the 16 bit address space.
    #[error("ORG value {0} not 16 bit")]
    OrgOutOfRange(i64),

    /// LB value outside -128..=255.
    #[error("value {0} not 8 bit")]
    ByteOutOfRange(i64),

    /// LN value outside -32768..=65535.
    #[error("value {0} not 16 bit")]
    WordOutOfRange(i64),

    /// JS/J target above 0x07FF.
    #[error("target {0} out of range 0x0000-0x07FF for jump")]
    JumpOutOfRange(i64),

    /// BR target too far in either direction.
    #[error("target {target:#06X} out of range for relative branch at {current:#06X}")]
    RelativeOutOfRange {
        /// Resolved target address.
        target: i64,
        /// Address of the branch.
        current: u32,
    },

    /// BC/BV/BN/BE target behind or too far ahead.
    #[error("target {target:#06X} out of range for forward branch at {current:#06X}")]
    ForwardOutOfRange {
        /// Resolved target address.
        target: i64,
        /// Address of the branch.
        current: u32,
    },

    /// Bytes (or a label) landing past 0xFFFF.
    #[error("{size} bytes at {address:#06X} run past the end of memory")]
    ImageOverflow {
        /// Address the line starts at.
        address: u32,
        /// Bytes the line needs.
        size: u32,
    },

    /// Pass 2 found a label pass 1 never recorded.
    #[error("internal error: label {0} wasn't recorded in pass 1")]
    MissingLabelEntry(String),
}

impl AsmError {
    /// `kind` returns the category this error is reported under.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LabelStartsWithDigit(_)
            | Self::LabelStartsWithUnderscore(_)
            | Self::LabelTooLong(_)
            | Self::LabelAlone(_)
            | Self::InvalidLabel(_)
            | Self::DuplicateLabel { .. }
            | Self::UndefinedLabel(_) => ErrorKind::Label,
            Self::InvalidExpression(_) => ErrorKind::Expression,
            Self::OrgBackwards { .. }
            | Self::OrgOutOfRange(_)
            | Self::ByteOutOfRange(_)
            | Self::WordOutOfRange(_)
            | Self::JumpOutOfRange(_)
            | Self::RelativeOutOfRange { .. }
            | Self::ForwardOutOfRange { .. }
            | Self::ImageOverflow { .. }
            | Self::TextOutOfRange(_) => ErrorKind::OperandRange,
            Self::UnknownMnemonic(_) => ErrorKind::UnknownMnemonic,
            Self::InvalidTarget(_)
            | Self::MissingOperand(_)
            | Self::UnexpectedOperand { .. }
            | Self::InvalidStackOffset(_)
            | Self::InvalidText(_)
            | Self::EmptyText(_) => ErrorKind::Syntax,
            Self::MissingLabelEntry(_) => ErrorKind::Internal,
        }
    }
}

/// `Diagnostic` is an error tied to the source line which produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1 based line number.
    pub line_num: usize,
    /// What went wrong.
    pub error: AsmError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error parsing line {}: {}", self.line_num, self.error)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Diagnostic", 3)?;
        s.serialize_field("line", &self.line_num)?;
        s.serialize_field("kind", &self.error.kind().to_string())?;
        s.serialize_field("message", &self.error.to_string())?;
        s.end()
    }
}

/// `Pass2Error` is returned instead of running pass 2 when its input
/// can't be trusted.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Pass2Error {
    /// Pass 1 reported errors.
    #[error("pass 1 reported {0} error(s)")]
    Pass1Errors(usize),

    /// The source changed since pass 1 ran.
    #[error("source text changed since pass 1")]
    StaleSource,

    /// A session wasn't in a state which allows running pass 2.
    #[error("can't run pass 2 from state {0}")]
    NotReady(SessionState),
}
