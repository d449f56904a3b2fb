//! opcodes defines the fixed Tiny BASIC IL instruction set. Every
//! mnemonic maps to exactly one opcode base and an operand rule which
//! determines both its size and how its operand folds into the encoding.
//!
//! Reference for the opcode assignments:
//! Tom Pittman, "The Tiny BASIC Experimenter's Kit" (IL opcode table).

use strum_macros::{Display, EnumIter, EnumString};

#[cfg(test)]
mod tests;

/// `JUMP_MAX` is the highest address reachable by `JS` and `J` (11 bit target).
pub const JUMP_MAX: u16 = 0x07FF;

/// `RELATIVE_MAX` is the highest encoded value of a `BR` offset (6 bits).
pub const RELATIVE_MAX: i64 = 0x3F;

/// `FORWARD_MAX` is the highest encoded value of a forward branch offset (5 bits).
pub const FORWARD_MAX: i64 = 0x1F;

/// `Mnemonic` defines every IL instruction the assembler accepts.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
#[allow(clippy::upper_case_acronyms)]
pub enum Mnemonic {
    /// Stack exchange. Swaps the top of stack with the byte n below it.
    /// Example: SX 2
    SX,

    /// No operation.
    NO,

    /// Push the following literal byte onto the expression stack.
    LB,

    /// Push the following literal 16 bit number onto the expression stack.
    LN,

    /// Duplicate the top number on the expression stack.
    DS,

    /// Pop the top number off the expression stack.
    SP,

    /// Save the BASIC pointer.
    SB,

    /// Restore the BASIC pointer.
    RB,

    /// Fetch variable.
    FV,

    /// Store variable.
    SV,

    /// Save GOSUB line.
    GS,

    /// Restore saved line (RETURN).
    RS,

    /// GOTO the line number on the stack.
    GO,

    /// Negate the top of stack.
    NE,

    /// Add.
    AD,

    /// Subtract.
    SU,

    /// Multiply.
    MP,

    /// Divide.
    DV,

    /// Compare.
    CP,

    /// Next BASIC statement.
    NX,

    /// List the program.
    LS,

    /// Print the number on top of stack.
    PN,

    /// Print a BASIC string.
    PQ,

    /// Print a tab.
    PT,

    /// New line.
    NL,

    /// Print the following literal text.
    PC,

    /// Get an input line.
    GL,

    /// Insert a BASIC line.
    IL,

    /// Mark the BASIC program space empty.
    MT,

    /// Execute the stored program.
    XQ,

    /// Stop (warm start).
    WS,

    /// Machine language subroutine call.
    US,

    /// IL subroutine return.
    RT,

    /// IL subroutine call.
    JS,

    /// IL jump.
    J,

    /// Relative branch either direction.
    BR,

    /// Forward branch if the following literal text doesn't match.
    BC,

    /// Forward branch if not a variable.
    BV,

    /// Forward branch if not a number.
    BN,

    /// Forward branch if not end of line.
    BE,
}

/// `OperandRule` defines what a mnemonic expects after it and therefore
/// how many bytes it occupies.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum OperandRule {
    /// No operand, one byte.
    None,

    /// A literal octal digit folded into the opcode byte.
    Stack,

    /// An expression emitted as a single byte after the opcode.
    Byte,

    /// An expression emitted as two bytes (high then low) after the opcode.
    Word,

    /// An 11 bit absolute target split across the opcode and one following byte.
    Jump,

    /// A biased 6 bit relative offset folded into the opcode byte.
    Relative,

    /// A 5 bit forward offset folded into the opcode byte.
    Forward,

    /// Literal text following the opcode.
    Text,

    /// A 5 bit forward offset folded into the opcode byte followed by literal text.
    ForwardText,
}

impl OperandRule {
    /// `fixed_size` returns the size in bytes for rules whose size doesn't
    /// depend on the operand. Text rules return None since their size is
    /// one plus the transformed text length.
    #[must_use]
    pub const fn fixed_size(self) -> Option<u16> {
        match self {
            Self::None | Self::Stack | Self::Relative | Self::Forward => Some(1),
            Self::Byte | Self::Jump => Some(2),
            Self::Word => Some(3),
            Self::Text | Self::ForwardText => None,
        }
    }

    /// `field_mask` is the set of opcode bits the operand is allowed to fill in.
    #[must_use]
    pub const fn field_mask(self) -> u8 {
        match self {
            Self::Stack | Self::Jump => 0x07,
            Self::Relative => 0x3F,
            Self::Forward | Self::ForwardText => 0x1F,
            Self::None | Self::Byte | Self::Word | Self::Text => 0x00,
        }
    }
}

/// `Instruction` is the static descriptor for a mnemonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The mnemonic this describes.
    pub mnemonic: Mnemonic,
    /// The opcode base. Operand bits are OR'd into this.
    pub opcode: u8,
    /// How the operand is parsed, sized and encoded.
    pub operand: OperandRule,
}

impl Mnemonic {
    /// `instruction` returns the static descriptor for this mnemonic.
    #[must_use]
    pub const fn instruction(self) -> Instruction {
        let (opcode, operand) = match self {
            Self::SX => (0x00, OperandRule::Stack),
            Self::NO => (0x08, OperandRule::None),
            Self::LB => (0x09, OperandRule::Byte),
            Self::LN => (0x0A, OperandRule::Word),
            Self::DS => (0x0B, OperandRule::None),
            Self::SP => (0x0C, OperandRule::None),
            Self::SB => (0x10, OperandRule::None),
            Self::RB => (0x11, OperandRule::None),
            Self::FV => (0x12, OperandRule::None),
            Self::SV => (0x13, OperandRule::None),
            Self::GS => (0x14, OperandRule::None),
            Self::RS => (0x15, OperandRule::None),
            Self::GO => (0x16, OperandRule::None),
            Self::NE => (0x17, OperandRule::None),
            Self::AD => (0x18, OperandRule::None),
            Self::SU => (0x19, OperandRule::None),
            Self::MP => (0x1A, OperandRule::None),
            Self::DV => (0x1B, OperandRule::None),
            Self::CP => (0x1C, OperandRule::None),
            Self::NX => (0x1D, OperandRule::None),
            Self::LS => (0x1F, OperandRule::None),
            Self::PN => (0x20, OperandRule::None),
            Self::PQ => (0x21, OperandRule::None),
            Self::PT => (0x22, OperandRule::None),
            Self::NL => (0x23, OperandRule::None),
            Self::PC => (0x24, OperandRule::Text),
            Self::GL => (0x27, OperandRule::None),
            Self::IL => (0x2A, OperandRule::None),
            Self::MT => (0x2B, OperandRule::None),
            Self::XQ => (0x2C, OperandRule::None),
            Self::WS => (0x2D, OperandRule::None),
            Self::US => (0x2E, OperandRule::None),
            Self::RT => (0x2F, OperandRule::None),
            Self::JS => (0x30, OperandRule::Jump),
            Self::J => (0x38, OperandRule::Jump),
            Self::BR => (0x40, OperandRule::Relative),
            Self::BC => (0x80, OperandRule::ForwardText),
            Self::BV => (0xA0, OperandRule::Forward),
            Self::BN => (0xC0, OperandRule::Forward),
            Self::BE => (0xE0, OperandRule::Forward),
        };
        Instruction {
            mnemonic: self,
            opcode,
            operand,
        }
    }
}

/// `decode` maps an opcode byte back to the instruction which produces it.
/// Bytes with operand bits folded in (SX, JS, J, BR, BC, BV, BN, BE) map to
/// their base mnemonic. Unassigned bytes return None.
#[must_use]
pub const fn decode(op: u8) -> Option<Instruction> {
    let m = match op {
        0x00..=0x07 => Mnemonic::SX,
        0x08 => Mnemonic::NO,
        0x09 => Mnemonic::LB,
        0x0A => Mnemonic::LN,
        0x0B => Mnemonic::DS,
        0x0C => Mnemonic::SP,
        0x10 => Mnemonic::SB,
        0x11 => Mnemonic::RB,
        0x12 => Mnemonic::FV,
        0x13 => Mnemonic::SV,
        0x14 => Mnemonic::GS,
        0x15 => Mnemonic::RS,
        0x16 => Mnemonic::GO,
        0x17 => Mnemonic::NE,
        0x18 => Mnemonic::AD,
        0x19 => Mnemonic::SU,
        0x1A => Mnemonic::MP,
        0x1B => Mnemonic::DV,
        0x1C => Mnemonic::CP,
        0x1D => Mnemonic::NX,
        0x1F => Mnemonic::LS,
        0x20 => Mnemonic::PN,
        0x21 => Mnemonic::PQ,
        0x22 => Mnemonic::PT,
        0x23 => Mnemonic::NL,
        0x24 => Mnemonic::PC,
        0x27 => Mnemonic::GL,
        0x2A => Mnemonic::IL,
        0x2B => Mnemonic::MT,
        0x2C => Mnemonic::XQ,
        0x2D => Mnemonic::WS,
        0x2E => Mnemonic::US,
        0x2F => Mnemonic::RT,
        0x30..=0x37 => Mnemonic::JS,
        0x38..=0x3F => Mnemonic::J,
        0x40..=0x7F => Mnemonic::BR,
        0x80..=0x9F => Mnemonic::BC,
        0xA0..=0xBF => Mnemonic::BV,
        0xC0..=0xDF => Mnemonic::BN,
        0xE0..=0xFF => Mnemonic::BE,
        // 0x0D-0x0F, 0x1E, 0x25, 0x26, 0x28, 0x29
        _ => return None,
    };
    Some(m.instruction())
}
