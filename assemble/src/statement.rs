//! Parsing the instruction part of a line into a `Statement`. Both passes
//! parse identically so anything pass 1 accepted pass 2 will too.

use crate::expr::evaluate;
use crate::label::is_label_name;
use crate::normalize::{split_first, tokenize};
use crate::text::{transform, unquote};
use crate::{AsmError, Labels};
use std::str::FromStr;
use tinyil::prelude::*;

/// `ORG` sets the address counter.
pub const ORG: &str = ".ORG";

/// `HERE` as a target means the address of the current instruction.
pub const HERE: &str = "*";

// Target is where a jump or branch goes. Labels can't be resolved until
// pass 2 since forward references are allowed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Label(String),
    Here,
    Address(i64),
}

impl Target {
    fn parse(token: &str) -> Result<Self, AsmError> {
        if token == HERE {
            return Ok(Self::Here);
        }
        if is_label_name(token) {
            return Ok(Self::Label(token.to_ascii_uppercase()));
        }
        match evaluate(token) {
            Ok(v) => Ok(Self::Address(v)),
            Err(_) => Err(AsmError::InvalidTarget(token.to_string())),
        }
    }

    // resolve returns the absolute address this target refers to for an
    // instruction at current.
    pub(crate) fn resolve(&self, current: u32, labels: &Labels) -> Result<i64, AsmError> {
        match self {
            Self::Label(l) => labels
                .get(l)
                .map(|e| i64::from(e.org))
                .ok_or_else(|| AsmError::UndefinedLabel(l.clone())),
            Self::Here => Ok(i64::from(current)),
            Self::Address(v) => Ok(*v),
        }
    }
}

// Operand is the parsed (but not resolved) operand of an instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Operand {
    None,
    Stack(u8),
    Value(i64),
    Target(Target),
    Text(Vec<u8>),
    TargetText(Target, Vec<u8>),
}

// Statement is one parsed line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Statement {
    Org(i64),
    Op(Instruction, Operand),
}

impl Statement {
    // size returns how many bytes this statement advances the address
    // counter from current. ORG is validated here since only it depends
    // on where it appears.
    pub(crate) fn size(&self, current: u32) -> Result<u32, AsmError> {
        match self {
            Self::Org(org) => {
                let Ok(new) = u16::try_from(*org) else {
                    return Err(AsmError::OrgOutOfRange(*org));
                };
                let new = u32::from(new);
                if new < current {
                    return Err(AsmError::OrgBackwards { org: *org, current });
                }
                Ok(new - current)
            }
            Self::Op(i, op) => Ok(match (i.operand.fixed_size(), op) {
                (Some(size), _) => u32::from(size),
                (None, Operand::Text(t) | Operand::TargetText(_, t)) => {
                    // Text came from a single source line so it always fits.
                    #[allow(clippy::cast_possible_truncation)]
                    let len = t.len() as u32;
                    1 + len
                }
                // Text rules always parse into a text operand.
                (None, _) => 1,
            }),
        }
    }
}

fn no_more(mnemonic: Mnemonic, extra: &[&str]) -> Result<(), AsmError> {
    if extra.is_empty() {
        Ok(())
    } else {
        Err(AsmError::UnexpectedOperand {
            mnemonic: mnemonic.to_string(),
            operand: extra.join(" "),
        })
    }
}

fn text(mnemonic: Mnemonic, token: &str) -> Result<Vec<u8>, AsmError> {
    let t = transform(unquote(token)?)?;
    if t.is_empty() {
        return Err(AsmError::EmptyText(mnemonic.to_string()));
    }
    Ok(t)
}

fn byte_value(v: i64) -> Result<i64, AsmError> {
    if (-128..=255).contains(&v) {
        Ok(v)
    } else {
        Err(AsmError::ByteOutOfRange(v))
    }
}

fn word_value(v: i64) -> Result<i64, AsmError> {
    if (-32768..=65535).contains(&v) {
        Ok(v)
    } else {
        Err(AsmError::WordOutOfRange(v))
    }
}

// target_text splits a BC operand into its target and quoted text. The
// target ends at the first quote with an optional trailing comma.
fn target_text(mnemonic: Mnemonic, operand: &str) -> Result<Operand, AsmError> {
    let Some(quote) = operand.find(['"', '\'']) else {
        return Err(AsmError::InvalidText(operand.to_string()));
    };
    let (target, literal) = operand.split_at(quote);
    let target = target.trim_end();
    let target = target.strip_suffix(',').unwrap_or(target).trim_end();
    if target.is_empty() {
        return Err(AsmError::InvalidTarget(operand.to_string()));
    }
    Ok(Operand::TargetText(
        Target::parse(target)?,
        text(mnemonic, literal.trim_end())?,
    ))
}

/// `parse` turns the instruction part of a normalized line (label already
/// removed) into a statement.
pub(crate) fn parse(line: &str) -> Result<Statement, AsmError> {
    let (first, operand) = split_first(line);
    if first == ORG {
        if operand.is_empty() {
            return Err(AsmError::MissingOperand(ORG.to_string()));
        }
        return Ok(Statement::Org(evaluate(operand)?));
    }
    let Ok(mnemonic) = Mnemonic::from_str(first) else {
        return Err(AsmError::UnknownMnemonic(first.to_string()));
    };
    let inst = mnemonic.instruction();
    let tokens = tokenize(operand);
    if inst.operand != OperandRule::None && tokens.is_empty() {
        return Err(AsmError::MissingOperand(mnemonic.to_string()));
    }
    let op = match inst.operand {
        OperandRule::None => {
            no_more(mnemonic, &tokens)?;
            Operand::None
        }
        OperandRule::Stack => {
            no_more(mnemonic, &tokens[1..])?;
            match tokens[0].as_bytes() {
                [d @ b'0'..=b'7'] => Operand::Stack(d - b'0'),
                _ => return Err(AsmError::InvalidStackOffset(tokens[0].to_string())),
            }
        }
        OperandRule::Byte => Operand::Value(byte_value(evaluate(operand)?)?),
        OperandRule::Word => Operand::Value(word_value(evaluate(operand)?)?),
        OperandRule::Jump | OperandRule::Relative | OperandRule::Forward => {
            no_more(mnemonic, &tokens[1..])?;
            Operand::Target(Target::parse(tokens[0])?)
        }
        OperandRule::Text => {
            no_more(mnemonic, &tokens[1..])?;
            Operand::Text(text(mnemonic, tokens[0])?)
        }
        OperandRule::ForwardText => target_text(mnemonic, operand)?,
    };
    Ok(Statement::Op(inst, op))
}

/// `encode` produces the bytes for an instruction at `current`.
pub(crate) fn encode(
    inst: Instruction,
    op: &Operand,
    current: u32,
    labels: &Labels,
) -> Result<Vec<u8>, AsmError> {
    // All the `as u8` casts below are of values masked or range checked to 8 bits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bytes = match op {
        Operand::None => vec![inst.opcode],
        Operand::Stack(n) => vec![inst.opcode | (n & inst.operand.field_mask())],
        Operand::Value(v) => match inst.operand {
            OperandRule::Word => vec![
                inst.opcode,
                ((v & 0xFF00) >> 8) as u8,
                (v & 0x00FF) as u8,
            ],
            _ => vec![inst.opcode, (v & 0x00FF) as u8],
        },
        Operand::Target(t) => {
            let target = t.resolve(current, labels)?;
            match inst.operand {
                OperandRule::Jump => {
                    if !(0..=i64::from(JUMP_MAX)).contains(&target) {
                        return Err(AsmError::JumpOutOfRange(target));
                    }
                    vec![
                        inst.opcode | ((target >> 8) as u8 & inst.operand.field_mask()),
                        (target & 0xFF) as u8,
                    ]
                }
                OperandRule::Relative => {
                    let v = relative(target, current)?;
                    vec![inst.opcode | (v as u8 & inst.operand.field_mask())]
                }
                _ => {
                    let v = forward(target, current)?;
                    vec![inst.opcode | (v as u8 & inst.operand.field_mask())]
                }
            }
        }
        Operand::Text(t) => {
            let mut b = vec![inst.opcode];
            b.extend_from_slice(t);
            b
        }
        Operand::TargetText(target, t) => {
            let v = forward(target.resolve(current, labels)?, current)?;
            let mut b = vec![inst.opcode | (v as u8 & inst.operand.field_mask())];
            b.extend_from_slice(t);
            b
        }
    };
    Ok(bytes)
}

// relative computes the biased BR offset. Targets behind get 31 added and
// targets at or ahead get 32 so 0x20 is the branch itself.
fn relative(target: i64, current: u32) -> Result<i64, AsmError> {
    let diff = target - i64::from(current);
    let v = if diff < 0 { diff + 31 } else { diff + 32 };
    if (0..=RELATIVE_MAX).contains(&v) {
        Ok(v)
    } else {
        Err(AsmError::RelativeOutOfRange { target, current })
    }
}

// forward computes the offset for BC/BV/BN/BE which counts from the byte
// after the opcode.
fn forward(target: i64, current: u32) -> Result<i64, AsmError> {
    let v = target - i64::from(current) - 1;
    if (0..=FORWARD_MAX).contains(&v) {
        Ok(v)
    } else {
        Err(AsmError::ForwardOutOfRange { target, current })
    }
}
