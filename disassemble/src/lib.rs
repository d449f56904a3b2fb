//! disassemble provides functions for disassembling a given
//! location in an IL image.

use std::num::Wrapping; // import without risk of name clashing
use tinyil::prelude::*;


/// Longest text literal `step` will follow before giving up on finding
/// the terminating byte.
pub const TEXT_MAX: usize = 256;

/// step will take the given pc and Memory implementation and disassemble the instruction
/// at that location. It will return a string of the dissembly as well as the next pc
/// to continue disassembling.
/// Reads wrap around the end of memory so disassembling 0xFFFF with a multi-byte
/// instruction reads 0x0000 onwards and returns a pc from that area as well.
///
/// Jump and branch targets are shown as absolute addresses. Text is shown
/// using the same escapes the assembler accepts.
pub fn step(pc: Wrapping<u16>, r: &impl Memory) -> (String, Wrapping<u16>) {
    let op = r.read(pc.0);
    let Some(inst) = decode(op) else {
        return (line(pc, &[op], "???"), pc + Wrapping(1));
    };
    let pc1 = r.read((pc + Wrapping(1)).0);
    let pc2 = r.read((pc + Wrapping(2)).0);
    let field = op & inst.operand.field_mask();
    let m = inst.mnemonic;

    let (bytes, out) = match inst.operand {
        OperandRule::None => (vec![op], m.to_string()),
        OperandRule::Stack => (vec![op], format!("{m} {field}")),
        OperandRule::Byte => (vec![op, pc1], format!("{m} 0x{pc1:02X}")),
        OperandRule::Word => (vec![op, pc1, pc2], format!("{m} 0x{pc1:02X}{pc2:02X}")),
        OperandRule::Jump => {
            let target = (u16::from(field) << 8) | u16::from(pc1);
            (vec![op, pc1], format!("{m} 0x{target:04X}"))
        }
        OperandRule::Relative => (vec![op], format!("{m} 0x{:04X}", relative(pc, field))),
        OperandRule::Forward => (vec![op], format!("{m} 0x{:04X}", forward(pc, field))),
        OperandRule::Text => {
            let (text, done) = literal(pc + Wrapping(1), r);
            let out = format!("{m} {}", render(&text, done));
            ([vec![op], text].concat(), out)
        }
        OperandRule::ForwardText => {
            let (text, done) = literal(pc + Wrapping(1), r);
            let out = format!("{m} 0x{:04X},{}", forward(pc, field), render(&text, done));
            ([vec![op], text].concat(), out)
        }
    };
    // At most TEXT_MAX + 1 bytes.
    #[allow(clippy::cast_possible_truncation)]
    let next = pc + Wrapping(bytes.len() as u16);
    (line(pc, &bytes, &out), next)
}

fn line(pc: Wrapping<u16>, bytes: &[u8], out: &str) -> String {
    let hex = bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{pc:04X} {hex:<10} {out}")
}

// relative undoes the BR bias. 0x00-0x1F count back from pc + 31 and
// 0x20-0x3F forward from pc + 32. 0x1F is never produced by the assembler
// and decodes as pc.
fn relative(pc: Wrapping<u16>, v: u8) -> Wrapping<u16> {
    let v = Wrapping(u16::from(v));
    if v.0 < 0x20 {
        pc + v - Wrapping(31)
    } else {
        pc + v - Wrapping(32)
    }
}

fn forward(pc: Wrapping<u16>, v: u8) -> Wrapping<u16> {
    pc + Wrapping(1) + Wrapping(u16::from(v))
}

// literal collects text bytes starting at addr up to and including the one
// with bit 7 set. The bool is false if TEXT_MAX was hit first.
fn literal(mut addr: Wrapping<u16>, r: &impl Memory) -> (Vec<u8>, bool) {
    let mut out = Vec::new();
    while out.len() < TEXT_MAX {
        let b = r.read(addr.0);
        out.push(b);
        if b & 0x80 != 0 {
            return (out, true);
        }
        addr += 1;
    }
    (out, false)
}

/// `render` turns encoded text back into a quoted literal. Control
/// characters become a letter followed by ^ and ^ itself is doubled.
/// Single quotes are used if the text contains a double quote.
///
/// NOTE: A letter followed by a literal ^ can't be written back the same
///       way (X^^ assembles as control X then ^) so those don't round trip.
#[must_use]
pub fn render(text: &[u8], terminated: bool) -> String {
    let mut s = String::new();
    for b in text {
        match b & 0x7F {
            c @ 0x00..=0x1A => {
                s.push(char::from(c + 64));
                s.push('^');
            }
            b'^' => s.push_str("^^"),
            c => s.push(char::from(c)),
        }
    }
    let q = if s.contains('"') { '\'' } else { '"' };
    if terminated {
        format!("{q}{s}{q}")
    } else {
        format!("{q}{s}")
    }
}
