//! ihex implements the checksummed text record format used to hand an
//! image to EPROM programmers and HDL tooling.
//!
//! Each record is `:LLAAAATT<data>CC` where LL is the data byte count,
//! AAAA the 16 bit load address, TT the record type and CC the checksum
//! (256 minus the low byte of the sum of every preceding field). A zero
//! length end-of-file record terminates the stream.

use crate::{Image, MAX_SIZE};
use std::fmt::Write;
use thiserror::Error;

/// Number of data bytes emitted per record.
pub const RECORD_LEN: usize = 16;

const DATA: u8 = 0x00;
const END_OF_FILE: u8 = 0x01;

/// `HexError` defines the ways a record stream can fail to decode.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    /// A record didn't start with ':' or had an odd number of hex digits.
    #[error("line {line}: malformed record - {record}")]
    Malformed {
        /// Line number (1 based) of the record.
        line: usize,
        /// The offending record text.
        record: String,
    },

    /// The byte count field doesn't match the data present.
    #[error("line {line}: byte count {count} doesn't match record length")]
    Length {
        /// Line number (1 based) of the record.
        line: usize,
        /// The declared byte count.
        count: u8,
    },

    /// The checksum didn't verify.
    #[error("line {line}: checksum {got:02X} should be {want:02X}")]
    Checksum {
        /// Line number (1 based) of the record.
        line: usize,
        /// Checksum present in the record.
        got: u8,
        /// Checksum computed from the record.
        want: u8,
    },

    /// Data would land past the end of the image.
    #[error("line {line}: data at {addr:04X} runs past the end of memory")]
    Overflow {
        /// Line number (1 based) of the record.
        line: usize,
        /// Load address of the record.
        addr: u16,
    },

    /// Only data and end-of-file records are supported.
    #[error("line {line}: unsupported record type {ty:02X}")]
    RecordType {
        /// Line number (1 based) of the record.
        line: usize,
        /// The record type found.
        ty: u8,
    },

    /// The stream ended without an end-of-file record.
    #[error("missing end of file record")]
    MissingEnd,
}

/// `checksum` returns 256 minus the low byte of the sum of `fields`.
#[must_use]
pub fn checksum(fields: &[u8]) -> u8 {
    let sum = fields.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    0u8.wrapping_sub(sum)
}

fn record(out: &mut String, addr: u16, ty: u8, data: &[u8]) {
    // Callers never pass more than RECORD_LEN bytes.
    #[allow(clippy::cast_possible_truncation)]
    let count = data.len() as u8;
    let [high, low] = addr.to_be_bytes();
    let mut fields = vec![count, high, low, ty];
    fields.extend_from_slice(data);
    let sum = checksum(&fields);
    out.push(':');
    for b in &fields {
        // Writing into a String can't fail.
        let _ = write!(out, "{b:02X}");
    }
    let _ = writeln!(out, "{sum:02X}");
}

/// `encode` renders `data` as records starting at address `start`
/// followed by the end-of-file record. Data past the end of the 64k
/// address space is dropped.
#[must_use]
pub fn encode(data: &[u8], start: u16) -> String {
    let mut out = String::new();
    let len = data.len().min(MAX_SIZE - usize::from(start));
    for (index, chunk) in data[..len].chunks(RECORD_LEN).enumerate() {
        // index * RECORD_LEN is bounded by len which fits in the address space.
        #[allow(clippy::cast_possible_truncation)]
        let addr = start.wrapping_add((index * RECORD_LEN) as u16);
        record(&mut out, addr, DATA, chunk);
    }
    record(&mut out, 0x0000, END_OF_FILE, &[]);
    out
}

fn parse_fields(line: usize, text: &str) -> Result<Vec<u8>, HexError> {
    let malformed = || HexError::Malformed {
        line,
        record: text.to_string(),
    };
    let Some(digits) = text.strip_prefix(':') else {
        return Err(malformed());
    };
    if digits.len() % 2 != 0 || digits.len() < 10 || !digits.is_ascii() {
        return Err(malformed());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed()))
        .collect()
}

/// `decode` parses a record stream back into an image. Blank lines are
/// ignored and anything after the end-of-file record is not examined.
/// Returns the image and the highest address written plus one.
///
/// # Errors
/// Any malformed record, bad checksum or unsupported record type.
pub fn decode(text: &str) -> Result<(Image, u32), HexError> {
    let mut img = Image::new();
    let mut end = 0u32;
    for (line_num, line) in text.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = parse_fields(line_num, line)?;
        let count = fields[0];
        if fields.len() != usize::from(count) + 5 {
            return Err(HexError::Length {
                line: line_num,
                count,
            });
        }
        let (body, sum) = fields.split_at(fields.len() - 1);
        let want = checksum(body);
        if sum[0] != want {
            return Err(HexError::Checksum {
                line: line_num,
                got: sum[0],
                want,
            });
        }
        let addr = u16::from_be_bytes([fields[1], fields[2]]);
        match fields[3] {
            DATA => {
                let data = &body[4..];
                if usize::from(addr) + data.len() > MAX_SIZE {
                    return Err(HexError::Overflow {
                        line: line_num,
                        addr,
                    });
                }
                let start = usize::from(addr);
                img.memory[start..start + data.len()].copy_from_slice(data);
                end = end.max(u32::from(addr) + u32::from(count));
            }
            END_OF_FILE => return Ok((img, end)),
            ty => {
                return Err(HexError::RecordType { line: line_num, ty });
            }
        }
    }
    Err(HexError::MissingEnd)
}
