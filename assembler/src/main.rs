//! assembler will take the given input file and generate a binary image
//! after assembling the IL instructions presented in it.

use assemble::{read_source, report, Diagnostic, Labels, Session};
use clap::Parser;
use clap_num::maybe_hex;
use color_eyre::eyre::{eyre, Result};
use log::info;
use serde::Serialize;
use std::{fs::write, path::Path};
use strum_macros::{Display, EnumString};
use tinyil::prelude::*;

// Format is how the output file is encoded.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Format {
    /// Bytes exactly as they load into memory.
    #[strum(to_string = "raw")]
    Raw,

    /// Intel hex style records.
    #[strum(to_string = "hex")]
    Hex,
}

/// assembler will take the given input file and generate a binary image
/// after assembling the IL instructions presented in it.
///
/// By default the image written runs from 0x0000 up to the smallest power
/// of two past the last byte assembled.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    filename: String,
    output: String,

    #[arg(long, default_value_t = Format::Raw, help = "Output encoding (raw or hex)")]
    format: Format,

    #[arg(
        long, value_parser=maybe_hex::<usize>,
        help = "The memory location to start emitting"
    )]
    start_loc: Option<usize>,

    #[arg(
        long, value_parser=maybe_hex::<usize>,
        help = "Number of bytes to emit"
    )]
    bytes: Option<usize>,

    #[arg(long, default_value_t = false, help = "Print the label table")]
    labels: bool,

    #[arg(long, default_value_t = false, help = "Print the assembly listing")]
    listing: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Print a JSON report of labels and diagnostics"
    )]
    json: bool,
}

// Report is what --json prints. Pass 2 is absent if it never ran.
#[derive(Serialize)]
struct Report<'a> {
    file: &'a str,
    labels: &'a Labels,
    pass1: &'a [Diagnostic],
    pass2: Option<&'a [Diagnostic]>,
    final_address: u32,
}

fn print_json(report: &Report) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

// window returns the start and end of the memory range to write. Either
// can be omitted and defaults to the start or end of memory.
fn window(start_loc: Option<usize>, bytes: Option<usize>) -> Result<(usize, usize)> {
    let start = start_loc.unwrap_or(0);
    let len = bytes.unwrap_or(MAX_SIZE.saturating_sub(start));
    match start.checked_add(len) {
        Some(end) if end <= MAX_SIZE => Ok((start, end)),
        _ => Err(eyre!("Starting at {start:#06X} + {len} bytes is > 64k")),
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args: Args = Args::parse();

    let mut session = Session::new(read_source(&args.filename)?);
    let p1 = session.run_pass1();
    if p1.errors() != 0 {
        if args.json {
            print_json(&Report {
                file: &args.filename,
                labels: &p1.labels,
                pass1: &p1.diagnostics,
                pass2: None,
                final_address: p1.org,
            })?;
        }
        return Err(report("pass 1", &p1.diagnostics));
    }
    session.run_pass2()?;
    let (Some(p1), Some(p2)) = (session.pass1(), session.pass2()) else {
        return Err(eyre!("no results from {}", session.state()));
    };
    if args.json {
        print_json(&Report {
            file: &args.filename,
            labels: &p1.labels,
            pass1: &p1.diagnostics,
            pass2: Some(&p2.diagnostics),
            final_address: p2.org,
        })?;
    }
    if p2.errors() != 0 {
        return Err(report("pass 2", &p2.diagnostics));
    }
    if args.labels {
        print!("{}", p1.labels.table());
    }
    if args.listing {
        print!("{}", p2.listing);
    }

    let data = if args.start_loc.is_none() && args.bytes.is_none() {
        p2.image.export(p2.org)
    } else {
        let (start, end) = window(args.start_loc, args.bytes)?;
        &p2.image.bytes()[start..end]
    };
    let start = u16::try_from(args.start_loc.unwrap_or(0))?;
    info!(
        "writing {} bytes from {start:#06X} to {}",
        data.len(),
        args.output
    );
    match args.format {
        Format::Raw => write(Path::new(args.output.as_str()), data)?,
        Format::Hex => write(Path::new(args.output.as_str()), ihex::encode(data, start))?,
    }
    Ok(())
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Args::command().debug_assert();
}

#[test]
fn verify_window() {
    assert_eq!(window(None, None).ok(), Some((0, MAX_SIZE)));
    assert_eq!(window(Some(0x100), None).ok(), Some((0x100, MAX_SIZE)));
    assert_eq!(window(Some(0x100), Some(0x10)).ok(), Some((0x100, 0x110)));
    assert_eq!(window(None, Some(MAX_SIZE)).ok(), Some((0, MAX_SIZE)));
    assert!(window(Some(1), Some(MAX_SIZE)).is_err());
    assert!(window(Some(MAX_SIZE + 1), None).is_err());
    assert!(window(Some(usize::MAX), Some(usize::MAX)).is_err());
    assert!(window(Some(1), Some(usize::MAX)).is_err());
}
