//! disassembler takes an IL image (raw binary or hex records) and prints
//! a listing of the instructions in it.

use clap::Parser;
use clap_num::maybe_hex;
use color_eyre::eyre::Result;
use disassemble::step;
use log::debug;
use std::fs::{read, read_to_string};
use std::num::Wrapping;
use strum_macros::{Display, EnumString};
use tinyil::prelude::*;

// Format is how the input file is encoded.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
enum Format {
    /// Bytes exactly as they load into memory.
    #[strum(to_string = "raw")]
    Raw,

    /// Intel hex style records which carry their own addresses.
    #[strum(to_string = "hex")]
    Hex,
}

/// disassembler takes an IL image and prints a listing of the
/// instructions in it.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    filename: String,

    #[arg(long, default_value_t = Format::Raw, help = "Input encoding (raw or hex)")]
    format: Format,

    #[arg(
        long,
        default_value_t = 0x0000, value_parser=maybe_hex::<u16>,
        help = "Offset into memory to load a raw image. Ignored for hex"
    )]
    offset: u16,

    #[arg(
        long,
        default_value_t = 0x0000, value_parser=maybe_hex::<u16>,
        help = "Address to start disassembling from"
    )]
    start_pc: u16,

    #[arg(
        long, value_parser=maybe_hex::<usize>,
        help = "Number of bytes to disassemble. Defaults to the end of the loaded data"
    )]
    len: Option<usize>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let args: Args = Args::parse();

    let (image, end) = match args.format {
        Format::Raw => {
            let bytes = read(&args.filename)?;
            let (image, len) = Image::load(&bytes, args.offset);
            if len < bytes.len() {
                println!(
                    "Length {} at offset {:#06X} too long, truncating to 64k",
                    bytes.len(),
                    args.offset
                );
            }
            (image, usize::from(args.offset) + len)
        }
        Format::Hex => {
            let (image, end) = ihex::decode(&read_to_string(&args.filename)?)?;
            (image, usize::try_from(end)?)
        }
    };
    let len = args
        .len
        .unwrap_or_else(|| end.saturating_sub(usize::from(args.start_pc)));
    debug!(
        "loaded {} ending at {end:#06X}, disassembling {len} bytes from {:#06X}",
        args.filename, args.start_pc
    );

    let mut pc = Wrapping(args.start_pc);
    let mut done = 0;
    while done < len {
        let (dis, next) = step(pc, &image);
        println!("{dis}");
        done += usize::from((next - pc).0);
        pc = next;
    }
    Ok(())
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Args::command().debug_assert();
}
