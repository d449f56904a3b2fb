use crate::ihex::{checksum, decode, encode, HexError};
use crate::{export_size, Image, Memory, MAX_SIZE};
use color_eyre::eyre::Result;
use std::fs::{read_to_string, write};
use tempfile::tempdir;

#[test]
fn array_memory() {
    let mut r: [u8; MAX_SIZE] = [0; MAX_SIZE];

    assert!(r.read(0x1234) == 0x00, "Bad value");
    r.write(0x1234, 0xAE);
    assert!(r.read(0x1234) == 0xAE, "Bad value");
}

#[test]
fn image_memory() {
    let mut img = Image::new();
    assert!(img.bytes().iter().all(|b| *b == 0), "new image not zeroed");
    img.write(0xFFFF, 0x12);
    assert_eq!(img.read(0xFFFF), 0x12);
    assert_eq!(img.bytes()[0xFFFF], 0x12);
    assert_eq!(format!("{img:?}"), "Image { 1 non-zero bytes }");
}

#[test]
fn load_clips_at_end() {
    let (img, copied) = Image::load(&[1, 2, 3, 4], 0xFFFE);
    assert_eq!(copied, 2);
    assert_eq!(img.read(0xFFFE), 1);
    assert_eq!(img.read(0xFFFF), 2);
    assert_eq!(img.read(0x0000), 0);
}

#[test]
fn store_bounds() {
    let mut img = Image::new();
    assert!(img.store(0xFFFE, &[1, 2]));
    assert_eq!(img.read(0xFFFF), 2);
    assert!(!img.store(0xFFFF, &[3, 4]), "store past the end succeeded");
    assert_eq!(img.read(0xFFFF), 2, "failed store modified the image");
    assert!(!img.store(0x10000, &[5]));
    assert!(img.store(0x10000, &[]));
}

#[test]
fn export_sizes() {
    for (end, want) in [
        (0, 1),
        (1, 2),
        (4, 8),
        (7, 8),
        (8, 16),
        (1000, 1024),
        (1024, 2048),
        (65535, 65536),
        (65536, 65536),
        (100_000, 65536),
    ] {
        assert_eq!(export_size(end), want, "final address {end}");
    }
    let (img, _) = Image::load(&[0x08, 0x08, 0x38, 0x00], 0);
    assert_eq!(img.export(4), &[0x08, 0x08, 0x38, 0x00, 0, 0, 0, 0]);
}

#[test]
fn record_checksum() {
    assert_eq!(checksum(&[0x00, 0x00, 0x00, 0x01]), 0xFF);
    // A sum whose low byte is zero has a zero checksum, not 256.
    assert_eq!(checksum(&[0x80, 0x80]), 0x00);
}

#[test]
fn encode_records() {
    let got = encode(&[0x08, 0x08, 0x38, 0x00], 0x0000);
    assert_eq!(got, ":0400000008083800B4\n:00000001FF\n");

    let data: Vec<u8> = (0..20).collect();
    let got = encode(&data, 0x0100);
    let lines: Vec<&str> = got.lines().collect();
    assert_eq!(lines.len(), 3, "{got}");
    assert!(lines[0].starts_with(":10010000"), "{}", lines[0]);
    assert!(lines[1].starts_with(":04011000"), "{}", lines[1]);
    assert_eq!(lines[2], ":00000001FF");
}

#[test]
fn decode_records() -> Result<()> {
    let (img, end) = decode(":0400000008083800B4\n\n:00000001FF\n")?;
    assert_eq!(end, 4);
    assert_eq!(&img.bytes()[0..5], &[0x08, 0x08, 0x38, 0x00, 0x00]);
    Ok(())
}

#[test]
fn decode_errors() {
    assert_eq!(
        decode(":0400000008083800B5\n:00000001FF\n"),
        Err(HexError::Checksum {
            line: 1,
            got: 0xB5,
            want: 0xB4
        })
    );
    assert!(matches!(
        decode("0400000008083800B4\n"),
        Err(HexError::Malformed { line: 1, .. })
    ));
    assert!(matches!(
        decode(":0500000008083800B3\n"),
        Err(HexError::Length { line: 1, count: 5 })
    ));
    assert!(matches!(
        decode(":00000002FE\n"),
        Err(HexError::RecordType { line: 1, ty: 2 })
    ));
    assert_eq!(decode(":0400000008083800B4\n"), Err(HexError::MissingEnd));
    assert!(matches!(
        decode(":02FFFF000101FE\n:00000001FF\n"),
        Err(HexError::Overflow { addr: 0xFFFF, .. })
    ));
}

#[test]
fn file_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("image.hex");

    let mut img = Image::new();
    for (addr, val) in [(0x0000u16, 0x24u8), (0x0001, 0xC1), (0x0123, 0x30), (0x01FF, 0x0A)] {
        img.write(addr, val);
    }
    write(&path, encode(img.export(0x0200), 0))?;

    let (got, end) = decode(&read_to_string(&path)?)?;
    assert_eq!(end, 0x0400);
    assert!(got == img, "images differ after round trip");
    Ok(())
}
