use crate::{decode, Mnemonic, OperandRule, JUMP_MAX};
use std::str::FromStr;
use strum::IntoEnumIterator;

#[test]
fn every_mnemonic_decodes_from_its_base() {
    for m in Mnemonic::iter() {
        let i = m.instruction();
        assert_eq!(i.mnemonic, m);
        // The operand field must not overlap the base.
        assert_eq!(
            i.opcode & i.operand.field_mask(),
            0,
            "{m} base {:02X} overlaps its operand field",
            i.opcode
        );
        let got = decode(i.opcode).unwrap_or_else(|| panic!("{m} base {:02X} didn't decode", i.opcode));
        assert_eq!(got, i, "{m} decoded to {got:?}");
    }
}

#[test]
fn operand_bits_decode_to_base() {
    assert_eq!(decode(0x05).map(|i| i.mnemonic), Some(Mnemonic::SX));
    assert_eq!(decode(0x37).map(|i| i.mnemonic), Some(Mnemonic::JS));
    assert_eq!(decode(0x3F).map(|i| i.mnemonic), Some(Mnemonic::J));
    assert_eq!(decode(0x7F).map(|i| i.mnemonic), Some(Mnemonic::BR));
    assert_eq!(decode(0x9F).map(|i| i.mnemonic), Some(Mnemonic::BC));
    assert_eq!(decode(0xBF).map(|i| i.mnemonic), Some(Mnemonic::BV));
    assert_eq!(decode(0xDF).map(|i| i.mnemonic), Some(Mnemonic::BN));
    assert_eq!(decode(0xFF).map(|i| i.mnemonic), Some(Mnemonic::BE));
}

#[test]
fn unassigned_bytes() {
    for op in [0x0D, 0x0E, 0x0F, 0x1E, 0x25, 0x26, 0x28, 0x29] {
        assert!(decode(op).is_none(), "{op:02X} shouldn't decode");
    }
    let assigned = (0..=0xFFu8).filter(|op| decode(*op).is_some()).count();
    assert_eq!(assigned, 256 - 8);
}

#[test]
fn sizes() {
    assert_eq!(Mnemonic::NO.instruction().operand.fixed_size(), Some(1));
    assert_eq!(Mnemonic::SX.instruction().operand.fixed_size(), Some(1));
    assert_eq!(Mnemonic::LB.instruction().operand.fixed_size(), Some(2));
    assert_eq!(Mnemonic::LN.instruction().operand.fixed_size(), Some(3));
    assert_eq!(Mnemonic::JS.instruction().operand.fixed_size(), Some(2));
    assert_eq!(Mnemonic::BR.instruction().operand.fixed_size(), Some(1));
    assert_eq!(Mnemonic::BE.instruction().operand.fixed_size(), Some(1));
    assert_eq!(Mnemonic::PC.instruction().operand, OperandRule::Text);
    assert_eq!(Mnemonic::PC.instruction().operand.fixed_size(), None);
    assert_eq!(Mnemonic::BC.instruction().operand.fixed_size(), None);
    assert_eq!(JUMP_MAX, 2047);
}

#[test]
fn parse_mnemonic() {
    assert_eq!(Mnemonic::from_str("NO"), Ok(Mnemonic::NO));
    assert_eq!(Mnemonic::from_str("bc"), Ok(Mnemonic::BC));
    assert!(Mnemonic::from_str("NOP").is_err());
    assert!(Mnemonic::from_str(".ORG").is_err());
    assert_eq!(Mnemonic::J.to_string(), "J");
}
