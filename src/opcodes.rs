#![allow(dead_code)]

//! JVM opcode constants and instruction-length table. Grounded on the
//! opcode classification already used by `cfg.rs` in the teacher lineage
//! (`opcodes::IRETURN`, `opcodes::GOTO`, etc.); extended here with the four
//! invoke opcodes the loader needs to recognize call sites, and with a
//! length table so the loader's linear scan can skip variable-width
//! instructions it does not otherwise care about.

use anyhow::{Context, Result};

pub(crate) const ACONST_NULL: u8 = 0x01;
pub(crate) const ICONST_M1: u8 = 0x02;
pub(crate) const ICONST_0: u8 = 0x03;
pub(crate) const ICONST_5: u8 = 0x08;
pub(crate) const BIPUSH: u8 = 0x10;
pub(crate) const SIPUSH: u8 = 0x11;
pub(crate) const LDC: u8 = 0x12;
pub(crate) const LDC_W: u8 = 0x13;
pub(crate) const LDC2_W: u8 = 0x14;
pub(crate) const ALOAD: u8 = 0x19;
pub(crate) const ALOAD_0: u8 = 0x2a;
pub(crate) const ALOAD_3: u8 = 0x2d;
pub(crate) const ASTORE: u8 = 0x3a;
pub(crate) const ASTORE_0: u8 = 0x4b;
pub(crate) const ASTORE_3: u8 = 0x4e;
pub(crate) const DUP: u8 = 0x59;
pub(crate) const POP: u8 = 0x57;
pub(crate) const POP2: u8 = 0x58;
pub(crate) const IRETURN: u8 = 0xac;
pub(crate) const LRETURN: u8 = 0xad;
pub(crate) const FRETURN: u8 = 0xae;
pub(crate) const DRETURN: u8 = 0xaf;
pub(crate) const ARETURN: u8 = 0xb0;
pub(crate) const RETURN: u8 = 0xb1;
pub(crate) const ATHROW: u8 = 0xbf;
pub(crate) const GOTO: u8 = 0xa7;
pub(crate) const JSR: u8 = 0xa8;
pub(crate) const RET: u8 = 0xa9;
pub(crate) const TABLESWITCH: u8 = 0xaa;
pub(crate) const LOOKUPSWITCH: u8 = 0xab;
pub(crate) const GOTO_W: u8 = 0xc8;
pub(crate) const JSR_W: u8 = 0xc9;
pub(crate) const WIDE: u8 = 0xc4;
pub(crate) const NEW: u8 = 0xbb;
pub(crate) const NEWARRAY: u8 = 0xbc;
pub(crate) const ANEWARRAY: u8 = 0xbd;
pub(crate) const ARRAYLENGTH: u8 = 0xbe;
pub(crate) const CHECKCAST: u8 = 0xc0;
pub(crate) const INSTANCEOF: u8 = 0xc1;
pub(crate) const MULTIANEWARRAY: u8 = 0xc5;
pub(crate) const IFNULL: u8 = 0xc6;
pub(crate) const IFNONNULL: u8 = 0xc7;

/// The four dispatch opcodes call sites are extracted from (spec.md §3).
pub(crate) const INVOKEVIRTUAL: u8 = 0xb6;
pub(crate) const INVOKESPECIAL: u8 = 0xb7;
pub(crate) const INVOKESTATIC: u8 = 0xb8;
pub(crate) const INVOKEINTERFACE: u8 = 0xb9;
pub(crate) const INVOKEDYNAMIC: u8 = 0xba;

pub(crate) fn is_exit_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        IRETURN | LRETURN | FRETURN | DRETURN | ARETURN | RETURN | ATHROW
    )
}

/// Length in bytes of the instruction at `offset`, including the opcode
/// byte itself. Variable-length instructions (`tableswitch`,
/// `lookupswitch`, `wide`) are computed from their operands; every other
/// opcode uses a fixed table indexed by opcode value.
pub(crate) fn opcode_length(code: &[u8], offset: usize) -> Result<usize> {
    let opcode = *code.get(offset).context("instruction offset out of range")?;
    match opcode {
        TABLESWITCH => tableswitch_length(code, offset),
        LOOKUPSWITCH => lookupswitch_length(code, offset),
        WIDE => wide_length(code, offset),
        _ => Ok(1 + FIXED_OPERAND_LENGTH[opcode as usize] as usize),
    }
}

pub(crate) fn padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

fn tableswitch_length(code: &[u8], offset: usize) -> Result<usize> {
    let pad = padding(offset);
    let base = offset + 1 + pad;
    let low = read_i32(code, base + 4)?;
    let high = read_i32(code, base + 8)?;
    let count = high
        .checked_sub(low)
        .and_then(|v| v.checked_add(1))
        .context("invalid tableswitch range")?;
    Ok(1 + pad + 12 + count as usize * 4)
}

fn lookupswitch_length(code: &[u8], offset: usize) -> Result<usize> {
    let pad = padding(offset);
    let base = offset + 1 + pad;
    let npairs = read_i32(code, base + 4)?;
    Ok(1 + pad + 8 + npairs as usize * 8)
}

fn wide_length(code: &[u8], offset: usize) -> Result<usize> {
    let modified = *code
        .get(offset + 1)
        .context("truncated wide instruction")?;
    if modified == 0x84 {
        // wide iinc
        Ok(1 + 1 + 2 + 2)
    } else {
        Ok(1 + 1 + 2)
    }
}

fn read_i32(code: &[u8], offset: usize) -> Result<i32> {
    let bytes: [u8; 4] = code
        .get(offset..offset + 4)
        .context("truncated instruction operand")?
        .try_into()
        .expect("slice of length 4");
    Ok(i32::from_be_bytes(bytes))
}

/// Operand byte count (excluding the opcode byte) for every fixed-length
/// opcode, indexed by opcode value. Variable-length opcodes are zeroed
/// here and handled explicitly in `opcode_length`.
const FIXED_OPERAND_LENGTH: [u8; 256] = {
    let mut table = [0u8; 256];
    table[BIPUSH as usize] = 1;
    table[SIPUSH as usize] = 2;
    table[LDC as usize] = 1;
    table[LDC_W as usize] = 2;
    table[LDC2_W as usize] = 2;
    table[0x15] = 1; // iload
    table[0x16] = 1; // lload
    table[0x17] = 1; // fload
    table[0x18] = 1; // dload
    table[ALOAD as usize] = 1;
    table[0x36] = 1; // istore
    table[0x37] = 1; // lstore
    table[0x38] = 1; // fstore
    table[0x39] = 1; // dstore
    table[ASTORE as usize] = 1;
    table[RET as usize] = 1;
    table[NEWARRAY as usize] = 1;
    table[ANEWARRAY as usize] = 2;
    table[CHECKCAST as usize] = 2;
    table[INSTANCEOF as usize] = 2;
    table[MULTIANEWARRAY as usize] = 3;
    table[NEW as usize] = 2;
    table[0xb2] = 2; // getstatic
    table[0xb3] = 2; // putstatic
    table[0xb4] = 2; // getfield
    table[0xb5] = 2; // putfield
    table[INVOKEVIRTUAL as usize] = 2;
    table[INVOKESPECIAL as usize] = 2;
    table[INVOKESTATIC as usize] = 2;
    table[INVOKEINTERFACE as usize] = 4;
    table[INVOKEDYNAMIC as usize] = 4;
    table[GOTO as usize] = 2;
    table[JSR as usize] = 2;
    table[GOTO_W as usize] = 4;
    table[JSR_W as usize] = 4;
    table[IFNULL as usize] = 2;
    table[IFNONNULL as usize] = 2;
    // if<cond>, if_icmp<cond>, if_acmp<cond>: 0x99..=0xa6
    let mut op = 0x99;
    while op <= 0xa6 {
        table[op] = 2;
        op += 1;
    }
    table
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_length_instruction_reports_opcode_plus_operand() {
        let code = [INVOKEVIRTUAL, 0x00, 0x01, RETURN];
        assert_eq!(opcode_length(&code, 0).expect("length"), 3);
        assert_eq!(opcode_length(&code, 3).expect("length"), 1);
    }

    #[test]
    fn tableswitch_length_accounts_for_padding_and_entries() {
        // tableswitch at offset 1 so padding is 2 bytes to reach a 4-aligned offset.
        let mut code = vec![0x00, TABLESWITCH];
        code.extend_from_slice(&[0, 0]); // padding
        code.extend_from_slice(&0i32.to_be_bytes()); // default
        code.extend_from_slice(&0i32.to_be_bytes()); // low
        code.extend_from_slice(&1i32.to_be_bytes()); // high
        code.extend_from_slice(&0i32.to_be_bytes()); // entry 0
        code.extend_from_slice(&0i32.to_be_bytes()); // entry 1
        let length = opcode_length(&code, 1).expect("length");
        assert_eq!(length, 1 + 2 + 12 + 2 * 4);
    }
}
