//! Machine code encoding
//!
//! Assembles a [`CompiledUnit`] into 32-bit MIPS words in two passes. The
//! first pass lays out the data segment and assigns every code label an
//! address; the second encodes each instruction with its labels resolved.
//!
//! Pseudo-instructions expand as follows:
//! - `li rd, imm` becomes `addi rd, $zero, imm`, or `lui` + `ori` when the
//!   value needs more than 16 bits
//! - `la rd, label` becomes `lui` + `ori`
//! - `move rd, rs` becomes `add rd, rs, $zero`

use crate::asm::{Inst, Reg};
use crate::unit::{CompiledUnit, DataValue};
use log::debug;
use mjc_common::CodegenError;
use std::collections::HashMap;

/// Address of the first instruction
pub const TEXT_BASE: u32 = 0x0040_0000;

/// Address of the first data byte
pub const DATA_BASE: u32 = 0x1001_0000;

mod opcode {
    pub const SPECIAL: u32 = 0x00;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const ADDI: u32 = 0x08;
    pub const ORI: u32 = 0x0D;
    pub const XORI: u32 = 0x0E;
    pub const LUI: u32 = 0x0F;
    pub const SPECIAL2: u32 = 0x1C;
    pub const LW: u32 = 0x23;
    pub const SW: u32 = 0x2B;
}

mod funct {
    pub const JR: u32 = 0x08;
    pub const SYSCALL: u32 = 0x0C;
    pub const ADD: u32 = 0x20;
    pub const SUB: u32 = 0x22;
    pub const AND: u32 = 0x24;
    pub const SLT: u32 = 0x2A;
    /// `mul` lives under SPECIAL2
    pub const MUL: u32 = 0x02;
}

/// Assembled unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineCode {
    /// Text segment, starting at [`TEXT_BASE`]
    pub text: Vec<u32>,
    /// Data segment, starting at [`DATA_BASE`]
    pub data: Vec<u8>,
    /// Address of every code and data label
    pub symbols: HashMap<String, u32>,
}

impl MachineCode {
    /// Text words in big-endian order followed by the data segment
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.text.len() * 4 + self.data.len());
        for word in &self.text {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

fn reg(r: Reg) -> u32 {
    r.number() as u32
}

fn r_type(op: u32, rs: Reg, rt: Reg, rd: Reg, funct: u32) -> u32 {
    (op << 26) | (reg(rs) << 21) | (reg(rt) << 16) | (reg(rd) << 11) | funct
}

fn i_type(op: u32, rs: Reg, rt: Reg, imm: u16) -> u32 {
    (op << 26) | (reg(rs) << 21) | (reg(rt) << 16) | u32::from(imm)
}

fn out_of_range(inst: &Inst, value: i64, bits: u32) -> CodegenError {
    CodegenError::ImmediateOutOfRange { inst: inst.to_string(), value, bits }
}

/// Sign-extended 16-bit field
fn signed16(inst: &Inst, value: i64) -> Result<u16, CodegenError> {
    i16::try_from(value)
        .map(|v| v as u16)
        .map_err(|_| out_of_range(inst, value, 16))
}

/// Zero-extended 16-bit field
fn unsigned16(inst: &Inst, value: i64) -> Result<u16, CodegenError> {
    u16::try_from(value).map_err(|_| out_of_range(inst, value, 16))
}

fn fits_signed16(value: i32) -> bool {
    i16::try_from(value).is_ok()
}

/// Number of machine words `inst` occupies
pub fn encoded_len(inst: &Inst) -> u32 {
    match inst {
        Inst::Label(_) | Inst::Comment(_) => 0,
        Inst::Li(_, imm) if !fits_signed16(*imm) => 2,
        Inst::La(..) => 2,
        _ => 1,
    }
}

fn lookup(symbols: &HashMap<String, u32>, label: &str) -> Result<u32, CodegenError> {
    symbols
        .get(label)
        .copied()
        .ok_or_else(|| CodegenError::UndefinedLabel(label.to_string()))
}

/// `lui rd, hi; ori rd, rd, lo`
fn load_upper_lower(rd: Reg, value: u32) -> Vec<u32> {
    vec![
        i_type(opcode::LUI, Reg::Zero, rd, (value >> 16) as u16),
        i_type(opcode::ORI, rd, rd, value as u16),
    ]
}

/// Encode one instruction located at `pc`
pub fn encode_inst(inst: &Inst, pc: u32, symbols: &HashMap<String, u32>) -> Result<Vec<u32>, CodegenError> {
    let word = match inst {
        Inst::Add(rd, rs, rt) => r_type(opcode::SPECIAL, *rs, *rt, *rd, funct::ADD),
        Inst::Sub(rd, rs, rt) => r_type(opcode::SPECIAL, *rs, *rt, *rd, funct::SUB),
        Inst::And(rd, rs, rt) => r_type(opcode::SPECIAL, *rs, *rt, *rd, funct::AND),
        Inst::Slt(rd, rs, rt) => r_type(opcode::SPECIAL, *rs, *rt, *rd, funct::SLT),
        Inst::Mul(rd, rs, rt) => r_type(opcode::SPECIAL2, *rs, *rt, *rd, funct::MUL),
        Inst::Addi(rt, rs, imm) => i_type(opcode::ADDI, *rs, *rt, signed16(inst, i64::from(*imm))?),
        Inst::Xori(rt, rs, imm) => i_type(opcode::XORI, *rs, *rt, unsigned16(inst, i64::from(*imm))?),
        Inst::Lw(rt, offset, base) => i_type(opcode::LW, *base, *rt, signed16(inst, i64::from(*offset))?),
        Inst::Sw(rt, offset, base) => i_type(opcode::SW, *base, *rt, signed16(inst, i64::from(*offset))?),
        Inst::Li(rd, imm) if fits_signed16(*imm) => i_type(opcode::ADDI, Reg::Zero, *rd, *imm as u16),
        Inst::Li(rd, imm) => return Ok(load_upper_lower(*rd, *imm as u32)),
        Inst::La(rd, label) => return Ok(load_upper_lower(*rd, lookup(symbols, label)?)),
        Inst::Move(rd, rs) => r_type(opcode::SPECIAL, *rs, Reg::Zero, *rd, funct::ADD),
        Inst::Beq(rs, rt, label) => {
            let target = lookup(symbols, label)?;
            let words = (i64::from(target) - i64::from(pc) - 4) / 4;
            i_type(opcode::BEQ, *rs, *rt, signed16(inst, words)?)
        }
        Inst::J(label) | Inst::Jal(label) => {
            let target = lookup(symbols, label)?;
            // The target must share the top four bits of the delay-slot address
            if (target ^ pc.wrapping_add(4)) & 0xF000_0000 != 0 {
                return Err(out_of_range(inst, i64::from(target), 26));
            }
            let op = if matches!(inst, Inst::Jal(_)) { opcode::JAL } else { opcode::J };
            (op << 26) | ((target >> 2) & 0x03FF_FFFF)
        }
        Inst::Jr(rs) => r_type(opcode::SPECIAL, *rs, Reg::Zero, Reg::Zero, funct::JR),
        Inst::Syscall => funct::SYSCALL,
        Inst::Label(_) | Inst::Comment(_) => return Ok(Vec::new()),
    };
    Ok(vec![word])
}

/// Lay out the data segment, word-aligning each entry
fn layout_data(unit: &CompiledUnit, symbols: &mut HashMap<String, u32>) -> Result<Vec<u8>, CodegenError> {
    let mut data = Vec::new();
    for entry in &unit.data {
        let addr = DATA_BASE + data.len() as u32;
        if symbols.insert(entry.label.clone(), addr).is_some() {
            return Err(CodegenError::LabelCollision(entry.label.clone()));
        }
        match &entry.value {
            DataValue::Asciiz(text) => {
                data.extend_from_slice(text.as_bytes());
                data.push(0);
            }
        }
        data.resize(data.len().next_multiple_of(4), 0);
    }
    Ok(data)
}

/// Assemble a whole unit
pub fn encode_unit(unit: &CompiledUnit) -> Result<MachineCode, CodegenError> {
    let mut symbols = HashMap::new();
    let data = layout_data(unit, &mut symbols)?;

    let mut pc = TEXT_BASE;
    for inst in unit.instructions() {
        if let Inst::Label(label) = inst {
            if symbols.insert(label.clone(), pc).is_some() {
                return Err(CodegenError::LabelCollision(label.clone()));
            }
        }
        pc += 4 * encoded_len(inst);
    }

    let mut text = Vec::new();
    let mut pc = TEXT_BASE;
    for inst in unit.instructions() {
        let words = encode_inst(inst, pc, &symbols)?;
        pc += 4 * words.len() as u32;
        text.extend(words);
    }

    debug!(
        "Encoded {} text words and {} data bytes ({} symbols)",
        text.len(),
        data.len(),
        symbols.len()
    );
    Ok(MachineCode { text, data, symbols })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{DataEntry, Procedure};
    use pretty_assertions::assert_eq;

    fn encode(inst: Inst) -> Vec<u32> {
        encode_inst(&inst, TEXT_BASE, &HashMap::new()).unwrap()
    }

    fn unit(body: Vec<Inst>) -> CompiledUnit {
        let mut unit = CompiledUnit::new();
        unit.require_data(DataEntry::asciiz("newline", "\n")).unwrap();
        unit.push_procedure(Procedure { label: "main".to_string(), body });
        unit
    }

    #[test]
    fn test_r_type() {
        assert_eq!(encode(Inst::Add(Reg::T0, Reg::T1, Reg::T0)), vec![0x0128_4020]);
        assert_eq!(encode(Inst::Sub(Reg::T0, Reg::T1, Reg::T0)), vec![0x0128_4022]);
        assert_eq!(encode(Inst::Slt(Reg::T0, Reg::T1, Reg::T0)), vec![0x0128_402A]);
        assert_eq!(encode(Inst::And(Reg::T0, Reg::T1, Reg::T0)), vec![0x0128_4024]);
        assert_eq!(encode(Inst::Mul(Reg::T0, Reg::T8, Reg::T0)), vec![0x7308_4002]);
        assert_eq!(encode(Inst::Jr(Reg::Ra)), vec![0x03E0_0008]);
        assert_eq!(encode(Inst::Syscall), vec![0x0000_000C]);
    }

    #[test]
    fn test_i_type() {
        assert_eq!(encode(Inst::Lw(Reg::Ra, 12, Reg::Sp)), vec![0x8FBF_000C]);
        assert_eq!(encode(Inst::Sw(Reg::Ra, 12, Reg::Sp)), vec![0xAFBF_000C]);
        assert_eq!(encode(Inst::Lw(Reg::T0, -16, Reg::Fp)), vec![0x8FC8_FFF0]);
        assert_eq!(encode(Inst::Addi(Reg::Sp, Reg::Sp, -8)), vec![0x23BD_FFF8]);
        assert_eq!(encode(Inst::Xori(Reg::T0, Reg::T0, 1)), vec![0x3908_0001]);
    }

    #[test]
    fn test_pseudo_instructions() {
        assert_eq!(encode(Inst::Li(Reg::V0, 10)), vec![0x2002_000A]);
        assert_eq!(encode(Inst::Li(Reg::T0, -1)), vec![0x2008_FFFF]);
        assert_eq!(encode(Inst::Li(Reg::T0, 0x12345)), vec![0x3C08_0001, 0x3508_2345]);
        assert_eq!(encode(Inst::Move(Reg::T0, Reg::V0)), vec![0x0040_4020]);
        assert_eq!(encoded_len(&Inst::Li(Reg::T0, 0x12345)), 2);
        assert_eq!(encoded_len(&Inst::Comment("x".into())), 0);
    }

    #[test]
    fn test_immediate_range() {
        let err = encode_inst(&Inst::Addi(Reg::Sp, Reg::Sp, 40000), TEXT_BASE, &HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            CodegenError::ImmediateOutOfRange { inst: "addi $sp, $sp, 40000".to_string(), value: 40000, bits: 16 }
        );
        assert!(encode_inst(&Inst::Lw(Reg::T0, -40000, Reg::Fp), TEXT_BASE, &HashMap::new()).is_err());
        assert!(encode_inst(&Inst::Xori(Reg::T0, Reg::T0, -1), TEXT_BASE, &HashMap::new()).is_err());
    }

    #[test]
    fn test_labels_resolve() {
        let code = encode_unit(&unit(vec![
            Inst::Label("main".into()),
            Inst::Beq(Reg::T0, Reg::Zero, "main".into()),
            Inst::La(Reg::A0, "newline".into()),
            Inst::Jal("main".into()),
            Inst::J("done".into()),
            Inst::Label("done".into()),
            Inst::Syscall,
        ]))
        .unwrap();

        assert_eq!(code.symbols["main"], TEXT_BASE);
        assert_eq!(code.symbols["newline"], DATA_BASE);
        // beq, la (2 words), jal, j
        assert_eq!(code.symbols["done"], TEXT_BASE + 20);
        assert_eq!(
            code.text,
            vec![0x1100_FFFF, 0x3C04_1001, 0x3484_0000, 0x0C10_0000, 0x0810_0005, 0x0000_000C]
        );
        assert_eq!(code.data, vec![b'\n', 0, 0, 0]);
    }

    #[test]
    fn test_undefined_label() {
        let err = encode_unit(&unit(vec![Inst::Label("main".into()), Inst::Jal("Fac_Missing".into())])).unwrap_err();
        assert_eq!(err, CodegenError::UndefinedLabel("Fac_Missing".to_string()));
    }

    #[test]
    fn test_to_bytes_is_big_endian() {
        let code = encode_unit(&unit(vec![Inst::Label("main".into()), Inst::Syscall])).unwrap();
        assert_eq!(code.to_bytes(), vec![0, 0, 0, 0x0C, b'\n', 0, 0, 0]);
    }
}
