//! MIPS-style Assembly Instruction Definitions
//!
//! This module defines the register model and the instruction set targeted by
//! the backend. Instructions are typed; their textual form is only produced by
//! the [`Display`](std::fmt::Display) implementations and the emitter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Register file of the target
///
/// 32 general purpose registers with the conventional MIPS roles. Only the
/// registers the backend actually uses are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    Zero, // Hard-wired zero
    V0,   // Return value / syscall code
    A0, A1, A2, A3,
    T0, T1, T2, T3, T4, T5, T6, T7, T8, T9,
    S0, S1, S2, S3, S4, S5, S6, S7,
    Sp, // Stack pointer
    Fp, // Frame pointer
    Ra, // Return address (link register)
}

impl Reg {
    /// Hardware register number
    pub fn number(self) -> usize {
        match self {
            Reg::Zero => 0,
            Reg::V0 => 2,
            Reg::A0 => 4,
            Reg::A1 => 5,
            Reg::A2 => 6,
            Reg::A3 => 7,
            Reg::T0 => 8,
            Reg::T1 => 9,
            Reg::T2 => 10,
            Reg::T3 => 11,
            Reg::T4 => 12,
            Reg::T5 => 13,
            Reg::T6 => 14,
            Reg::T7 => 15,
            Reg::S0 => 16,
            Reg::S1 => 17,
            Reg::S2 => 18,
            Reg::S3 => 19,
            Reg::S4 => 20,
            Reg::S5 => 21,
            Reg::S6 => 22,
            Reg::S7 => 23,
            Reg::T8 => 24,
            Reg::T9 => 25,
            Reg::Sp => 29,
            Reg::Fp => 30,
            Reg::Ra => 31,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Reg::Zero => "zero",
            Reg::V0 => "v0",
            Reg::A0 => "a0",
            Reg::A1 => "a1",
            Reg::A2 => "a2",
            Reg::A3 => "a3",
            Reg::T0 => "t0",
            Reg::T1 => "t1",
            Reg::T2 => "t2",
            Reg::T3 => "t3",
            Reg::T4 => "t4",
            Reg::T5 => "t5",
            Reg::T6 => "t6",
            Reg::T7 => "t7",
            Reg::T8 => "t8",
            Reg::T9 => "t9",
            Reg::S0 => "s0",
            Reg::S1 => "s1",
            Reg::S2 => "s2",
            Reg::S3 => "s3",
            Reg::S4 => "s4",
            Reg::S5 => "s5",
            Reg::S6 => "s6",
            Reg::S7 => "s7",
            Reg::Sp => "sp",
            Reg::Fp => "fp",
            Reg::Ra => "ra",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

/// One instruction operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    Imm(i32),
    Label(String),
    /// `offset(base)` memory reference
    Mem { offset: i32, base: Reg },
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::Imm(imm) => write!(f, "{}", imm),
            Operand::Label(label) => write!(f, "{}", label),
            Operand::Mem { offset, base } => write!(f, "{}({})", offset, base),
        }
    }
}

/// Target instructions
///
/// `Li`, `La` and `Move` are assembler pseudo-instructions; `Label` and
/// `Comment` produce no machine code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inst {
    // Arithmetic / logic
    Add(Reg, Reg, Reg),           // rd = rs + rt
    Sub(Reg, Reg, Reg),           // rd = rs - rt
    Mul(Reg, Reg, Reg),           // rd = rs * rt (low 32 bits)
    Slt(Reg, Reg, Reg),           // rd = (rs < rt) ? 1 : 0
    And(Reg, Reg, Reg),           // rd = rs & rt
    Addi(Reg, Reg, i32),          // rd = rs + imm
    Xori(Reg, Reg, i32),          // rd = rs ^ imm

    // Memory
    Lw(Reg, i32, Reg),            // rt = mem[base + offset]
    Sw(Reg, i32, Reg),            // mem[base + offset] = rt

    // Pseudo moves
    Li(Reg, i32),                 // rd = imm
    La(Reg, String),              // rd = address of data label
    Move(Reg, Reg),               // rd = rs

    // Control flow
    Beq(Reg, Reg, String),        // branch if rs == rt
    J(String),                    // jump
    Jal(String),                  // jump and link
    Jr(Reg),                      // jump to register

    // System
    Syscall,

    // Assembly pseudo-instructions
    Label(String),
    Comment(String),
}

impl Inst {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Inst::Add(..) => "add",
            Inst::Sub(..) => "sub",
            Inst::Mul(..) => "mul",
            Inst::Slt(..) => "slt",
            Inst::And(..) => "and",
            Inst::Addi(..) => "addi",
            Inst::Xori(..) => "xori",
            Inst::Lw(..) => "lw",
            Inst::Sw(..) => "sw",
            Inst::Li(..) => "li",
            Inst::La(..) => "la",
            Inst::Move(..) => "move",
            Inst::Beq(..) => "beq",
            Inst::J(_) => "j",
            Inst::Jal(_) => "jal",
            Inst::Jr(_) => "jr",
            Inst::Syscall => "syscall",
            Inst::Label(_) => "",
            Inst::Comment(_) => "#",
        }
    }

    /// Operands in assembly order
    pub fn operands(&self) -> Vec<Operand> {
        use Operand::{Imm, Label as L, Mem, Reg as R};
        match self {
            Inst::Add(rd, rs, rt)
            | Inst::Sub(rd, rs, rt)
            | Inst::Mul(rd, rs, rt)
            | Inst::Slt(rd, rs, rt)
            | Inst::And(rd, rs, rt) => vec![R(*rd), R(*rs), R(*rt)],
            Inst::Addi(rd, rs, imm) | Inst::Xori(rd, rs, imm) => vec![R(*rd), R(*rs), Imm(*imm)],
            Inst::Lw(rt, offset, base) | Inst::Sw(rt, offset, base) => {
                vec![R(*rt), Mem { offset: *offset, base: *base }]
            }
            Inst::Li(rd, imm) => vec![R(*rd), Imm(*imm)],
            Inst::La(rd, label) => vec![R(*rd), L(label.clone())],
            Inst::Move(rd, rs) => vec![R(*rd), R(*rs)],
            Inst::Beq(rs, rt, label) => vec![R(*rs), R(*rt), L(label.clone())],
            Inst::J(label) | Inst::Jal(label) => vec![L(label.clone())],
            Inst::Jr(rs) => vec![R(*rs)],
            Inst::Syscall | Inst::Label(_) | Inst::Comment(_) => Vec::new(),
        }
    }

    /// Code label this instruction transfers control to, if any
    pub fn target_label(&self) -> Option<&str> {
        match self {
            Inst::Beq(_, _, label) | Inst::J(label) | Inst::Jal(label) => Some(label),
            _ => None,
        }
    }

    /// Net change this instruction applies to the stack pointer
    pub fn stack_delta(&self) -> i32 {
        match self {
            Inst::Addi(Reg::Sp, Reg::Sp, imm) => *imm,
            _ => 0,
        }
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Label(label) => write!(f, "{}:", label),
            Inst::Comment(text) => write!(f, "# {}", text),
            _ => {
                write!(f, "{}", self.mnemonic())?;
                for (i, operand) in self.operands().iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{}{}", sep, operand)?;
                }
                Ok(())
            }
        }
    }
}
