//! Calling Convention
//!
//! One declarative description of how procedures talk to each other. Every
//! component (call sites, prologues, epilogues, the entry point) reads its
//! register roles and stack discipline from here and nowhere else.
//!
//! Stack layout at the moment a callee is entered (stack grows downward):
//!
//! ```text
//!   higher addresses
//!   | receiver slot     |  caller-pushed (object calls only)
//!   | arg 0             |
//!   | ...               |
//!   | arg n-1           |  <- $sp at entry == callee $fp
//!   | saved $ra         |  $fp - 4
//!   | saved $s0         |  $fp - 8   (object methods)
//!   | saved $fp         |
//!   | params, locals    |
//!   | padding           |  <- $sp after prologue
//!   lower addresses
//! ```

use crate::asm::{Inst, Reg};

/// Runtime services reachable through `syscall`, selected by `$v0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyscallCode {
    PrintInt,
    PrintString,
    Sbrk,
    Exit,
}

impl SyscallCode {
    pub fn code(self) -> i32 {
        match self {
            SyscallCode::PrintInt => 1,
            SyscallCode::PrintString => 4,
            SyscallCode::Sbrk => 9,
            SyscallCode::Exit => 10,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(SyscallCode::PrintInt),
            4 => Some(SyscallCode::PrintString),
            9 => Some(SyscallCode::Sbrk),
            10 => Some(SyscallCode::Exit),
            _ => None,
        }
    }
}

/// Register roles and stack discipline
///
/// - `$t0`: result register of every expression
/// - `$t1`-`$t7`: left-operand scratch, indexed by nesting depth
/// - `$t8`: reload target for spilled left operands
/// - `$a0`: receiver on entry to an object method
/// - `$s0`: receiver inside an object method (callee-saved)
/// - `$v0`: return value
/// - `$ra`, `$fp`: callee-saved
/// - arguments: pushed left to right on the stack, popped by the caller
pub struct CallingConvention;

impl CallingConvention {
    pub const WORD_SIZE: i32 = 4;

    /// Required alignment of the stack pointer between instructions of a frame
    pub const STACK_ALIGN: i32 = 8;

    pub const RESULT: Reg = Reg::T0;
    pub const SCRATCH: [Reg; 7] = [Reg::T1, Reg::T2, Reg::T3, Reg::T4, Reg::T5, Reg::T6, Reg::T7];

    /// Receives a spilled left operand when it is reloaded
    pub const RELOAD: Reg = Reg::T8;

    pub const RETURN_VALUE: Reg = Reg::V0;
    pub const RECEIVER_ARG: Reg = Reg::A0;
    pub const RECEIVER: Reg = Reg::S0;
    pub const LINK: Reg = Reg::Ra;

    pub const STACK_PTR: Reg = Reg::Sp;
    pub const FRAME_PTR: Reg = Reg::Fp;

    /// Signed 16-bit displacement field of loads, stores and `addi`
    pub const MAX_DISPLACEMENT: i32 = i16::MAX as i32;
    pub const MIN_DISPLACEMENT: i32 = i16::MIN as i32;

    /// Registers a callee saves, in prologue order
    pub fn saved_registers(object_scoped: bool) -> Vec<Reg> {
        if object_scoped {
            vec![Self::LINK, Self::RECEIVER, Self::FRAME_PTR]
        } else {
            vec![Self::LINK, Self::FRAME_PTR]
        }
    }

    /// Offset from the callee's `$fp` of caller-pushed argument `index`
    pub fn incoming_arg_offset(index: usize, arg_count: usize) -> i32 {
        (arg_count - 1 - index) as i32 * Self::WORD_SIZE
    }

    /// Offset from `$sp` of the pushed receiver once all arguments are pushed
    pub fn pushed_receiver_offset(arg_count: usize) -> i32 {
        arg_count as i32 * Self::WORD_SIZE
    }

    pub fn fits_displacement(offset: i32) -> bool {
        (Self::MIN_DISPLACEMENT..=Self::MAX_DISPLACEMENT).contains(&offset)
    }

    /// Round a byte count up to the stack alignment
    pub fn align_frame(bytes: i32) -> i32 {
        (bytes + Self::STACK_ALIGN - 1) / Self::STACK_ALIGN * Self::STACK_ALIGN
    }

    /// Push one word: `addi $sp, $sp, -4; sw reg, 0($sp)`
    pub fn push(reg: Reg) -> Vec<Inst> {
        vec![
            Inst::Addi(Self::STACK_PTR, Self::STACK_PTR, -Self::WORD_SIZE),
            Inst::Sw(reg, 0, Self::STACK_PTR),
        ]
    }

    /// Pop one word into `reg`
    pub fn pop(reg: Reg) -> Vec<Inst> {
        vec![
            Inst::Lw(reg, 0, Self::STACK_PTR),
            Inst::Addi(Self::STACK_PTR, Self::STACK_PTR, Self::WORD_SIZE),
        ]
    }

    /// Release `words` pushed words, if any
    pub fn release(words: usize) -> Option<Inst> {
        if words == 0 {
            None
        } else {
            Some(Inst::Addi(
                Self::STACK_PTR,
                Self::STACK_PTR,
                words as i32 * Self::WORD_SIZE,
            ))
        }
    }

    /// `li $v0, code; syscall`
    pub fn syscall(code: SyscallCode) -> Vec<Inst> {
        vec![Inst::Li(Reg::V0, code.code()), Inst::Syscall]
    }
}
