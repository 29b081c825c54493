//! MiniJava Compiler - Target Model and ABI
//! 
//! This crate describes the MIPS-style target the backend lowers to:
//! 
//! - Register and instruction definitions
//! - The calling convention shared by every call site and prologue
//! - Stack frame layout planning and prologue/epilogue generation
//! - The compiled-unit container and its assembly text emission
//! - Machine code encoding

pub mod asm;
pub mod abi;
pub mod frame;
pub mod unit;
pub mod emit;
pub mod encode;

pub use asm::{Inst, Operand, Reg};
pub use abi::{CallingConvention, SyscallCode};
pub use frame::FrameLayout;
pub use unit::{CompiledUnit, DataEntry, DataValue, Procedure};
pub use emit::{emit_unit, EmitOptions};
pub use encode::{encode_unit, MachineCode};
