//! MiniJava Compiler - Simulator
//!
//! Executes a [`mjc_codegen::CompiledUnit`] directly from its typed
//! instructions. Used as the oracle for end-to-end tests and by `mjc run`.

pub mod constants;
pub mod error;
pub mod vm;

pub use error::VmError;
pub use vm::{run_unit, RunOutcome, VMState, VmConfig, VM};
