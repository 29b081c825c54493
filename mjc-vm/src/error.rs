use thiserror::Error;

/// A fault raised while loading or running a unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Unaligned access at address {addr:#x}")]
    UnalignedAccess { addr: u32 },

    #[error("Access outside mapped memory at address {addr:#x}")]
    OutOfBounds { addr: u32 },

    #[error("Stack pointer {sp:#x} collided with the heap (break at {brk:#x})")]
    StackCollision { sp: u32, brk: u32 },

    #[error("Unknown label '{0}'")]
    UnknownLabel(String),

    #[error("Jump to invalid code address {0}")]
    InvalidCodeAddress(i32),

    #[error("Step limit of {0} instructions exceeded")]
    StepLimit(u64),

    #[error("Unknown syscall {0}")]
    UnknownSyscall(i32),

    #[error("Data section of {size} bytes does not fit in {memory} bytes of memory")]
    DataTooLarge { size: usize, memory: usize },

    #[error("Program has no entry label '{0}'")]
    NoEntry(String),
}
