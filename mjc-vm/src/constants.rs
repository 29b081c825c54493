//! Memory map and limits of the simulator

/// Default memory size in bytes
pub const DEFAULT_MEMORY_SIZE: usize = 1 << 20;

/// Default maximum number of executed instructions
pub const DEFAULT_STEP_LIMIT: u64 = 10_000_000;

// Memory layout (byte addresses):
// [0, DATA_BASE)          unmapped, catches null dereferences
// [DATA_BASE, heap start) data section
// [heap start, brk)       bump-allocated heap, grows up
// [$sp, memory_size)      stack, grows down from the top
pub const DATA_BASE: usize = 0x1000;

pub const MIN_MEMORY_SIZE: usize = 2 * DATA_BASE;

pub const WORD_BYTES: usize = 4;
pub const STACK_ALIGN: usize = 8;

pub const NUM_REGISTERS: usize = 32;
