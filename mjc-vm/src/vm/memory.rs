use super::VM;
use crate::constants::*;
use crate::error::VmError;
use mjc_codegen::Reg;

impl VM {
    /// Translate a word address, checking alignment and mapping
    fn word_index(&self, addr: i32) -> Result<usize, VmError> {
        let addr = addr as u32;
        if addr as usize % WORD_BYTES != 0 {
            return Err(VmError::UnalignedAccess { addr });
        }
        let index = addr as usize;
        if index < DATA_BASE || index + WORD_BYTES > self.memory.len() {
            return Err(VmError::OutOfBounds { addr });
        }
        Ok(index)
    }

    pub fn load_word(&self, addr: i32) -> Result<i32, VmError> {
        let index = self.word_index(addr)?;
        let mut bytes = [0u8; WORD_BYTES];
        bytes.copy_from_slice(&self.memory[index..index + WORD_BYTES]);
        Ok(i32::from_le_bytes(bytes))
    }

    pub fn store_word(&mut self, addr: i32, value: i32) -> Result<(), VmError> {
        let index = self.word_index(addr)?;
        self.memory[index..index + WORD_BYTES].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// NUL-terminated string starting at `addr`
    pub(super) fn read_cstring(&self, addr: i32) -> Result<String, VmError> {
        let start = addr as u32 as usize;
        if start < DATA_BASE || start >= self.memory.len() {
            return Err(VmError::OutOfBounds { addr: addr as u32 });
        }
        let len = self.memory[start..]
            .iter()
            .position(|&b| b == 0)
            .ok_or(VmError::OutOfBounds { addr: self.memory.len() as u32 })?;
        Ok(String::from_utf8_lossy(&self.memory[start..start + len]).into_owned())
    }

    /// Grow the heap by `bytes` (rounded up to a word) and return the old break
    pub(super) fn sbrk(&mut self, bytes: i32) -> Result<i32, VmError> {
        let old = self.brk;
        let size = (bytes.max(0) as u32).next_multiple_of(WORD_BYTES as u32);
        let new = old + size;
        let sp = self.reg(Reg::Sp) as u32;
        if new > sp {
            return Err(VmError::StackCollision { sp, brk: new });
        }
        self.brk = new;
        Ok(old as i32)
    }

    /// Fault if the stack has grown into the heap
    pub(super) fn check_stack(&self) -> Result<(), VmError> {
        let sp = self.reg(Reg::Sp) as u32;
        if sp < self.brk || sp as usize > self.memory.len() {
            return Err(VmError::StackCollision { sp, brk: self.brk });
        }
        Ok(())
    }
}
