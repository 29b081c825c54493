use super::{VMState, VM};
use crate::error::VmError;
use log::trace;
use mjc_codegen::{Inst, Reg, SyscallCode};

impl VM {
    fn jump_to(&mut self, label: &str) -> Result<(), VmError> {
        self.pc = *self
            .labels
            .get(label)
            .ok_or_else(|| VmError::UnknownLabel(label.to_string()))?;
        Ok(())
    }

    pub(super) fn execute_instruction(&mut self, inst: &Inst) -> Result<(), VmError> {
        trace!("{:4}: {}", self.pc - 1, inst);

        match inst {
            // ALU register-register
            Inst::Add(rd, rs, rt) => self.set_reg(*rd, self.reg(*rs).wrapping_add(self.reg(*rt))),
            Inst::Sub(rd, rs, rt) => self.set_reg(*rd, self.reg(*rs).wrapping_sub(self.reg(*rt))),
            Inst::Mul(rd, rs, rt) => self.set_reg(*rd, self.reg(*rs).wrapping_mul(self.reg(*rt))),
            Inst::Slt(rd, rs, rt) => {
                let less = self.reg(*rs) < self.reg(*rt);
                self.set_reg(*rd, i32::from(less));
            }
            Inst::And(rd, rs, rt) => self.set_reg(*rd, self.reg(*rs) & self.reg(*rt)),

            // ALU immediate
            Inst::Addi(rd, rs, imm) => {
                self.set_reg(*rd, self.reg(*rs).wrapping_add(*imm));
                if *rd == Reg::Sp {
                    self.check_stack()?;
                }
            }
            Inst::Xori(rd, rs, imm) => self.set_reg(*rd, self.reg(*rs) ^ *imm),

            // Memory
            Inst::Lw(rt, offset, base) => {
                let value = self.load_word(self.reg(*base).wrapping_add(*offset))?;
                self.set_reg(*rt, value);
            }
            Inst::Sw(rt, offset, base) => {
                self.store_word(self.reg(*base).wrapping_add(*offset), self.reg(*rt))?;
            }

            Inst::Li(rd, imm) => self.set_reg(*rd, *imm),
            Inst::La(rd, label) => {
                let addr = *self
                    .data_labels
                    .get(label)
                    .ok_or_else(|| VmError::UnknownLabel(label.clone()))?;
                self.set_reg(*rd, addr as i32);
            }
            Inst::Move(rd, rs) => {
                self.set_reg(*rd, self.reg(*rs));
                if *rd == Reg::Sp {
                    self.check_stack()?;
                }
            }

            // Control flow. Code addresses are instruction indices.
            Inst::Beq(rs, rt, label) => {
                if self.reg(*rs) == self.reg(*rt) {
                    self.jump_to(label)?;
                }
            }
            Inst::J(label) => self.jump_to(label)?,
            Inst::Jal(label) => {
                self.set_reg(Reg::Ra, self.pc as i32);
                self.jump_to(label)?;
            }
            Inst::Jr(rs) => {
                let target = self.reg(*rs);
                if target < 0 || target as usize >= self.instructions.len() {
                    return Err(VmError::InvalidCodeAddress(target));
                }
                self.pc = target as usize;
            }

            Inst::Syscall => self.syscall()?,

            Inst::Label(_) | Inst::Comment(_) => {}
        }
        Ok(())
    }

    fn syscall(&mut self) -> Result<(), VmError> {
        let code = self.reg(Reg::V0);
        let service = SyscallCode::from_code(code).ok_or(VmError::UnknownSyscall(code))?;
        match service {
            SyscallCode::PrintInt => {
                let value = self.reg(Reg::A0);
                self.output.push_str(&value.to_string());
            }
            SyscallCode::PrintString => {
                let text = self.read_cstring(self.reg(Reg::A0))?;
                self.output.push_str(&text);
            }
            SyscallCode::Sbrk => {
                let addr = self.sbrk(self.reg(Reg::A0))?;
                self.set_reg(Reg::V0, addr);
            }
            SyscallCode::Exit => {
                self.exit_code = 0;
                self.state = VMState::Halted;
            }
        }
        Ok(())
    }
}
