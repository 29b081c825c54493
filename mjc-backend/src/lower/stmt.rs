//! Statement lowering

use super::BodyLowering;
use crate::naming::NEWLINE_LABEL;
use mjc_codegen::{CallingConvention, DataEntry, Inst, Reg, SyscallCode};
use mjc_common::{CodegenError, Stmt};

impl BodyLowering<'_> {
    pub(super) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Assign { target, value } => {
                self.lower_expr(value)?;
                self.store_var(target)
            }
            Stmt::Print(value) => {
                self.lower_expr(value)?;
                self.emit_print();
                Ok(())
            }
            Stmt::If { cond, then_branch, else_branch } => {
                self.lower_if(cond, then_branch, else_branch.as_deref())
            }
            Stmt::While { cond, body } => self.lower_while(cond, body),
            Stmt::Block(stmts) => stmts.iter().try_for_each(|s| self.lower_stmt(s)),
            Stmt::Eval(value) => self.lower_expr(value),
        }
    }

    /// Print the result register followed by a newline
    pub(super) fn emit_print(&mut self) {
        self.require_data(DataEntry::asciiz(NEWLINE_LABEL, "\n"));
        self.emit(Inst::Move(Reg::A0, CallingConvention::RESULT));
        self.emit_all(CallingConvention::syscall(SyscallCode::PrintInt));
        self.emit(Inst::La(Reg::A0, NEWLINE_LABEL.to_string()));
        self.emit_all(CallingConvention::syscall(SyscallCode::PrintString));
    }
}
