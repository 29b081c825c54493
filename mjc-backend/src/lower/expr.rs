//! Expression lowering

use super::BodyLowering;
use log::trace;
use mjc_codegen::{CallingConvention, Inst, Reg, SyscallCode};
use mjc_common::{BinaryOp, CodegenError, Expr};

/// Where a left operand waits while its right operand is evaluated
enum Held {
    Scratch(Reg),
    Stack,
}

/// True if evaluating `expr` may execute a `jal`, directly or in a
/// subexpression
pub(super) fn may_call(expr: &Expr) -> bool {
    match expr {
        Expr::Int(_) | Expr::Bool(_) | Expr::Var(_) | Expr::This | Expr::New(_) => false,
        Expr::Call(_) => true,
        Expr::Not(inner) => may_call(inner),
        Expr::Binary { left, right, .. } => may_call(left) || may_call(right),
        Expr::Conditional { cond, then_expr, else_expr } => {
            may_call(cond) || may_call(then_expr) || may_call(else_expr)
        }
    }
}

fn binary_inst(op: BinaryOp, rd: Reg, lhs: Reg, rhs: Reg) -> Inst {
    match op {
        BinaryOp::Add => Inst::Add(rd, lhs, rhs),
        BinaryOp::Sub => Inst::Sub(rd, lhs, rhs),
        BinaryOp::Mul => Inst::Mul(rd, lhs, rhs),
        BinaryOp::Lt => Inst::Slt(rd, lhs, rhs),
        // Operands are already 0 or 1
        BinaryOp::And => Inst::And(rd, lhs, rhs),
    }
}

impl BodyLowering<'_> {
    /// Lower `expr`, leaving its value in the result register
    pub(super) fn lower_expr(&mut self, expr: &Expr) -> Result<(), CodegenError> {
        let result = CallingConvention::RESULT;
        match expr {
            Expr::Int(value) => self.emit(Inst::Li(result, *value)),
            Expr::Bool(value) => self.emit(Inst::Li(result, i32::from(*value))),
            Expr::Var(name) => self.load_var(name)?,
            Expr::This => {
                self.require_receiver()?;
                self.emit(Inst::Move(result, CallingConvention::RECEIVER));
            }
            Expr::Binary { op, left, right } => self.lower_binary(*op, left, right)?,
            Expr::Not(inner) => {
                self.lower_expr(inner)?;
                self.emit(Inst::Xori(result, result, 1));
            }
            Expr::Conditional { cond, then_expr, else_expr } => {
                self.lower_conditional(cond, then_expr, else_expr)?
            }
            Expr::Call(call) => self.lower_call(call)?,
            Expr::New(class) => self.lower_new(class)?,
        }
        Ok(())
    }

    fn lower_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<(), CodegenError> {
        let result = CallingConvention::RESULT;
        self.lower_expr(left)?;

        // A call in the right operand clobbers every caller-saved register,
        // so the left value goes to the stack. Otherwise it waits in the
        // scratch register for this depth while one is free.
        let held = if self.options.spill_across_calls && may_call(right) {
            Held::Stack
        } else {
            match CallingConvention::SCRATCH.get(self.live.len()) {
                Some(&reg) => Held::Scratch(reg),
                None => Held::Stack,
            }
        };

        let lhs = match held {
            Held::Scratch(reg) => {
                trace!("{}: hold left operand in {}", self.method, reg);
                self.emit(Inst::Move(reg, result));
                self.live.push(reg);
                self.lower_expr(right)?;
                self.live.pop();
                reg
            }
            Held::Stack => {
                self.spill(result);
                self.lower_expr(right)?;
                self.reload(CallingConvention::RELOAD);
                CallingConvention::RELOAD
            }
        };

        self.emit(binary_inst(op, result, lhs, result));
        Ok(())
    }

    fn has_receiver(&self) -> bool {
        self.layout.is_some_and(|layout| layout.is_object_scoped())
    }

    fn require_receiver(&self) -> Result<(), CodegenError> {
        if self.has_receiver() {
            Ok(())
        } else {
            Err(CodegenError::ReceiverOutsideInstance { method: self.method.clone() })
        }
    }

    /// Resolve `name` to a base register and displacement: a parameter or
    /// local first, then a field of the receiver
    fn locate_var(&self, name: &str) -> Result<(i32, Reg), CodegenError> {
        if let Some(offset) = self.layout.and_then(|layout| layout.offset_of(name)) {
            return Ok((offset, CallingConvention::FRAME_PTR));
        }
        if self.has_receiver() {
            if let Some(offset) = self.classes.field_offset(self.class, name)? {
                return Ok((offset, CallingConvention::RECEIVER));
            }
        }
        Err(CodegenError::UnresolvedVariable {
            method: self.method.clone(),
            name: name.to_string(),
        })
    }

    fn load_var(&mut self, name: &str) -> Result<(), CodegenError> {
        let (offset, base) = self.locate_var(name)?;
        self.emit(Inst::Lw(CallingConvention::RESULT, offset, base));
        Ok(())
    }

    /// Store the result register into `name`
    pub(super) fn store_var(&mut self, name: &str) -> Result<(), CodegenError> {
        let (offset, base) = self.locate_var(name)?;
        self.emit(Inst::Sw(CallingConvention::RESULT, offset, base));
        Ok(())
    }

    /// One heap request sized from the field layout
    fn lower_new(&mut self, class: &str) -> Result<(), CodegenError> {
        let size = self.classes.object_size(class)?;
        self.comment(format!("new {}", class));
        self.emit(Inst::Li(Reg::A0, size));
        self.emit_all(CallingConvention::syscall(SyscallCode::Sbrk));
        self.emit(Inst::Move(CallingConvention::RESULT, CallingConvention::RETURN_VALUE));
        Ok(())
    }
}
