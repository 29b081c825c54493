//! Call sites
//!
//! Sequence for `receiver.method(a, b)`:
//!
//! ```text
//!     <save live scratch registers>
//!     <receiver>  push $t0
//!     <a>         push $t0
//!     <b>         push $t0
//!     lw $a0, 8($sp)          # receiver, object calls only
//!     jal Class_method
//!     addi $sp, $sp, 12       # arguments and receiver slot
//!     move $t0, $v0
//!     <restore live scratch registers>
//! ```
//!
//! The receiver is pushed rather than held in a register because argument
//! evaluation may itself contain calls.

use super::BodyLowering;
use log::debug;
use mjc_codegen::{CallingConvention, Inst, Reg};
use mjc_common::{CallExpr, CodegenError, Expr, MethodDecl};

/// A resolved call ready for emission
pub(super) struct CallSite<'e> {
    pub target: String,
    pub receiver: Option<&'e Expr>,
    pub args: &'e [Expr],
}

/// Check a call against the declaration it resolved to
pub(super) fn check_call(
    class: &str,
    decl: &MethodDecl,
    has_receiver: bool,
    arg_count: usize,
) -> Result<(), CodegenError> {
    if decl.params.len() != arg_count {
        return Err(CodegenError::ArityMismatch {
            class: class.to_string(),
            method: decl.name.clone(),
            expected: decl.params.len(),
            found: arg_count,
        });
    }

    let message = match (decl.is_static, has_receiver) {
        (true, true) => "static method called on a receiver",
        (false, false) => "instance method called without a receiver",
        _ => return Ok(()),
    };
    Err(CodegenError::ReceiverMismatch {
        class: class.to_string(),
        method: decl.name.clone(),
        message: message.to_string(),
    })
}

impl BodyLowering<'_> {
    pub(super) fn lower_call(&mut self, call: &CallExpr) -> Result<(), CodegenError> {
        let (defining, decl) = self.classes.resolve_method(&call.class, &call.method)?;
        check_call(&call.class, decl, call.receiver.is_some(), call.args.len())?;

        let site = CallSite {
            target: self.namer.procedure_label(defining, &decl.name)?,
            receiver: call.receiver.as_deref(),
            args: &call.args,
        };
        self.emit_call(&site)
    }

    /// Emit a call with the shared convention. The value ends in the result
    /// register and the stack pointer is back where it started.
    pub(super) fn emit_call(&mut self, site: &CallSite<'_>) -> Result<(), CodegenError> {
        debug!(
            "{}: call {} ({} args{})",
            self.method,
            site.target,
            site.args.len(),
            if site.receiver.is_some() { ", receiver" } else { "" }
        );

        let saved: Vec<Reg> = if self.options.spill_across_calls {
            self.live.clone()
        } else {
            Vec::new()
        };
        for &reg in &saved {
            self.spill(reg);
        }

        let mut words = 0;
        if let Some(receiver) = site.receiver {
            self.lower_expr(receiver)?;
            self.push_result();
            words += 1;
        }
        for arg in site.args {
            self.lower_expr(arg)?;
            self.push_result();
            words += 1;
        }

        if site.receiver.is_some() {
            self.emit(Inst::Lw(
                CallingConvention::RECEIVER_ARG,
                CallingConvention::pushed_receiver_offset(site.args.len()),
                CallingConvention::STACK_PTR,
            ));
        }
        self.emit(Inst::Jal(site.target.clone()));
        self.release(words);
        self.emit(Inst::Move(CallingConvention::RESULT, CallingConvention::RETURN_VALUE));

        for &reg in saved.iter().rev() {
            self.reload(reg);
        }
        Ok(())
    }
}
