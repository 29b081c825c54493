//! Control flow: conditionals and loops as compare-and-branch sequences
//!
//! ```text
//!         <cond>                    while_N:
//!         beq $t0, $zero, else_N            <cond>
//!         <then>                            beq $t0, $zero, end_while_N
//!         j end_if_N                        <body>
//! else_N:                                   j while_N
//!         <else>                    end_while_N:
//! end_if_N:
//! ```

use super::BodyLowering;
use mjc_codegen::{CallingConvention, Inst, Reg};
use mjc_common::{CodegenError, Expr, Stmt};

impl BodyLowering<'_> {
    /// Shared if/else shape. Both arms end at `end_if_N`.
    fn lower_if_shape<T, E>(&mut self, cond: &Expr, then_arm: T, else_arm: E) -> Result<(), CodegenError>
    where
        T: FnOnce(&mut Self) -> Result<(), CodegenError>,
        E: FnOnce(&mut Self) -> Result<(), CodegenError>,
    {
        let (else_label, end_label) = self.namer.if_labels();

        self.lower_expr(cond)?;
        self.emit(Inst::Beq(CallingConvention::RESULT, Reg::Zero, else_label.clone()));
        then_arm(self)?;
        self.emit(Inst::J(end_label.clone()));
        self.define_label(&else_label)?;
        else_arm(self)?;
        self.define_label(&end_label)
    }

    /// `cond ? then_expr : else_expr`; both arms leave their value in the
    /// result register
    pub(super) fn lower_conditional(
        &mut self,
        cond: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
    ) -> Result<(), CodegenError> {
        self.lower_if_shape(
            cond,
            |body| body.lower_expr(then_expr),
            |body| body.lower_expr(else_expr),
        )
    }

    pub(super) fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), CodegenError> {
        self.lower_if_shape(
            cond,
            |body| body.lower_stmt(then_branch),
            |body| match else_branch {
                Some(stmt) => body.lower_stmt(stmt),
                None => Ok(()),
            },
        )
    }

    pub(super) fn lower_while(&mut self, cond: &Expr, loop_body: &Stmt) -> Result<(), CodegenError> {
        let (top_label, end_label) = self.namer.while_labels();

        self.define_label(&top_label)?;
        self.lower_expr(cond)?;
        self.emit(Inst::Beq(CallingConvention::RESULT, Reg::Zero, end_label.clone()));
        self.lower_stmt(loop_body)?;
        self.emit(Inst::J(top_label));
        self.define_label(&end_label)
    }
}
