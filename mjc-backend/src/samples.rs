//! Built-in sample programs

use mjc_common::{BinaryOp, ClassDecl, EntryPoint, Expr, MethodDecl, Program, Stmt, VarDecl};

fn fac_program(compute_fac: MethodDecl, arg: i32) -> Program {
    Program {
        classes: vec![ClassDecl {
            name: "Fac".to_string(),
            extends: None,
            fields: vec![],
            methods: vec![compute_fac],
        }],
        entry: EntryPoint {
            class: "Fac".to_string(),
            method: "ComputeFac".to_string(),
            args: vec![arg],
        },
    }
}

/// `num * this.ComputeFac(num - 1)`
fn recursive_step() -> Expr {
    Expr::binary(
        BinaryOp::Mul,
        Expr::var("num"),
        Expr::call(
            Expr::This,
            "Fac",
            "ComputeFac",
            vec![Expr::binary(BinaryOp::Sub, Expr::var("num"), Expr::int(1))],
        ),
    )
}

/// Recursive factorial written with a conditional expression:
///
/// ```text
/// int ComputeFac(int num) {
///     return (num < 1) ? 1 : num * this.ComputeFac(num - 1);
/// }
/// ```
pub fn factorial(arg: i32) -> Program {
    fac_program(
        MethodDecl {
            name: "ComputeFac".to_string(),
            is_static: false,
            params: vec![VarDecl::int("num")],
            locals: vec![],
            body: vec![],
            ret: Expr::conditional(
                Expr::binary(BinaryOp::Lt, Expr::var("num"), Expr::int(1)),
                Expr::int(1),
                recursive_step(),
            ),
        },
        arg,
    )
}

/// The same factorial written with an `if` statement and a local
pub fn factorial_with_local(arg: i32) -> Program {
    fac_program(
        MethodDecl {
            name: "ComputeFac".to_string(),
            is_static: false,
            params: vec![VarDecl::int("num")],
            locals: vec![VarDecl::int("num_aux")],
            body: vec![Stmt::if_else(
                Expr::binary(BinaryOp::Lt, Expr::var("num"), Expr::int(1)),
                Stmt::assign("num_aux", Expr::int(1)),
                Stmt::assign("num_aux", recursive_step()),
            )],
            ret: Expr::var("num_aux"),
        },
        arg,
    )
}
