//! End-to-end tests: lower whole programs and run them in the simulator

mod errors;

use crate::{lower_program, LoweringOptions};
use mjc_codegen::CompiledUnit;
use mjc_common::{ClassDecl, EntryPoint, Expr, MethodDecl, Program, Stmt, VarDecl};
use mjc_vm::{run_unit, RunOutcome, VmConfig};

pub(crate) fn vars(names: &[&str]) -> Vec<VarDecl> {
    names.iter().map(|name| VarDecl::int(name)).collect()
}

pub(crate) fn method(
    name: &str,
    is_static: bool,
    params: &[&str],
    locals: &[&str],
    body: Vec<Stmt>,
    ret: Expr,
) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        is_static,
        params: vars(params),
        locals: vars(locals),
        body,
        ret,
    }
}

pub(crate) fn class(name: &str, extends: Option<&str>, fields: &[&str], methods: Vec<MethodDecl>) -> ClassDecl {
    ClassDecl {
        name: name.to_string(),
        extends: extends.map(str::to_string),
        fields: vars(fields),
        methods,
    }
}

pub(crate) fn program(classes: Vec<ClassDecl>, class: &str, method: &str, args: Vec<i32>) -> Program {
    Program {
        classes,
        entry: EntryPoint { class: class.to_string(), method: method.to_string(), args },
    }
}

pub(crate) fn compile(program: &Program) -> CompiledUnit {
    lower_program(program, &LoweringOptions::default()).unwrap()
}

pub(crate) fn run_with(program: &Program, options: &LoweringOptions) -> RunOutcome {
    let unit = lower_program(program, options).unwrap();
    run_unit(&unit, VmConfig::default()).unwrap()
}

pub(crate) fn run(program: &Program) -> RunOutcome {
    run_with(program, &LoweringOptions::default())
}
