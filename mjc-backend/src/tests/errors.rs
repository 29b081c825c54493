//! Programs the backend must reject

use super::*;
use crate::samples::factorial;
use mjc_common::{BinaryOp, CodegenError, ErrorKind};
use pretty_assertions::assert_eq;

fn lower(program: &Program) -> Result<CompiledUnit, CodegenError> {
    lower_program(program, &LoweringOptions::default())
}

fn single(method_decl: MethodDecl) -> Program {
    let name = method_decl.name.clone();
    program(vec![class("A", None, &["f"], vec![method_decl])], "A", &name, vec![])
}

#[test]
fn test_unresolved_variable() {
    let err = lower(&single(method("M", false, &[], &[], vec![], Expr::var("ghost")))).unwrap_err();
    assert_eq!(
        err,
        CodegenError::UnresolvedVariable { method: "A.M".to_string(), name: "ghost".to_string() }
    );
    assert_eq!(err.kind(), ErrorKind::Unresolved);
}

#[test]
fn test_assignment_to_unknown_name() {
    let body = vec![Stmt::assign("ghost", Expr::int(1))];
    let err = lower(&single(method("M", false, &[], &[], body, Expr::int(0)))).unwrap_err();
    assert!(matches!(err, CodegenError::UnresolvedVariable { name, .. } if name == "ghost"));
}

#[test]
fn test_fields_invisible_in_static_method() {
    let err = lower(&single(method("M", true, &[], &[], vec![], Expr::var("f")))).unwrap_err();
    assert!(matches!(err, CodegenError::UnresolvedVariable { name, .. } if name == "f"));
}

#[test]
fn test_this_in_static_method() {
    let err = lower(&single(method("M", true, &[], &[], vec![], Expr::This))).unwrap_err();
    assert_eq!(err, CodegenError::ReceiverOutsideInstance { method: "A.M".to_string() });
}

#[test]
fn test_unresolved_method_and_class() {
    let call_missing = Expr::call(Expr::This, "A", "Missing", vec![]);
    let err = lower(&single(method("M", false, &[], &[], vec![], call_missing))).unwrap_err();
    assert_eq!(
        err,
        CodegenError::UnresolvedMethod { class: "A".to_string(), method: "Missing".to_string() }
    );

    let new_missing = Expr::new_object("Nope");
    let err = lower(&single(method("M", false, &[], &[], vec![], new_missing))).unwrap_err();
    assert_eq!(err, CodegenError::UnresolvedClass("Nope".to_string()));

    let mut bad_entry = factorial(1);
    bad_entry.entry.method = "Compute".to_string();
    assert!(matches!(lower(&bad_entry), Err(CodegenError::UnresolvedMethod { .. })));
}

#[test]
fn test_arity_mismatch() {
    let mut no_args = factorial(1);
    no_args.entry.args.clear();
    assert_eq!(
        lower(&no_args).unwrap_err(),
        CodegenError::ArityMismatch {
            class: "Fac".to_string(),
            method: "ComputeFac".to_string(),
            expected: 1,
            found: 0,
        }
    );

    let extra = Expr::call(Expr::This, "A", "M", vec![Expr::int(1)]);
    let err = lower(&single(method("M", false, &[], &[], vec![], extra))).unwrap_err();
    assert!(matches!(err, CodegenError::ArityMismatch { expected: 0, found: 1, .. }));
}

#[test]
fn test_receiver_mismatch() {
    let helper = method("H", true, &[], &[], vec![], Expr::int(1));
    let on_receiver = method("M", false, &[], &[], vec![], Expr::call(Expr::This, "A", "H", vec![]));
    let static_on_receiver = program(vec![class("A", None, &[], vec![helper, on_receiver])], "A", "M", vec![]);
    assert!(matches!(lower(&static_on_receiver), Err(CodegenError::ReceiverMismatch { .. })));

    let target = method("T", false, &[], &[], vec![], Expr::int(1));
    let without = method("S", true, &[], &[], vec![], Expr::static_call("A", "T", vec![]));
    let missing_receiver = program(vec![class("A", None, &[], vec![target, without])], "A", "S", vec![]);
    assert!(matches!(lower(&missing_receiver), Err(CodegenError::ReceiverMismatch { .. })));
}

#[test]
fn test_duplicate_variable() {
    let err = lower(&single(method("M", false, &[], &["x", "x"], vec![], Expr::int(0)))).unwrap_err();
    assert_eq!(err, CodegenError::DuplicateVariable { method: "A.M".to_string(), name: "x".to_string() });
}

#[test]
fn test_layout_overflow() {
    let names: Vec<String> = (0..9000).map(|i| format!("v{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let huge = method("M", true, &[], &refs, vec![], Expr::int(0));

    let err = lower(&single(huge)).unwrap_err();
    assert!(matches!(err, CodegenError::LayoutOverflow { .. }));
    assert_eq!(err.kind(), ErrorKind::Layout);
}

#[test]
fn test_error_aborts_whole_unit() {
    // The first method is fine; the second is not
    let good = method(
        "Good",
        true,
        &[],
        &[],
        vec![],
        Expr::binary(BinaryOp::Add, Expr::int(1), Expr::int(2)),
    );
    let bad = method("Bad", true, &[], &[], vec![], Expr::var("ghost"));
    let program = program(vec![class("A", None, &[], vec![good, bad])], "A", "Good", vec![]);
    assert!(lower(&program).is_err());
}
