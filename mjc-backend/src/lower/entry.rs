use super::call::{check_call, CallSite};
use super::{BodyLowering, LoweredProcedure};
use crate::classes::ClassTable;
use crate::naming::{Namer, ENTRY_LABEL};
use crate::LoweringOptions;
use log::debug;
use mjc_codegen::{CallingConvention, SyscallCode};
use mjc_common::{CodegenError, EntryPoint, Expr};

/// Lower the program entry procedure
///
/// Allocates the start object when the start method is object-scoped, calls
/// the start method through the ordinary call-site sequence, prints its
/// result and exits.
pub fn lower_entry(
    classes: &ClassTable<'_>,
    namer: &mut Namer,
    options: &LoweringOptions,
    entry: &EntryPoint,
) -> Result<LoweredProcedure, CodegenError> {
    let (defining, decl) = classes.resolve_method(&entry.class, &entry.method)?;

    let receiver = (!decl.is_static).then(|| Expr::New(entry.class.clone()));
    let args: Vec<Expr> = entry.args.iter().copied().map(Expr::Int).collect();
    check_call(&entry.class, decl, receiver.is_some(), args.len())?;

    let target = namer.procedure_label(defining, &decl.name)?;
    debug!("Entry point calls {} with {:?}", target, entry.args);

    let mut body = BodyLowering::new(
        classes,
        namer,
        options,
        None,
        &entry.class,
        ENTRY_LABEL.to_string(),
    );

    body.define_label(ENTRY_LABEL)?;
    body.comment(format!("start {}.{}", entry.class, entry.method));
    body.emit_call(&CallSite {
        target,
        receiver: receiver.as_ref(),
        args: &args,
    })?;
    body.emit_print();
    body.comment("exit");
    body.emit_all(CallingConvention::syscall(SyscallCode::Exit));

    body.finish(ENTRY_LABEL.to_string())
}
