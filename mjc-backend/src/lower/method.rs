use super::{BodyLowering, LoweredProcedure};
use crate::classes::ClassTable;
use crate::naming::Namer;
use crate::LoweringOptions;
use log::debug;
use mjc_codegen::{CallingConvention, FrameLayout, Inst};
use mjc_common::{CodegenError, MethodDescriptor};

/// Lower one method into a complete procedure: label, prologue, body,
/// return value, epilogue
pub fn lower_method(
    classes: &ClassTable<'_>,
    namer: &mut Namer,
    options: &LoweringOptions,
    desc: MethodDescriptor<'_>,
) -> Result<LoweredProcedure, CodegenError> {
    let layout = FrameLayout::plan(&desc)?;
    let label = namer.procedure_label(desc.class, desc.name())?;
    debug!("Lowering {} as {}", desc.qualified_name(), label);

    let mut body = BodyLowering::new(
        classes,
        namer,
        options,
        Some(&layout),
        desc.class,
        desc.qualified_name(),
    );

    body.define_label(&label)?;
    body.comment(format!("{}: frame {} bytes", desc.qualified_name(), layout.frame_size()));
    body.emit_all(layout.gen_prologue());

    for stmt in &desc.method.body {
        body.lower_stmt(stmt)?;
    }

    body.lower_expr(&desc.method.ret)?;
    body.emit(Inst::Move(CallingConvention::RETURN_VALUE, CallingConvention::RESULT));
    body.emit_all(layout.gen_epilogue());

    body.finish(label)
}
