//! MiniJava Compiler - Backend
//!
//! Lowers a typed [`Program`] into a [`CompiledUnit`]: one procedure per
//! method plus the `main` entry procedure, all sharing one calling
//! convention, and the data entries those procedures need.

pub mod classes;
mod lower;
pub mod naming;
pub mod samples;
pub mod validate;

#[cfg(test)]
mod tests;

pub use classes::ClassTable;
pub use lower::{lower_entry, lower_method, LoweredProcedure};
pub use naming::{Namer, ENTRY_LABEL, NEWLINE_LABEL};
pub use validate::validate_unit;

use log::info;
use mjc_codegen::{emit_unit, CompiledUnit, EmitOptions, Procedure};
use mjc_common::{CodegenError, Program};

/// Options for lowering
#[derive(Debug, Clone)]
pub struct LoweringOptions {
    /// Save left operands and live scratch registers on the stack around
    /// calls. Turning this off produces wrong code for recursive methods and
    /// exists only to demonstrate that.
    pub spill_across_calls: bool,
    /// Log spills and reloads at debug level instead of trace
    pub trace_spills: bool,
    /// Annotate generated code with `#` comments
    pub emit_comments: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            spill_across_calls: true,
            trace_spills: false,
            emit_comments: true,
        }
    }
}

fn add_procedure(unit: &mut CompiledUnit, lowered: LoweredProcedure) -> Result<(), CodegenError> {
    for entry in lowered.data {
        unit.require_data(entry)?;
    }
    unit.push_procedure(Procedure { label: lowered.label, body: lowered.body });
    Ok(())
}

/// Lower a whole program. Any error aborts the unit.
pub fn lower_program(program: &Program, options: &LoweringOptions) -> Result<CompiledUnit, CodegenError> {
    info!(
        "Lowering program with {} classes, entry {}.{}",
        program.classes.len(),
        program.entry.class,
        program.entry.method
    );

    let classes = ClassTable::build(&program.classes)?;
    let mut namer = Namer::for_classes(&program.classes);
    let mut unit = CompiledUnit::new();

    let entry = lower_entry(&classes, &mut namer, options, &program.entry)?;
    add_procedure(&mut unit, entry)?;

    for class in &program.classes {
        for desc in class.descriptors() {
            let lowered = lower_method(&classes, &mut namer, options, desc)?;
            add_procedure(&mut unit, lowered)?;
        }
    }

    validate_unit(&unit)?;

    info!(
        "Generated {} procedures, {} instructions",
        unit.procedures.len(),
        unit.instructions().count()
    );
    Ok(unit)
}

/// Lower a program and format it as assembly text
pub fn compile_to_text(program: &Program, options: &LoweringOptions) -> Result<String, CodegenError> {
    let unit = lower_program(program, options)?;
    Ok(emit_unit(&unit, EmitOptions { comments: options.emit_comments }))
}
