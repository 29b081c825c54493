//! Assembly text emission
//!
//! Formats a [`CompiledUnit`] as MIPS-style assembly source. Formatting is
//! deliberately plain: one instruction per line, labels flush left.

use crate::asm::Inst;
use crate::unit::{CompiledUnit, DataValue};
use std::fmt;

/// Options for text emission
#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// Keep `# ...` comment lines
    pub comments: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { comments: true }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

/// Assembly listing of a unit
pub struct Listing<'u> {
    unit: &'u CompiledUnit,
    options: EmitOptions,
}

impl<'u> Listing<'u> {
    pub fn new(unit: &'u CompiledUnit, options: EmitOptions) -> Self {
        Self { unit, options }
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ".data")?;
        for entry in &self.unit.data {
            match &entry.value {
                DataValue::Asciiz(text) => writeln!(f, "{}: .asciiz \"{}\"", entry.label, escape(text))?,
            }
        }

        writeln!(f)?;
        writeln!(f, ".text")?;
        writeln!(f, ".globl main")?;

        for procedure in &self.unit.procedures {
            writeln!(f)?;
            for inst in &procedure.body {
                match inst {
                    Inst::Label(_) => writeln!(f, "{}", inst)?,
                    Inst::Comment(_) if !self.options.comments => {}
                    _ => writeln!(f, "    {}", inst)?,
                }
            }
        }
        Ok(())
    }
}

/// Emit the complete program text
pub fn emit_unit(unit: &CompiledUnit, options: EmitOptions) -> String {
    Listing::new(unit, options).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Reg;
    use crate::unit::{DataEntry, Procedure};

    fn sample_unit() -> CompiledUnit {
        let mut unit = CompiledUnit::new();
        unit.require_data(DataEntry::asciiz("newline", "\n")).unwrap();
        unit.push_procedure(Procedure {
            label: "main".to_string(),
            body: vec![
                Inst::Label("main".to_string()),
                Inst::Comment("exit".to_string()),
                Inst::Li(Reg::V0, 10),
                Inst::Syscall,
            ],
        });
        unit
    }

    #[test]
    fn test_emit_sections() {
        let text = emit_unit(&sample_unit(), EmitOptions::default());
        assert!(text.starts_with(".data\nnewline: .asciiz \"\\n\"\n"));
        assert!(text.contains(".text\n.globl main\n"));
        assert!(text.contains("\nmain:\n"));
        assert!(text.contains("    # exit\n"));
        assert!(text.contains("    li $v0, 10\n    syscall\n"));
    }

    #[test]
    fn test_emit_without_comments() {
        let text = emit_unit(&sample_unit(), EmitOptions { comments: false });
        assert!(!text.contains('#'));
    }
}
