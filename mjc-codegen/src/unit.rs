//! Output of code generation: procedures plus data-section requirements

use crate::asm::Inst;
use mjc_common::CodegenError;
use serde::{Deserialize, Serialize};

/// Initial value of a data-section entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataValue {
    /// NUL-terminated string (`.asciiz`)
    Asciiz(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    pub label: String,
    pub value: DataValue,
}

impl DataEntry {
    pub fn asciiz(label: &str, text: &str) -> Self {
        Self { label: label.to_string(), value: DataValue::Asciiz(text.to_string()) }
    }
}

/// Instructions of one procedure. `body` starts with the procedure's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub label: String,
    pub body: Vec<Inst>,
}

/// A fully generated compilation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledUnit {
    pub procedures: Vec<Procedure>,
    pub data: Vec<DataEntry>,
}

impl CompiledUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_procedure(&mut self, procedure: Procedure) {
        self.procedures.push(procedure);
    }

    /// Register a data entry. Requesting the same entry twice is harmless;
    /// reusing a label for different contents is not.
    pub fn require_data(&mut self, entry: DataEntry) -> Result<(), CodegenError> {
        match self.data.iter().find(|e| e.label == entry.label) {
            Some(existing) if *existing == entry => Ok(()),
            Some(_) => Err(CodegenError::LabelCollision(entry.label)),
            None => {
                self.data.push(entry);
                Ok(())
            }
        }
    }

    pub fn procedure(&self, label: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.label == label)
    }

    /// All instructions in emission order
    pub fn instructions(&self) -> impl Iterator<Item = &Inst> {
        self.procedures.iter().flat_map(|p| p.body.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_data_deduplicates() {
        let mut unit = CompiledUnit::new();
        unit.require_data(DataEntry::asciiz("newline", "\n")).unwrap();
        unit.require_data(DataEntry::asciiz("newline", "\n")).unwrap();
        assert_eq!(unit.data.len(), 1);

        let clash = unit.require_data(DataEntry::asciiz("newline", "\r\n"));
        assert_eq!(clash, Err(CodegenError::LabelCollision("newline".to_string())));
    }

    #[test]
    fn test_instruction_order() {
        let mut unit = CompiledUnit::new();
        unit.push_procedure(Procedure {
            label: "main".to_string(),
            body: vec![Inst::Label("main".to_string()), Inst::Syscall],
        });
        unit.push_procedure(Procedure {
            label: "A_f".to_string(),
            body: vec![Inst::Label("A_f".to_string())],
        });

        let labels: Vec<_> = unit
            .instructions()
            .filter_map(|i| match i {
                Inst::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["main", "A_f"]);
        assert!(unit.procedure("A_f").is_some());
    }
}
