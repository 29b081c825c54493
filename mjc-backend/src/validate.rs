//! Label checks over a finished unit
//!
//! Every code and data label must be defined exactly once, every branch,
//! jump and call must target a defined code label, and every `la` a defined
//! data label.

use log::debug;
use mjc_codegen::{CompiledUnit, Inst};
use mjc_common::CodegenError;
use std::collections::HashSet;

pub fn validate_unit(unit: &CompiledUnit) -> Result<(), CodegenError> {
    let mut code_labels = HashSet::new();
    for inst in unit.instructions() {
        if let Inst::Label(label) = inst {
            if !code_labels.insert(label.as_str()) {
                return Err(CodegenError::LabelCollision(label.clone()));
            }
        }
    }

    let mut data_labels = HashSet::new();
    for entry in &unit.data {
        if code_labels.contains(entry.label.as_str()) || !data_labels.insert(entry.label.as_str()) {
            return Err(CodegenError::LabelCollision(entry.label.clone()));
        }
    }

    for inst in unit.instructions() {
        let (label, defined) = match inst {
            Inst::La(_, label) => (label.as_str(), &data_labels),
            _ => match inst.target_label() {
                Some(label) => (label, &code_labels),
                None => continue,
            },
        };
        if !defined.contains(label) {
            return Err(CodegenError::UndefinedLabel(label.to_string()));
        }
    }

    debug!(
        "Validated {} code labels and {} data labels",
        code_labels.len(),
        data_labels.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mjc_codegen::{DataEntry, Procedure, Reg};

    fn unit(body: Vec<Inst>) -> CompiledUnit {
        let mut unit = CompiledUnit::new();
        unit.push_procedure(Procedure { label: "main".to_string(), body });
        unit
    }

    #[test]
    fn test_valid_unit() {
        let mut unit = unit(vec![
            Inst::Label("main".into()),
            Inst::Beq(Reg::T0, Reg::Zero, "else_0".into()),
            Inst::J("end_if_0".into()),
            Inst::Label("else_0".into()),
            Inst::Label("end_if_0".into()),
            Inst::La(Reg::A0, "newline".into()),
        ]);
        unit.require_data(DataEntry::asciiz("newline", "\n")).unwrap();
        assert_eq!(validate_unit(&unit), Ok(()));
    }

    #[test]
    fn test_duplicate_label() {
        let unit = unit(vec![Inst::Label("main".into()), Inst::Label("main".into())]);
        assert_eq!(validate_unit(&unit), Err(CodegenError::LabelCollision("main".into())));
    }

    #[test]
    fn test_undefined_targets() {
        let unit_a = unit(vec![Inst::Label("main".into()), Inst::Jal("Fac_Missing".into())]);
        assert_eq!(validate_unit(&unit_a), Err(CodegenError::UndefinedLabel("Fac_Missing".into())));

        // A code label does not satisfy an `la`
        let unit_b = unit(vec![Inst::Label("main".into()), Inst::La(Reg::A0, "main".into())]);
        assert_eq!(validate_unit(&unit_b), Err(CodegenError::UndefinedLabel("main".into())));
    }
}
