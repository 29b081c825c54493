//! Label naming for one compilation unit
//!
//! Procedure labels are derived from the class and method name
//! (`Class_Method`); branch labels come in pairs drawn from one monotonic
//! counter (`else_N`/`end_if_N`, `while_N`/`end_while_N`). Each unit owns its
//! own [`Namer`], so independent units never share counter state.
//!
//! All labels live in one namespace. Procedure, entry and data labels are
//! reserved before any body is lowered; a procedure whose derived label is
//! already taken gets a numeric suffix, and a branch number whose labels are
//! taken is skipped.

use log::{debug, trace};
use mjc_codegen::Inst;
use mjc_common::{ClassDecl, CodegenError};
use std::collections::{HashMap, HashSet};

/// Label of the program entry procedure
pub const ENTRY_LABEL: &str = "main";

/// Data label of the newline string used by `print`
pub const NEWLINE_LABEL: &str = "newline";

#[derive(Debug, Default)]
pub struct Namer {
    next_label_id: u32,

    /// Every label handed out or reserved so far
    taken: HashSet<String>,

    /// Labels already emitted as definitions
    defined: HashSet<String>,

    /// Procedure label of each `(class, method)`
    procedures: HashMap<(String, String), String>,
}

impl Namer {
    /// Namer for a unit made of `classes`, with the entry, data and
    /// procedure labels reserved
    pub fn for_classes(classes: &[ClassDecl]) -> Self {
        let mut namer = Self::default();
        namer.taken.insert(ENTRY_LABEL.to_string());
        namer.taken.insert(NEWLINE_LABEL.to_string());

        for class in classes {
            for desc in class.descriptors() {
                let label = namer.unique_procedure_label(desc.class, desc.name());
                namer.procedures.insert((desc.class.to_string(), desc.name().to_string()), label);
            }
        }
        namer
    }

    fn unique_procedure_label(&mut self, class: &str, method: &str) -> String {
        let base = format!("{}_{}", class, method);
        let mut label = base.clone();
        let mut suffix = 0;
        while self.taken.contains(&label) {
            suffix += 1;
            label = format!("{}_{}", base, suffix);
        }
        if suffix > 0 {
            debug!("Procedure {}.{} renamed to {} ({} is taken)", class, method, label, base);
        }
        self.taken.insert(label.clone());
        label
    }

    /// Label of a method's procedure
    pub fn procedure_label(&self, class: &str, method: &str) -> Result<String, CodegenError> {
        self.procedures
            .get(&(class.to_string(), method.to_string()))
            .cloned()
            .ok_or_else(|| CodegenError::UnresolvedMethod {
                class: class.to_string(),
                method: method.to_string(),
            })
    }

    /// Next number whose two labels are both free. The pair is reserved.
    fn fresh_pair(&mut self, first: &str, second: &str) -> (String, String) {
        loop {
            let id = self.next_label_id;
            self.next_label_id += 1;

            let pair = (format!("{}_{}", first, id), format!("{}_{}", second, id));
            if self.taken.contains(&pair.0) || self.taken.contains(&pair.1) {
                trace!("Label number {id} is taken, skipping");
                continue;
            }
            self.taken.insert(pair.0.clone());
            self.taken.insert(pair.1.clone());
            return pair;
        }
    }

    /// Fresh `(else_N, end_if_N)` pair for one conditional
    pub fn if_labels(&mut self) -> (String, String) {
        let pair = self.fresh_pair("else", "end_if");
        trace!("Allocated conditional labels {} / {}", pair.0, pair.1);
        pair
    }

    /// Fresh `(while_N, end_while_N)` pair for one loop
    pub fn while_labels(&mut self) -> (String, String) {
        let pair = self.fresh_pair("while", "end_while");
        trace!("Allocated loop labels {} / {}", pair.0, pair.1);
        pair
    }

    /// Record the definition of `label` and return the label instruction
    pub fn define(&mut self, label: &str) -> Result<Inst, CodegenError> {
        if !self.defined.insert(label.to_string()) {
            return Err(CodegenError::LabelCollision(label.to_string()));
        }
        Ok(Inst::Label(label.to_string()))
    }
}
