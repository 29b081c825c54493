//! Class table: field layout and static method resolution
//!
//! Objects are flat arrays of words. Inherited fields come first, so a
//! subclass object can be used wherever its parent is expected. Method calls
//! are resolved statically from the receiver's declared class, walking up the
//! `extends` chain.

use log::debug;
use mjc_codegen::CallingConvention;
use mjc_common::{ClassDecl, CodegenError, MethodDecl, VarDecl};
use std::collections::{HashMap, HashSet};

pub struct ClassTable<'a> {
    classes: HashMap<&'a str, &'a ClassDecl>,
}

impl<'a> ClassTable<'a> {
    /// Index the classes and check the inheritance graph
    pub fn build(decls: &'a [ClassDecl]) -> Result<Self, CodegenError> {
        let mut classes = HashMap::new();
        for class in decls {
            if classes.insert(class.name.as_str(), class).is_some() {
                return Err(CodegenError::DuplicateDeclaration {
                    what: "class".to_string(),
                    name: class.name.clone(),
                });
            }

            let mut methods = HashSet::new();
            for method in &class.methods {
                if !methods.insert(method.name.as_str()) {
                    return Err(CodegenError::DuplicateDeclaration {
                        what: "method".to_string(),
                        name: format!("{}.{}", class.name, method.name),
                    });
                }
            }
        }

        let table = Self { classes };
        for class in decls {
            table.check_ancestry(class)?;
        }

        debug!("Class table built with {} classes", table.classes.len());
        Ok(table)
    }

    fn check_ancestry(&self, class: &ClassDecl) -> Result<(), CodegenError> {
        let mut seen = HashSet::new();
        let mut current = class;
        seen.insert(current.name.as_str());
        while let Some(parent) = current.extends.as_deref() {
            current = self.get(parent)?;
            if !seen.insert(current.name.as_str()) {
                return Err(CodegenError::InheritanceCycle(class.name.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&'a ClassDecl, CodegenError> {
        self.classes
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnresolvedClass(name.to_string()))
    }

    /// The class followed by its ancestors, nearest first
    fn ancestry(&self, name: &str) -> Result<Vec<&'a ClassDecl>, CodegenError> {
        let mut current = self.get(name)?;
        let mut chain = vec![current];
        while let Some(parent) = current.extends.as_deref() {
            current = self.get(parent)?;
            chain.push(current);
        }
        Ok(chain)
    }

    /// All fields of an object of `class`, inherited fields first
    pub fn fields(&self, class: &str) -> Result<Vec<&'a VarDecl>, CodegenError> {
        let chain = self.ancestry(class)?;
        Ok(chain.into_iter().rev().flat_map(|c| c.fields.iter()).collect())
    }

    /// Byte offset of a field within an object of `class`. A field declared in
    /// a subclass hides a parent field of the same name.
    pub fn field_offset(&self, class: &str, field: &str) -> Result<Option<i32>, CodegenError> {
        let fields = self.fields(class)?;
        Ok(fields
            .iter()
            .rposition(|f| f.name == field)
            .map(|index| index as i32 * CallingConvention::WORD_SIZE))
    }

    /// Allocation size of an object of `class`. Never zero, so every object
    /// has a distinct address.
    pub fn object_size(&self, class: &str) -> Result<i32, CodegenError> {
        let words = self.fields(class)?.len() as i32;
        Ok((words * CallingConvention::WORD_SIZE).max(CallingConvention::WORD_SIZE))
    }

    /// Find `method` starting at `class`. Returns the defining class name.
    pub fn resolve_method(
        &self,
        class: &str,
        method: &str,
    ) -> Result<(&'a str, &'a MethodDecl), CodegenError> {
        for candidate in self.ancestry(class)? {
            if let Some(decl) = candidate.methods.iter().find(|m| m.name == method) {
                return Ok((candidate.name.as_str(), decl));
            }
        }
        Err(CodegenError::UnresolvedMethod {
            class: class.to_string(),
            method: method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mjc_common::Expr;

    fn class(name: &str, extends: Option<&str>, fields: &[&str], methods: &[&str]) -> ClassDecl {
        ClassDecl {
            name: name.to_string(),
            extends: extends.map(str::to_string),
            fields: fields.iter().map(|f| VarDecl::int(f)).collect(),
            methods: methods
                .iter()
                .map(|m| MethodDecl {
                    name: m.to_string(),
                    is_static: false,
                    params: vec![],
                    locals: vec![],
                    body: vec![],
                    ret: Expr::int(0),
                })
                .collect(),
        }
    }

    #[test]
    fn test_inherited_field_layout() {
        let decls = vec![
            class("Base", None, &["a", "b"], &["get"]),
            class("Derived", Some("Base"), &["c", "a"], &[]),
        ];
        let table = ClassTable::build(&decls).unwrap();

        assert_eq!(table.field_offset("Base", "b").unwrap(), Some(4));
        assert_eq!(table.field_offset("Derived", "b").unwrap(), Some(4));
        assert_eq!(table.field_offset("Derived", "c").unwrap(), Some(8));
        // Derived.a hides Base.a
        assert_eq!(table.field_offset("Derived", "a").unwrap(), Some(12));
        assert_eq!(table.field_offset("Derived", "zz").unwrap(), None);
        assert_eq!(table.object_size("Derived").unwrap(), 16);
    }

    #[test]
    fn test_empty_object_has_size() {
        let decls = vec![class("Fac", None, &[], &["ComputeFac"])];
        let table = ClassTable::build(&decls).unwrap();
        assert_eq!(table.object_size("Fac").unwrap(), 4);
    }

    #[test]
    fn test_method_resolution_walks_parents() {
        let decls = vec![
            class("Base", None, &[], &["get", "put"]),
            class("Derived", Some("Base"), &[], &["put"]),
        ];
        let table = ClassTable::build(&decls).unwrap();

        assert_eq!(table.resolve_method("Derived", "get").unwrap().0, "Base");
        assert_eq!(table.resolve_method("Derived", "put").unwrap().0, "Derived");
        assert!(matches!(
            table.resolve_method("Base", "missing"),
            Err(CodegenError::UnresolvedMethod { .. })
        ));
    }

    #[test]
    fn test_bad_hierarchies() {
        let cyclic = vec![class("A", Some("B"), &[], &[]), class("B", Some("A"), &[], &[])];
        assert!(matches!(ClassTable::build(&cyclic), Err(CodegenError::InheritanceCycle(_))));

        let dangling = vec![class("A", Some("Missing"), &[], &[])];
        assert_eq!(
            ClassTable::build(&dangling).err(),
            Some(CodegenError::UnresolvedClass("Missing".to_string()))
        );

        let duplicate = vec![class("A", None, &[], &[]), class("A", None, &[], &[])];
        assert!(matches!(
            ClassTable::build(&duplicate),
            Err(CodegenError::DuplicateDeclaration { .. })
        ));

        let duplicate_method = vec![class("A", None, &[], &["f", "f"])];
        assert!(matches!(
            ClassTable::build(&duplicate_method),
            Err(CodegenError::DuplicateDeclaration { .. })
        ));
    }
}
