//! Typed AST consumed by the backend
//!
//! The front end (parser plus type checker) is an external collaborator. It
//! hands over a fully resolved [`Program`]: every call names the static class
//! of its receiver, and every declaration carries its type. The backend only
//! reads this tree.

use serde::{Deserialize, Serialize};

/// Source-level types. Every type occupies one 32-bit word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Int,
    Boolean,
    Class(String),
}

/// A parameter, local variable or field declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
}

impl VarDecl {
    pub fn int(name: &str) -> Self {
        Self { name: name.to_string(), ty: Type::Int }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Signed less-than, yields 0 or 1
    Lt,
    /// Logical and over 0/1 values
    And,
}

/// A method invocation. `receiver` is `None` for static calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallExpr {
    #[serde(default)]
    pub receiver: Option<Box<Expr>>,
    /// Static class of the receiver (or the declaring class of a static call)
    pub class: String,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Int(i32),
    Bool(bool),
    Var(String),
    This,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Call(CallExpr),
    New(String),
}

impl Expr {
    pub fn int(value: i32) -> Self {
        Expr::Int(value)
    }

    pub fn var(name: &str) -> Self {
        Expr::Var(name.to_string())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn conditional(cond: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Conditional {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Method call on an object
    pub fn call(receiver: Expr, class: &str, method: &str, args: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            receiver: Some(Box::new(receiver)),
            class: class.to_string(),
            method: method.to_string(),
            args,
        })
    }

    /// Call without a receiver
    pub fn static_call(class: &str, method: &str, args: Vec<Expr>) -> Self {
        Expr::Call(CallExpr {
            receiver: None,
            class: class.to_string(),
            method: method.to_string(),
            args,
        })
    }

    pub fn new_object(class: &str) -> Self {
        Expr::New(class.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    /// Assignment to a parameter, local or field
    Assign { target: String, value: Expr },
    Print(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        #[serde(default)]
        else_branch: Option<Box<Stmt>>,
    },
    While { cond: Expr, body: Box<Stmt> },
    Block(Vec<Stmt>),
    /// Expression evaluated for its effect (typically a call)
    Eval(Expr),
}

impl Stmt {
    pub fn assign(target: &str, value: Expr) -> Self {
        Stmt::Assign { target: target.to_string(), value }
    }

    pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Stmt) -> Self {
        Stmt::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub params: Vec<VarDecl>,
    #[serde(default)]
    pub locals: Vec<VarDecl>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    /// The single return expression ending the body
    pub ret: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<VarDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    /// Descriptors for every method declared directly in this class
    pub fn descriptors(&self) -> impl Iterator<Item = MethodDescriptor<'_>> {
        self.methods.iter().map(move |method| MethodDescriptor { class: &self.name, method })
    }
}

/// The designated start method and its integer arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub class: String,
    pub method: String,
    #[serde(default)]
    pub args: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub entry: EntryPoint,
}

/// Read-only view of one method together with its owning class
#[derive(Debug, Clone, Copy)]
pub struct MethodDescriptor<'a> {
    pub class: &'a str,
    pub method: &'a MethodDecl,
}

impl<'a> MethodDescriptor<'a> {
    pub fn name(&self) -> &'a str {
        &self.method.name
    }

    pub fn params(&self) -> &'a [VarDecl] {
        &self.method.params
    }

    pub fn locals(&self) -> &'a [VarDecl] {
        &self.method.locals
    }

    /// Object-scoped methods receive a `this` reference
    pub fn is_object_scoped(&self) -> bool {
        !self.method.is_static
    }

    /// `Class.method`, used in diagnostics
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.method.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_from_json() {
        let json = r#"{
            "classes": [{
                "name": "Fac",
                "methods": [{
                    "name": "ComputeFac",
                    "params": [{ "name": "num", "ty": "int" }],
                    "ret": { "binary": {
                        "op": "mul",
                        "left": { "var": "num" },
                        "right": { "int": 2 }
                    }}
                }]
            }],
            "entry": { "class": "Fac", "method": "ComputeFac", "args": [10] }
        }"#;

        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.classes.len(), 1);
        let method = &program.classes[0].methods[0];
        assert!(!method.is_static);
        assert!(method.locals.is_empty());
        assert_eq!(
            method.ret,
            Expr::binary(BinaryOp::Mul, Expr::var("num"), Expr::int(2))
        );
        assert_eq!(program.entry.args, vec![10]);
    }

    #[test]
    fn test_descriptors() {
        let class = ClassDecl {
            name: "Fac".to_string(),
            extends: None,
            fields: vec![],
            methods: vec![MethodDecl {
                name: "Id".to_string(),
                is_static: true,
                params: vec![VarDecl::int("x")],
                locals: vec![],
                body: vec![],
                ret: Expr::var("x"),
            }],
        };

        let descriptors: Vec<_> = class.descriptors().collect();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].qualified_name(), "Fac.Id");
        assert!(!descriptors[0].is_object_scoped());
    }
}
