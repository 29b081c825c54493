//! MiniJava Compiler - Common Types and Utilities
//! 
//! This crate contains the typed AST handed over by the front end and the
//! error type shared by every code generation component.

pub mod ast;
pub mod error;

pub use ast::{
    BinaryOp, CallExpr, ClassDecl, EntryPoint, Expr, MethodDecl, MethodDescriptor, Program, Stmt,
    Type, VarDecl,
};
pub use error::{CodegenError, ErrorKind};
