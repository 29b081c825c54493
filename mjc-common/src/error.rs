//! Error handling for the MiniJava compiler backend
//! 
//! Every failure is detected synchronously while lowering and is fatal to the
//! whole compilation unit, so there is one flat error type and no recovery.

use thiserror::Error;

/// Coarse classification of a [`CodegenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A name with no matching declaration
    Unresolved,
    /// A frame or operand that does not fit the target's instruction fields
    Layout,
    /// A broken internal invariant (label bookkeeping)
    Internal,
}

/// Code generation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Unresolved variable '{name}' in method {method}")]
    UnresolvedVariable { method: String, name: String },

    #[error("Unresolved class '{0}'")]
    UnresolvedClass(String),

    #[error("Unresolved method '{method}' on class {class}")]
    UnresolvedMethod { class: String, method: String },

    #[error("'this' used in static method {method}")]
    ReceiverOutsideInstance { method: String },

    #[error("Call to {class}.{method}: {message}")]
    ReceiverMismatch {
        class: String,
        method: String,
        message: String,
    },

    #[error("Call to {class}.{method} passes {found} arguments (expected {expected})")]
    ArityMismatch {
        class: String,
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("Variable '{name}' declared more than once in method {method}")]
    DuplicateVariable { method: String, name: String },

    #[error("Duplicate {what} '{name}'")]
    DuplicateDeclaration { what: String, name: String },

    #[error("Class '{0}' inherits from itself")]
    InheritanceCycle(String),

    #[error("Stack frame of {method} too large: {size} bytes (displacement limit {limit})")]
    LayoutOverflow {
        method: String,
        size: i64,
        limit: i64,
    },

    #[error("Value {value} does not fit the {bits}-bit field of '{inst}'")]
    ImmediateOutOfRange { inst: String, value: i64, bits: u32 },

    #[error("Label '{0}' defined more than once")]
    LabelCollision(String),

    #[error("Label '{0}' referenced but never defined")]
    UndefinedLabel(String),

    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl CodegenError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodegenError::UnresolvedVariable { .. }
            | CodegenError::UnresolvedClass(_)
            | CodegenError::UnresolvedMethod { .. }
            | CodegenError::ReceiverOutsideInstance { .. }
            | CodegenError::ReceiverMismatch { .. }
            | CodegenError::ArityMismatch { .. }
            | CodegenError::DuplicateVariable { .. }
            | CodegenError::DuplicateDeclaration { .. }
            | CodegenError::InheritanceCycle(_) => ErrorKind::Unresolved,
            CodegenError::LayoutOverflow { .. } | CodegenError::ImmediateOutOfRange { .. } => {
                ErrorKind::Layout
            }
            CodegenError::LabelCollision(_)
            | CodegenError::UndefinedLabel(_)
            | CodegenError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = CodegenError::UnresolvedVariable {
            method: "Fac_ComputeFac".to_string(),
            name: "x".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Unresolved);
        assert_eq!(
            CodegenError::LabelCollision("else_0".to_string()).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            CodegenError::LayoutOverflow { method: "A_f".to_string(), size: 40000, limit: 32767 }.kind(),
            ErrorKind::Layout
        );
        assert_eq!(
            CodegenError::ImmediateOutOfRange { inst: "addi $sp, $sp, 40000".to_string(), value: 40000, bits: 16 }
                .kind(),
            ErrorKind::Layout
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CodegenError::ArityMismatch {
            class: "Fac".to_string(),
            method: "ComputeFac".to_string(),
            expected: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Call to Fac.ComputeFac passes 2 arguments (expected 1)"
        );
    }
}
