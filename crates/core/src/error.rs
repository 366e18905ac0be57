//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// One offending line in a rejected multi-line action.
///
/// `line` is the human-facing line label (the SKU name for draft and order lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineViolation {
    pub line: String,
    pub reason: String,
}

impl LineViolation {
    pub fn new(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

impl core::fmt::Display for LineViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.line, self.reason)
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts, confirmations). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// One or more lines failed validation. Every offending line is listed.
    #[error("validation failed for {} line(s): {}", .0.len(), join_violations(.0))]
    InvalidLines(Vec<LineViolation>),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A SKU could not be resolved by the inventory store.
    #[error("unresolved sku: {0}")]
    Unresolved(String),

    /// The action is valid but must be explicitly confirmed first.
    #[error("confirmation required: {}", .0.join("; "))]
    ConfirmationRequired(Vec<String>),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. duplicate creation).
    #[error("conflict: {0}")]
    Conflict(String),
}

fn join_violations(violations: &[LineViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_lines(violations: Vec<LineViolation>) -> Self {
        Self::InvalidLines(violations)
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn unresolved(sku: impl Into<String>) -> Self {
        Self::Unresolved(sku.into())
    }

    pub fn confirmation_required(warnings: Vec<String>) -> Self {
        Self::ConfirmationRequired(warnings)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Soft gates are not data-validity failures; the caller may retry with confirmation.
    pub fn is_soft_gate(&self) -> bool {
        matches!(self, Self::ConfirmationRequired(_))
    }

    /// Lines named by an `InvalidLines` error (empty for other variants).
    pub fn offending_lines(&self) -> Vec<&str> {
        match self {
            Self::InvalidLines(v) => v.iter().map(|l| l.line.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_lines_message_names_every_line() {
        let err = DomainError::invalid_lines(vec![
            LineViolation::new("8oz-bottle", "quantity is zero"),
            LineViolation::new("16oz-bottle", "exceeds capacity (120%)"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 line(s)"));
        assert!(msg.contains("8oz-bottle: quantity is zero"));
        assert!(msg.contains("16oz-bottle: exceeds capacity (120%)"));
        assert_eq!(err.offending_lines(), vec!["8oz-bottle", "16oz-bottle"]);
    }

    #[test]
    fn confirmation_is_a_soft_gate() {
        let err = DomainError::confirmation_required(vec!["quantity changed".to_string()]);
        assert!(err.is_soft_gate());
        assert!(!DomainError::validation("x").is_soft_gate());
    }
}
