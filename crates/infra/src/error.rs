use thiserror::Error;

use packflow_core::DomainError;

use crate::store::StoreError;

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain rejection (validation, soft gate, invariant). Nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Collaborator failure before any write was issued.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A write failed after earlier writes of the same operation had landed.
    /// Landed writes are not rolled back.
    #[error("partial commit: {committed} of {attempted} writes applied before failure: {source}")]
    PartialCommit {
        committed: usize,
        attempted: usize,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Failure of a sequential write after `committed` of `attempted` planned writes landed.
    pub(crate) fn write_failed(committed: usize, attempted: usize, source: StoreError) -> Self {
        if committed == 0 {
            return ServiceError::Store(source);
        }
        tracing::warn!(committed, attempted, error = %source, "write failed after partial commit");
        ServiceError::PartialCommit {
            committed,
            attempted,
            source,
        }
    }

    /// Soft-gate rejection the caller can retry with confirmation.
    pub fn is_confirmation_required(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_soft_gate())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_commit_message_names_the_gap() {
        let err = ServiceError::PartialCommit {
            committed: 1,
            attempted: 3,
            source: StoreError::Unavailable("timeout".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "partial commit: 1 of 3 writes applied before failure: store unavailable: timeout"
        );
    }

    #[test]
    fn soft_gate_is_detected_through_domain_variant() {
        let err: ServiceError = DomainError::confirmation_required(vec!["x".to_string()]).into();
        assert!(err.is_confirmation_required());
        let err = ServiceError::from(StoreError::NotFound("a".to_string()));
        assert!(!err.is_confirmation_required());
    }
}
