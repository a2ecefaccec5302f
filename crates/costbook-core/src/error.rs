use std::time::Duration;

use costbook_domain::PaymentRuleViolation;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Ledger not found: {0}")]
    LedgerNotFound(Uuid),
    #[error("Payment {payment} not found in ledger {ledger}")]
    PaymentNotFound { ledger: Uuid, payment: Uuid },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Concurrent modification of ledger {ledger} persisted after {attempts} attempts")]
    Conflict { ledger: Uuid, attempts: u32 },
    #[error("Report generation exceeded {0:?}")]
    Timeout(Duration),
    #[error("Ledger {ledger} changed (expected revision {expected}, found {found})")]
    RevisionMismatch {
        ledger: Uuid,
        expected: u64,
        found: u64,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps a domain rule violation raised while mutating `ledger`.
    pub fn from_violation(ledger: Uuid, violation: PaymentRuleViolation) -> Self {
        match violation {
            PaymentRuleViolation::UnknownPayment(payment) => {
                CoreError::PaymentNotFound { ledger, payment }
            }
            other => CoreError::Validation(other.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::LedgerNotFound(_) | CoreError::PaymentNotFound { .. }
        )
    }
}

impl From<PaymentRuleViolation> for CoreError {
    fn from(violation: PaymentRuleViolation) -> Self {
        CoreError::Validation(violation.to_string())
    }
}
