use std::collections::HashSet;

use costbook_domain::{CostLedger, PaymentStatus};
use uuid::Uuid;

use crate::CoreError;

/// Document store holding whole ledgers. A ledger is the unit of persistence;
/// payments are never stored on their own.
///
/// Writes are revision-checked: `replace` succeeds only when the stored
/// revision equals `ledger.revision`, and the returned copy carries the next
/// revision.
pub trait LedgerStore: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Result<Option<CostLedger>, CoreError>;

    /// Stores a new ledger at revision 1. Fails if the id is taken.
    fn insert(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError>;

    /// Writes `ledger` if nobody else has written since it was read.
    /// Returns [`CoreError::RevisionMismatch`] otherwise.
    fn replace(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError>;

    /// Deletes the ledger and every payment it owns. Returns `false` if absent.
    fn delete(&self, id: Uuid) -> Result<bool, CoreError>;

    /// Ids of ledgers belonging to `project_id`, or all ledgers when `None`.
    ///
    /// Listing every id (`None`) must not require loading the documents.
    fn select_ids(&self, project_id: Option<Uuid>) -> Result<Vec<Uuid>, CoreError>;
}

/// Detects anomalies in a loaded ledger that validation would have rejected.
pub fn ledger_warnings(ledger: &CostLedger) -> Vec<String> {
    let rules = ledger.item().payment_rules();
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for payment in ledger.payments() {
        if !seen.insert(payment.id) {
            warnings.push(format!(
                "ledger {} repeats payment id {}",
                ledger.id, payment.id
            ));
        }
        if !rules.allows(payment.status) {
            warnings.push(format!(
                "payment {} has status `{}` not allowed for {} ledgers",
                payment.id,
                payment.status,
                ledger.kind()
            ));
        }
        if payment.status == PaymentStatus::Paid && payment.payment_date.is_none() {
            warnings.push(format!("payment {} is paid but undated", payment.id));
        }
    }
    warnings
}
