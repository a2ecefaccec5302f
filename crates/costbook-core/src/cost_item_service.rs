//! Lifecycle of cost-item ledgers.

use std::sync::Arc;

use costbook_domain::{CostItem, CostLedger};
use tracing::info;
use uuid::Uuid;

use crate::{storage::LedgerStore, CoreError};

/// Creates, reads and deletes cost-item ledgers.
pub struct CostItemService {
    store: Arc<dyn LedgerStore>,
}

impl CostItemService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Persists a new ledger with an empty payment sub-ledger.
    pub fn create(
        &self,
        project_id: Uuid,
        label: impl Into<String>,
        item: CostItem,
    ) -> Result<CostLedger, CoreError> {
        let label = label.into();
        let label = label.trim();
        if label.is_empty() {
            return Err(CoreError::Validation("cost item label must not be empty".into()));
        }
        item.validate()?;

        let stored = self.store.insert(&CostLedger::new(project_id, label, item))?;
        info!(
            ledger = %stored.id,
            project = %project_id,
            kind = %stored.kind(),
            "cost item created"
        );
        Ok(stored)
    }

    pub fn get(&self, ledger_id: Uuid) -> Result<CostLedger, CoreError> {
        self.store
            .find_by_id(ledger_id)?
            .ok_or(CoreError::LedgerNotFound(ledger_id))
    }

    /// Ledgers for one project, or every ledger when `project_id` is `None`.
    pub fn list(&self, project_id: Option<Uuid>) -> Result<Vec<CostLedger>, CoreError> {
        let mut ledgers = Vec::new();
        for id in self.store.select_ids(project_id)? {
            if let Some(ledger) = self.store.find_by_id(id)? {
                ledgers.push(ledger);
            }
        }
        ledgers.sort_by_key(|ledger| (ledger.created_at, ledger.id));
        Ok(ledgers)
    }

    /// Deletes the ledger together with its payments.
    pub fn delete(&self, ledger_id: Uuid) -> Result<(), CoreError> {
        if !self.store.delete(ledger_id)? {
            return Err(CoreError::LedgerNotFound(ledger_id));
        }
        info!(ledger = %ledger_id, "cost item deleted");
        Ok(())
    }
}
