//! In-process [`LedgerStore`] used by tests and embedded callers.

use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use costbook_domain::CostLedger;
use uuid::Uuid;

use crate::{storage::LedgerStore, CoreError};

#[derive(Default)]
struct Documents {
    by_id: HashMap<Uuid, CostLedger>,
    order: Vec<Uuid>,
}

/// Map-backed store; every write holds the lock for its whole check-and-set.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    documents: RwLock<Documents>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Documents>, CoreError> {
        self.documents
            .read()
            .map_err(|_| CoreError::Storage("ledger store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Documents>, CoreError> {
        self.documents
            .write()
            .map_err(|_| CoreError::Storage("ledger store lock poisoned".into()))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<CostLedger>, CoreError> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    fn insert(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError> {
        let mut docs = self.write()?;
        if docs.by_id.contains_key(&ledger.id) {
            return Err(CoreError::Storage(format!(
                "ledger {} already exists",
                ledger.id
            )));
        }
        let mut stored = ledger.clone();
        stored.revision = 1;
        docs.by_id.insert(stored.id, stored.clone());
        docs.order.push(stored.id);
        Ok(stored)
    }

    fn replace(&self, ledger: &CostLedger) -> Result<CostLedger, CoreError> {
        let mut docs = self.write()?;
        let current = docs
            .by_id
            .get_mut(&ledger.id)
            .ok_or(CoreError::LedgerNotFound(ledger.id))?;
        if current.revision != ledger.revision {
            return Err(CoreError::RevisionMismatch {
                ledger: ledger.id,
                expected: ledger.revision,
                found: current.revision,
            });
        }
        let mut stored = ledger.clone();
        stored.revision = ledger.revision + 1;
        *current = stored.clone();
        Ok(stored)
    }

    fn delete(&self, id: Uuid) -> Result<bool, CoreError> {
        let mut docs = self.write()?;
        if docs.by_id.remove(&id).is_none() {
            return Ok(false);
        }
        docs.order.retain(|existing| *existing != id);
        Ok(true)
    }

    fn select_ids(&self, project_id: Option<Uuid>) -> Result<Vec<Uuid>, CoreError> {
        let docs = self.read()?;
        Ok(docs
            .order
            .iter()
            .filter(|id| match (project_id, docs.by_id.get(id)) {
                (None, Some(_)) => true,
                (Some(project), Some(ledger)) => ledger.project_id == project,
                (_, None) => false,
            })
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbook_domain::CostItem;

    fn ledger(project: Uuid) -> CostLedger {
        CostLedger::new(project, "Scaffolding", CostItem::contract("Acme", None))
    }

    #[test]
    fn replace_requires_matching_revision() {
        let store = InMemoryLedgerStore::new();
        let stored = store.insert(&ledger(Uuid::new_v4())).unwrap();
        assert_eq!(stored.revision, 1);

        let next = store.replace(&stored).unwrap();
        assert_eq!(next.revision, 2);

        let err = store.replace(&stored).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RevisionMismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn select_filters_by_project_in_insertion_order() {
        let store = InMemoryLedgerStore::new();
        let project = Uuid::new_v4();
        let a = store.insert(&ledger(project)).unwrap();
        let _other = store.insert(&ledger(Uuid::new_v4())).unwrap();
        let b = store.insert(&ledger(project)).unwrap();

        assert_eq!(store.select_ids(Some(project)).unwrap(), vec![a.id, b.id]);
        assert_eq!(store.select_ids(None).unwrap().len(), 3);
    }

    #[test]
    fn delete_reports_absence() {
        let store = InMemoryLedgerStore::new();
        let stored = store.insert(&ledger(Uuid::new_v4())).unwrap();
        assert!(store.delete(stored.id).unwrap());
        assert!(!store.delete(stored.id).unwrap());
        assert!(store.find_by_id(stored.id).unwrap().is_none());
        assert!(store.is_empty());
    }
}
