use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use costbook_config::Config;
use costbook_core::{CostItemService, LedgerManager, LedgerStore, ReportAggregator};
use costbook_domain::{
    CostItem, CostLedger, PaymentInput, PaymentPatch, PaymentRecord, PaymentReport,
    PaymentSnapshot, ReportFilter,
};
use costbook_storage_json::JsonLedgerStore;
use tracing::debug;
use uuid::Uuid;

use crate::{config, errors::Result};

/// Entry point for callers: wires a ledger store to the payment, report and
/// cost-item services using one [`Config`].
pub struct PaymentDesk {
    config: Config,
    data_root: Option<PathBuf>,
    items: CostItemService,
    ledgers: LedgerManager,
    reports: ReportAggregator,
}

impl PaymentDesk {
    /// Opens the JSON-backed desk rooted at `COSTBOOK_HOME` or `~/.costbook`.
    pub fn from_env() -> Result<Self> {
        Self::open(config::app_data_dir())
    }

    /// Opens the JSON-backed desk whose config lives under `base`.
    pub fn open(base: impl Into<PathBuf>) -> Result<Self> {
        let base = base.into();
        let (_, config) = config::load_config(base.clone())?;
        let data_root = config.resolve_data_root(&base);
        let store = JsonLedgerStore::new(&data_root)?;
        debug!(base = %base.display(), data_root = %data_root.display(), "payment desk opened");

        let mut desk = Self::with_store(Arc::new(store), config);
        desk.data_root = Some(data_root);
        Ok(desk)
    }

    /// Builds a desk over any store, e.g. an in-memory one.
    pub fn with_store(store: Arc<dyn LedgerStore>, config: Config) -> Self {
        Self {
            items: CostItemService::new(store.clone()),
            ledgers: LedgerManager::new(store.clone())
                .with_max_attempts(config.max_write_attempts),
            reports: ReportAggregator::new(store).with_timeout(config.report_timeout()),
            data_root: None,
            config,
        }
    }

    /// Replaces the payment service, keeping the configured retry bound.
    pub fn with_ledger_manager(mut self, ledgers: LedgerManager) -> Self {
        self.ledgers = ledgers.with_max_attempts(self.config.max_write_attempts);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_root(&self) -> Option<&Path> {
        self.data_root.as_deref()
    }

    pub fn create_cost_item(
        &self,
        project_id: Uuid,
        label: &str,
        item: CostItem,
    ) -> Result<CostLedger> {
        Ok(self.items.create(project_id, label, item)?)
    }

    pub fn delete_cost_item(&self, ledger_id: Uuid) -> Result<()> {
        Ok(self.items.delete(ledger_id)?)
    }

    pub fn cost_item(&self, ledger_id: Uuid) -> Result<CostLedger> {
        Ok(self.items.get(ledger_id)?)
    }

    pub fn cost_items(&self, project_id: Option<Uuid>) -> Result<Vec<CostLedger>> {
        Ok(self.items.list(project_id)?)
    }

    pub fn add_payment(&self, ledger_id: Uuid, input: PaymentInput) -> Result<CostLedger> {
        Ok(self.ledgers.add_payment(ledger_id, input)?)
    }

    pub fn get_payment(&self, ledger_id: Uuid, payment_id: Uuid) -> Result<PaymentRecord> {
        Ok(self.ledgers.find_payment(ledger_id, payment_id)?)
    }

    pub fn update_payment(
        &self,
        ledger_id: Uuid,
        payment_id: Uuid,
        patch: PaymentPatch,
    ) -> Result<CostLedger> {
        Ok(self.ledgers.update_payment(ledger_id, payment_id, patch)?)
    }

    pub fn remove_payment(&self, ledger_id: Uuid, payment_id: Uuid) -> Result<CostLedger> {
        Ok(self.ledgers.remove_payment(ledger_id, payment_id)?)
    }

    pub fn list_payments(&self, ledger_id: Uuid) -> Result<PaymentSnapshot> {
        Ok(self.ledgers.list_payments(ledger_id)?)
    }

    /// Report bounded by the configured timeout.
    pub fn generate_report(&self, filter: &ReportFilter) -> Result<PaymentReport> {
        Ok(self.reports.generate_report(filter)?)
    }
}
