//! Payment sub-ledger operations with optimistic concurrency.

use std::sync::Arc;

use costbook_domain::{
    CostLedger, Displayable, PaymentInput, PaymentPatch, PaymentRecord, PaymentRuleViolation,
    PaymentSnapshot,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    ids::{IdGenerator, RandomIds},
    storage::LedgerStore,
    time::{Clock, SystemClock},
    CoreError,
};

/// Default number of read-modify-write cycles before a write gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const ID_ATTEMPTS: usize = 3;

/// The only path through which a ledger's payments change.
///
/// Every mutation reads the whole ledger, applies the change in memory
/// (which recomputes the derived totals), and writes the ledger back
/// conditioned on the revision it read. When another writer got there
/// first the whole cycle is repeated, up to `max_attempts` times.
pub struct LedgerManager {
    store: Arc<dyn LedgerStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl LedgerManager {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            ids: Arc::new(RandomIds),
            clock: Arc::new(SystemClock),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Validates `input`, appends it under a fresh id and persists the ledger.
    pub fn add_payment(
        &self,
        ledger_id: Uuid,
        input: PaymentInput,
    ) -> Result<CostLedger, CoreError> {
        let today = self.clock.today();
        self.transact(ledger_id, "add_payment", |ledger| {
            let id = self.fresh_id(ledger)?;
            let record = input.clone().into_record(id)?;
            let appended = ledger
                .append_payment(record, today)
                .map_err(|violation| CoreError::from_violation(ledger_id, violation))?;
            debug!(ledger = %ledger_id, payment = %appended.display_label(), "payment staged");
            Ok(())
        })
    }

    pub fn find_payment(
        &self,
        ledger_id: Uuid,
        payment_id: Uuid,
    ) -> Result<PaymentRecord, CoreError> {
        let ledger = self.load(ledger_id)?;
        ledger
            .payment(payment_id)
            .cloned()
            .ok_or(CoreError::PaymentNotFound {
                ledger: ledger_id,
                payment: payment_id,
            })
    }

    /// Applies a partial update to one payment. An empty patch writes nothing.
    pub fn update_payment(
        &self,
        ledger_id: Uuid,
        payment_id: Uuid,
        patch: PaymentPatch,
    ) -> Result<CostLedger, CoreError> {
        if patch.is_empty() {
            let ledger = self.load(ledger_id)?;
            if ledger.payment(payment_id).is_none() {
                return Err(CoreError::PaymentNotFound {
                    ledger: ledger_id,
                    payment: payment_id,
                });
            }
            return Ok(ledger);
        }

        let today = self.clock.today();
        self.transact(ledger_id, "update_payment", |ledger| {
            ledger
                .update_payment(payment_id, &patch, today)
                .map_err(|violation| CoreError::from_violation(ledger_id, violation))?;
            Ok(())
        })
    }

    pub fn remove_payment(
        &self,
        ledger_id: Uuid,
        payment_id: Uuid,
    ) -> Result<CostLedger, CoreError> {
        self.transact(ledger_id, "remove_payment", |ledger| {
            ledger
                .remove_payment(payment_id)
                .map(|_| ())
                .map_err(|violation| CoreError::from_violation(ledger_id, violation))
        })
    }

    pub fn list_payments(&self, ledger_id: Uuid) -> Result<PaymentSnapshot, CoreError> {
        let ledger = self.load(ledger_id)?;
        Ok(PaymentSnapshot::from(&ledger))
    }

    fn load(&self, ledger_id: Uuid) -> Result<CostLedger, CoreError> {
        self.store
            .find_by_id(ledger_id)?
            .ok_or(CoreError::LedgerNotFound(ledger_id))
    }

    fn fresh_id(&self, ledger: &CostLedger) -> Result<Uuid, CoreError> {
        let mut last = Uuid::nil();
        for _ in 0..ID_ATTEMPTS {
            last = self.ids.next_id();
            if ledger.payment(last).is_none() {
                return Ok(last);
            }
        }
        Err(PaymentRuleViolation::DuplicatePaymentId(last).into())
    }

    fn transact<F>(
        &self,
        ledger_id: Uuid,
        operation: &'static str,
        mut mutate: F,
    ) -> Result<CostLedger, CoreError>
    where
        F: FnMut(&mut CostLedger) -> Result<(), CoreError>,
    {
        for attempt in 1..=self.max_attempts {
            let mut ledger = self.load(ledger_id)?;
            mutate(&mut ledger)?;
            match self.store.replace(&ledger) {
                Ok(stored) => {
                    debug!(
                        ledger = %ledger_id,
                        operation,
                        revision = stored.revision,
                        payments = stored.payments().len(),
                        total_paid = %stored.total_paid(),
                        "ledger written"
                    );
                    return Ok(stored);
                }
                Err(CoreError::RevisionMismatch {
                    expected, found, ..
                }) => {
                    warn!(
                        ledger = %ledger_id,
                        operation,
                        attempt,
                        expected,
                        found,
                        "ledger changed during write, retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        warn!(
            ledger = %ledger_id,
            operation,
            attempts = self.max_attempts,
            "giving up on contended ledger"
        );
        Err(CoreError::Conflict {
            ledger: ledger_id,
            attempts: self.max_attempts,
        })
    }
}
