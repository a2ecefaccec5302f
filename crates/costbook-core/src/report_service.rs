//! Cross-ledger payment report grouped by status.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use costbook_domain::{
    checked_total, sum_amounts, Amounted, CostLedger, LedgerRef, PaymentReport, PaymentRow,
    PaymentRuleViolation, PaymentStatus, ReportFilter, StatusGroup,
};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::{storage::LedgerStore, CoreError};

/// Flattens payments from many ledgers and groups them by status.
///
/// Each ledger is read as one snapshot, so a row is either complete or
/// missing. Reads are not coordinated with concurrent writers.
pub struct ReportAggregator {
    store: Arc<dyn LedgerStore>,
    timeout: Option<Duration>,
}

impl ReportAggregator {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            timeout: None,
        }
    }

    /// Default budget for [`Self::generate_report`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generate_report(&self, filter: &ReportFilter) -> Result<PaymentReport, CoreError> {
        self.generate_report_within(filter, self.timeout)
    }

    /// Builds the report, failing with [`CoreError::Timeout`] instead of
    /// returning partial results once `timeout` has elapsed.
    pub fn generate_report_within(
        &self,
        filter: &ReportFilter,
        timeout: Option<Duration>,
    ) -> Result<PaymentReport, CoreError> {
        let deadline = Deadline::start(timeout);
        // Listing all ids is cheap for every store; the project filter is
        // applied to each snapshot so every load happens under the deadline.
        let candidates = self.store.select_ids(None)?;
        let mut snapshots = Vec::new();

        for ledger_id in &candidates {
            deadline.check()?;
            match self.store.find_by_id(*ledger_id)? {
                Some(ledger) => snapshots.push(ledger),
                None => debug!(ledger = %ledger_id, "ledger vanished before report read"),
            }
        }
        deadline.check()?;

        snapshots.sort_by_key(|ledger| (ledger.created_at, ledger.id));
        let mut rows = Vec::new();
        for ledger in &snapshots {
            flatten_into(ledger, filter, &mut rows);
        }
        let report = group_rows(rows)?;
        debug!(
            ledgers = candidates.len(),
            rows = report.total_count,
            total = %report.total_amount,
            groups = report.by_status.len(),
            "payment report generated"
        );
        Ok(report)
    }
}

struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn check(&self) -> Result<(), CoreError> {
        match self.limit {
            Some(limit) if self.started.elapsed() > limit => Err(CoreError::Timeout(limit)),
            _ => Ok(()),
        }
    }
}

fn flatten_into(ledger: &CostLedger, filter: &ReportFilter, rows: &mut Vec<PaymentRow>) {
    if filter
        .project_id
        .is_some_and(|project| project != ledger.project_id)
    {
        return;
    }
    let owner = LedgerRef::from(ledger);
    rows.extend(
        ledger
            .payments()
            .iter()
            .filter(|payment| filter.matches(payment))
            .map(|payment| PaymentRow {
                ledger: owner.clone(),
                payment: payment.clone(),
            }),
    );
}

#[derive(Default)]
struct Accumulator {
    total: Decimal,
    owners: Vec<LedgerRef>,
    seen_owners: HashSet<Uuid>,
    rows: Vec<PaymentRow>,
}

impl Accumulator {
    fn push(&mut self, row: PaymentRow) -> Result<(), PaymentRuleViolation> {
        self.total = checked_total(self.total, row.amount())?;
        if self.seen_owners.insert(row.ledger.ledger_id) {
            self.owners.push(row.ledger.clone());
        }
        self.rows.push(row);
        Ok(())
    }

    fn finish(self, status: PaymentStatus) -> StatusGroup {
        StatusGroup {
            status,
            count: self.rows.len(),
            total_amount: self.total,
            owners: self.owners,
            rows: self.rows,
        }
    }
}

/// Groups rows by status in [`PaymentStatus`] order and adds grand totals.
pub fn group_rows(rows: Vec<PaymentRow>) -> Result<PaymentReport, CoreError> {
    let mut groups: BTreeMap<PaymentStatus, Accumulator> = BTreeMap::new();
    for row in rows {
        groups.entry(row.payment.status).or_default().push(row)?;
    }

    let by_status: Vec<StatusGroup> = groups
        .into_iter()
        .map(|(status, acc)| acc.finish(status))
        .collect();
    let total_count = by_status.iter().map(|group| group.count).sum();
    let total_amount = sum_amounts(&by_status).ok_or(PaymentRuleViolation::AmountOverflow)?;

    Ok(PaymentReport {
        by_status,
        total_count,
        total_amount,
    })
}
