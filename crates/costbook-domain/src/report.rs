//! Read-only projections of payment records across many ledgers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::Amounted, ledger::*, payment::*};

/// Optional constraints for a payment report. Absent fields do not filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportFilter {
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn has_date_bounds(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    /// Status and date checks for one record. Bounds are inclusive; a record
    /// without a payment date never matches a bounded filter.
    pub fn matches(&self, record: &PaymentRecord) -> bool {
        if self.status.is_some_and(|status| status != record.status) {
            return false;
        }
        if !self.has_date_bounds() {
            return true;
        }
        let Some(date) = record.payment_date else {
            return false;
        };
        let after_start = self.date_from.map_or(true, |from| date >= from);
        let before_end = self.date_to.map_or(true, |to| date <= to);
        after_start && before_end
    }
}

/// Identifying fields of the ledger a report row came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerRef {
    pub ledger_id: Uuid,
    pub project_id: Uuid,
    pub label: String,
    pub kind: CostItemKind,
    pub counterparty: String,
}

impl From<&CostLedger> for LedgerRef {
    fn from(ledger: &CostLedger) -> Self {
        Self {
            ledger_id: ledger.id,
            project_id: ledger.project_id,
            label: ledger.label.clone(),
            kind: ledger.kind(),
            counterparty: ledger.item().counterparty().to_string(),
        }
    }
}

/// One payment annotated with its owning ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRow {
    pub ledger: LedgerRef,
    pub payment: PaymentRecord,
}

impl Amounted for PaymentRow {
    fn amount(&self) -> Decimal {
        self.payment.amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusGroup {
    pub status: PaymentStatus,
    pub count: usize,
    pub total_amount: Decimal,
    /// Distinct owning ledgers in first-seen order.
    pub owners: Vec<LedgerRef>,
    pub rows: Vec<PaymentRow>,
}

impl Amounted for StatusGroup {
    fn amount(&self) -> Decimal {
        self.total_amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReport {
    pub by_status: Vec<StatusGroup>,
    pub total_count: usize,
    pub total_amount: Decimal,
}

impl PaymentReport {
    pub fn empty() -> Self {
        Self {
            by_status: Vec::new(),
            total_count: 0,
            total_amount: Decimal::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn group(&self, status: PaymentStatus) -> Option<&StatusGroup> {
        self.by_status.iter().find(|group| group.status == status)
    }
}

/// Snapshot of a ledger's payment sub-ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSnapshot {
    pub payments: Vec<PaymentRecord>,
    pub total_paid: Decimal,
    pub overall_status: Option<PaymentStatus>,
}

impl From<&CostLedger> for PaymentSnapshot {
    fn from(ledger: &CostLedger) -> Self {
        Self {
            payments: ledger.payments().to_vec(),
            total_paid: ledger.total_paid(),
            overall_status: ledger.overall_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(status: PaymentStatus, date: Option<NaiveDate>) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            amount: Decimal::TEN,
            kind: "cash".into(),
            payment_date: date,
            status,
            note: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn unbounded_filter_matches_undated_records() {
        let filter = ReportFilter::new();
        assert!(filter.matches(&dated(PaymentStatus::Pending, None)));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = ReportFilter::new().date_from(day(10)).date_to(day(20));
        assert!(filter.matches(&dated(PaymentStatus::Paid, Some(day(10)))));
        assert!(filter.matches(&dated(PaymentStatus::Paid, Some(day(20)))));
        assert!(!filter.matches(&dated(PaymentStatus::Paid, Some(day(9)))));
        assert!(!filter.matches(&dated(PaymentStatus::Paid, Some(day(21)))));
        assert!(!filter.matches(&dated(PaymentStatus::Paid, None)));
    }

    #[test]
    fn single_bound_leaves_other_side_open() {
        let filter = ReportFilter::new().date_to(day(5));
        assert!(filter.matches(&dated(PaymentStatus::Paid, Some(day(1)))));
        assert!(!filter.matches(&dated(PaymentStatus::Paid, Some(day(6)))));
    }

    #[test]
    fn status_filter_is_exact() {
        let filter = ReportFilter::new().status(PaymentStatus::Overdue);
        assert!(filter.matches(&dated(PaymentStatus::Overdue, None)));
        assert!(!filter.matches(&dated(PaymentStatus::Pending, None)));
    }
}
