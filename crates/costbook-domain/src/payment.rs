//! Payment records held in a cost item's sub-ledger.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, rules::*};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
/// Lifecycle state of a single payment.
///
/// Declaration order is the order status groups appear in reports.
pub enum PaymentStatus {
    Overdue,
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Overdue,
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentRuleViolation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overdue" => Ok(PaymentStatus::Overdue),
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "cancelled" | "canceled" => Ok(PaymentStatus::Cancelled),
            _ => Err(PaymentRuleViolation::UnknownStatus(value.to_string())),
        }
    }
}

/// One payment event. Owned by exactly one [`crate::CostLedger`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PaymentRecord {
    pub fn is_cancelled(&self) -> bool {
        self.status == PaymentStatus::Cancelled
    }

    /// A paid record always carries a date; stamp `today` when none was given.
    pub fn ensure_settlement_date(&mut self, today: NaiveDate) {
        if self.status == PaymentStatus::Paid && self.payment_date.is_none() {
            self.payment_date = Some(today);
        }
    }
}

impl Identifiable for PaymentRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for PaymentRecord {
    fn amount(&self) -> Decimal {
        self.amount
    }
}

impl Displayable for PaymentRecord {
    fn display_label(&self) -> String {
        format!("{} {} [{}]", self.kind, self.amount, self.status)
    }
}

/// Caller-supplied values for a new payment. The id is assigned on insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub kind: String,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub note: Option<String>,
}

impl PaymentInput {
    pub fn new(amount: Decimal, kind: impl Into<String>, status: PaymentStatus) -> Self {
        Self {
            amount,
            kind: kind.into(),
            payment_date: None,
            status,
            note: None,
        }
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.payment_date = Some(date);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Validates the field values and builds a record with the given id.
    pub fn into_record(self, id: Uuid) -> Result<PaymentRecord, PaymentRuleViolation> {
        Ok(PaymentRecord {
            id,
            amount: validate_amount(self.amount)?,
            kind: normalize_kind(&self.kind)?,
            payment_date: self.payment_date,
            status: self.status,
            note: normalize_note(self.note),
        })
    }
}

/// Partial update for a payment's mutable fields.
///
/// `payment_date` and `note` use a nested option: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaymentPatch {
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub payment_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub note: Option<Option<String>>,
}

impl PaymentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn payment_date(mut self, date: Option<NaiveDate>) -> Self {
        self.payment_date = Some(date);
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = Some(note);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.kind.is_none()
            && self.payment_date.is_none()
            && self.status.is_none()
            && self.note.is_none()
    }

    /// Applies the patch to `record`. Either every field is applied or none is.
    pub fn apply_to(&self, record: &mut PaymentRecord) -> Result<(), PaymentRuleViolation> {
        let amount = self.amount.map(validate_amount).transpose()?;
        let kind = self.kind.as_deref().map(normalize_kind).transpose()?;

        if let Some(amount) = amount {
            record.amount = amount;
        }
        if let Some(kind) = kind {
            record.kind = kind;
        }
        if let Some(date) = self.payment_date {
            record.payment_date = date;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(note) = self.note.clone() {
            record.note = normalize_note(note);
        }
        Ok(())
    }
}
