//! Validation rules applied to payment records and cost items.

use std::fmt;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{ledger::CostItemKind, payment::PaymentStatus};

/// Per cost-item-type constraints on the payment sub-ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentRules {
    pub kind: CostItemKind,
    pub allowed_statuses: &'static [PaymentStatus],
}

impl PaymentRules {
    pub fn allows(&self, status: PaymentStatus) -> bool {
        self.allowed_statuses.contains(&status)
    }

    pub fn check_status(&self, status: PaymentStatus) -> Result<(), PaymentRuleViolation> {
        if self.allows(status) {
            Ok(())
        } else {
            Err(PaymentRuleViolation::StatusNotAllowed {
                status,
                kind: self.kind,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Reasons a payment or cost item fails validation.
pub enum PaymentRuleViolation {
    NegativeAmount(Decimal),
    EmptyKind,
    UnknownStatus(String),
    StatusNotAllowed {
        status: PaymentStatus,
        kind: CostItemKind,
    },
    AmountOverflow,
    UndatedSettlement(Uuid),
    DuplicatePaymentId(Uuid),
    UnknownPayment(Uuid),
    InvalidCostItem(String),
}

impl fmt::Display for PaymentRuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRuleViolation::NegativeAmount(amount) => {
                write!(f, "payment amount must not be negative (got {amount})")
            }
            PaymentRuleViolation::EmptyKind => f.write_str("payment kind must not be empty"),
            PaymentRuleViolation::UnknownStatus(raw) => {
                write!(f, "unknown payment status `{raw}`")
            }
            PaymentRuleViolation::StatusNotAllowed { status, kind } => {
                write!(f, "status `{status}` is not allowed for {kind} payments")
            }
            PaymentRuleViolation::AmountOverflow => {
                f.write_str("amount total exceeds the representable range")
            }
            PaymentRuleViolation::UndatedSettlement(id) => {
                write!(f, "payment {id} is paid and its date cannot be cleared")
            }
            PaymentRuleViolation::DuplicatePaymentId(id) => {
                write!(f, "payment id {id} already exists in this ledger")
            }
            PaymentRuleViolation::UnknownPayment(id) => write!(f, "payment {id} not found"),
            PaymentRuleViolation::InvalidCostItem(reason) => {
                write!(f, "invalid cost item: {reason}")
            }
        }
    }
}

impl std::error::Error for PaymentRuleViolation {}

/// Rejects negative amounts.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, PaymentRuleViolation> {
    if amount < Decimal::ZERO {
        return Err(PaymentRuleViolation::NegativeAmount(amount));
    }
    Ok(amount)
}

/// Adds two amounts, failing instead of overflowing.
pub fn checked_total(total: Decimal, amount: Decimal) -> Result<Decimal, PaymentRuleViolation> {
    total
        .checked_add(amount)
        .ok_or(PaymentRuleViolation::AmountOverflow)
}

/// Trims the payment kind and rejects blank values.
pub fn normalize_kind(kind: &str) -> Result<String, PaymentRuleViolation> {
    let trimmed = kind.trim();
    if trimmed.is_empty() {
        return Err(PaymentRuleViolation::EmptyKind);
    }
    Ok(trimmed.to_string())
}

/// Blank notes are stored as `None`.
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_accepted() {
        assert!(validate_amount(Decimal::ZERO).is_ok());
        assert!(validate_amount(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn kind_is_trimmed() {
        assert_eq!(normalize_kind("  wire ").unwrap(), "wire");
        assert_eq!(normalize_kind("   "), Err(PaymentRuleViolation::EmptyKind));
    }

    #[test]
    fn checked_total_reports_overflow() {
        assert_eq!(
            checked_total(Decimal::new(15, 1), Decimal::ONE),
            Ok(Decimal::new(25, 1))
        );
        assert_eq!(
            checked_total(Decimal::MAX, Decimal::ONE),
            Err(PaymentRuleViolation::AmountOverflow)
        );
    }
}
