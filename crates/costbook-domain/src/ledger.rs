//! Cost-item ledgers and their derived payment totals.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, payment::*, rules::*};

const MATERIAL_STATUSES: [PaymentStatus; 3] = [
    PaymentStatus::Pending,
    PaymentStatus::Paid,
    PaymentStatus::Cancelled,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Type tag for the cost items that carry a payment sub-ledger.
pub enum CostItemKind {
    Contract,
    Material,
}

impl fmt::Display for CostItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CostItemKind::Contract => "contract",
            CostItemKind::Material => "material",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractTerms {
    pub contractor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialPurchase {
    pub supplier: String,
    #[serde(default)]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl MaterialPurchase {
    /// `quantity × unit_price`, or `None` when the product is out of range.
    pub fn total_cost(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Business payload of a cost item, tagged by its kind.
pub enum CostItem {
    Contract(ContractTerms),
    Material(MaterialPurchase),
}

impl CostItem {
    pub fn contract(contractor: impl Into<String>, contract_value: Option<Decimal>) -> Self {
        CostItem::Contract(ContractTerms {
            contractor: contractor.into(),
            contract_value,
        })
    }

    pub fn material(
        supplier: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        CostItem::Material(MaterialPurchase {
            supplier: supplier.into(),
            description: description.into(),
            quantity,
            unit_price,
        })
    }

    pub fn kind(&self) -> CostItemKind {
        match self {
            CostItem::Contract(_) => CostItemKind::Contract,
            CostItem::Material(_) => CostItemKind::Material,
        }
    }

    pub fn counterparty(&self) -> &str {
        match self {
            CostItem::Contract(terms) => &terms.contractor,
            CostItem::Material(purchase) => &purchase.supplier,
        }
    }

    /// Payment constraints for this kind of cost item.
    pub fn payment_rules(&self) -> PaymentRules {
        match self {
            CostItem::Contract(_) => PaymentRules {
                kind: CostItemKind::Contract,
                allowed_statuses: &PaymentStatus::ALL,
            },
            CostItem::Material(_) => PaymentRules {
                kind: CostItemKind::Material,
                allowed_statuses: &MATERIAL_STATUSES,
            },
        }
    }

    pub fn validate(&self) -> Result<(), PaymentRuleViolation> {
        let invalid = |reason: &str| Err(PaymentRuleViolation::InvalidCostItem(reason.into()));
        match self {
            CostItem::Contract(terms) => {
                if terms.contractor.trim().is_empty() {
                    return invalid("contractor must not be empty");
                }
                if terms.contract_value.is_some_and(|value| value < Decimal::ZERO) {
                    return invalid("contract value must not be negative");
                }
            }
            CostItem::Material(purchase) => {
                if purchase.supplier.trim().is_empty() {
                    return invalid("supplier must not be empty");
                }
                if purchase.quantity < Decimal::ZERO || purchase.unit_price < Decimal::ZERO {
                    return invalid("quantity and unit price must not be negative");
                }
                if purchase.total_cost().is_none() {
                    return invalid("quantity times unit price is out of range");
                }
            }
        }
        Ok(())
    }
}

/// Derived aggregate over a payment collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentTotals {
    pub total_paid: Decimal,
    pub overall_status: Option<PaymentStatus>,
}

impl PaymentTotals {
    /// Computes the derived fields for a payment collection.
    ///
    /// Cancelled records are excluded from both the total and the status
    /// vote. Among the rest: any `overdue` wins, then all `paid` (with at
    /// least one) gives `paid`, otherwise `pending`. Only an empty collection
    /// has no status, so a collection of cancelled records is `pending`.
    pub fn from_records<'a, I>(records: I) -> Result<Self, PaymentRuleViolation>
    where
        I: IntoIterator<Item = &'a PaymentRecord>,
    {
        let mut total_paid = Decimal::ZERO;
        let mut seen_any = false;
        let mut active = 0usize;
        let mut paid = 0usize;
        let mut overdue = false;

        for record in records {
            seen_any = true;
            if record.is_cancelled() {
                continue;
            }
            active += 1;
            total_paid = checked_total(total_paid, record.amount)?;
            match record.status {
                PaymentStatus::Overdue => overdue = true,
                PaymentStatus::Paid => paid += 1,
                PaymentStatus::Pending | PaymentStatus::Cancelled => {}
            }
        }

        let overall_status = if !seen_any {
            None
        } else if overdue {
            Some(PaymentStatus::Overdue)
        } else if active > 0 && paid == active {
            Some(PaymentStatus::Paid)
        } else {
            Some(PaymentStatus::Pending)
        };

        Ok(Self {
            total_paid,
            overall_status,
        })
    }
}

/// A cost-item document owning an ordered payment sub-ledger.
///
/// `payments`, `total_paid` and `overall_status` are private so the derived
/// fields can only change together with the collection they summarise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "LedgerDocument")]
pub struct CostLedger {
    pub id: Uuid,
    pub project_id: Uuid,
    pub label: String,
    item: CostItem,
    payments: Vec<PaymentRecord>,
    total_paid: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    overall_status: Option<PaymentStatus>,
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a stored ledger; derived fields are recomputed on load.
#[derive(Deserialize)]
struct LedgerDocument {
    id: Uuid,
    project_id: Uuid,
    label: String,
    item: CostItem,
    #[serde(default)]
    payments: Vec<PaymentRecord>,
    #[serde(default)]
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LedgerDocument> for CostLedger {
    type Error = PaymentRuleViolation;

    fn try_from(doc: LedgerDocument) -> Result<Self, Self::Error> {
        let totals = PaymentTotals::from_records(&doc.payments)?;
        Ok(Self {
            id: doc.id,
            project_id: doc.project_id,
            label: doc.label,
            item: doc.item,
            payments: doc.payments,
            total_paid: totals.total_paid,
            overall_status: totals.overall_status,
            revision: doc.revision,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

impl CostLedger {
    pub fn new(project_id: Uuid, label: impl Into<String>, item: CostItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            label: label.into(),
            item,
            payments: Vec::new(),
            total_paid: Decimal::ZERO,
            overall_status: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn item(&self) -> &CostItem {
        &self.item
    }

    pub fn kind(&self) -> CostItemKind {
        self.item.kind()
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn payment(&self, id: Uuid) -> Option<&PaymentRecord> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    pub fn total_paid(&self) -> Decimal {
        self.total_paid
    }

    pub fn overall_status(&self) -> Option<PaymentStatus> {
        self.overall_status
    }

    pub fn totals(&self) -> PaymentTotals {
        PaymentTotals {
            total_paid: self.total_paid,
            overall_status: self.overall_status,
        }
    }

    /// Appends a validated record, stamping a settlement date if it is paid.
    pub fn append_payment(
        &mut self,
        mut record: PaymentRecord,
        today: NaiveDate,
    ) -> Result<&PaymentRecord, PaymentRuleViolation> {
        if self.payment(record.id).is_some() {
            return Err(PaymentRuleViolation::DuplicatePaymentId(record.id));
        }
        let rules = self.item.payment_rules();
        rules.check_status(record.status)?;
        record.ensure_settlement_date(today);

        let totals = PaymentTotals::from_records(self.payments.iter().chain([&record]))?;

        self.payments.push(record);
        self.apply_totals(totals);
        Ok(&self.payments[self.payments.len() - 1])
    }

    /// Applies `patch` to the payment with `id`, keeping its position.
    ///
    /// Clearing the date of a record that stays `paid` is rejected; a record
    /// that becomes `paid` without a date is stamped with `today`.
    pub fn update_payment(
        &mut self,
        id: Uuid,
        patch: &PaymentPatch,
        today: NaiveDate,
    ) -> Result<&PaymentRecord, PaymentRuleViolation> {
        let index = self
            .position(id)
            .ok_or(PaymentRuleViolation::UnknownPayment(id))?;
        let rules = self.item.payment_rules();

        let mut updated = self.payments[index].clone();
        patch.apply_to(&mut updated)?;
        rules.check_status(updated.status)?;
        if updated.status == PaymentStatus::Paid && patch.payment_date == Some(None) {
            return Err(PaymentRuleViolation::UndatedSettlement(id));
        }
        updated.ensure_settlement_date(today);

        let totals = PaymentTotals::from_records(
            self.payments
                .iter()
                .enumerate()
                .map(|(idx, record)| if idx == index { &updated } else { record }),
        )?;

        self.payments[index] = updated;
        self.apply_totals(totals);
        Ok(&self.payments[index])
    }

    /// Removes the payment with `id`; remaining entries keep their order.
    pub fn remove_payment(&mut self, id: Uuid) -> Result<PaymentRecord, PaymentRuleViolation> {
        let index = self
            .position(id)
            .ok_or(PaymentRuleViolation::UnknownPayment(id))?;
        let totals = PaymentTotals::from_records(
            self.payments
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != index)
                .map(|(_, record)| record),
        )?;
        let removed = self.payments.remove(index);
        self.apply_totals(totals);
        Ok(removed)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.payments.iter().position(|payment| payment.id() == id)
    }

    fn apply_totals(&mut self, totals: PaymentTotals) {
        self.total_paid = totals.total_paid;
        self.overall_status = totals.overall_status;
        self.touch();
    }
}

impl Identifiable for CostLedger {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for CostLedger {
    fn amount(&self) -> Decimal {
        self.total_paid
    }
}

impl Displayable for CostLedger {
    fn display_label(&self) -> String {
        format!("{} ({}: {})", self.label, self.kind(), self.item.counterparty())
    }
}
