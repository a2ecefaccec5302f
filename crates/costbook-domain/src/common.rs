//! Shared traits implemented by ledger entities.

use rust_decimal::Decimal;
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in a ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

/// Sums the amounts of `items`; `None` if the sum overflows.
pub fn sum_amounts<'a, T, I>(items: I) -> Option<Decimal>
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items
        .into_iter()
        .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.amount()))
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}
