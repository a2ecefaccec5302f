//! costbook-domain
//!
//! Pure domain models (cost-item ledgers, payment records, report projections).
//! No I/O, no CLI, no storage. Only data types, validation rules and derived totals.

pub mod common;
pub mod ledger;
pub mod payment;
pub mod report;
pub mod rules;

pub use common::*;
pub use ledger::*;
pub use payment::*;
pub use report::*;
pub use rules::*;
