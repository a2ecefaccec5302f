#![doc(test(attr(deny(warnings))))]

//! Costbook tracks payments made against construction cost items: each
//! contract or material purchase owns a payment sub-ledger, and reports
//! aggregate those payments across ledgers by status.

pub mod cli;
pub mod config;
pub mod desk;
pub mod errors;
pub mod utils;

pub use desk::PaymentDesk;
pub use errors::{CostbookError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Costbook tracing initialized.");
    });
}
