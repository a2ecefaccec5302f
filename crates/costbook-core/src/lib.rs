//! costbook-core
//!
//! Business services for cost-item payment sub-ledgers.
//! Depends on costbook-domain. No CLI, no terminal I/O; persistence goes through [`LedgerStore`].

pub mod cost_item_service;
pub mod error;
pub mod ids;
pub mod ledger_manager;
pub mod memory;
pub mod report_service;
pub mod storage;
pub mod time;

pub use cost_item_service::CostItemService;
pub use error::CoreError;
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use ledger_manager::{LedgerManager, DEFAULT_MAX_ATTEMPTS};
pub use memory::InMemoryLedgerStore;
pub use report_service::ReportAggregator;
pub use storage::LedgerStore;
pub use time::{Clock, FixedClock, SystemClock};
