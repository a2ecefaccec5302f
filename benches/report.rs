use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use costbook_core::{
    CostItemService, InMemoryLedgerStore, LedgerManager, LedgerStore, ReportAggregator,
};
use costbook_domain::{CostItem, PaymentInput, PaymentStatus, ReportFilter};
use costbook_storage_json::JsonLedgerStore;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;
use tempfile::tempdir;
use uuid::Uuid;

fn seed(store: Arc<dyn LedgerStore>, ledgers: usize, payments_per_ledger: usize) {
    let items = CostItemService::new(store.clone());
    let manager = LedgerManager::new(store);
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let project = Uuid::new_v4();

    for ledger_idx in 0..ledgers {
        let ledger = items
            .create(
                project,
                format!("Item {ledger_idx}"),
                CostItem::contract("Bench Builders", None),
            )
            .expect("create ledger");
        for idx in 0..payments_per_ledger {
            let status = PaymentStatus::ALL[idx % PaymentStatus::ALL.len()];
            let input = PaymentInput::new(Decimal::new(1_000 + idx as i64, 2), "wire", status)
                .dated(start + Duration::days((idx % 365) as i64));
            manager.add_payment(ledger.id, input).expect("add payment");
        }
    }
}

fn bench_report_in_memory(c: &mut Criterion) {
    let store = Arc::new(InMemoryLedgerStore::new());
    seed(store.clone(), black_box(200), black_box(25));
    let aggregator = ReportAggregator::new(store);
    let filter = ReportFilter::new();

    c.bench_function("report_memory_200x25", |b| {
        b.iter(|| {
            let report = aggregator.generate_report(&filter).expect("report");
            black_box(report);
        })
    });
}

fn bench_report_json(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonLedgerStore::new(dir.path()).expect("json store"));
    seed(store.clone(), black_box(50), black_box(25));
    let aggregator = ReportAggregator::new(store);
    let filter = ReportFilter::new()
        .status(PaymentStatus::Paid)
        .date_from(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());

    c.bench_function("report_json_50x25_filtered", |b| {
        b.iter(|| {
            let report = aggregator.generate_report(&filter).expect("report");
            black_box(report);
        })
    });
}

criterion_group!(benches, bench_report_in_memory, bench_report_json);
criterion_main!(benches);
