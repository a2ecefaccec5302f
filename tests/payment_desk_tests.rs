mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{setup_test_env, temp_home, write_config};
use costbook::{CostbookError, PaymentDesk};
use costbook_config::Config;
use costbook_core::{CoreError, FixedClock, InMemoryLedgerStore, LedgerManager};
use costbook_domain::{CostItem, PaymentInput, PaymentPatch, PaymentStatus, ReportFilter};
use rust_decimal::Decimal;
use uuid::Uuid;

fn units(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

#[test]
fn desk_persists_payments_across_reopen() {
    let (desk, home) = setup_test_env();
    let ledger = desk
        .create_cost_item(Uuid::new_v4(), "Framing", CostItem::contract("Acme", None))
        .expect("create cost item");
    let updated = desk
        .add_payment(
            ledger.id,
            PaymentInput::new(units(100), "wire", PaymentStatus::Pending),
        )
        .expect("add payment");
    let payment_id = updated.payments()[0].id;

    assert_eq!(
        desk.data_root().expect("json desk has a data root"),
        home.join("ledgers")
    );
    drop(desk);

    let reopened = PaymentDesk::open(home).expect("reopen desk");
    let payment = reopened
        .get_payment(ledger.id, payment_id)
        .expect("payment survives reopen");
    assert_eq!(payment.amount, units(100));
    let snapshot = reopened.list_payments(ledger.id).expect("list payments");
    assert_eq!(snapshot.total_paid, units(100));
    assert_eq!(snapshot.overall_status, Some(PaymentStatus::Pending));
}

#[test]
fn desk_covers_payment_lifecycle() {
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()));
    let store = Arc::new(InMemoryLedgerStore::new());
    let desk_mem = PaymentDesk::with_store(store.clone(), Config::default())
        .with_ledger_manager(LedgerManager::new(store).with_clock(clock));

    let ledger = desk_mem
        .create_cost_item(Uuid::new_v4(), "Roof", CostItem::contract("Acme", None))
        .expect("create");
    let first = desk_mem
        .add_payment(
            ledger.id,
            PaymentInput::new(units(100), "wire", PaymentStatus::Pending),
        )
        .expect("add first")
        .payments()[0]
        .id;
    let second = desk_mem
        .add_payment(
            ledger.id,
            PaymentInput::new(units(50), "wire", PaymentStatus::Paid),
        )
        .expect("add second")
        .payments()[1]
        .id;

    let updated = desk_mem
        .update_payment(ledger.id, first, PaymentPatch::new().status(PaymentStatus::Paid))
        .expect("mark paid");
    assert_eq!(updated.total_paid(), units(150));
    assert_eq!(updated.overall_status(), Some(PaymentStatus::Paid));
    assert_eq!(
        updated.payment(first).and_then(|p| p.payment_date),
        NaiveDate::from_ymd_opt(2024, 9, 30)
    );

    let removed = desk_mem
        .remove_payment(ledger.id, second)
        .expect("remove second");
    assert_eq!(removed.total_paid(), units(100));

    let err = desk_mem.get_payment(ledger.id, second).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(desk_mem.cost_items(None).expect("list items").len(), 1);

    desk_mem.delete_cost_item(ledger.id).expect("delete");
    assert!(desk_mem.list_payments(ledger.id).unwrap_err().is_not_found());
}

#[test]
fn desk_report_groups_by_status() {
    let (desk, _) = setup_test_env();
    let project = Uuid::new_v4();
    let excavation = desk
        .create_cost_item(project, "Excavation", CostItem::contract("Diggers", None))
        .expect("create");
    let cement = desk
        .create_cost_item(
            project,
            "Cement",
            CostItem::material("Cemco", "Portland", units(60), units(10)),
        )
        .expect("create");

    desk.add_payment(
        excavation.id,
        PaymentInput::new(units(200), "wire", PaymentStatus::Overdue),
    )
    .expect("add overdue");
    desk.add_payment(
        cement.id,
        PaymentInput::new(units(300), "wire", PaymentStatus::Paid),
    )
    .expect("add paid");

    let report = desk
        .generate_report(&ReportFilter::new().project(project))
        .expect("report");
    let statuses: Vec<_> = report.by_status.iter().map(|g| g.status).collect();
    assert_eq!(statuses, vec![PaymentStatus::Overdue, PaymentStatus::Paid]);
    assert_eq!(report.group(PaymentStatus::Overdue).unwrap().total_amount, units(200));
    assert_eq!(report.group(PaymentStatus::Paid).unwrap().total_amount, units(300));
    assert_eq!(report.total_amount, units(500));
    assert_eq!(report.total_count, 2);

    let none = desk
        .generate_report(&ReportFilter::new().project(Uuid::new_v4()))
        .expect("report");
    assert!(none.is_empty());
}

#[test]
fn desk_surfaces_validation_errors() {
    let (desk, _) = setup_test_env();
    let ledger = desk
        .create_cost_item(
            Uuid::new_v4(),
            "Sand",
            CostItem::material("Quarry", "Fine sand", units(10), units(5)),
        )
        .expect("create");

    let err = desk
        .add_payment(
            ledger.id,
            PaymentInput::new(units(10), "cash", PaymentStatus::Overdue),
        )
        .unwrap_err();
    assert!(matches!(err, CostbookError::Core(CoreError::Validation(_))));

    let err = desk
        .create_cost_item(Uuid::new_v4(), "", CostItem::contract("Acme", None))
        .unwrap_err();
    assert!(matches!(err, CostbookError::Core(CoreError::Validation(_))));
}

#[test]
fn desk_honours_stored_configuration() {
    let home = temp_home();
    let custom_root = home.join("elsewhere");
    write_config(
        &home,
        &Config {
            data_root: Some(custom_root.clone()),
            max_write_attempts: 2,
            report_timeout_ms: None,
            ..Config::default()
        },
    );

    let desk = PaymentDesk::open(home).expect("open desk");
    assert_eq!(desk.config().max_write_attempts, 2);
    assert_eq!(desk.data_root(), Some(custom_root.as_path()));

    let ledger = desk
        .create_cost_item(Uuid::new_v4(), "Doors", CostItem::contract("Acme", None))
        .expect("create");
    assert!(custom_root.join(format!("{}.json", ledger.id)).exists());
}
