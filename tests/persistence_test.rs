//! Snapshot save/load through the JSON file repository.

mod common;

use common::{estimate_payload, invoice_payload, payment, store, work_order_payload};
use jobdocs::services::store::{DocumentStore, StoreConfig};
use jobdocs::services::{JsonFileRepository, SnapshotRepository};
use rust_decimal_macros::dec;
use tempfile::tempdir;

#[test]
fn save_then_load_round_trips_the_collections() {
    let dir = tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("documents.json"));

    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Persisted Customer"));
    store.send_estimate(estimate.id).unwrap();
    store.add_work_order(&work_order_payload("Persisted WO Customer"));
    let invoice = store.add_invoice(&invoice_payload("Persisted Invoice Customer"));
    store.add_payment(invoice.id, &payment(dec!(50))).unwrap();

    repo.save(&store.snapshot()).unwrap();

    let restored = DocumentStore::from_snapshot(StoreConfig::default(), repo.load().unwrap());
    assert_eq!(restored.estimates().len(), 1);
    assert_eq!(restored.work_orders().len(), 1);
    assert_eq!(restored.invoices().len(), 1);

    let restored_estimate = restored.get_estimate(estimate.id).unwrap();
    assert_eq!(restored_estimate.status, estimate.status);
    assert!(restored_estimate.sent_at.is_some());

    let restored_invoice = restored.get_invoice(invoice.id).unwrap();
    assert_eq!(restored_invoice.totals.amount_paid, dec!(50));
    assert_eq!(restored_invoice.payments.len(), 1);
}

#[test]
fn timestamps_serialize_as_iso_8601_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("documents.json");
    let repo = JsonFileRepository::new(path.clone());

    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("ISO Customer"));
    repo.save(&store.snapshot()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let created = estimate.created_at.format("%Y-%m-%d").to_string();
    assert!(raw.contains(&created));
    assert!(raw.contains(&estimate.valid_until.format("%Y-%m-%d").to_string()));
    assert!(raw.contains("EST-0001"));
}

#[test]
fn missing_file_loads_as_an_empty_store() {
    let dir = tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("never-written.json"));

    let snapshot = repo.load().unwrap();
    assert!(snapshot.estimates.is_empty());
    assert!(snapshot.work_orders.is_empty());
    assert!(snapshot.invoices.is_empty());
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("nested/deeper/documents.json"));

    repo.save(&store().snapshot()).unwrap();
    assert!(repo.path().exists());
}

#[test]
fn numbering_continues_after_a_reload() {
    let dir = tempdir().unwrap();
    let repo = JsonFileRepository::new(dir.path().join("documents.json"));

    let mut store = store();
    store.add_estimate(&estimate_payload("First Session"));
    store.add_estimate(&estimate_payload("First Session Again"));
    repo.save(&store.snapshot()).unwrap();

    let mut restored = DocumentStore::from_snapshot(StoreConfig::default(), repo.load().unwrap());
    let next = restored.add_estimate(&estimate_payload("Second Session"));
    assert_eq!(next.document_number, "EST-0003");
}
