//! Document lifecycle tests: estimate and work order state machines,
//! expiration as a read-time projection, duplication, and numbering.

mod common;

use chrono::{Duration, Utc};
use common::{estimate_payload, store, work_order_payload};
use jobdocs::error::AppError;
use jobdocs::models::{EstimateStatus, UpdateEstimate, WorkOrderStatus};
use jobdocs::services::filter::{filter_estimates, EstimateFilter};
use uuid::Uuid;

#[test]
fn send_then_view_then_accept_stamps_each_step() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Lifecycle Customer"));
    assert_eq!(estimate.status, EstimateStatus::Draft);

    let sent = store.send_estimate(estimate.id).unwrap();
    assert_eq!(sent.status, EstimateStatus::Sent);
    assert!(sent.sent_at.is_some());

    let viewed = store.mark_estimate_viewed(estimate.id).unwrap();
    assert_eq!(viewed.status, EstimateStatus::Viewed);
    assert!(viewed.viewed_at.is_some());

    let accepted = store.accept_estimate(estimate.id).unwrap();
    assert_eq!(accepted.status, EstimateStatus::Accepted);
    assert!(accepted.accepted_at.is_some());
}

#[test]
fn mark_viewed_is_a_no_op_unless_sent() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("View Guard Customer"));

    let result = store.mark_estimate_viewed(estimate.id).unwrap();
    assert_eq!(result.status, EstimateStatus::Draft);
    assert!(result.viewed_at.is_none());
}

#[test]
fn decline_is_allowed_from_any_state() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Decline Customer"));
    store.accept_estimate(estimate.id).unwrap();

    // The source workflow permits reversing a terminal decision.
    let declined = store.decline_estimate(estimate.id).unwrap();
    assert_eq!(declined.status, EstimateStatus::Declined);
    assert!(declined.declined_at.is_some());
}

#[test]
fn past_valid_until_reads_expired_without_a_stored_write() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Expiry Customer"));
    store.send_estimate(estimate.id).unwrap();

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    store
        .update_estimate(
            estimate.id,
            &UpdateEstimate {
                valid_until: Some(yesterday),
                ..Default::default()
            },
        )
        .unwrap();

    let views = filter_estimates(
        store.estimates(),
        &EstimateFilter::default(),
        Utc::now().date_naive(),
    );
    let view = views.iter().find(|e| e.id == estimate.id).unwrap();
    assert_eq!(view.status, EstimateStatus::Expired);

    // The stored status stays what it was until the next explicit write.
    assert_eq!(
        store.get_estimate(estimate.id).unwrap().status,
        EstimateStatus::Sent
    );
}

#[test]
fn accepted_estimates_never_read_expired() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Accepted Expiry Customer"));
    store.accept_estimate(estimate.id).unwrap();

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    store
        .update_estimate(
            estimate.id,
            &UpdateEstimate {
                valid_until: Some(yesterday),
                ..Default::default()
            },
        )
        .unwrap();

    let stored = store.get_estimate(estimate.id).unwrap();
    assert_eq!(
        stored.effective_status(Utc::now().date_naive()),
        EstimateStatus::Accepted
    );
}

#[test]
fn duplicate_resets_lifecycle_and_assigns_a_new_number() {
    let mut store = store();
    let today = Utc::now().date_naive();
    let estimate = store.add_estimate(&estimate_payload("Duplicate Customer"));
    store.send_estimate(estimate.id).unwrap();
    store.accept_estimate(estimate.id).unwrap();

    let copy = store.duplicate_estimate(estimate.id).unwrap();

    assert_ne!(copy.id, estimate.id);
    assert_ne!(copy.document_number, estimate.document_number);
    assert_eq!(copy.status, EstimateStatus::Draft);
    assert!(copy.sent_at.is_none());
    assert!(copy.accepted_at.is_none());
    assert!(copy.converted_to_work_order_id.is_none());
    assert!(copy.valid_until >= today + Duration::days(30));
    assert_eq!(copy.totals, estimate.totals);
}

#[test]
fn document_numbers_are_unique_per_kind() {
    let mut store = store();
    let first = store.add_estimate(&estimate_payload("Numbering One"));
    let second = store.add_estimate(&estimate_payload("Numbering Two"));
    let copy = store.duplicate_estimate(first.id).unwrap();

    assert_eq!(first.document_number, "EST-0001");
    assert_eq!(second.document_number, "EST-0002");
    assert_eq!(copy.document_number, "EST-0003");

    // Work orders number independently of estimates.
    let order = store.add_work_order(&work_order_payload("Numbering WO"));
    assert_eq!(order.document_number, "WO-0001");
}

#[test]
fn work_order_walks_schedule_start_complete() {
    let mut store = store();
    let order = store.add_work_order(&work_order_payload("WO Lifecycle Customer"));
    assert_eq!(order.status, WorkOrderStatus::Draft);

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let scheduled = store.schedule_work_order(order.id, tomorrow, None).unwrap();
    assert_eq!(scheduled.status, WorkOrderStatus::Scheduled);
    assert_eq!(scheduled.scheduled_date, Some(tomorrow));

    let started = store.start_work_order(order.id).unwrap();
    assert_eq!(started.status, WorkOrderStatus::InProgress);
    assert!(started.started_at.is_some());

    let completed = store.complete_work_order(order.id).unwrap();
    assert_eq!(completed.status, WorkOrderStatus::Completed);
    assert!(completed.completed_at.is_some());
}

#[test]
fn work_order_created_with_a_schedule_starts_scheduled() {
    let mut store = store();
    let mut payload = work_order_payload("Pre-scheduled Customer");
    payload.scheduled_date = Some(Utc::now().date_naive() + Duration::days(3));

    let order = store.add_work_order(&payload);
    assert_eq!(order.status, WorkOrderStatus::Scheduled);
}

#[test]
fn time_entries_open_and_close_on_the_parent() {
    let mut store = store();
    let order = store.add_work_order(&work_order_payload("Time Customer"));

    let started = Utc::now();
    let entry = store.add_time_entry(order.id, started, None).unwrap();
    assert!(entry.ended_at.is_none());

    let ended = started + Duration::hours(2);
    let closed = store.close_time_entry(order.id, entry.id, ended).unwrap();
    assert_eq!(closed.ended_at, Some(ended));
    assert_eq!(store.get_work_order(order.id).unwrap().time_entries.len(), 1);
}

#[test]
fn unknown_ids_are_reported_not_swallowed() {
    let mut store = store();
    let missing = Uuid::new_v4();

    assert!(matches!(
        store.update_estimate(missing, &UpdateEstimate::default()),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        store.delete_work_order(missing),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        store.duplicate_estimate(missing),
        Err(AppError::NotFound(_))
    ));
    assert!(store.get_invoice(missing).is_none());
}

#[test]
fn delete_does_not_cascade_to_converted_documents() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Cascade Customer"));
    let order = store.convert_estimate_to_work_order(estimate.id).unwrap();

    store.delete_estimate(estimate.id).unwrap();

    // The provenance pointer dangles but the work order survives.
    let survivor = store.get_work_order(order.id).unwrap();
    assert_eq!(survivor.estimate_id, Some(estimate.id));
}
