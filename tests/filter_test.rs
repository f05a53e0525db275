//! Filter and sort views over the three collections.

mod common;

use chrono::{Duration, Utc};
use common::{estimate_payload, invoice_payload, store, work_order_payload};
use jobdocs::models::{EstimateStatus, UpdateEstimate, UpdateInvoice};
use jobdocs::services::{
    EstimateFilter, EstimateSortKey, InvoiceFilter, InvoiceSortKey, SortDirection, WorkOrderFilter,
};
use rust_decimal_macros::dec;

#[test]
fn search_matches_number_name_and_email_case_insensitively() {
    let mut store = store();
    let mut payload = estimate_payload("Acme Plumbing");
    payload.customer_email = Some("billing@acme.example".to_string());
    let target = store.add_estimate(&payload);
    store.add_estimate(&estimate_payload("Other Customer"));

    for needle in ["acme", "ACME", "est-0001", "billing@"] {
        let filter = EstimateFilter {
            search: Some(needle.to_string()),
            ..Default::default()
        };
        let results = store.list_estimates(&filter, None);
        assert_eq!(results.len(), 1, "search {needle:?}");
        assert_eq!(results[0].id, target.id);
    }
}

#[test]
fn status_filter_sees_expired_as_a_status() {
    let mut store = store();
    let expired = store.add_estimate(&estimate_payload("Expired Customer"));
    store.send_estimate(expired.id).unwrap();
    store
        .update_estimate(
            expired.id,
            &UpdateEstimate {
                valid_until: Some(Utc::now().date_naive() - Duration::days(1)),
                ..Default::default()
            },
        )
        .unwrap();

    let fresh = store.add_estimate(&estimate_payload("Fresh Customer"));
    store.send_estimate(fresh.id).unwrap();

    let filter = EstimateFilter {
        statuses: Some(vec![EstimateStatus::Expired]),
        ..Default::default()
    };
    let results = store.list_estimates(&filter, None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, expired.id);
    assert_eq!(results[0].status, EstimateStatus::Expired);

    // A Sent filter no longer matches the expired one.
    let filter = EstimateFilter {
        statuses: Some(vec![EstimateStatus::Sent]),
        ..Default::default()
    };
    let results = store.list_estimates(&filter, None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, fresh.id);
}

#[test]
fn customer_and_amount_range_filters_combine() {
    let mut store = store();
    let small = store.add_estimate(&estimate_payload("Range Customer"));

    let mut big_payload = estimate_payload("Range Customer");
    big_payload.customer_id = small.customer_id;
    big_payload.line_items[0].unit_price = dec!(500);
    store.add_estimate(&big_payload);

    store.add_estimate(&estimate_payload("Unrelated Customer"));

    let filter = EstimateFilter {
        customer_id: Some(small.customer_id),
        max_total: Some(dec!(300)),
        ..Default::default()
    };
    let results = store.list_estimates(&filter, None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, small.id);
}

#[test]
fn assignee_filter_matches_any_listed_person() {
    let mut store = store();
    let mut payload = work_order_payload("Crew Customer");
    payload.assigned_to = vec!["dana".to_string(), "lee".to_string()];
    let assigned = store.add_work_order(&payload);
    store.add_work_order(&work_order_payload("Unassigned Customer"));

    let filter = WorkOrderFilter {
        assignees: Some(vec!["lee".to_string()]),
        ..Default::default()
    };
    let results = store.list_work_orders(&filter, None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, assigned.id);
}

#[test]
fn overdue_only_is_fact_based_not_status_based() {
    let mut store = store();

    let mut payload = invoice_payload("Overdue Filter Customer");
    payload.due_date = Some(Utc::now().date_naive() - Duration::days(5));
    let overdue = store.add_invoice(&payload);
    store.send_invoice(overdue.id).unwrap();

    // Move the due date into the past via a plain field edit.
    let stale = store.add_invoice(&invoice_payload("Stale Customer"));
    store.send_invoice(stale.id).unwrap();
    store
        .update_invoice(
            stale.id,
            &UpdateInvoice {
                due_date: Some(Utc::now().date_naive() - Duration::days(2)),
                ..Default::default()
            },
        )
        .unwrap();

    let current = store.add_invoice(&invoice_payload("Current Customer"));
    store.send_invoice(current.id).unwrap();

    let draft_payload = {
        let mut p = invoice_payload("Draft Customer");
        p.due_date = Some(Utc::now().date_naive() - Duration::days(5));
        p
    };
    store.add_invoice(&draft_payload);

    let filter = InvoiceFilter {
        overdue_only: true,
        ..Default::default()
    };
    let results = store.list_invoices(&filter, None);
    let ids: Vec<_> = results.iter().map(|i| i.id).collect();
    assert!(ids.contains(&overdue.id));
    assert!(ids.contains(&stale.id));
    assert!(!ids.contains(&current.id));
    assert_eq!(results.len(), 2);
}

#[test]
fn sorting_is_stable_and_direction_aware() {
    let mut store = store();
    store.add_estimate(&estimate_payload("zeta"));
    store.add_estimate(&estimate_payload("Alpha"));
    store.add_estimate(&estimate_payload("midway"));

    let asc = store.list_estimates(
        &EstimateFilter::default(),
        Some((EstimateSortKey::CustomerName, SortDirection::Asc)),
    );
    let names: Vec<_> = asc.iter().map(|e| e.customer_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "midway", "zeta"]);

    let desc = store.list_estimates(
        &EstimateFilter::default(),
        Some((EstimateSortKey::CustomerName, SortDirection::Desc)),
    );
    let names: Vec<_> = desc.iter().map(|e| e.customer_name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "midway", "Alpha"]);
}

#[test]
fn sort_by_total_orders_numerically() {
    let mut store = store();
    let mut cheap = invoice_payload("Cheap");
    cheap.line_items[0].unit_price = dec!(10);
    store.add_invoice(&cheap);
    store.add_invoice(&invoice_payload("Standard"));
    let mut dear = invoice_payload("Dear");
    dear.line_items[0].unit_price = dec!(900);
    store.add_invoice(&dear);

    let sorted = store.list_invoices(
        &InvoiceFilter::default(),
        Some((InvoiceSortKey::Total, SortDirection::Desc)),
    );
    let names: Vec<_> = sorted.iter().map(|i| i.customer_name.as_str()).collect();
    assert_eq!(names, vec!["Dear", "Standard", "Cheap"]);
}

#[test]
fn views_never_write_back_to_the_store() {
    let mut store = store();
    let estimate = store.add_estimate(&estimate_payload("Projection Customer"));
    store.send_estimate(estimate.id).unwrap();
    store
        .update_estimate(
            estimate.id,
            &UpdateEstimate {
                valid_until: Some(Utc::now().date_naive() - Duration::days(1)),
                ..Default::default()
            },
        )
        .unwrap();

    let views = store.list_estimates(&EstimateFilter::default(), None);
    assert_eq!(views[0].status, EstimateStatus::Expired);
    assert_eq!(
        store.get_estimate(estimate.id).unwrap().status,
        EstimateStatus::Sent
    );
}
