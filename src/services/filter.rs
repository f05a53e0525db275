//! Read-only filtered/sorted views over the collections. Nothing here
//! mutates stored data; estimate views re-label expired documents in the
//! returned clones only.

use crate::models::{
    Estimate, EstimateStatus, Invoice, InvoiceStatus, WorkOrder, WorkOrderStatus,
};
use crate::services::store::DocumentStore;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

fn matches_search(search: &str, number: &str, name: &str, email: Option<&str>) -> bool {
    let needle = search.to_lowercase();
    number.to_lowercase().contains(&needle)
        || name.to_lowercase().contains(&needle)
        || email.is_some_and(|e| e.to_lowercase().contains(&needle))
}

fn in_date_range(date: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

fn in_total_range(total: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.map_or(true, |m| total >= m) && max.map_or(true, |m| total <= m)
}

// -------------------------------------------------------------------------
// Estimates
// -------------------------------------------------------------------------

/// Filter parameters for listing estimates.
#[derive(Debug, Clone, Default)]
pub struct EstimateFilter {
    /// Case-insensitive match over number, customer name, customer email.
    pub search: Option<String>,
    /// Matched against the effective (expiration-aware) status.
    pub statuses: Option<Vec<EstimateStatus>>,
    pub customer_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_total: Option<Decimal>,
    pub max_total: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateSortKey {
    DocumentNumber,
    CustomerName,
    Date,
    ValidUntil,
    Total,
    CreatedAt,
    Status,
}

pub fn filter_estimates(
    estimates: &[Estimate],
    filter: &EstimateFilter,
    as_of: NaiveDate,
) -> Vec<Estimate> {
    estimates
        .iter()
        .map(|estimate| {
            // Display-time projection: the stored status is untouched.
            let mut view = estimate.clone();
            view.status = estimate.effective_status(as_of);
            view
        })
        .filter(|estimate| {
            filter.search.as_deref().map_or(true, |search| {
                matches_search(
                    search,
                    &estimate.document_number,
                    &estimate.customer_name,
                    estimate.customer_email.as_deref(),
                )
            }) && filter
                .statuses
                .as_deref()
                .map_or(true, |statuses| statuses.contains(&estimate.status))
                && filter.customer_id.map_or(true, |id| estimate.customer_id == id)
                && in_date_range(estimate.date, filter.date_from, filter.date_to)
                && in_total_range(estimate.totals.total, filter.min_total, filter.max_total)
        })
        .collect()
}

pub fn sort_estimates(estimates: &mut [Estimate], key: EstimateSortKey, direction: SortDirection) {
    estimates.sort_by(|a, b| {
        let ordering = match key {
            EstimateSortKey::DocumentNumber => a
                .document_number
                .to_lowercase()
                .cmp(&b.document_number.to_lowercase()),
            EstimateSortKey::CustomerName => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            EstimateSortKey::Date => a.date.cmp(&b.date),
            EstimateSortKey::ValidUntil => a.valid_until.cmp(&b.valid_until),
            EstimateSortKey::Total => a.totals.total.cmp(&b.totals.total),
            EstimateSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            EstimateSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        direction.apply(ordering)
    });
}

// -------------------------------------------------------------------------
// Work Orders
// -------------------------------------------------------------------------

/// Filter parameters for listing work orders.
#[derive(Debug, Clone, Default)]
pub struct WorkOrderFilter {
    pub search: Option<String>,
    pub statuses: Option<Vec<WorkOrderStatus>>,
    pub customer_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_total: Option<Decimal>,
    pub max_total: Option<Decimal>,
    /// Keep orders assigned to any of these people.
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderSortKey {
    DocumentNumber,
    CustomerName,
    Date,
    ScheduledDate,
    Total,
    CreatedAt,
    Status,
}

pub fn filter_work_orders(work_orders: &[WorkOrder], filter: &WorkOrderFilter) -> Vec<WorkOrder> {
    work_orders
        .iter()
        .filter(|order| {
            filter.search.as_deref().map_or(true, |search| {
                matches_search(
                    search,
                    &order.document_number,
                    &order.customer_name,
                    order.customer_email.as_deref(),
                )
            }) && filter
                .statuses
                .as_deref()
                .map_or(true, |statuses| statuses.contains(&order.status))
                && filter.customer_id.map_or(true, |id| order.customer_id == id)
                && in_date_range(order.date, filter.date_from, filter.date_to)
                && in_total_range(order.totals.total, filter.min_total, filter.max_total)
                && filter.assignees.as_deref().map_or(true, |assignees| {
                    order
                        .assigned_to
                        .iter()
                        .any(|person| assignees.contains(person))
                })
        })
        .cloned()
        .collect()
}

pub fn sort_work_orders(
    work_orders: &mut [WorkOrder],
    key: WorkOrderSortKey,
    direction: SortDirection,
) {
    work_orders.sort_by(|a, b| {
        let ordering = match key {
            WorkOrderSortKey::DocumentNumber => a
                .document_number
                .to_lowercase()
                .cmp(&b.document_number.to_lowercase()),
            WorkOrderSortKey::CustomerName => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            WorkOrderSortKey::Date => a.date.cmp(&b.date),
            WorkOrderSortKey::ScheduledDate => a.scheduled_date.cmp(&b.scheduled_date),
            WorkOrderSortKey::Total => a.totals.total.cmp(&b.totals.total),
            WorkOrderSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            WorkOrderSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        direction.apply(ordering)
    });
}

// -------------------------------------------------------------------------
// Invoices
// -------------------------------------------------------------------------

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub search: Option<String>,
    pub statuses: Option<Vec<InvoiceStatus>>,
    pub customer_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_total: Option<Decimal>,
    pub max_total: Option<Decimal>,
    /// Keep only invoices with an outstanding balance past their due date.
    pub overdue_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSortKey {
    DocumentNumber,
    CustomerName,
    Date,
    DueDate,
    Total,
    CreatedAt,
    Status,
}

pub fn filter_invoices(
    invoices: &[Invoice],
    filter: &InvoiceFilter,
    as_of: NaiveDate,
) -> Vec<Invoice> {
    invoices
        .iter()
        .filter(|invoice| {
            // Overdue is checked against the facts, not the stored status:
            // a stale status must not hide an overdue invoice from the view.
            let overdue = invoice.totals.balance > Decimal::ZERO
                && invoice.due_date < as_of
                && invoice.status != InvoiceStatus::Draft
                && invoice.status != InvoiceStatus::Cancelled;

            (!filter.overdue_only || overdue)
                && filter.search.as_deref().map_or(true, |search| {
                    matches_search(
                        search,
                        &invoice.document_number,
                        &invoice.customer_name,
                        invoice.customer_email.as_deref(),
                    )
                })
                && filter
                    .statuses
                    .as_deref()
                    .map_or(true, |statuses| statuses.contains(&invoice.status))
                && filter.customer_id.map_or(true, |id| invoice.customer_id == id)
                && in_date_range(invoice.date, filter.date_from, filter.date_to)
                && in_total_range(invoice.totals.total, filter.min_total, filter.max_total)
        })
        .cloned()
        .collect()
}

pub fn sort_invoices(invoices: &mut [Invoice], key: InvoiceSortKey, direction: SortDirection) {
    invoices.sort_by(|a, b| {
        let ordering = match key {
            InvoiceSortKey::DocumentNumber => a
                .document_number
                .to_lowercase()
                .cmp(&b.document_number.to_lowercase()),
            InvoiceSortKey::CustomerName => a
                .customer_name
                .to_lowercase()
                .cmp(&b.customer_name.to_lowercase()),
            InvoiceSortKey::Date => a.date.cmp(&b.date),
            InvoiceSortKey::DueDate => a.due_date.cmp(&b.due_date),
            InvoiceSortKey::Total => a.totals.total.cmp(&b.totals.total),
            InvoiceSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            InvoiceSortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        };
        direction.apply(ordering)
    });
}

// -------------------------------------------------------------------------
// Store conveniences
// -------------------------------------------------------------------------

impl DocumentStore {
    pub fn list_estimates(
        &self,
        filter: &EstimateFilter,
        sort: Option<(EstimateSortKey, SortDirection)>,
    ) -> Vec<Estimate> {
        let mut result = filter_estimates(&self.estimates, filter, Utc::now().date_naive());
        if let Some((key, direction)) = sort {
            sort_estimates(&mut result, key, direction);
        }
        result
    }

    pub fn list_work_orders(
        &self,
        filter: &WorkOrderFilter,
        sort: Option<(WorkOrderSortKey, SortDirection)>,
    ) -> Vec<WorkOrder> {
        let mut result = filter_work_orders(&self.work_orders, filter);
        if let Some((key, direction)) = sort {
            sort_work_orders(&mut result, key, direction);
        }
        result
    }

    pub fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        sort: Option<(InvoiceSortKey, SortDirection)>,
    ) -> Vec<Invoice> {
        let mut result = filter_invoices(&self.invoices, filter, Utc::now().date_naive());
        if let Some((key, direction)) = sort {
            sort_invoices(&mut result, key, direction);
        }
        result
    }
}
