//! Per-kind summary metrics, recomputed fresh on every call.

use crate::models::{
    Estimate, EstimateStatus, Invoice, InvoiceStatus, WorkOrder, WorkOrderStatus,
};
use crate::services::store::DocumentStore;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

#[derive(Debug, Clone, Default)]
pub struct EstimateStats {
    pub count: usize,
    /// Counts by effective (expiration-aware) status.
    pub status_counts: HashMap<EstimateStatus, usize>,
    pub total_value: Decimal,
    /// accepted / (sent + viewed + accepted + declined), over stored
    /// statuses so expired-but-sent estimates stay in the denominator.
    pub acceptance_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct WorkOrderStats {
    pub count: usize,
    pub status_counts: HashMap<WorkOrderStatus, usize>,
    pub total_value: Decimal,
    /// Mean completed_at - started_at, in hours, over completed orders with
    /// both stamps present.
    pub avg_completion_hours: f64,
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceStats {
    pub count: usize,
    pub status_counts: HashMap<InvoiceStatus, usize>,
    pub total_value: Decimal,
    /// Sum of outstanding balances across non-cancelled invoices.
    pub total_outstanding: Decimal,
    /// Mean paid_at - created_at, in days, over paid invoices.
    pub avg_days_to_pay: f64,
}

pub fn estimate_stats(estimates: &[Estimate], as_of: NaiveDate) -> EstimateStats {
    let mut stats = EstimateStats {
        count: estimates.len(),
        ..Default::default()
    };

    let mut decided = 0usize;
    let mut accepted = 0usize;
    for estimate in estimates {
        *stats
            .status_counts
            .entry(estimate.effective_status(as_of))
            .or_insert(0) += 1;
        stats.total_value += estimate.totals.total;
        match estimate.status {
            EstimateStatus::Accepted => {
                decided += 1;
                accepted += 1;
            }
            EstimateStatus::Sent | EstimateStatus::Viewed | EstimateStatus::Declined => {
                decided += 1;
            }
            _ => {}
        }
    }

    if decided > 0 {
        stats.acceptance_rate = accepted as f64 / decided as f64;
    }
    stats
}

pub fn work_order_stats(work_orders: &[WorkOrder]) -> WorkOrderStats {
    let mut stats = WorkOrderStats {
        count: work_orders.len(),
        ..Default::default()
    };

    let mut completed_hours = Vec::new();
    for order in work_orders {
        *stats.status_counts.entry(order.status).or_insert(0) += 1;
        stats.total_value += order.totals.total;
        if order.status == WorkOrderStatus::Completed {
            if let (Some(started), Some(completed)) = (order.started_at, order.completed_at) {
                let seconds = (completed - started).num_seconds() as f64;
                completed_hours.push(seconds / SECONDS_PER_HOUR);
            }
        }
    }

    if !completed_hours.is_empty() {
        stats.avg_completion_hours =
            completed_hours.iter().sum::<f64>() / completed_hours.len() as f64;
    }
    stats
}

pub fn invoice_stats(invoices: &[Invoice]) -> InvoiceStats {
    let mut stats = InvoiceStats {
        count: invoices.len(),
        ..Default::default()
    };

    let mut days_to_pay = Vec::new();
    for invoice in invoices {
        *stats.status_counts.entry(invoice.status).or_insert(0) += 1;
        stats.total_value += invoice.totals.total;
        if invoice.status != InvoiceStatus::Cancelled {
            stats.total_outstanding += invoice.totals.balance;
        }
        if let Some(paid_at) = invoice.paid_at {
            let seconds = (paid_at - invoice.created_at).num_seconds() as f64;
            days_to_pay.push(seconds / SECONDS_PER_DAY);
        }
    }

    if !days_to_pay.is_empty() {
        stats.avg_days_to_pay = days_to_pay.iter().sum::<f64>() / days_to_pay.len() as f64;
    }
    stats
}

impl DocumentStore {
    pub fn estimate_stats(&self) -> EstimateStats {
        estimate_stats(&self.estimates, Utc::now().date_naive())
    }

    pub fn work_order_stats(&self) -> WorkOrderStats {
        work_order_stats(&self.work_orders)
    }

    pub fn invoice_stats(&self) -> InvoiceStats {
        invoice_stats(&self.invoices)
    }
}
