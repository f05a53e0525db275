//! Work order model.

use crate::models::{CreateLineItem, DocumentTotals, LineItem};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Work order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Draft,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Draft => "draft",
            WorkOrderStatus::Scheduled => "scheduled",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "scheduled" => WorkOrderStatus::Scheduled,
            "in_progress" => WorkOrderStatus::InProgress,
            "completed" => WorkOrderStatus::Completed,
            "cancelled" => WorkOrderStatus::Cancelled,
            _ => WorkOrderStatus::Draft,
        }
    }
}

/// A tracked block of time on a work order. Owned by the parent; no
/// independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// A work order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: Uuid,
    pub document_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: NaiveDate,
    pub status: WorkOrderStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub assigned_to: Vec<String>,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Decimal,
    pub totals: DocumentTotals,
    pub time_entries: Vec<TimeEntry>,
    pub photos: Vec<String>,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Estimate this order was converted from, when any.
    pub estimate_id: Option<Uuid>,
    pub converted_to_invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a work order.
#[derive(Debug, Clone)]
pub struct CreateWorkOrder {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub assigned_to: Vec<String>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Vec<CreateLineItem>,
    pub notes: Option<String>,
    pub estimate_id: Option<Uuid>,
}

/// Input for updating a work order.
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkOrder {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub assigned_to: Option<Vec<String>>,
    pub photos: Option<Vec<String>>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Option<Vec<CreateLineItem>>,
    pub notes: Option<String>,
}
