//! Estimate model.

use crate::models::{CreateLineItem, DocumentTotals, LineItem};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Estimate status. `Expired` is never stored; it is a read-time projection
/// (see [`Estimate::effective_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Draft,
    Sent,
    Viewed,
    Accepted,
    Declined,
    Expired,
}

impl EstimateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateStatus::Draft => "draft",
            EstimateStatus::Sent => "sent",
            EstimateStatus::Viewed => "viewed",
            EstimateStatus::Accepted => "accepted",
            EstimateStatus::Declined => "declined",
            EstimateStatus::Expired => "expired",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => EstimateStatus::Sent,
            "viewed" => EstimateStatus::Viewed,
            "accepted" => EstimateStatus::Accepted,
            "declined" => EstimateStatus::Declined,
            "expired" => EstimateStatus::Expired,
            _ => EstimateStatus::Draft,
        }
    }

    /// A terminal human decision: accepted or declined.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EstimateStatus::Accepted | EstimateStatus::Declined)
    }
}

/// An estimate document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    pub id: Uuid,
    pub document_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: NaiveDate,
    pub valid_until: NaiveDate,
    pub status: EstimateStatus,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Decimal,
    pub totals: DocumentTotals,
    pub notes: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub converted_to_work_order_id: Option<Uuid>,
    pub converted_to_invoice_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    /// The status as displayed: a past-due estimate with no terminal human
    /// decision reads as `Expired` without touching the stored field.
    pub fn effective_status(&self, as_of: NaiveDate) -> EstimateStatus {
        if self.valid_until < as_of && !self.status.is_terminal() {
            EstimateStatus::Expired
        } else {
            self.status
        }
    }
}

/// Input for creating an estimate. `None` date fields fall back to the
/// store's configured offsets.
#[derive(Debug, Clone)]
pub struct CreateEstimate {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Vec<CreateLineItem>,
    pub notes: Option<String>,
}

/// Input for updating an estimate. A `line_items` value replaces the whole
/// list (fresh ids, positional sort order).
#[derive(Debug, Clone, Default)]
pub struct UpdateEstimate {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Option<Vec<CreateLineItem>>,
    pub notes: Option<String>,
}
