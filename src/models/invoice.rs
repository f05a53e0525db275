//! Invoice model.

use crate::models::{CreateLineItem, DocumentTotals, LineItem, Payment};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invoice status. `Partial`, `Paid`, and `Overdue` are derived from payment
/// and due-date facts on every relevant mutation; `Draft`/`Sent`/`Viewed`
/// reflect the last explicit action and `Cancelled` pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Viewed => "viewed",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => InvoiceStatus::Sent,
            "viewed" => InvoiceStatus::Viewed,
            "partial" => InvoiceStatus::Partial,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Draft,
        }
    }
}

/// An invoice document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub document_number: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub payment_terms_days: i64,
    pub status: InvoiceStatus,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Decimal,
    pub totals: DocumentTotals,
    pub payments: Vec<Payment>,
    pub notes: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Document this invoice was converted from, when any.
    pub estimate_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Re-derive status from payment and due-date facts. `Cancelled` pins.
    /// The explicit base (`Draft`/`Sent`/`Viewed`) is reconstructed from the
    /// lifecycle stamps so removing payments reverts cleanly; `paid_at` is
    /// set the first time the invoice becomes fully paid and cleared when
    /// payments drop back below the total.
    pub fn refresh_status(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        if self.status == InvoiceStatus::Cancelled {
            return;
        }

        let paid = self.totals.amount_paid;
        let total = self.totals.total;

        if paid > Decimal::ZERO && paid >= total {
            if self.paid_at.is_none() {
                self.paid_at = Some(now);
            }
            self.status = InvoiceStatus::Paid;
            return;
        }

        self.paid_at = None;

        let base = if self.viewed_at.is_some() {
            InvoiceStatus::Viewed
        } else if self.sent_at.is_some() {
            InvoiceStatus::Sent
        } else {
            InvoiceStatus::Draft
        };

        // Overdue wins over Partial: both describe an unpaid balance, but
        // overdue is the actionable one. Drafts never go overdue.
        if self.totals.balance > Decimal::ZERO
            && self.due_date < today
            && base != InvoiceStatus::Draft
        {
            self.status = InvoiceStatus::Overdue;
        } else if paid > Decimal::ZERO {
            self.status = InvoiceStatus::Partial;
        } else {
            self.status = base;
        }
    }
}

/// Input for creating an invoice. A missing `due_date` is derived from
/// `payment_terms_days` (falling back to the store's configured default).
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_terms_days: Option<i64>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Vec<CreateLineItem>,
    pub notes: Option<String>,
    pub estimate_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
}

/// Input for updating an invoice.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub job_id: Option<Uuid>,
    pub job_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub payment_terms_days: Option<i64>,
    pub tax_rate: Option<Decimal>,
    pub line_items: Option<Vec<CreateLineItem>>,
    pub notes: Option<String>,
}
