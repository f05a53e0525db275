//! Document store: single source of truth for the three document
//! collections. The only component permitted to construct or mutate
//! documents; every mutation that touches line items, tax rate, or payments
//! recomputes totals, and invoice mutations re-derive status.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    calculate_totals, CreateEstimate, CreateInvoice, CreateLineItem, CreatePayment,
    CreateWorkOrder, Estimate, EstimateStatus, Invoice, InvoiceStatus, LineItem, Payment,
    TimeEntry, UpdateEstimate, UpdateInvoice, UpdateLineItem, UpdatePayment, UpdateWorkOrder,
    WorkOrder, WorkOrderStatus,
};
use crate::services::numbering::{next_document_number, DocumentKind};
use crate::services::persistence::StoreSnapshot;
use anyhow::anyhow;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Store-level knobs, injected at construction so tests can instantiate
/// isolated stores.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Days an estimate stays valid from its creation date.
    pub valid_days: i64,
    /// Default net payment terms for invoices.
    pub payment_terms_days: i64,
    /// Tax rate (percent) used when a payload does not carry one.
    pub default_tax_rate: Decimal,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            valid_days: 30,
            payment_terms_days: 30,
            default_tax_rate: Decimal::ZERO,
        }
    }
}

impl From<&Config> for StoreConfig {
    fn from(config: &Config) -> Self {
        Self {
            valid_days: config.default_valid_days,
            payment_terms_days: config.default_payment_terms_days,
            default_tax_rate: config.default_tax_rate,
        }
    }
}

/// In-memory document store. Single-writer by contract: all operations are
/// synchronous read-modify-write steps, and durability is the caller's
/// concern via [`snapshot`](DocumentStore::snapshot).
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pub(crate) config: StoreConfig,
    pub(crate) estimates: Vec<Estimate>,
    pub(crate) work_orders: Vec<WorkOrder>,
    pub(crate) invoices: Vec<Invoice>,
}

fn build_line_items(inputs: &[CreateLineItem]) -> Vec<LineItem> {
    inputs
        .iter()
        .enumerate()
        .map(|(position, input)| LineItem::from_input(input, position as i32))
        .collect()
}

fn reorder_items(items: &mut Vec<LineItem>, ordered_ids: &[Uuid]) -> Result<(), AppError> {
    if ordered_ids.len() != items.len() {
        return Err(AppError::BadRequest(anyhow!(
            "Reorder must list every line item exactly once ({} given, {} present)",
            ordered_ids.len(),
            items.len()
        )));
    }

    let mut remaining = items.clone();
    let mut reordered = Vec::with_capacity(items.len());
    for (position, id) in ordered_ids.iter().enumerate() {
        let index = remaining
            .iter()
            .position(|item| item.id == *id)
            .ok_or_else(|| AppError::BadRequest(anyhow!("Unknown line item {}", id)))?;
        let mut item = remaining.remove(index);
        item.sort_order = position as i32;
        reordered.push(item);
    }
    *items = reordered;
    Ok(())
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            estimates: Vec::new(),
            work_orders: Vec::new(),
            invoices: Vec::new(),
        }
    }

    /// Populate a store from a persisted snapshot (startup path).
    pub fn from_snapshot(config: StoreConfig, snapshot: StoreSnapshot) -> Self {
        Self {
            config,
            estimates: snapshot.estimates,
            work_orders: snapshot.work_orders,
            invoices: snapshot.invoices,
        }
    }

    /// Current collections, cloned for the persistence collaborator. The
    /// store never flushes on its own.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            estimates: self.estimates.clone(),
            work_orders: self.work_orders.clone(),
            invoices: self.invoices.clone(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    pub fn work_orders(&self) -> &[WorkOrder] {
        &self.work_orders
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub(crate) fn estimate_mut(&mut self, id: Uuid) -> Result<&mut Estimate, AppError> {
        self.estimates
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Estimate {} not found", id)))
    }

    pub(crate) fn work_order_mut(&mut self, id: Uuid) -> Result<&mut WorkOrder, AppError> {
        self.work_orders
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Work order {} not found", id)))
    }

    pub(crate) fn invoice_mut(&mut self, id: Uuid) -> Result<&mut Invoice, AppError> {
        self.invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice {} not found", id)))
    }

    // -------------------------------------------------------------------------
    // Estimate Operations
    // -------------------------------------------------------------------------

    /// Create a new draft estimate.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub fn add_estimate(&mut self, input: &CreateEstimate) -> Estimate {
        let now = Utc::now();
        let today = now.date_naive();

        let numbers: Vec<String> = self
            .estimates
            .iter()
            .map(|e| e.document_number.clone())
            .collect();
        let document_number = next_document_number(DocumentKind::Estimate, &numbers);

        let line_items = build_line_items(&input.line_items);
        let tax_rate = input.tax_rate.unwrap_or(self.config.default_tax_rate);
        let totals = calculate_totals(&line_items, tax_rate, &[]);

        let estimate = Estimate {
            id: Uuid::new_v4(),
            document_number,
            customer_id: input.customer_id,
            customer_name: input.customer_name.clone(),
            customer_email: input.customer_email.clone(),
            job_id: input.job_id,
            job_name: input.job_name.clone(),
            date: input.date.unwrap_or(today),
            valid_until: input
                .valid_until
                .unwrap_or(today + Duration::days(self.config.valid_days)),
            status: EstimateStatus::Draft,
            line_items,
            tax_rate,
            totals,
            notes: input.notes.clone(),
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            declined_at: None,
            converted_to_work_order_id: None,
            converted_to_invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        self.estimates.push(estimate.clone());
        info!(
            estimate_id = %estimate.id,
            document_number = %estimate.document_number,
            "Estimate created"
        );
        estimate
    }

    pub fn get_estimate(&self, id: Uuid) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.id == id)
    }

    /// Merge an update payload. Totals are recomputed from the merged line
    /// items and tax rate, never the pre-merge ones.
    #[instrument(skip(self, input), fields(estimate_id = %id))]
    pub fn update_estimate(
        &mut self,
        id: Uuid,
        input: &UpdateEstimate,
    ) -> Result<Estimate, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(id)?;

        if let Some(ref customer_name) = input.customer_name {
            estimate.customer_name = customer_name.clone();
        }
        if let Some(ref customer_email) = input.customer_email {
            estimate.customer_email = Some(customer_email.clone());
        }
        if let Some(job_id) = input.job_id {
            estimate.job_id = Some(job_id);
        }
        if let Some(ref job_name) = input.job_name {
            estimate.job_name = Some(job_name.clone());
        }
        if let Some(date) = input.date {
            estimate.date = date;
        }
        if let Some(valid_until) = input.valid_until {
            estimate.valid_until = valid_until;
        }
        if let Some(ref notes) = input.notes {
            estimate.notes = Some(notes.clone());
        }

        let totals_touched = input.line_items.is_some() || input.tax_rate.is_some();
        if let Some(ref line_items) = input.line_items {
            estimate.line_items = build_line_items(line_items);
        }
        if let Some(tax_rate) = input.tax_rate {
            estimate.tax_rate = tax_rate;
        }
        if totals_touched {
            estimate.totals = calculate_totals(&estimate.line_items, estimate.tax_rate, &[]);
        }

        estimate.updated_at = now;
        let updated = estimate.clone();
        info!(estimate_id = %id, "Estimate updated");
        Ok(updated)
    }

    /// Remove an estimate. Documents converted from it keep their dangling,
    /// informational provenance pointers; nothing cascades.
    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn delete_estimate(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .estimates
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Estimate {} not found", id)))?;
        self.estimates.remove(index);
        info!(estimate_id = %id, "Estimate deleted");
        Ok(())
    }

    /// Copy an estimate into a fresh draft: new id and number, line items
    /// copied, lifecycle stamps and provenance cleared, validity window
    /// re-opened from today.
    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn duplicate_estimate(&mut self, id: Uuid) -> Result<Estimate, AppError> {
        let source = self
            .get_estimate(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Estimate {} not found", id)))?;

        let now = Utc::now();
        let today = now.date_naive();
        let numbers: Vec<String> = self
            .estimates
            .iter()
            .map(|e| e.document_number.clone())
            .collect();

        let mut line_items = source.line_items.clone();
        for (position, item) in line_items.iter_mut().enumerate() {
            item.id = Uuid::new_v4();
            item.sort_order = position as i32;
            item.amount = item.quantity * item.unit_price;
        }
        let totals = calculate_totals(&line_items, source.tax_rate, &[]);

        let copy = Estimate {
            id: Uuid::new_v4(),
            document_number: next_document_number(DocumentKind::Estimate, &numbers),
            customer_id: source.customer_id,
            customer_name: source.customer_name,
            customer_email: source.customer_email,
            job_id: source.job_id,
            job_name: source.job_name,
            date: today,
            valid_until: today + Duration::days(self.config.valid_days),
            status: EstimateStatus::Draft,
            line_items,
            tax_rate: source.tax_rate,
            totals,
            notes: source.notes,
            sent_at: None,
            viewed_at: None,
            accepted_at: None,
            declined_at: None,
            converted_to_work_order_id: None,
            converted_to_invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        self.estimates.push(copy.clone());
        info!(
            source_id = %id,
            estimate_id = %copy.id,
            document_number = %copy.document_number,
            "Estimate duplicated"
        );
        Ok(copy)
    }

    /// Mark an estimate sent. Allowed from any state; re-sending re-stamps.
    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn send_estimate(&mut self, id: Uuid) -> Result<Estimate, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(id)?;
        estimate.status = EstimateStatus::Sent;
        estimate.sent_at = Some(now);
        estimate.updated_at = now;
        let updated = estimate.clone();
        info!(estimate_id = %id, "Estimate sent");
        Ok(updated)
    }

    /// Record that the customer viewed a sent estimate. Viewing only matters
    /// once sent, so any other state is a no-op, not an error.
    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn mark_estimate_viewed(&mut self, id: Uuid) -> Result<Estimate, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(id)?;
        if estimate.status == EstimateStatus::Sent {
            estimate.status = EstimateStatus::Viewed;
            estimate.viewed_at = Some(now);
            estimate.updated_at = now;
            info!(estimate_id = %id, "Estimate viewed");
        }
        Ok(estimate.clone())
    }

    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn accept_estimate(&mut self, id: Uuid) -> Result<Estimate, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(id)?;
        if estimate.status.is_terminal() {
            warn!(
                estimate_id = %id,
                status = estimate.status.as_str(),
                "Accepting an estimate that already had a terminal decision"
            );
        }
        estimate.status = EstimateStatus::Accepted;
        estimate.accepted_at = Some(now);
        estimate.updated_at = now;
        let updated = estimate.clone();
        info!(estimate_id = %id, "Estimate accepted");
        Ok(updated)
    }

    #[instrument(skip(self), fields(estimate_id = %id))]
    pub fn decline_estimate(&mut self, id: Uuid) -> Result<Estimate, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(id)?;
        if estimate.status.is_terminal() {
            warn!(
                estimate_id = %id,
                status = estimate.status.as_str(),
                "Declining an estimate that already had a terminal decision"
            );
        }
        estimate.status = EstimateStatus::Declined;
        estimate.declined_at = Some(now);
        estimate.updated_at = now;
        let updated = estimate.clone();
        info!(estimate_id = %id, "Estimate declined");
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Estimate Line Items
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(estimate_id = %estimate_id))]
    pub fn add_estimate_line_item(
        &mut self,
        estimate_id: Uuid,
        input: &CreateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        let item = LineItem::from_input(input, estimate.line_items.len() as i32);
        estimate.line_items.push(item.clone());
        estimate.totals = calculate_totals(&estimate.line_items, estimate.tax_rate, &[]);
        estimate.updated_at = now;
        Ok(item)
    }

    #[instrument(skip(self, input), fields(estimate_id = %estimate_id, line_item_id = %item_id))]
    pub fn update_estimate_line_item(
        &mut self,
        estimate_id: Uuid,
        item_id: Uuid,
        input: &UpdateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        let item = estimate
            .line_items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        item.apply(input);
        let updated = item.clone();
        estimate.totals = calculate_totals(&estimate.line_items, estimate.tax_rate, &[]);
        estimate.updated_at = now;
        Ok(updated)
    }

    #[instrument(skip(self), fields(estimate_id = %estimate_id, line_item_id = %item_id))]
    pub fn delete_estimate_line_item(
        &mut self,
        estimate_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        let index = estimate
            .line_items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        estimate.line_items.remove(index);
        estimate.totals = calculate_totals(&estimate.line_items, estimate.tax_rate, &[]);
        estimate.updated_at = now;
        Ok(())
    }

    /// Replace line-item order; `sort_order` is reassigned by position.
    #[instrument(skip(self, ordered_ids), fields(estimate_id = %estimate_id))]
    pub fn reorder_estimate_line_items(
        &mut self,
        estimate_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<LineItem>, AppError> {
        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        reorder_items(&mut estimate.line_items, ordered_ids)?;
        estimate.totals = calculate_totals(&estimate.line_items, estimate.tax_rate, &[]);
        estimate.updated_at = now;
        Ok(estimate.line_items.clone())
    }

    // -------------------------------------------------------------------------
    // Work Order Operations
    // -------------------------------------------------------------------------

    /// Create a new work order. Starts `Draft` unless a schedule date is
    /// supplied, in which case it starts `Scheduled`.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub fn add_work_order(&mut self, input: &CreateWorkOrder) -> WorkOrder {
        let now = Utc::now();
        let today = now.date_naive();

        let numbers: Vec<String> = self
            .work_orders
            .iter()
            .map(|w| w.document_number.clone())
            .collect();
        let document_number = next_document_number(DocumentKind::WorkOrder, &numbers);

        let line_items = build_line_items(&input.line_items);
        let tax_rate = input.tax_rate.unwrap_or(self.config.default_tax_rate);
        let totals = calculate_totals(&line_items, tax_rate, &[]);
        let status = if input.scheduled_date.is_some() {
            WorkOrderStatus::Scheduled
        } else {
            WorkOrderStatus::Draft
        };

        let work_order = WorkOrder {
            id: Uuid::new_v4(),
            document_number,
            customer_id: input.customer_id,
            customer_name: input.customer_name.clone(),
            customer_email: input.customer_email.clone(),
            job_id: input.job_id,
            job_name: input.job_name.clone(),
            date: input.date.unwrap_or(today),
            status,
            scheduled_date: input.scheduled_date,
            scheduled_time: input.scheduled_time,
            assigned_to: input.assigned_to.clone(),
            line_items,
            tax_rate,
            totals,
            time_entries: Vec::new(),
            photos: Vec::new(),
            notes: input.notes.clone(),
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            estimate_id: input.estimate_id,
            converted_to_invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        self.work_orders.push(work_order.clone());
        info!(
            work_order_id = %work_order.id,
            document_number = %work_order.document_number,
            "Work order created"
        );
        work_order
    }

    pub fn get_work_order(&self, id: Uuid) -> Option<&WorkOrder> {
        self.work_orders.iter().find(|w| w.id == id)
    }

    #[instrument(skip(self, input), fields(work_order_id = %id))]
    pub fn update_work_order(
        &mut self,
        id: Uuid,
        input: &UpdateWorkOrder,
    ) -> Result<WorkOrder, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(id)?;

        if let Some(ref customer_name) = input.customer_name {
            work_order.customer_name = customer_name.clone();
        }
        if let Some(ref customer_email) = input.customer_email {
            work_order.customer_email = Some(customer_email.clone());
        }
        if let Some(job_id) = input.job_id {
            work_order.job_id = Some(job_id);
        }
        if let Some(ref job_name) = input.job_name {
            work_order.job_name = Some(job_name.clone());
        }
        if let Some(date) = input.date {
            work_order.date = date;
        }
        if let Some(scheduled_date) = input.scheduled_date {
            work_order.scheduled_date = Some(scheduled_date);
        }
        if let Some(scheduled_time) = input.scheduled_time {
            work_order.scheduled_time = Some(scheduled_time);
        }
        if let Some(ref assigned_to) = input.assigned_to {
            work_order.assigned_to = assigned_to.clone();
        }
        if let Some(ref photos) = input.photos {
            work_order.photos = photos.clone();
        }
        if let Some(ref notes) = input.notes {
            work_order.notes = Some(notes.clone());
        }

        let totals_touched = input.line_items.is_some() || input.tax_rate.is_some();
        if let Some(ref line_items) = input.line_items {
            work_order.line_items = build_line_items(line_items);
        }
        if let Some(tax_rate) = input.tax_rate {
            work_order.tax_rate = tax_rate;
        }
        if totals_touched {
            work_order.totals = calculate_totals(&work_order.line_items, work_order.tax_rate, &[]);
        }

        work_order.updated_at = now;
        let updated = work_order.clone();
        info!(work_order_id = %id, "Work order updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn delete_work_order(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .work_orders
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Work order {} not found", id)))?;
        self.work_orders.remove(index);
        info!(work_order_id = %id, "Work order deleted");
        Ok(())
    }

    /// Copy a work order into a fresh draft: schedule, time tracking,
    /// photos, stamps, and provenance are all cleared.
    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn duplicate_work_order(&mut self, id: Uuid) -> Result<WorkOrder, AppError> {
        let source = self
            .get_work_order(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Work order {} not found", id)))?;

        let now = Utc::now();
        let today = now.date_naive();
        let numbers: Vec<String> = self
            .work_orders
            .iter()
            .map(|w| w.document_number.clone())
            .collect();

        let mut line_items = source.line_items.clone();
        for (position, item) in line_items.iter_mut().enumerate() {
            item.id = Uuid::new_v4();
            item.sort_order = position as i32;
            item.amount = item.quantity * item.unit_price;
        }
        let totals = calculate_totals(&line_items, source.tax_rate, &[]);

        let copy = WorkOrder {
            id: Uuid::new_v4(),
            document_number: next_document_number(DocumentKind::WorkOrder, &numbers),
            customer_id: source.customer_id,
            customer_name: source.customer_name,
            customer_email: source.customer_email,
            job_id: source.job_id,
            job_name: source.job_name,
            date: today,
            status: WorkOrderStatus::Draft,
            scheduled_date: None,
            scheduled_time: None,
            assigned_to: source.assigned_to,
            line_items,
            tax_rate: source.tax_rate,
            totals,
            time_entries: Vec::new(),
            photos: Vec::new(),
            notes: source.notes,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            estimate_id: None,
            converted_to_invoice_id: None,
            created_at: now,
            updated_at: now,
        };

        self.work_orders.push(copy.clone());
        info!(
            source_id = %id,
            work_order_id = %copy.id,
            document_number = %copy.document_number,
            "Work order duplicated"
        );
        Ok(copy)
    }

    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn schedule_work_order(
        &mut self,
        id: Uuid,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<WorkOrder, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(id)?;
        work_order.status = WorkOrderStatus::Scheduled;
        work_order.scheduled_date = Some(date);
        work_order.scheduled_time = time;
        work_order.updated_at = now;
        let updated = work_order.clone();
        info!(work_order_id = %id, scheduled_date = %date, "Work order scheduled");
        Ok(updated)
    }

    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn start_work_order(&mut self, id: Uuid) -> Result<WorkOrder, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(id)?;
        work_order.status = WorkOrderStatus::InProgress;
        work_order.started_at = Some(now);
        work_order.updated_at = now;
        let updated = work_order.clone();
        info!(work_order_id = %id, "Work order started");
        Ok(updated)
    }

    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn complete_work_order(&mut self, id: Uuid) -> Result<WorkOrder, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(id)?;
        work_order.status = WorkOrderStatus::Completed;
        work_order.completed_at = Some(now);
        work_order.updated_at = now;
        let updated = work_order.clone();
        info!(work_order_id = %id, "Work order completed");
        Ok(updated)
    }

    #[instrument(skip(self), fields(work_order_id = %id))]
    pub fn cancel_work_order(&mut self, id: Uuid) -> Result<WorkOrder, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(id)?;
        work_order.status = WorkOrderStatus::Cancelled;
        work_order.cancelled_at = Some(now);
        work_order.updated_at = now;
        let updated = work_order.clone();
        info!(work_order_id = %id, "Work order cancelled");
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Work Order Line Items and Time Tracking
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(work_order_id = %work_order_id))]
    pub fn add_work_order_line_item(
        &mut self,
        work_order_id: Uuid,
        input: &CreateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        let item = LineItem::from_input(input, work_order.line_items.len() as i32);
        work_order.line_items.push(item.clone());
        work_order.totals = calculate_totals(&work_order.line_items, work_order.tax_rate, &[]);
        work_order.updated_at = now;
        Ok(item)
    }

    #[instrument(skip(self, input), fields(work_order_id = %work_order_id, line_item_id = %item_id))]
    pub fn update_work_order_line_item(
        &mut self,
        work_order_id: Uuid,
        item_id: Uuid,
        input: &UpdateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        let item = work_order
            .line_items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        item.apply(input);
        let updated = item.clone();
        work_order.totals = calculate_totals(&work_order.line_items, work_order.tax_rate, &[]);
        work_order.updated_at = now;
        Ok(updated)
    }

    #[instrument(skip(self), fields(work_order_id = %work_order_id, line_item_id = %item_id))]
    pub fn delete_work_order_line_item(
        &mut self,
        work_order_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        let index = work_order
            .line_items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        work_order.line_items.remove(index);
        work_order.totals = calculate_totals(&work_order.line_items, work_order.tax_rate, &[]);
        work_order.updated_at = now;
        Ok(())
    }

    #[instrument(skip(self, ordered_ids), fields(work_order_id = %work_order_id))]
    pub fn reorder_work_order_line_items(
        &mut self,
        work_order_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<LineItem>, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        reorder_items(&mut work_order.line_items, ordered_ids)?;
        work_order.totals = calculate_totals(&work_order.line_items, work_order.tax_rate, &[]);
        work_order.updated_at = now;
        Ok(work_order.line_items.clone())
    }

    /// Open a time entry on a work order.
    #[instrument(skip(self, notes), fields(work_order_id = %work_order_id))]
    pub fn add_time_entry(
        &mut self,
        work_order_id: Uuid,
        started_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<TimeEntry, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        let entry = TimeEntry {
            id: Uuid::new_v4(),
            started_at,
            ended_at: None,
            notes,
        };
        work_order.time_entries.push(entry.clone());
        work_order.updated_at = now;
        Ok(entry)
    }

    /// Close an open time entry.
    #[instrument(skip(self), fields(work_order_id = %work_order_id, entry_id = %entry_id))]
    pub fn close_time_entry(
        &mut self,
        work_order_id: Uuid,
        entry_id: Uuid,
        ended_at: DateTime<Utc>,
    ) -> Result<TimeEntry, AppError> {
        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        let entry = work_order
            .time_entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Time entry {} not found", entry_id)))?;
        entry.ended_at = Some(ended_at);
        let closed = entry.clone();
        work_order.updated_at = now;
        Ok(closed)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Create a new draft invoice. A missing due date is derived from the
    /// payment terms.
    #[instrument(skip(self, input), fields(customer_id = %input.customer_id))]
    pub fn add_invoice(&mut self, input: &CreateInvoice) -> Invoice {
        let now = Utc::now();
        let today = now.date_naive();

        let numbers: Vec<String> = self
            .invoices
            .iter()
            .map(|i| i.document_number.clone())
            .collect();
        let document_number = next_document_number(DocumentKind::Invoice, &numbers);

        let line_items = build_line_items(&input.line_items);
        let tax_rate = input.tax_rate.unwrap_or(self.config.default_tax_rate);
        let totals = calculate_totals(&line_items, tax_rate, &[]);
        let payment_terms_days = input
            .payment_terms_days
            .unwrap_or(self.config.payment_terms_days);
        let due_date = input
            .due_date
            .unwrap_or(today + Duration::days(payment_terms_days));

        let invoice = Invoice {
            id: Uuid::new_v4(),
            document_number,
            customer_id: input.customer_id,
            customer_name: input.customer_name.clone(),
            customer_email: input.customer_email.clone(),
            job_id: input.job_id,
            job_name: input.job_name.clone(),
            date: input.date.unwrap_or(today),
            due_date,
            payment_terms_days,
            status: InvoiceStatus::Draft,
            line_items,
            tax_rate,
            totals,
            payments: Vec::new(),
            notes: input.notes.clone(),
            sent_at: None,
            viewed_at: None,
            paid_at: None,
            cancelled_at: None,
            estimate_id: input.estimate_id,
            work_order_id: input.work_order_id,
            created_at: now,
            updated_at: now,
        };

        self.invoices.push(invoice.clone());
        info!(
            invoice_id = %invoice.id,
            document_number = %invoice.document_number,
            "Invoice created"
        );
        invoice
    }

    pub fn get_invoice(&self, id: Uuid) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    #[instrument(skip(self, input), fields(invoice_id = %id))]
    pub fn update_invoice(&mut self, id: Uuid, input: &UpdateInvoice) -> Result<Invoice, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(id)?;

        if let Some(ref customer_name) = input.customer_name {
            invoice.customer_name = customer_name.clone();
        }
        if let Some(ref customer_email) = input.customer_email {
            invoice.customer_email = Some(customer_email.clone());
        }
        if let Some(job_id) = input.job_id {
            invoice.job_id = Some(job_id);
        }
        if let Some(ref job_name) = input.job_name {
            invoice.job_name = Some(job_name.clone());
        }
        if let Some(date) = input.date {
            invoice.date = date;
        }
        if let Some(due_date) = input.due_date {
            invoice.due_date = due_date;
        }
        if let Some(payment_terms_days) = input.payment_terms_days {
            invoice.payment_terms_days = payment_terms_days;
        }
        if let Some(ref notes) = input.notes {
            invoice.notes = Some(notes.clone());
        }

        let totals_touched = input.line_items.is_some() || input.tax_rate.is_some();
        if let Some(ref line_items) = input.line_items {
            invoice.line_items = build_line_items(line_items);
        }
        if let Some(tax_rate) = input.tax_rate {
            invoice.tax_rate = tax_rate;
        }
        if totals_touched {
            invoice.totals =
                calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        }

        // Status is always re-derived: a changed due date or total can move
        // the invoice in or out of overdue/paid.
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        let updated = invoice.clone();
        info!(invoice_id = %id, status = updated.status.as_str(), "Invoice updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn delete_invoice(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice {} not found", id)))?;
        self.invoices.remove(index);
        info!(invoice_id = %id, "Invoice deleted");
        Ok(())
    }

    /// Copy an invoice into a fresh draft: payments cleared (balance back to
    /// the full total), stamps and provenance cleared, due date re-offset
    /// from today by the source's payment terms.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn duplicate_invoice(&mut self, id: Uuid) -> Result<Invoice, AppError> {
        let source = self
            .get_invoice(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Invoice {} not found", id)))?;

        let now = Utc::now();
        let today = now.date_naive();
        let numbers: Vec<String> = self
            .invoices
            .iter()
            .map(|i| i.document_number.clone())
            .collect();

        let mut line_items = source.line_items.clone();
        for (position, item) in line_items.iter_mut().enumerate() {
            item.id = Uuid::new_v4();
            item.sort_order = position as i32;
            item.amount = item.quantity * item.unit_price;
        }
        let totals = calculate_totals(&line_items, source.tax_rate, &[]);

        let copy = Invoice {
            id: Uuid::new_v4(),
            document_number: next_document_number(DocumentKind::Invoice, &numbers),
            customer_id: source.customer_id,
            customer_name: source.customer_name,
            customer_email: source.customer_email,
            job_id: source.job_id,
            job_name: source.job_name,
            date: today,
            due_date: today + Duration::days(source.payment_terms_days),
            payment_terms_days: source.payment_terms_days,
            status: InvoiceStatus::Draft,
            line_items,
            tax_rate: source.tax_rate,
            totals,
            payments: Vec::new(),
            notes: source.notes,
            sent_at: None,
            viewed_at: None,
            paid_at: None,
            cancelled_at: None,
            estimate_id: None,
            work_order_id: None,
            created_at: now,
            updated_at: now,
        };

        self.invoices.push(copy.clone());
        info!(
            source_id = %id,
            invoice_id = %copy.id,
            document_number = %copy.document_number,
            "Invoice duplicated"
        );
        Ok(copy)
    }

    /// Mark an invoice sent. Payment facts still win: a sent invoice with a
    /// full payment on record stays `Paid`.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn send_invoice(&mut self, id: Uuid) -> Result<Invoice, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(id)?;
        invoice.sent_at = Some(now);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        let updated = invoice.clone();
        info!(invoice_id = %id, status = updated.status.as_str(), "Invoice sent");
        Ok(updated)
    }

    /// Record that the customer viewed a sent invoice; a no-op from any
    /// other state, mirroring estimates.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn mark_invoice_viewed(&mut self, id: Uuid) -> Result<Invoice, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(id)?;
        if invoice.status == InvoiceStatus::Sent {
            invoice.viewed_at = Some(now);
            invoice.refresh_status(today, now);
            invoice.updated_at = now;
            info!(invoice_id = %id, "Invoice viewed");
        }
        Ok(invoice.clone())
    }

    /// Pin the invoice to `Cancelled` regardless of payment facts.
    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn cancel_invoice(&mut self, id: Uuid) -> Result<Invoice, AppError> {
        let now = Utc::now();
        let invoice = self.invoice_mut(id)?;
        invoice.status = InvoiceStatus::Cancelled;
        invoice.cancelled_at = Some(now);
        invoice.updated_at = now;
        let updated = invoice.clone();
        info!(invoice_id = %id, "Invoice cancelled");
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Invoice Line Items
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(invoice_id = %invoice_id))]
    pub fn add_invoice_line_item(
        &mut self,
        invoice_id: Uuid,
        input: &CreateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        let item = LineItem::from_input(input, invoice.line_items.len() as i32);
        invoice.line_items.push(item.clone());
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        Ok(item)
    }

    #[instrument(skip(self, input), fields(invoice_id = %invoice_id, line_item_id = %item_id))]
    pub fn update_invoice_line_item(
        &mut self,
        invoice_id: Uuid,
        item_id: Uuid,
        input: &UpdateLineItem,
    ) -> Result<LineItem, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        let item = invoice
            .line_items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        item.apply(input);
        let updated = item.clone();
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        Ok(updated)
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id, line_item_id = %item_id))]
    pub fn delete_invoice_line_item(
        &mut self,
        invoice_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        let index = invoice
            .line_items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Line item {} not found", item_id)))?;
        invoice.line_items.remove(index);
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        Ok(())
    }

    #[instrument(skip(self, ordered_ids), fields(invoice_id = %invoice_id))]
    pub fn reorder_invoice_line_items(
        &mut self,
        invoice_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<LineItem>, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        reorder_items(&mut invoice.line_items, ordered_ids)?;
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        Ok(invoice.line_items.clone())
    }

    // -------------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------------

    /// Record a payment against an invoice.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id))]
    pub fn add_payment(
        &mut self,
        invoice_id: Uuid,
        input: &CreatePayment,
    ) -> Result<Payment, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;

        if input.amount > invoice.totals.balance {
            warn!(
                invoice_id = %invoice_id,
                amount = %input.amount,
                balance = %invoice.totals.balance,
                "Payment exceeds outstanding balance"
            );
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            amount: input.amount,
            date: input.date,
            method: input.method,
            notes: input.notes.clone(),
        };
        invoice.payments.push(payment.clone());
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            status = invoice.status.as_str(),
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Correct a recorded payment.
    #[instrument(skip(self, input), fields(invoice_id = %invoice_id, payment_id = %payment_id))]
    pub fn update_payment(
        &mut self,
        invoice_id: Uuid,
        payment_id: Uuid,
        input: &UpdatePayment,
    ) -> Result<Payment, AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        let payment = invoice
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Payment {} not found", payment_id)))?;

        if let Some(amount) = input.amount {
            payment.amount = amount;
        }
        if let Some(date) = input.date {
            payment.date = date;
        }
        if let Some(method) = input.method {
            payment.method = method;
        }
        if let Some(ref notes) = input.notes {
            payment.notes = Some(notes.clone());
        }
        let updated = payment.clone();

        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        info!(
            invoice_id = %invoice_id,
            payment_id = %payment_id,
            status = invoice.status.as_str(),
            "Payment updated"
        );
        Ok(updated)
    }

    /// Remove a recorded payment. Dropping below the total clears `paid_at`
    /// and reverts the status via the usual derivation.
    #[instrument(skip(self), fields(invoice_id = %invoice_id, payment_id = %payment_id))]
    pub fn delete_payment(&mut self, invoice_id: Uuid, payment_id: Uuid) -> Result<(), AppError> {
        let now = Utc::now();
        let today = now.date_naive();
        let invoice = self.invoice_mut(invoice_id)?;
        let index = invoice
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| AppError::NotFound(anyhow!("Payment {} not found", payment_id)))?;
        invoice.payments.remove(index);
        invoice.totals = calculate_totals(&invoice.line_items, invoice.tax_rate, &invoice.payments);
        invoice.refresh_status(today, now);
        invoice.updated_at = now;
        info!(
            invoice_id = %invoice_id,
            payment_id = %payment_id,
            status = invoice.status.as_str(),
            "Payment deleted"
        );
        Ok(())
    }
}
