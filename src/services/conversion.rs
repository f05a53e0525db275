//! Directional conversion between document kinds. Each route copies the
//! customer/job identity and line items verbatim, resets the target's
//! lifecycle to its kind's initial state, and stamps a provenance pointer on
//! both sides.

use crate::error::AppError;
use crate::models::{
    CreateInvoice, CreateLineItem, CreateWorkOrder, Invoice, LineItem, WorkOrder,
};
use crate::services::store::DocumentStore;
use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Optional overrides when converting into an invoice. An explicit due date
/// wins over payment terms; payment terms win over the store default.
#[derive(Debug, Clone, Default)]
pub struct ConvertToInvoice {
    pub due_date: Option<NaiveDate>,
    pub payment_terms_days: Option<i64>,
}

/// Line items are copied verbatim: quantities and rates are not renegotiated
/// by a conversion.
fn copy_line_items(items: &[LineItem]) -> Vec<CreateLineItem> {
    items
        .iter()
        .map(|item| CreateLineItem {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            taxable: Some(item.taxable),
            kind: item.kind,
            detail: item.detail.clone(),
        })
        .collect()
}

impl DocumentStore {
    /// Convert an estimate into a fresh work order.
    #[instrument(skip(self), fields(estimate_id = %estimate_id))]
    pub fn convert_estimate_to_work_order(
        &mut self,
        estimate_id: Uuid,
    ) -> Result<WorkOrder, AppError> {
        let source = self
            .get_estimate(estimate_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Estimate {} not found", estimate_id)))?;

        if let Some(previous) = source.converted_to_work_order_id {
            warn!(
                estimate_id = %estimate_id,
                previous_work_order_id = %previous,
                "Estimate was already converted; provenance pointer will be replaced"
            );
        }

        let payload = CreateWorkOrder {
            customer_id: source.customer_id,
            customer_name: source.customer_name.clone(),
            customer_email: source.customer_email.clone(),
            job_id: source.job_id,
            job_name: source.job_name.clone(),
            date: None,
            scheduled_date: None,
            scheduled_time: None,
            assigned_to: Vec::new(),
            tax_rate: Some(source.tax_rate),
            line_items: copy_line_items(&source.line_items),
            notes: source.notes.clone(),
            estimate_id: Some(source.id),
        };
        let work_order = self.add_work_order(&payload);

        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        estimate.converted_to_work_order_id = Some(work_order.id);
        estimate.updated_at = now;

        info!(
            estimate_id = %estimate_id,
            work_order_id = %work_order.id,
            "Estimate converted to work order"
        );
        Ok(work_order)
    }

    /// Convert a work order into a fresh draft invoice. The estimate chain,
    /// when present, is carried onto the invoice as well.
    #[instrument(skip(self, opts), fields(work_order_id = %work_order_id))]
    pub fn convert_work_order_to_invoice(
        &mut self,
        work_order_id: Uuid,
        opts: &ConvertToInvoice,
    ) -> Result<Invoice, AppError> {
        let source = self
            .get_work_order(work_order_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Work order {} not found", work_order_id)))?;

        if let Some(previous) = source.converted_to_invoice_id {
            warn!(
                work_order_id = %work_order_id,
                previous_invoice_id = %previous,
                "Work order was already converted; provenance pointer will be replaced"
            );
        }

        let payload = CreateInvoice {
            customer_id: source.customer_id,
            customer_name: source.customer_name.clone(),
            customer_email: source.customer_email.clone(),
            job_id: source.job_id,
            job_name: source.job_name.clone(),
            date: None,
            due_date: opts.due_date,
            payment_terms_days: opts.payment_terms_days,
            tax_rate: Some(source.tax_rate),
            line_items: copy_line_items(&source.line_items),
            notes: source.notes.clone(),
            estimate_id: source.estimate_id,
            work_order_id: Some(source.id),
        };
        let invoice = self.add_invoice(&payload);

        let now = Utc::now();
        let work_order = self.work_order_mut(work_order_id)?;
        work_order.converted_to_invoice_id = Some(invoice.id);
        work_order.updated_at = now;

        info!(
            work_order_id = %work_order_id,
            invoice_id = %invoice.id,
            "Work order converted to invoice"
        );
        Ok(invoice)
    }

    /// Convert an estimate directly into a draft invoice, skipping the work
    /// order stage.
    #[instrument(skip(self, opts), fields(estimate_id = %estimate_id))]
    pub fn convert_estimate_to_invoice(
        &mut self,
        estimate_id: Uuid,
        opts: &ConvertToInvoice,
    ) -> Result<Invoice, AppError> {
        let source = self
            .get_estimate(estimate_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(anyhow!("Estimate {} not found", estimate_id)))?;

        if let Some(previous) = source.converted_to_invoice_id {
            warn!(
                estimate_id = %estimate_id,
                previous_invoice_id = %previous,
                "Estimate was already converted; provenance pointer will be replaced"
            );
        }

        let payload = CreateInvoice {
            customer_id: source.customer_id,
            customer_name: source.customer_name.clone(),
            customer_email: source.customer_email.clone(),
            job_id: source.job_id,
            job_name: source.job_name.clone(),
            date: None,
            due_date: opts.due_date,
            payment_terms_days: opts.payment_terms_days,
            tax_rate: Some(source.tax_rate),
            line_items: copy_line_items(&source.line_items),
            notes: source.notes.clone(),
            estimate_id: Some(source.id),
            work_order_id: None,
        };
        let invoice = self.add_invoice(&payload);

        let now = Utc::now();
        let estimate = self.estimate_mut(estimate_id)?;
        estimate.converted_to_invoice_id = Some(invoice.id);
        estimate.updated_at = now;

        info!(
            estimate_id = %estimate_id,
            invoice_id = %invoice.id,
            "Estimate converted to invoice"
        );
        Ok(invoice)
    }
}
