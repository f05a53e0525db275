//! Shared fixtures for the document engine tests.
#![allow(dead_code)]

use chrono::Utc;
use jobdocs::models::{
    CreateEstimate, CreateInvoice, CreateLineItem, CreatePayment, CreateWorkOrder, LineItemKind,
    PaymentMethod,
};
use jobdocs::services::store::{DocumentStore, StoreConfig};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub fn store() -> DocumentStore {
    DocumentStore::new(StoreConfig::default())
}

/// Two rows: 2 x 50 taxable material, 1 x 100 non-taxable labor. With a 6%
/// tax rate: subtotal 200, taxable 100, tax 6, total 206.
pub fn scenario_items() -> Vec<CreateLineItem> {
    let mut materials = CreateLineItem::new("PVC pipe and fittings", dec!(2), dec!(50));
    materials.kind = LineItemKind::Material;
    materials.detail = Some("PVC-40-10".to_string());

    let mut labor = CreateLineItem::new("Install labor", dec!(1), dec!(100));
    labor.kind = LineItemKind::Labor;

    vec![materials, labor]
}

pub fn estimate_payload(customer_name: &str) -> CreateEstimate {
    CreateEstimate {
        customer_id: Uuid::new_v4(),
        customer_name: customer_name.to_string(),
        customer_email: None,
        job_id: None,
        job_name: None,
        date: None,
        valid_until: None,
        tax_rate: Some(dec!(6)),
        line_items: scenario_items(),
        notes: None,
    }
}

pub fn work_order_payload(customer_name: &str) -> CreateWorkOrder {
    CreateWorkOrder {
        customer_id: Uuid::new_v4(),
        customer_name: customer_name.to_string(),
        customer_email: None,
        job_id: None,
        job_name: None,
        date: None,
        scheduled_date: None,
        scheduled_time: None,
        assigned_to: Vec::new(),
        tax_rate: Some(dec!(6)),
        line_items: scenario_items(),
        notes: None,
        estimate_id: None,
    }
}

pub fn invoice_payload(customer_name: &str) -> CreateInvoice {
    CreateInvoice {
        customer_id: Uuid::new_v4(),
        customer_name: customer_name.to_string(),
        customer_email: None,
        job_id: None,
        job_name: None,
        date: None,
        due_date: None,
        payment_terms_days: None,
        tax_rate: Some(dec!(6)),
        line_items: scenario_items(),
        notes: None,
        estimate_id: None,
        work_order_id: None,
    }
}

pub fn payment(amount: Decimal) -> CreatePayment {
    CreatePayment {
        amount,
        date: Utc::now().date_naive(),
        method: PaymentMethod::Check,
        notes: None,
    }
}
