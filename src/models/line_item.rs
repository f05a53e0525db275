//! Line item model shared by all document kinds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing category of a line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Material,
    Labor,
    Subcontractor,
    #[default]
    Other,
}

impl LineItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineItemKind::Material => "material",
            LineItemKind::Labor => "labor",
            LineItemKind::Subcontractor => "subcontractor",
            LineItemKind::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "material" => LineItemKind::Material,
            "labor" => LineItemKind::Labor,
            "subcontractor" => LineItemKind::Subcontractor,
            _ => LineItemKind::Other,
        }
    }

    /// Conventional tax treatment when a payload does not say: labor is
    /// non-taxable, everything else is taxable.
    pub fn default_taxable(&self) -> bool {
        !matches!(self, LineItemKind::Labor)
    }
}

/// One billable row on a financial document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Always `quantity * unit_price`; recomputed on every mutation, never
    /// accepted from input.
    pub amount: Decimal,
    pub taxable: bool,
    pub kind: LineItemKind,
    /// Kind-specific detail: part number, labor type, subcontractor name.
    pub detail: Option<String>,
    pub sort_order: i32,
}

impl LineItem {
    pub fn from_input(input: &CreateLineItem, sort_order: i32) -> Self {
        let taxable = input
            .taxable
            .unwrap_or_else(|| input.kind.default_taxable());
        Self {
            id: Uuid::new_v4(),
            description: input.description.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            amount: input.quantity * input.unit_price,
            taxable,
            kind: input.kind,
            detail: input.detail.clone(),
            sort_order,
        }
    }

    /// Merge an update payload and re-derive `amount`.
    pub fn apply(&mut self, input: &UpdateLineItem) {
        if let Some(ref description) = input.description {
            self.description = description.clone();
        }
        if let Some(quantity) = input.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = input.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(taxable) = input.taxable {
            self.taxable = taxable;
        }
        if let Some(kind) = input.kind {
            self.kind = kind;
        }
        if let Some(ref detail) = input.detail {
            self.detail = Some(detail.clone());
        }
        if let Some(sort_order) = input.sort_order {
            self.sort_order = sort_order;
        }
        self.amount = self.quantity * self.unit_price;
    }
}

/// Input for adding a line item. `amount` is intentionally absent.
#[derive(Debug, Clone)]
pub struct CreateLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// `None` falls back to the kind's conventional treatment.
    pub taxable: Option<bool>,
    pub kind: LineItemKind,
    pub detail: Option<String>,
}

impl CreateLineItem {
    pub fn new(description: &str, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.to_string(),
            quantity,
            unit_price,
            taxable: None,
            kind: LineItemKind::Other,
            detail: None,
        }
    }
}

/// Input for updating a line item.
#[derive(Debug, Clone, Default)]
pub struct UpdateLineItem {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub taxable: Option<bool>,
    pub kind: Option<LineItemKind>,
    pub detail: Option<String>,
    pub sort_order: Option<i32>,
}
