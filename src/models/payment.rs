//! Payment model, owned by invoices.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    Card,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Check => "check",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "cash" => PaymentMethod::Cash,
            "check" => PaymentMethod::Check,
            "card" => PaymentMethod::Card,
            "bank_transfer" => PaymentMethod::BankTransfer,
            _ => PaymentMethod::Other,
        }
    }
}

/// A payment recorded against an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub amount: Decimal,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    pub notes: Option<String>,
}

/// Input for correcting a recorded payment.
#[derive(Debug, Clone, Default)]
pub struct UpdatePayment {
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}
