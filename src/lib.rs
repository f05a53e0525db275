//! Financial document lifecycle engine for field-service back-office
//! operations: estimates, work orders, and invoices with computed totals,
//! per-kind state machines, and directional conversion between kinds.

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use services::store::DocumentStore;
