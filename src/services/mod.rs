//! Engines built over the document collections.

pub mod conversion;
pub mod filter;
pub mod numbering;
pub mod persistence;
pub mod stats;
pub mod store;

pub use conversion::ConvertToInvoice;
pub use filter::{
    filter_estimates, filter_invoices, filter_work_orders, sort_estimates, sort_invoices,
    sort_work_orders, EstimateFilter, EstimateSortKey, InvoiceFilter, InvoiceSortKey,
    SortDirection, WorkOrderFilter, WorkOrderSortKey,
};
pub use numbering::{next_document_number, DocumentKind};
pub use persistence::{JsonFileRepository, SnapshotRepository, StoreSnapshot};
pub use stats::{
    estimate_stats, invoice_stats, work_order_stats, EstimateStats, InvoiceStats, WorkOrderStats,
};
pub use store::{DocumentStore, StoreConfig};
