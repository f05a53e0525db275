//! Domain models for the document engine.

mod directory;
mod estimate;
mod invoice;
mod line_item;
mod payment;
mod totals;
mod work_order;

pub use directory::{resolve_customer, CustomerRecord, Directory, InMemoryDirectory, JobRecord};
pub use estimate::{CreateEstimate, Estimate, EstimateStatus, UpdateEstimate};
pub use invoice::{CreateInvoice, Invoice, InvoiceStatus, UpdateInvoice};
pub use line_item::{CreateLineItem, LineItem, LineItemKind, UpdateLineItem};
pub use payment::{CreatePayment, Payment, PaymentMethod, UpdatePayment};
pub use totals::{calculate_totals, DocumentTotals};
pub use work_order::{CreateWorkOrder, TimeEntry, UpdateWorkOrder, WorkOrder, WorkOrderStatus};
