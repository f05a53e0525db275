//! Read-only customer/job directory collaborator.
//!
//! Documents store only the denormalized id/name pair; the directory is
//! consulted once, when a creation payload is pre-filled, and never again.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub name: String,
    pub customer_id: Uuid,
}

pub trait Directory {
    fn find_customer_by_id(&self, id: Uuid) -> Option<CustomerRecord>;
    fn find_job_by_id(&self, id: Uuid) -> Option<JobRecord>;
}

/// Directory backed by in-memory lists; the production implementation lives
/// with the persistence collaborator.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    pub customers: Vec<CustomerRecord>,
    pub jobs: Vec<JobRecord>,
}

impl Directory for InMemoryDirectory {
    fn find_customer_by_id(&self, id: Uuid) -> Option<CustomerRecord> {
        self.customers.iter().find(|c| c.id == id).cloned()
    }

    fn find_job_by_id(&self, id: Uuid) -> Option<JobRecord> {
        self.jobs.iter().find(|j| j.id == id).cloned()
    }
}

/// Resolve the denormalized name fields for a creation payload. Returns
/// `None` when the customer id is unknown to the directory.
pub fn resolve_customer(
    dir: &dyn Directory,
    customer_id: Uuid,
    job_id: Option<Uuid>,
) -> Option<(String, Option<String>, Option<String>)> {
    let customer = dir.find_customer_by_id(customer_id)?;
    let job_name = job_id
        .and_then(|id| dir.find_job_by_id(id))
        .map(|j| j.name);
    Some((customer.name, customer.email, job_name))
}
