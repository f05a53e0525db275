//! Persistence boundary. The store works purely in memory; durability is an
//! explicit, caller-driven snapshot exchange. Timestamps cross this boundary
//! as ISO-8601 strings (chrono's serde form) and come back as date values.

use crate::error::AppError;
use crate::models::{Estimate, Invoice, WorkOrder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Serialized form of the three collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub estimates: Vec<Estimate>,
    pub work_orders: Vec<WorkOrder>,
    pub invoices: Vec<Invoice>,
}

/// Durable storage collaborator. Called once at startup (`load`) and after
/// mutations (`save`); the store itself never awaits or verifies a flush.
pub trait SnapshotRepository {
    fn load(&self) -> Result<StoreSnapshot, AppError>;
    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), AppError>;
}

/// JSON-file-backed repository.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SnapshotRepository for JsonFileRepository {
    /// A missing file is a first run, not an error.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<StoreSnapshot, AppError> {
        if !self.path.exists() {
            info!("No snapshot file; starting empty");
            return Ok(StoreSnapshot::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
        info!(
            estimates = snapshot.estimates.len(),
            work_orders = snapshot.work_orders.len(),
            invoices = snapshot.invoices.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &StoreSnapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, raw)?;
        info!("Snapshot saved");
        Ok(())
    }
}
