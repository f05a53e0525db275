//! Human-facing document number generation.

use serde::{Deserialize, Serialize};

/// The three financial document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Estimate,
    WorkOrder,
    Invoice,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "EST",
            DocumentKind::WorkOrder => "WO",
            DocumentKind::Invoice => "INV",
        }
    }
}

/// Produce the next number for a kind given the numbers already in use:
/// highest numeric suffix plus one, zero-padded to four digits. The caller
/// must pass the current snapshot of the kind's collection; once assigned a
/// number is immutable for the life of the document.
pub fn next_document_number(kind: DocumentKind, existing: &[String]) -> String {
    let prefix = kind.prefix();
    let next = existing
        .iter()
        .filter_map(|number| number.strip_prefix(prefix))
        .filter_map(|rest| rest.strip_prefix('-'))
        .filter_map(|digits| digits.parse::<u64>().ok())
        .max()
        .map_or(1, |highest| highest + 1);
    format!("{}-{:04}", prefix, next)
}
