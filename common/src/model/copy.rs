//! Physical copies and the work metadata shown alongside them.

use serde::{Deserialize, Serialize};

use crate::ident::{CopyId, WorkId};

fn default_available() -> bool {
    true
}

/// A physical instance of a catalogued work.
///
/// `available == false` iff exactly one loan referencing this copy is
/// Active or Overdue. The Copy Ledger is the only writer of the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copy {
    pub id: CopyId,
    pub work: WorkId,
    /// Unique physical label.
    pub barcode: String,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Condition rating, recorded at acquisition and updated by catalog
/// management (external to the engine).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
    Unusable,
}

/// Display-only projection of a work, served by the Catalog port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    pub id: WorkId,
    pub title: String,
}
