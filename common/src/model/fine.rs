//! Monetary penalties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ident::{FineId, LoanId, PatronId};

/// A penalty tied to a patron, optionally to a loan.
///
/// Amounts are integer cents. Immutable once Paid or Cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    pub id: FineId,
    /// Absent for fines not derived from a loan event (damage, loss).
    pub loan: Option<LoanId>,
    pub patron: PatronId,
    pub kind: FineKind,
    pub amount_cents: i64,
    pub issued_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: FineStatus,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FineKind {
    LateReturn,
    Damage,
    Loss,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FineStatus {
    Pending,
    Paid,
    Cancelled,
}

impl Fine {
    pub fn is_pending(&self) -> bool {
        self.status == FineStatus::Pending
    }
}
