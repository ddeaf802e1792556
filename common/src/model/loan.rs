//! Loan records and their lifecycle states.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ident::{CopyId, LoanId, PatronId};

/// One borrowing transaction. Never deleted; only transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub copy: CopyId,
    pub patron: PatronId,
    pub checked_out_at: DateTime<Utc>,
    pub due_on: NaiveDate,
    pub returned_at: Option<DateTime<Utc>>,
    pub renewals: u32,
    pub status: LoanStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    /// Past due and not yet returned. Still holds the copy claim.
    Overdue,
    Returned,
    Cancelled,
}

impl LoanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Returned | LoanStatus::Cancelled)
    }

    /// Whether a loan in this state holds the exclusive copy claim.
    pub fn holds_claim(self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.status.holds_claim()
    }

    /// Whole days past due, measured against the return date for closed
    /// loans and against `today` for open ones. Never negative.
    pub fn days_late_on(&self, today: NaiveDate) -> i64 {
        let reference = match self.returned_at {
            Some(returned) => returned.date_naive(),
            None => today,
        };
        (reference - self.due_on).num_days().max(0)
    }
}
