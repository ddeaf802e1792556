//! The **Loan State Machine**: lifecycle of a loan from checkout to closure.
//!
//! States: Active (initial), Overdue (past due, still holds the copy
//! claim), Returned and Cancelled (terminal). Every mutation happens under
//! the store's per-key entry lock and re-checks the current status at
//! write time, so a return that commits between a sweep's read and write
//! always wins.

use chrono::{DateTime, Days, NaiveDate, Utc};
use circ_common::error::{CircError, CircResult};
use circ_common::ident::{CopyId, LoanId, PatronId};
use circ_common::model::{Loan, LoanStatus};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

#[derive(Debug, Default)]
pub struct LoanStore {
    loans: DashMap<LoanId, Loan>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books a freshly opened loan. The caller must already hold the copy
    /// claim; a duplicate id means the id generator misbehaved.
    pub fn open(&self, loan: Loan) -> CircResult<Loan> {
        match self.loans.entry(loan.id.clone()) {
            Entry::Occupied(_) => Err(CircError::InvariantViolation(format!(
                "duplicate loan id {}",
                loan.id
            ))),
            Entry::Vacant(slot) => {
                debug!(loan = %loan.id, copy = %loan.copy, "loan opened");
                slot.insert(loan.clone());
                Ok(loan)
            }
        }
    }

    pub fn get(&self, id: &LoanId) -> CircResult<Loan> {
        self.loans
            .get(id)
            .map(|entry| entry.clone())
            .ok_or_else(|| CircError::LoanNotFound(id.clone()))
    }

    /// Active -> Overdue when past due as of the given date. Idempotent:
    /// returns whether this call performed the flip. The status re-check
    /// happens under the entry lock, so a loan closed by a concurrent
    /// return is left alone.
    pub fn mark_overdue(&self, id: &LoanId, as_of: NaiveDate) -> CircResult<bool> {
        let mut entry = self
            .loans
            .get_mut(id)
            .ok_or_else(|| CircError::LoanNotFound(id.clone()))?;
        if entry.status == LoanStatus::Active && entry.due_on < as_of {
            entry.status = LoanStatus::Overdue;
            debug!(loan = %id, "loan flagged overdue");
            return Ok(true);
        }
        Ok(false)
    }

    /// Extends the due date and counts the renewal. Allowed from Active or
    /// Overdue; renewing an Overdue loan returns it to Active.
    pub fn renew(&self, id: &LoanId, extension_days: u32, max_renewals: u32) -> CircResult<Loan> {
        let mut entry = self
            .loans
            .get_mut(id)
            .ok_or_else(|| CircError::LoanNotFound(id.clone()))?;
        if entry.status.is_terminal() {
            return Err(CircError::LoanNotActive(id.clone()));
        }
        if entry.renewals >= max_renewals {
            return Err(CircError::RenewalLimitExceeded(id.clone()));
        }
        entry.due_on = entry.due_on + Days::new(u64::from(extension_days));
        entry.renewals += 1;
        entry.status = LoanStatus::Active;
        debug!(loan = %id, due_on = %entry.due_on, renewals = entry.renewals, "loan renewed");
        Ok(entry.clone())
    }

    /// Active or Overdue -> Returned.
    pub fn close(&self, id: &LoanId, returned_at: DateTime<Utc>) -> CircResult<Loan> {
        self.terminate(id, LoanStatus::Returned, Some(returned_at))
    }

    /// Active or Overdue -> Cancelled (administrative path, e.g. copy lost).
    pub fn cancel(&self, id: &LoanId) -> CircResult<Loan> {
        self.terminate(id, LoanStatus::Cancelled, None)
    }

    fn terminate(
        &self,
        id: &LoanId,
        status: LoanStatus,
        returned_at: Option<DateTime<Utc>>,
    ) -> CircResult<Loan> {
        let mut entry = self
            .loans
            .get_mut(id)
            .ok_or_else(|| CircError::LoanNotFound(id.clone()))?;
        if entry.status.is_terminal() {
            return Err(CircError::AlreadyClosed(id.clone()));
        }
        entry.status = status;
        entry.returned_at = returned_at;
        debug!(loan = %id, ?status, "loan closed");
        Ok(entry.clone())
    }

    /// The open (claim-holding) loan on a copy, if any. The engine keeps
    /// this at most one; seeing two is an invariant violation upstream.
    pub fn open_loan_for_copy(&self, copy: &CopyId) -> Option<Loan> {
        self.loans
            .iter()
            .find(|entry| entry.copy == *copy && entry.is_open())
            .map(|entry| entry.clone())
    }

    /// Ids of Active loans due strictly before `as_of`, for the sweep.
    pub fn due_before(&self, as_of: NaiveDate) -> Vec<LoanId> {
        self.loans
            .iter()
            .filter(|entry| entry.status == LoanStatus::Active && entry.due_on < as_of)
            .map(|entry| entry.id.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<Loan> {
        self.sorted(self.loans.iter().map(|entry| entry.clone()).collect())
    }

    pub fn by_patron(&self, patron: &PatronId) -> Vec<Loan> {
        self.filtered(|loan| loan.patron == *patron)
    }

    pub fn with_status(&self, status: LoanStatus) -> Vec<Loan> {
        self.filtered(|loan| loan.status == status)
    }

    pub fn count_with_status(&self, status: LoanStatus) -> usize {
        self.loans
            .iter()
            .filter(|entry| entry.status == status)
            .count()
    }

    fn filtered(&self, keep: impl Fn(&Loan) -> bool) -> Vec<Loan> {
        self.sorted(
            self.loans
                .iter()
                .filter(|entry| keep(entry.value()))
                .map(|entry| entry.clone())
                .collect(),
        )
    }

    fn sorted(&self, mut loans: Vec<Loan>) -> Vec<Loan> {
        loans.sort_by(|a, b| {
            a.checked_out_at
                .cmp(&b.checked_out_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        loans
    }
}
