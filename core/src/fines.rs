//! The **Fine Policy**: deterministic penalty computation and the fine book.

use chrono::{DateTime, NaiveDate, Utc};
use circ_common::error::{CircError, CircResult};
use circ_common::ident::{FineId, LoanId, PatronId};
use circ_common::model::{Fine, FineKind, FineStatus, Loan};
use dashmap::DashMap;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct FinePolicy {
    fines: DashMap<FineId, Fine>,
}

impl FinePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assesses a late return: `days_late * per_day_rate` for whole days
    /// past due, nothing on an on-time return. Deterministic given the
    /// same loan and return date. A loan's return event happens exactly
    /// once, so a second assessment is rejected rather than silently
    /// duplicating a fine.
    pub fn assess_late_return(
        &self,
        loan: &Loan,
        returned_on: NaiveDate,
        per_day_rate_cents: i64,
        id: FineId,
        issued_at: DateTime<Utc>,
    ) -> CircResult<Option<Fine>> {
        if self.late_fine_for_loan(&loan.id).is_some() {
            return Err(CircError::AlreadyAssessed(loan.id.clone()));
        }

        let days_late = (returned_on - loan.due_on).num_days().max(0);
        if days_late == 0 {
            return Ok(None);
        }

        let fine = Fine {
            id,
            loan: Some(loan.id.clone()),
            patron: loan.patron.clone(),
            kind: FineKind::LateReturn,
            amount_cents: days_late * per_day_rate_cents,
            issued_at,
            paid_at: None,
            status: FineStatus::Pending,
            description: format!("Late return: {days_late} day(s) past due"),
        };
        info!(fine = %fine.id, loan = %loan.id, days_late, amount_cents = fine.amount_cents, "late fine issued");
        self.fines.insert(fine.id.clone(), fine.clone());
        Ok(Some(fine))
    }

    /// Books a fine not derived from a loan event (damage, loss, other).
    pub fn issue(&self, fine: Fine) -> Fine {
        debug!(fine = %fine.id, patron = %fine.patron, "fine issued");
        self.fines.insert(fine.id.clone(), fine.clone());
        fine
    }

    /// Pending -> Paid. Settled fines are immutable.
    pub fn mark_paid(&self, id: &FineId, paid_at: DateTime<Utc>) -> CircResult<Fine> {
        let mut entry = self
            .fines
            .get_mut(id)
            .ok_or_else(|| CircError::FineNotFound(id.clone()))?;
        if entry.status != FineStatus::Pending {
            return Err(CircError::FineSettled(id.clone()));
        }
        entry.status = FineStatus::Paid;
        entry.paid_at = Some(paid_at);
        Ok(entry.clone())
    }

    /// Pending -> Cancelled.
    pub fn cancel(&self, id: &FineId) -> CircResult<Fine> {
        let mut entry = self
            .fines
            .get_mut(id)
            .ok_or_else(|| CircError::FineNotFound(id.clone()))?;
        if entry.status != FineStatus::Pending {
            return Err(CircError::FineSettled(id.clone()));
        }
        entry.status = FineStatus::Cancelled;
        Ok(entry.clone())
    }

    pub fn get(&self, id: &FineId) -> CircResult<Fine> {
        self.fines
            .get(id)
            .map(|entry| entry.clone())
            .ok_or_else(|| CircError::FineNotFound(id.clone()))
    }

    pub fn has_pending(&self, patron: &PatronId) -> bool {
        self.fines
            .iter()
            .any(|entry| entry.patron == *patron && entry.is_pending())
    }

    pub fn all(&self) -> Vec<Fine> {
        self.sorted(self.fines.iter().map(|entry| entry.clone()).collect())
    }

    pub fn by_patron(&self, patron: &PatronId) -> Vec<Fine> {
        self.filtered(|fine| fine.patron == *patron)
    }

    pub fn pending(&self) -> Vec<Fine> {
        self.filtered(Fine::is_pending)
    }

    pub fn pending_by_patron(&self, patron: &PatronId) -> Vec<Fine> {
        self.filtered(|fine| fine.patron == *patron && fine.is_pending())
    }

    /// Sum of pending amounts, over everyone or one patron.
    pub fn pending_total_cents(&self, patron: Option<&PatronId>) -> i64 {
        self.fines
            .iter()
            .filter(|entry| entry.is_pending())
            .filter(|entry| patron.is_none_or(|p| entry.patron == *p))
            .map(|entry| entry.amount_cents)
            .sum()
    }

    fn late_fine_for_loan(&self, loan: &LoanId) -> Option<Fine> {
        self.fines
            .iter()
            .find(|entry| entry.kind == FineKind::LateReturn && entry.loan.as_ref() == Some(loan))
            .map(|entry| entry.clone())
    }

    fn filtered(&self, keep: impl Fn(&Fine) -> bool) -> Vec<Fine> {
        self.sorted(
            self.fines
                .iter()
                .filter(|entry| keep(entry.value()))
                .map(|entry| entry.clone())
                .collect(),
        )
    }

    fn sorted(&self, mut fines: Vec<Fine>) -> Vec<Fine> {
        fines.sort_by(|a, b| a.issued_at.cmp(&b.issued_at).then_with(|| a.id.cmp(&b.id)));
        fines
    }
}
