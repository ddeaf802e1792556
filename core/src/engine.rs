//! The **Circulation Engine**: the orchestrator and the only component
//! exposed to the presentation layer.
//!
//! The unit of mutual exclusion is the copy. Checkout, return, and cancel
//! each run under that copy's keyed lock, so the ledger write and the loan
//! write land as one atomically-visible unit per copy while operations on
//! distinct copies proceed in parallel. The overdue sweep takes no copy
//! lock at all: it only flips Active -> Overdue under per-loan entry locks
//! and re-checks status at write time, so a racing return always wins.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use circ_common::clock::Clock;
use circ_common::config::CirculationPolicy;
use circ_common::error::{CircError, CircResult};
use circ_common::ident::{CopyId, FineId, IdGenerator, LoanId, PatronId};
use circ_common::model::{Copy, Fine, FineKind, FineStatus, Loan, LoanStatus};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::eligibility::EligibilityChecker;
use crate::fines::FinePolicy;
use crate::ledger::CopyLedger;
use crate::loans::LoanStore;
use crate::ports::{Catalog, PatronDirectory};

/// Result of a return: the closed loan plus the late fine, if one was due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnOutcome {
    pub loan: Loan,
    pub fine: Option<Fine>,
}

/// Read-only projection of a loan for display: the loan itself plus the
/// late/days-late figures and catalog context the presentation layer
/// shows next to it.
#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub loan: Loan,
    pub is_late: bool,
    pub days_late: i64,
    pub barcode: Option<String>,
    pub work_title: Option<String>,
}

/// Serializable engine state, for persistence between CLI invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub copies: Vec<Copy>,
    pub loans: Vec<Loan>,
    pub fines: Vec<Fine>,
}

pub struct CirculationEngine {
    policy: CirculationPolicy,
    ledger: CopyLedger,
    loans: LoanStore,
    fines: FinePolicy,
    eligibility: EligibilityChecker,
    catalog: Arc<dyn Catalog>,
    directory: Arc<dyn PatronDirectory>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    copy_locks: DashMap<CopyId, Arc<Mutex<()>>>,
}

impl CirculationEngine {
    pub fn new(
        policy: CirculationPolicy,
        catalog: Arc<dyn Catalog>,
        directory: Arc<dyn PatronDirectory>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            policy,
            ledger: CopyLedger::new(),
            loans: LoanStore::new(),
            fines: FinePolicy::new(),
            eligibility: EligibilityChecker::new(directory.clone()),
            catalog,
            directory,
            clock,
            ids,
            copy_locks: DashMap::new(),
        }
    }

    pub fn policy(&self) -> &CirculationPolicy {
        &self.policy
    }

    /// Admits a copy into the ledger. No-op for copies already tracked.
    pub fn register_copy(&self, copy: Copy) -> bool {
        self.ledger.register(copy)
    }

    fn copy_lock(&self, id: &CopyId) -> Arc<Mutex<()>> {
        self.copy_locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Issues a loan: eligibility, then claim, then loan creation, as one
    /// unit under the copy's lock. A claim that cannot be paired with a
    /// loan is rolled back before the error surfaces.
    pub async fn checkout(
        &self,
        copy_id: &CopyId,
        patron_id: &PatronId,
        loan_period_days: Option<u32>,
    ) -> CircResult<Loan> {
        let days = loan_period_days.unwrap_or(self.policy.loan_period_days);
        let lock = self.copy_lock(copy_id);
        let _guard = lock.lock().await;

        self.eligibility.can_checkout(patron_id, &self.fines).await?;

        // Copies the catalog knows about but the ledger has not seen yet
        // are admitted lazily.
        if !self.ledger.contains(copy_id) {
            if let Some(copy) = self.catalog.copy(copy_id).await {
                self.ledger.register(copy);
            }
        }

        let copy = self.ledger.claim(copy_id)?;

        if let Some(orphan) = self.loans.open_loan_for_copy(copy_id) {
            // The copy was available while a loan still held it: the
            // pairing invariant is broken. Undo the claim and abort.
            let _ = self.ledger.release(copy_id);
            let msg = format!("open loan {} on available copy {copy_id}", orphan.id);
            error!(%msg, "invariant violation");
            return Err(CircError::InvariantViolation(msg));
        }

        let now = self.clock.now();
        let loan = Loan {
            id: self.ids.loan_id(),
            copy: copy.id.clone(),
            patron: patron_id.clone(),
            checked_out_at: now,
            due_on: now.date_naive() + Days::new(u64::from(days)),
            returned_at: None,
            renewals: 0,
            status: LoanStatus::Active,
            notes: None,
        };

        match self.loans.open(loan) {
            Ok(loan) => {
                info!(loan = %loan.id, copy = %copy_id, patron = %patron_id, due_on = %loan.due_on, "checkout");
                Ok(loan)
            }
            Err(err) => {
                // The claim must never outlive a failed checkout.
                if let Err(release_err) = self.ledger.release(copy_id) {
                    error!(copy = %copy_id, %release_err, "claim rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Closes the loan, releases the claim, and assesses the late fine,
    /// atomically under the copy's lock.
    pub async fn return_copy(
        &self,
        loan_id: &LoanId,
        returned_at: Option<DateTime<Utc>>,
    ) -> CircResult<ReturnOutcome> {
        let copy_id = self.loans.get(loan_id)?.copy;
        let lock = self.copy_lock(&copy_id);
        let _guard = lock.lock().await;

        // Re-read under the lock; the loan may have closed while waiting.
        let loan = self.loans.get(loan_id)?;
        if loan.status.is_terminal() {
            return Err(CircError::AlreadyClosed(loan_id.clone()));
        }
        if self.ledger.is_available(&copy_id)? {
            let msg = format!("open loan {loan_id} but copy {copy_id} is not claimed");
            error!(%msg, "invariant violation");
            return Err(CircError::InvariantViolation(msg));
        }

        let returned_at = returned_at.unwrap_or_else(|| self.clock.now());
        let closed = self.loans.close(loan_id, returned_at)?;
        self.ledger.release(&copy_id)?;

        let fine = self.fines.assess_late_return(
            &closed,
            returned_at.date_naive(),
            self.policy.per_day_rate_cents,
            self.ids.fine_id(),
            self.clock.now(),
        )?;

        info!(loan = %loan_id, copy = %copy_id, late_fine = fine.is_some(), "return");
        Ok(ReturnOutcome { loan: closed, fine })
    }

    /// Extends a loan. Does not touch the claim, so no copy lock is taken.
    pub async fn renew(&self, loan_id: &LoanId, extension_days: Option<u32>) -> CircResult<Loan> {
        let days = extension_days.unwrap_or(self.policy.renewal_extension_days);
        let loan = self.loans.get(loan_id)?;
        self.eligibility.can_renew(&loan, self.policy.max_renewals)?;
        let renewed = self.loans.renew(loan_id, days, self.policy.max_renewals)?;
        info!(loan = %loan_id, due_on = %renewed.due_on, renewals = renewed.renewals, "renewal");
        Ok(renewed)
    }

    /// Administrative closure (e.g. copy lost): cancels the loan and
    /// releases the claim under the copy's lock.
    pub async fn cancel_loan(&self, loan_id: &LoanId) -> CircResult<Loan> {
        let copy_id = self.loans.get(loan_id)?.copy;
        let lock = self.copy_lock(&copy_id);
        let _guard = lock.lock().await;

        let loan = self.loans.get(loan_id)?;
        if loan.status.is_terminal() {
            return Err(CircError::AlreadyClosed(loan_id.clone()));
        }
        if self.ledger.is_available(&copy_id)? {
            let msg = format!("open loan {loan_id} but copy {copy_id} is not claimed");
            error!(%msg, "invariant violation");
            return Err(CircError::InvariantViolation(msg));
        }

        let cancelled = self.loans.cancel(loan_id)?;
        self.ledger.release(&copy_id)?;
        warn!(loan = %loan_id, copy = %copy_id, "loan cancelled");
        Ok(cancelled)
    }

    /// Flags every Active loan due strictly before `as_of` as Overdue and
    /// returns how many were flipped. Safe to run concurrently with
    /// checkouts and returns: ownership of the copy never changes here.
    pub fn sweep_overdue(&self, as_of: NaiveDate) -> usize {
        let mut flagged = 0;
        for loan_id in self.loans.due_before(as_of) {
            // A return may close the loan between the scan and this write;
            // mark_overdue re-checks and reports false in that case.
            if matches!(self.loans.mark_overdue(&loan_id, as_of), Ok(true)) {
                flagged += 1;
            }
        }
        if flagged > 0 {
            info!(flagged, %as_of, "overdue sweep");
        }
        flagged
    }

    // ---- read-only views -------------------------------------------------

    pub async fn loan_view(&self, loan_id: &LoanId) -> CircResult<LoanView> {
        let loan = self.loans.get(loan_id)?;
        Ok(self.project(loan).await)
    }

    pub async fn loans_all(&self) -> Vec<LoanView> {
        self.project_all(self.loans.all()).await
    }

    pub async fn loans_for_patron(&self, patron: &PatronId) -> Vec<LoanView> {
        self.project_all(self.loans.by_patron(patron)).await
    }

    pub async fn loans_with_status(&self, status: LoanStatus) -> Vec<LoanView> {
        self.project_all(self.loans.with_status(status)).await
    }

    pub fn count_loans_with_status(&self, status: LoanStatus) -> usize {
        self.loans.count_with_status(status)
    }

    pub fn copies(&self) -> Vec<Copy> {
        self.ledger.all()
    }

    pub fn copy_available(&self, copy_id: &CopyId) -> CircResult<bool> {
        self.ledger.is_available(copy_id)
    }

    async fn project_all(&self, loans: Vec<Loan>) -> Vec<LoanView> {
        let mut views = Vec::with_capacity(loans.len());
        for loan in loans {
            views.push(self.project(loan).await);
        }
        views
    }

    async fn project(&self, loan: Loan) -> LoanView {
        let copy = self.ledger.get(&loan.copy);
        let work_title = match &copy {
            Some(copy) => self.catalog.work(&copy.work).await.map(|work| work.title),
            None => None,
        };
        let days_late = loan.days_late_on(self.clock.today());
        LoanView {
            is_late: days_late > 0,
            days_late,
            barcode: copy.map(|copy| copy.barcode),
            work_title,
            loan,
        }
    }

    // ---- fines -----------------------------------------------------------

    pub fn fine(&self, id: &FineId) -> CircResult<Fine> {
        self.fines.get(id)
    }

    pub fn fines_all(&self) -> Vec<Fine> {
        self.fines.all()
    }

    pub fn fines_for_patron(&self, patron: &PatronId) -> Vec<Fine> {
        self.fines.by_patron(patron)
    }

    pub fn fines_pending(&self) -> Vec<Fine> {
        self.fines.pending()
    }

    pub fn fines_pending_for(&self, patron: &PatronId) -> Vec<Fine> {
        self.fines.pending_by_patron(patron)
    }

    pub fn pending_total_cents(&self, patron: Option<&PatronId>) -> i64 {
        self.fines.pending_total_cents(patron)
    }

    pub fn pay_fine(&self, id: &FineId) -> CircResult<Fine> {
        let paid = self.fines.mark_paid(id, self.clock.now())?;
        info!(fine = %id, amount_cents = paid.amount_cents, "fine paid");
        Ok(paid)
    }

    pub fn cancel_fine(&self, id: &FineId) -> CircResult<Fine> {
        let cancelled = self.fines.cancel(id)?;
        info!(fine = %id, "fine cancelled");
        Ok(cancelled)
    }

    /// Books a fine not derived from a loan event (damage, loss, other).
    pub async fn issue_fine(
        &self,
        patron_id: &PatronId,
        kind: FineKind,
        amount_cents: i64,
        description: String,
    ) -> CircResult<Fine> {
        self.directory
            .patron(patron_id)
            .await
            .ok_or_else(|| CircError::PatronNotFound(patron_id.clone()))?;
        let fine = Fine {
            id: self.ids.fine_id(),
            loan: None,
            patron: patron_id.clone(),
            kind,
            amount_cents,
            issued_at: self.clock.now(),
            paid_at: None,
            status: FineStatus::Pending,
            description,
        };
        Ok(self.fines.issue(fine))
    }

    // ---- persistence -----------------------------------------------------

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            copies: self.ledger.all(),
            loans: self.loans.all(),
            fines: self.fines.all(),
        }
    }

    /// Loads a previously captured snapshot. Meant for a fresh engine;
    /// entities already present keep their live state.
    pub fn restore(&self, snapshot: EngineSnapshot) -> CircResult<()> {
        for copy in snapshot.copies {
            self.ledger.register(copy);
        }
        for loan in snapshot.loans {
            self.loans.open(loan)?;
        }
        for fine in snapshot.fines {
            self.fines.issue(fine);
        }
        Ok(())
    }
}
