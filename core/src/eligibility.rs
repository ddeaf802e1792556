//! The **Eligibility Checker**: gatekeeper for checkout and renewal.

use std::sync::Arc;

use circ_common::error::{CircError, CircResult};
use circ_common::ident::PatronId;
use circ_common::model::Loan;
use tracing::debug;

use crate::fines::FinePolicy;
use crate::ports::PatronDirectory;

pub struct EligibilityChecker {
    directory: Arc<dyn PatronDirectory>,
}

impl EligibilityChecker {
    pub fn new(directory: Arc<dyn PatronDirectory>) -> Self {
        Self { directory }
    }

    /// A patron may check out when they exist, are active, and carry no
    /// pending fine, neither in the engine's own fine book nor in an
    /// external billing system. The fines gate applies on every checkout
    /// path.
    pub async fn can_checkout(&self, patron: &PatronId, fines: &FinePolicy) -> CircResult<()> {
        let record = self
            .directory
            .patron(patron)
            .await
            .ok_or_else(|| CircError::PatronNotFound(patron.clone()))?;
        if !record.active {
            debug!(patron = %patron, "checkout refused: inactive patron");
            return Err(CircError::PatronInactive(patron.clone()));
        }
        if fines.has_pending(patron) || self.directory.has_pending_fines(patron).await {
            debug!(patron = %patron, "checkout refused: outstanding fines");
            return Err(CircError::OutstandingFines(patron.clone()));
        }
        Ok(())
    }

    /// Renewal is refused on terminal loans and past the renewal cap.
    /// The cap is enforced again inside the state machine's `renew`; this
    /// check exists so a refusal never reaches the mutation path.
    pub fn can_renew(&self, loan: &Loan, max_renewals: u32) -> CircResult<()> {
        if loan.status.is_terminal() {
            return Err(CircError::LoanNotActive(loan.id.clone()));
        }
        if loan.renewals >= max_renewals {
            return Err(CircError::RenewalLimitExceeded(loan.id.clone()));
        }
        Ok(())
    }
}
