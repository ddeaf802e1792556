//! Error taxonomy for circulation operations.
//!
//! Every engine operation returns one of these kinds rather than a raw
//! fault. `NotFound` and `PolicyViolation` are ordinary outcomes the
//! presentation layer reports to the caller. `Conflict` is expected under
//! concurrency (losing the race for a copy) and is never retried by the
//! engine. `Invariant` means the atomicity guarantee was broken and the
//! operation aborted without partial commit.

use thiserror::Error;

use crate::ident::{CopyId, FineId, LoanId, PatronId};

/// Coarse classification of a [`CircError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PolicyViolation,
    Invariant,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CircError {
    #[error("copy not found: {0}")]
    CopyNotFound(CopyId),
    #[error("loan not found: {0}")]
    LoanNotFound(LoanId),
    #[error("patron not found: {0}")]
    PatronNotFound(PatronId),
    #[error("fine not found: {0}")]
    FineNotFound(FineId),

    #[error("copy is already on loan: {0}")]
    AlreadyClaimed(CopyId),
    #[error("copy is already available: {0}")]
    AlreadyAvailable(CopyId),
    #[error("loan is already closed: {0}")]
    AlreadyClosed(LoanId),
    #[error("late fine already assessed for loan {0}")]
    AlreadyAssessed(LoanId),
    #[error("fine is already settled: {0}")]
    FineSettled(FineId),

    #[error("patron is inactive: {0}")]
    PatronInactive(PatronId),
    #[error("patron has outstanding fines: {0}")]
    OutstandingFines(PatronId),
    #[error("renewal limit reached for loan {0}")]
    RenewalLimitExceeded(LoanId),
    #[error("loan is not active: {0}")]
    LoanNotActive(LoanId),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl CircError {
    pub fn kind(&self) -> ErrorKind {
        use CircError::*;
        match self {
            CopyNotFound(_) | LoanNotFound(_) | PatronNotFound(_) | FineNotFound(_) => {
                ErrorKind::NotFound
            }
            AlreadyClaimed(_) | AlreadyAvailable(_) | AlreadyClosed(_) | AlreadyAssessed(_)
            | FineSettled(_) => ErrorKind::Conflict,
            PatronInactive(_) | OutstandingFines(_) | RenewalLimitExceeded(_)
            | LoanNotActive(_) => ErrorKind::PolicyViolation,
            InvariantViolation(_) => ErrorKind::Invariant,
        }
    }
}

pub type CircResult<T> = Result<T, CircError>;
