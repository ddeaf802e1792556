//! Circulation entities.

pub mod copy;
pub mod fine;
pub mod loan;
pub mod patron;

pub use copy::{Condition, Copy, WorkSummary};
pub use fine::{Fine, FineKind, FineStatus};
pub use loan::{Loan, LoanStatus};
pub use patron::Patron;
