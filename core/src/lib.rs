//! The circulation engine.
//!
//! Components, leaves first: the [`ledger`] owns copy availability, the
//! [`loans`] module owns the loan lifecycle, [`fines`] computes and books
//! penalties, [`eligibility`] gatekeeps requests, and [`engine`] composes
//! the four behind the only surface the presentation layer sees. External
//! collaborators (catalog, patron directory) enter through [`ports`].

pub mod eligibility;
pub mod engine;
pub mod fines;
pub mod ledger;
pub mod loans;
pub mod ports;
