//! Patron records as served by the Patron Directory port.

use serde::{Deserialize, Serialize};

use crate::ident::PatronId;

/// Identity and standing of a library member. Owned by the directory;
/// the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patron {
    pub id: PatronId,
    pub name: String,
    pub active: bool,
}
