//! The **Copy Ledger**: availability authority for physical copies.
//!
//! The single source of truth for "is this copy loanable right now."
//! Every successful claim/release is paired 1:1 with a loan opening or
//! closure by the engine; nothing else may mutate the flag.

use circ_common::error::{CircError, CircResult};
use circ_common::ident::CopyId;
use circ_common::model::Copy;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CopyLedger {
    copies: DashMap<CopyId, Copy>,
}

impl CopyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a copy the ledger has not seen. Returns false (and leaves
    /// the stored record alone) if the copy is already tracked, so a
    /// re-registration never clobbers live availability state.
    pub fn register(&self, copy: Copy) -> bool {
        match self.copies.entry(copy.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(copy);
                true
            }
        }
    }

    pub fn get(&self, id: &CopyId) -> Option<Copy> {
        self.copies.get(id).map(|entry| entry.clone())
    }

    pub fn contains(&self, id: &CopyId) -> bool {
        self.copies.contains_key(id)
    }

    pub fn is_available(&self, id: &CopyId) -> CircResult<bool> {
        self.copies
            .get(id)
            .map(|entry| entry.available)
            .ok_or_else(|| CircError::CopyNotFound(id.clone()))
    }

    /// Atomically transitions available -> unavailable.
    ///
    /// Two concurrent claims on the same copy are totally ordered by the
    /// per-key entry lock: exactly one sees the flag set, the other gets
    /// `AlreadyClaimed`. Claims on distinct copies never contend.
    pub fn claim(&self, id: &CopyId) -> CircResult<Copy> {
        let mut entry = self
            .copies
            .get_mut(id)
            .ok_or_else(|| CircError::CopyNotFound(id.clone()))?;
        if !entry.available {
            return Err(CircError::AlreadyClaimed(id.clone()));
        }
        entry.available = false;
        debug!(copy = %id, "copy claimed");
        Ok(entry.clone())
    }

    /// Transitions unavailable -> available.
    ///
    /// Releasing an already-available copy signals a caller bug
    /// (`AlreadyAvailable`), not a retryable condition.
    pub fn release(&self, id: &CopyId) -> CircResult<Copy> {
        let mut entry = self
            .copies
            .get_mut(id)
            .ok_or_else(|| CircError::CopyNotFound(id.clone()))?;
        if entry.available {
            return Err(CircError::AlreadyAvailable(id.clone()));
        }
        entry.available = true;
        debug!(copy = %id, "copy released");
        Ok(entry.clone())
    }

    /// All tracked copies, ordered by id.
    pub fn all(&self) -> Vec<Copy> {
        let mut copies: Vec<Copy> = self.copies.iter().map(|entry| entry.clone()).collect();
        copies.sort_by(|a, b| a.id.cmp(&b.id));
        copies
    }
}
