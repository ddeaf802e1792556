//! External collaborators of the engine.
//!
//! The engine depends on these abstractions, never on a concrete catalog
//! or membership system; the in-memory implementations below back the CLI
//! and the test suite.

use async_trait::async_trait;
use circ_common::ident::{CopyId, PatronId, WorkId};
use circ_common::model::{Copy, Patron, WorkSummary};
use dashmap::DashMap;

/// Copy and work metadata, owned by catalog management.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn copy(&self, id: &CopyId) -> Option<Copy>;

    /// Title lookup, for display only.
    async fn work(&self, id: &WorkId) -> Option<WorkSummary>;
}

/// Patron identity and standing, owned by the membership system.
#[async_trait]
pub trait PatronDirectory: Send + Sync {
    async fn patron(&self, id: &PatronId) -> Option<Patron>;

    /// Pending fines known to an external billing system. Fines the
    /// engine issued itself are checked against its own fine book; this
    /// covers debts booked elsewhere.
    async fn has_pending_fines(&self, id: &PatronId) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    copies: DashMap<CopyId, Copy>,
    works: DashMap<WorkId, WorkSummary>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_copy(&self, copy: Copy) {
        self.copies.insert(copy.id.clone(), copy);
    }

    pub fn add_work(&self, work: WorkSummary) {
        self.works.insert(work.id.clone(), work);
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn copy(&self, id: &CopyId) -> Option<Copy> {
        self.copies.get(id).map(|entry| entry.clone())
    }

    async fn work(&self, id: &WorkId) -> Option<WorkSummary> {
        self.works.get(id).map(|entry| entry.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    patrons: DashMap<PatronId, Patron>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_patron(&self, patron: Patron) {
        self.patrons.insert(patron.id.clone(), patron);
    }
}

#[async_trait]
impl PatronDirectory for InMemoryDirectory {
    async fn patron(&self, id: &PatronId) -> Option<Patron> {
        self.patrons.get(id).map(|entry| entry.clone())
    }

    async fn has_pending_fines(&self, _id: &PatronId) -> bool {
        // No external billing in the in-memory directory.
        false
    }
}
