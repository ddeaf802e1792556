//! Shared fixture: an engine wired with in-memory ports, a pinned clock,
//! and deterministic ids.
//!
//! Seeded world: one work (W1), two copies of it (C1, C2), two active
//! patrons (P1, P2) and one inactive patron (P3). The clock starts at
//! 2026-03-01 10:00 UTC; tests move time with `clock.advance_days`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use circ_common::clock::FixedClock;
use circ_common::config::CirculationPolicy;
use circ_common::ident::SequentialIds;
use circ_common::model::{Condition, Copy, Patron, WorkSummary};
use circ_core::engine::CirculationEngine;
use circ_core::ports::{InMemoryCatalog, InMemoryDirectory};

pub struct Fixture {
    pub engine: CirculationEngine,
    pub clock: Arc<FixedClock>,
}

pub fn engine() -> Fixture {
    engine_with(CirculationPolicy::default())
}

pub fn engine_with(policy: CirculationPolicy) -> Fixture {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.add_work(WorkSummary {
        id: "W1".into(),
        title: "The Count of Monte Cristo".into(),
    });
    catalog.add_copy(copy("C1", "BC-0001"));
    catalog.add_copy(copy("C2", "BC-0002"));

    let directory = Arc::new(InMemoryDirectory::new());
    directory.add_patron(patron("P1", "Ada", true));
    directory.add_patron(patron("P2", "Brent", true));
    directory.add_patron(patron("P3", "Cleo", false));

    let clock = Arc::new(FixedClock::at(
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
    ));

    let engine = CirculationEngine::new(
        policy,
        catalog,
        directory,
        clock.clone(),
        Arc::new(SequentialIds::default()),
    );
    engine.register_copy(copy("C1", "BC-0001"));
    engine.register_copy(copy("C2", "BC-0002"));

    Fixture { engine, clock }
}

/// Same wiring, but with an empty ledger. Used to exercise snapshot
/// restoration into a cold engine.
pub fn empty_engine() -> Fixture {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.add_work(WorkSummary {
        id: "W1".into(),
        title: "The Count of Monte Cristo".into(),
    });

    let directory = Arc::new(InMemoryDirectory::new());
    directory.add_patron(patron("P1", "Ada", true));
    directory.add_patron(patron("P2", "Brent", true));

    let clock = Arc::new(FixedClock::at(
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
    ));

    let engine = CirculationEngine::new(
        CirculationPolicy::default(),
        catalog,
        directory,
        clock.clone(),
        Arc::new(SequentialIds::default()),
    );

    Fixture { engine, clock }
}

pub fn copy(id: &str, barcode: &str) -> Copy {
    Copy {
        id: id.into(),
        work: "W1".into(),
        barcode: barcode.into(),
        condition: Condition::Good,
        available: true,
    }
}

fn patron(id: &str, name: &str, active: bool) -> Patron {
    Patron {
        id: id.into(),
        name: name.into(),
        active,
    }
}
