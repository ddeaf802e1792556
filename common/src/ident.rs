//! Typed identifiers and the id-generation capability.
//!
//! Entities cross-reference each other by identifier only (no embedded
//! object graphs), so ids get their own types to keep a `LoanId` from
//! ever being handed to a copy lookup.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }
    };
}

entity_id!(
    /// A physical, individually trackable instance of a catalogued work.
    CopyId
);
entity_id!(
    /// One borrowing transaction.
    LoanId
);
entity_id!(
    /// A monetary penalty record.
    FineId
);
entity_id!(PatronId);
entity_id!(WorkId);

/// Source of fresh loan and fine identifiers.
///
/// Injected into the engine so tests can supply deterministic ids.
pub trait IdGenerator: Send + Sync {
    fn loan_id(&self) -> LoanId;
    fn fine_id(&self) -> FineId;
}

/// Production generator: prefix, wall-clock millis, random suffix.
#[derive(Debug, Default)]
pub struct WallClockIds;

impl WallClockIds {
    fn generate(prefix: &str) -> String {
        let suffix = Alphanumeric
            .sample_string(&mut rand::rng(), 4)
            .to_ascii_lowercase();
        format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), suffix)
    }
}

impl IdGenerator for WallClockIds {
    fn loan_id(&self) -> LoanId {
        LoanId::new(Self::generate("LN"))
    }

    fn fine_id(&self) -> FineId {
        FineId::new(Self::generate("FN"))
    }
}

/// Deterministic generator for tests: `LN-1`, `LN-2`, `FN-1`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    loans: AtomicU64,
    fines: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn loan_id(&self) -> LoanId {
        LoanId::new(format!("LN-{}", self.loans.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn fine_id(&self) -> FineId {
        FineId::new(format!("FN-{}", self.fines.fetch_add(1, Ordering::Relaxed) + 1))
    }
}
