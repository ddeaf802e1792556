//! File-backed state for the CLI.
//!
//! The library fixture is read-only input (works, copies, patrons); the
//! engine snapshot is loaded before and written after every mutating
//! command. The core prescribes no wire format; JSON is a presentation
//! choice.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use circ_common::config::CirculationPolicy;
use circ_common::model::{Copy, Patron, WorkSummary};
use circ_core::engine::EngineSnapshot;

#[derive(Debug, Default, Deserialize)]
pub struct LibraryFile {
    #[serde(default)]
    pub works: Vec<WorkSummary>,
    #[serde(default)]
    pub copies: Vec<Copy>,
    #[serde(default)]
    pub patrons: Vec<Patron>,
}

/// Missing fixture is an empty library; loan/fine listings still work
/// against a previously saved state.
pub fn load_library(path: &Path) -> anyhow::Result<LibraryFile> {
    if !path.exists() {
        return Ok(LibraryFile::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading library file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing library file {}", path.display()))
}

pub fn load_state(path: &Path) -> anyhow::Result<Option<EngineSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading state file {}", path.display()))?;
    let snapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing state file {}", path.display()))?;
    Ok(Some(snapshot))
}

pub fn save_state(path: &Path, snapshot: &EngineSnapshot) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating state directory {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, body).with_context(|| format!("writing state file {}", path.display()))
}

pub fn load_policy(path: Option<&Path>) -> anyhow::Result<CirculationPolicy> {
    let Some(path) = path else {
        return Ok(CirculationPolicy::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading policy file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing policy file {}", path.display()))
}
