use chrono::{NaiveDate, Utc};
use tracing::info;

use circ_core::engine::CirculationEngine;

pub fn run(engine: &CirculationEngine, as_of: Option<NaiveDate>) -> anyhow::Result<bool> {
    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let flagged = engine.sweep_overdue(as_of);

    if flagged == 0 {
        info!("no loans past due as of {as_of}");
    } else {
        info!("{flagged} loan(s) flagged overdue as of {as_of}");
    }
    Ok(flagged > 0)
}
