use colored::Colorize;
use tracing::info;

use circ_common::ident::{CopyId, PatronId};
use circ_core::engine::CirculationEngine;

use crate::commands::{loans, report_refusal};

pub async fn run(
    engine: &CirculationEngine,
    copy: &str,
    patron: &str,
    days: Option<u32>,
) -> anyhow::Result<bool> {
    let copy_id = CopyId::from(copy);
    let patron_id = PatronId::from(patron);

    match engine.checkout(&copy_id, &patron_id, days).await {
        Ok(loan) => {
            info!(
                "loan {} opened, due {}",
                loan.id.to_string().bold(),
                loan.due_on.to_string().green()
            );
            if let Ok(view) = engine.loan_view(&loan.id).await {
                loans::render(0, &view);
            }
            Ok(true)
        }
        Err(err) => report_refusal(err),
    }
}
