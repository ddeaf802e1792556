use colored::Colorize;
use tracing::info;

use circ_common::ident::LoanId;
use circ_core::engine::CirculationEngine;

use crate::commands::report_refusal;

pub async fn run(
    engine: &CirculationEngine,
    loan: &str,
    days: Option<u32>,
) -> anyhow::Result<bool> {
    let loan_id = LoanId::from(loan);

    match engine.renew(&loan_id, days).await {
        Ok(renewed) => {
            info!(
                "loan {} renewed ({} of {}), now due {}",
                renewed.id.to_string().bold(),
                renewed.renewals,
                engine.policy().max_renewals,
                renewed.due_on.to_string().green()
            );
            Ok(true)
        }
        Err(err) => report_refusal(err),
    }
}
