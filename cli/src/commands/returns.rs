use chrono::{NaiveDate, NaiveTime};
use colored::Colorize;
use tracing::{info, warn};

use circ_common::ident::LoanId;
use circ_core::engine::CirculationEngine;

use crate::commands::report_refusal;
use crate::terminal::format;

pub async fn run(
    engine: &CirculationEngine,
    loan: &str,
    on: Option<NaiveDate>,
) -> anyhow::Result<bool> {
    let loan_id = LoanId::from(loan);
    let returned_at = on.map(|date| date.and_time(NaiveTime::MIN).and_utc());

    match engine.return_copy(&loan_id, returned_at).await {
        Ok(outcome) => {
            info!(
                "loan {} returned, copy {} available again",
                outcome.loan.id.to_string().bold(),
                outcome.loan.copy
            );
            match outcome.fine {
                Some(fine) => warn!(
                    "late fine {}: {} pending ({})",
                    fine.id,
                    format::money(fine.amount_cents).yellow().bold(),
                    fine.description
                ),
                None => info!("returned on time, no fine"),
            }
            Ok(true)
        }
        Err(err) => report_refusal(err),
    }
}

pub async fn cancel(engine: &CirculationEngine, loan: &str) -> anyhow::Result<bool> {
    let loan_id = LoanId::from(loan);

    match engine.cancel_loan(&loan_id).await {
        Ok(cancelled) => {
            info!(
                "loan {} cancelled, copy {} released",
                cancelled.id.to_string().bold(),
                cancelled.copy
            );
            Ok(true)
        }
        Err(err) => report_refusal(err),
    }
}
