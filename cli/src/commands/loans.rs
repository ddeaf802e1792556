use tracing::info;

use circ_common::ident::PatronId;
use circ_common::model::LoanStatus;
use circ_core::engine::{CirculationEngine, LoanView};

use crate::terminal::{format, print};

pub async fn run(
    engine: &CirculationEngine,
    patron: Option<&str>,
    active: bool,
    overdue: bool,
) -> anyhow::Result<bool> {
    let views = if let Some(patron) = patron {
        engine.loans_for_patron(&PatronId::from(patron)).await
    } else if active {
        engine.loans_with_status(LoanStatus::Active).await
    } else if overdue {
        engine.loans_with_status(LoanStatus::Overdue).await
    } else {
        engine.loans_all().await
    };

    if views.is_empty() {
        print::status_line("no matching loans");
        return Ok(false);
    }

    for (idx, view) in views.iter().enumerate() {
        render(idx, view);
    }
    info!(
        "{} listed; {} active, {} overdue in total",
        views.len(),
        engine.count_loans_with_status(LoanStatus::Active),
        engine.count_loans_with_status(LoanStatus::Overdue)
    );
    Ok(false)
}

pub fn render(idx: usize, view: &LoanView) {
    print::tree_head(idx, view.loan.id.as_str());
    print::tree(format::loan_details(view));
}
