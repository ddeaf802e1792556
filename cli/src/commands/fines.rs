use anyhow::bail;
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use circ_common::ident::{FineId, PatronId};
use circ_common::model::FineKind;
use circ_core::engine::CirculationEngine;

use crate::commands::report_refusal;
use crate::terminal::{format, print};

#[derive(Subcommand)]
pub enum FinesCommand {
    /// List fines
    List {
        #[arg(long)]
        patron: Option<String>,
        #[arg(long)]
        pending: bool,
    },
    /// Settle a pending fine
    Pay { fine: String },
    /// Void a pending fine
    Cancel { fine: String },
    /// Book a fine not tied to a loan (damage, loss)
    Issue {
        patron: String,
        kind: FineKindArg,
        /// Amount in currency units, e.g. 4.50
        amount: String,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FineKindArg {
    Damage,
    Loss,
    Other,
}

impl From<FineKindArg> for FineKind {
    fn from(kind: FineKindArg) -> Self {
        match kind {
            FineKindArg::Damage => FineKind::Damage,
            FineKindArg::Loss => FineKind::Loss,
            FineKindArg::Other => FineKind::Other,
        }
    }
}

pub async fn run(engine: &CirculationEngine, command: Option<FinesCommand>) -> anyhow::Result<bool> {
    match command.unwrap_or(FinesCommand::List {
        patron: None,
        pending: false,
    }) {
        FinesCommand::List { patron, pending } => list(engine, patron.as_deref(), pending),
        FinesCommand::Pay { fine } => match engine.pay_fine(&FineId::from(fine.as_str())) {
            Ok(paid) => {
                info!(
                    "fine {} paid ({})",
                    paid.id.to_string().bold(),
                    format::money(paid.amount_cents)
                );
                Ok(true)
            }
            Err(err) => report_refusal(err),
        },
        FinesCommand::Cancel { fine } => match engine.cancel_fine(&FineId::from(fine.as_str())) {
            Ok(cancelled) => {
                info!("fine {} cancelled", cancelled.id.to_string().bold());
                Ok(true)
            }
            Err(err) => report_refusal(err),
        },
        FinesCommand::Issue {
            patron,
            kind,
            amount,
            description,
        } => {
            let amount_cents = parse_amount_cents(&amount)?;
            let description =
                description.unwrap_or_else(|| format!("{:?} fine", FineKind::from(kind)));
            match engine
                .issue_fine(
                    &PatronId::from(patron.as_str()),
                    kind.into(),
                    amount_cents,
                    description,
                )
                .await
            {
                Ok(fine) => {
                    info!(
                        "fine {} issued to {} ({})",
                        fine.id.to_string().bold(),
                        fine.patron,
                        format::money(fine.amount_cents)
                    );
                    Ok(true)
                }
                Err(err) => report_refusal(err),
            }
        }
    }
}

fn list(engine: &CirculationEngine, patron: Option<&str>, pending: bool) -> anyhow::Result<bool> {
    let fines = match (patron, pending) {
        (Some(patron), true) => engine.fines_pending_for(&PatronId::from(patron)),
        (Some(patron), false) => engine.fines_for_patron(&PatronId::from(patron)),
        (None, true) => engine.fines_pending(),
        (None, false) => engine.fines_all(),
    };

    if fines.is_empty() {
        print::status_line("no matching fines");
        return Ok(false);
    }

    for (idx, fine) in fines.iter().enumerate() {
        print::tree_head(idx, fine.id.as_str());
        print::tree(format::fine_details(fine));
    }
    let total = engine.pending_total_cents(patron.map(PatronId::from).as_ref());
    info!("pending total: {}", format::money(total).yellow().bold());
    Ok(false)
}

/// Parses a decimal currency amount ("4.50", "12") into cents.
fn parse_amount_cents(raw: &str) -> anyhow::Result<i64> {
    let (units, cents) = match raw.split_once('.') {
        Some((units, cents)) => (units, cents),
        None => (raw, ""),
    };
    if cents.len() > 2 {
        bail!("invalid amount '{raw}': at most two decimal places");
    }
    let units: i64 = units.parse().map_err(|_| anyhow::anyhow!("invalid amount '{raw}'"))?;
    if units < 0 {
        bail!("invalid amount '{raw}': must not be negative");
    }
    let cents: i64 = if cents.is_empty() {
        0
    } else {
        format!("{cents:0<2}")
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid amount '{raw}'"))?
    };
    Ok(units * 100 + cents)
}
