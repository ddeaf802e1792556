pub mod checkout;
pub mod fines;
pub mod loans;
pub mod renew;
pub mod returns;
pub mod sweep;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing::warn;

use circ_common::clock::SystemClock;
use circ_common::error::{CircError, ErrorKind};
use circ_common::ident::WallClockIds;
use circ_core::engine::CirculationEngine;
use circ_core::ports::{InMemoryCatalog, InMemoryDirectory};

use crate::store;
use crate::terminal::print;

#[derive(Parser)]
#[command(name = "circ")]
#[command(about = "A library circulation engine.")]
pub struct CommandLine {
    /// Library fixture: works, copies, and patrons (JSON)
    #[arg(long, global = true, default_value = "library.json")]
    pub library: PathBuf,

    /// Engine state, loaded before and saved after mutating commands
    #[arg(long, global = true, default_value = "circ-state.json")]
    pub state: PathBuf,

    /// Circulation policy overrides (JSON)
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    /// Suppress informational output (repeat to keep only errors)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a copy out to a patron
    #[command(alias = "co")]
    Checkout {
        copy: String,
        patron: String,
        /// Loan period in days (policy default when omitted)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Return a copy by loan id
    #[command(alias = "r")]
    Return {
        loan: String,
        /// Return date (today when omitted)
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Extend a loan's due date
    #[command(alias = "rn")]
    Renew {
        loan: String,
        /// Extension in days (policy default when omitted)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Cancel a loan administratively (e.g. copy lost)
    Cancel { loan: String },
    /// Flag overdue loans
    #[command(alias = "s")]
    Sweep {
        /// Evaluation date (today when omitted)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// List loans
    #[command(alias = "l")]
    Loans {
        #[arg(long)]
        patron: Option<String>,
        #[arg(long)]
        active: bool,
        #[arg(long)]
        overdue: bool,
    },
    /// Inspect and settle fines
    #[command(alias = "f")]
    Fines {
        #[command(subcommand)]
        command: Option<fines::FinesCommand>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub async fn run(cli: CommandLine) -> anyhow::Result<()> {
    let policy = store::load_policy(cli.policy.as_deref())?;
    let library = store::load_library(&cli.library)?;

    let catalog = Arc::new(InMemoryCatalog::new());
    for work in library.works {
        catalog.add_work(work);
    }
    let directory = Arc::new(InMemoryDirectory::new());
    for patron in library.patrons {
        directory.add_patron(patron);
    }

    let engine = CirculationEngine::new(
        policy,
        catalog.clone(),
        directory,
        Arc::new(SystemClock),
        Arc::new(WallClockIds),
    );
    if let Some(snapshot) = store::load_state(&cli.state)? {
        engine.restore(snapshot)?;
    }
    for copy in library.copies {
        catalog.add_copy(copy.clone());
        engine.register_copy(copy);
    }

    let quiet = cli.quiet;
    let mutated = match cli.command {
        Commands::Checkout { copy, patron, days } => {
            print::header("checkout", quiet);
            checkout::run(&engine, &copy, &patron, days).await?
        }
        Commands::Return { loan, on } => {
            print::header("return", quiet);
            returns::run(&engine, &loan, on).await?
        }
        Commands::Renew { loan, days } => {
            print::header("renewal", quiet);
            renew::run(&engine, &loan, days).await?
        }
        Commands::Cancel { loan } => {
            print::header("cancellation", quiet);
            returns::cancel(&engine, &loan).await?
        }
        Commands::Sweep { as_of } => {
            print::header("overdue sweep", quiet);
            sweep::run(&engine, as_of)?
        }
        Commands::Loans {
            patron,
            active,
            overdue,
        } => {
            print::header("loans", quiet);
            loans::run(&engine, patron.as_deref(), active, overdue).await?
        }
        Commands::Fines { command } => {
            print::header("fines", quiet);
            fines::run(&engine, command).await?
        }
    };

    if mutated {
        store::save_state(&cli.state, &engine.snapshot())?;
    }
    Ok(())
}

/// Expected refusals (absent records, lost races, policy gates) are
/// outcomes to report, not faults; only invariant violations abort.
pub(crate) fn report_refusal(err: CircError) -> anyhow::Result<bool> {
    match err.kind() {
        ErrorKind::Invariant => Err(err.into()),
        _ => {
            warn!("{err}");
            Ok(false)
        }
    }
}
