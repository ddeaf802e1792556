mod commands;
mod store;
mod terminal;

use commands::CommandLine;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init(cli.quiet);

    commands::run(cli).await
}
