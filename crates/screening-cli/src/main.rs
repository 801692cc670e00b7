//! blink-screen binary

use clap::Parser;
use screening_cli::{init_logging, run, Cli};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let report = match run(&cli).await {
        Ok(report) => report,
        Err(e) => {
            error!("Screening failed: {:#}", e);
            return Err(e);
        }
    };

    println!("{}", report.to_json(cli.pretty)?);
    Ok(())
}
