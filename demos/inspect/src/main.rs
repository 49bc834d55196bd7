// demos/inspect/src/main.rs

use anyhow::Result;
use clap::Parser;
use mcd_common::{inspect_flow, load_config};
use tracing_subscriber::EnvFilter;

/// Print Vat, ilk and urn state for an account without submitting anything.
#[derive(Parser, Debug)]
#[command(name = "inspect")]
struct Args {
    account: String,

    #[arg(long, default_value = "ETH-A")]
    ilk: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = load_config()?;
    inspect_flow(&cfg, &args.account, &args.ilk).await?;
    Ok(())
}
