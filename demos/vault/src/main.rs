// demos/vault/src/main.rs

use anyhow::Result;
use clap::Parser;
use mcd_common::{load_config, vault_flow, KeySpec, LifecycleParams, Wad};
use tracing_subscriber::EnvFilter;

/// Open, draw against, repay and unwind one MCD vault.
#[derive(Parser, Debug)]
#[command(name = "vault")]
struct Args {
    /// Default account, e.g. 0x0000000000000000000000000000000aBcdef123
    account: String,

    /// key_file=<keystore.json>,pass_file=<passphrase>; omit for a read-only run
    keys: Option<KeySpec>,

    #[arg(long, default_value = "ETH-A")]
    ilk: String,

    /// Collateral to join
    #[arg(long, default_value = "0.2")]
    collateral: Wad,

    /// Dai to draw
    #[arg(long, default_value = "20.0")]
    dai: Wad,

    /// Deposit native currency into the collateral token first
    #[arg(long)]
    wrap_native: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // load .env (ETH_RPC_URL, MCD_CONFIG_DIR, ...)
    let cfg = load_config()?;

    let params = LifecycleParams::new(args.collateral, args.dai, args.wrap_native)?;
    vault_flow(&cfg, &args.account, args.keys.as_ref(), &args.ilk, &params).await?;

    Ok(())
}
