// common/src/lib.rs
pub mod chain;
pub mod contracts;
pub mod deployment;
pub mod dss;
pub mod error;
pub mod lifecycle;
pub mod numeric;

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenv::dotenv;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use reqwest::{Client, Url};
use tracing::info;

pub use chain::{McdBackend, OnChain};
pub use deployment::{Collateral, Deployment};
pub use dss::{check_frob, FrobRejection, Ilk, IlkState, SystemState, Urn};
pub use error::{AmountError, KeySpecError, McdError};
pub use lifecycle::{checked_frob, run_lifecycle, LifecycleParams, Mode, Outcome};
pub use numeric::{Rad, Ray, Wad};

// ─────────────────── Configuration ───────────────────

pub struct Config {
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub poll_interval: Duration,
    pub config_dir: PathBuf,
    /// Explicit deployment descriptor; otherwise picked by network id.
    pub addresses: Option<PathBuf>,
}

pub fn load_config() -> Result<Config, McdError> {
    dotenv().ok();
    config_from(|name| env::var(name).ok().filter(|v| !v.is_empty()))
}

fn parse_var<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, McdError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| McdError::InvalidEnv { name, value: v }),
    }
}

fn config_from(var: impl Fn(&str) -> Option<String>) -> Result<Config, McdError> {
    let rpc_url = var("ETH_RPC_URL").ok_or(McdError::MissingEnv("ETH_RPC_URL"))?;
    let timeout_secs = parse_var("ETH_RPC_TIMEOUT", var("ETH_RPC_TIMEOUT"), 10u64)?;
    let poll_ms = parse_var("ETH_POLL_INTERVAL_MS", var("ETH_POLL_INTERVAL_MS"), 1000u64)?;
    let config_dir = var("MCD_CONFIG_DIR").unwrap_or_else(|| "config".to_owned());
    Ok(Config {
        rpc_url,
        rpc_timeout: Duration::from_secs(timeout_secs),
        poll_interval: Duration::from_millis(poll_ms),
        config_dir: PathBuf::from(config_dir),
        addresses: var("MCD_ADDRESSES").map(PathBuf::from),
    })
}

pub fn http_client(cfg: &Config) -> Result<Client, McdError> {
    Ok(Client::builder().timeout(cfg.rpc_timeout).build()?)
}

pub fn rpc_client(cfg: &Config) -> Result<Provider<Http>, McdError> {
    let url = Url::parse(&cfg.rpc_url).map_err(|_| McdError::RpcUrl(cfg.rpc_url.clone()))?;
    let http = Http::new_with_client(url, http_client(cfg)?);
    Ok(Provider::new(http).interval(cfg.poll_interval))
}

pub fn parse_account(account: &str) -> Result<Address, McdError> {
    Address::from_str(account.trim()).map_err(|_| McdError::Account(account.to_owned()))
}

async fn load_deployment(cfg: &Config, provider: &Provider<Http>) -> Result<Deployment> {
    let deployment = match &cfg.addresses {
        Some(path) => Deployment::from_file(path)
            .with_context(|| format!("loading deployment from {}", path.display()))?,
        None => Deployment::from_node(provider, &cfg.config_dir)
            .await
            .context("loading deployment for the node's network")?,
    };
    Ok(deployment)
}

// ─────────────────── Signing keys ───────────────────

/// `key_file=<keystore.json>[,pass_file=<passphrase>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub key_file: PathBuf,
    pub pass_file: Option<PathBuf>,
}

impl FromStr for KeySpec {
    type Err = KeySpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || KeySpecError(s.to_owned());
        let mut key_file = None;
        let mut pass_file = None;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (k, v) = part.split_once('=').ok_or_else(bad)?;
            let slot = match k.trim() {
                "key_file" => &mut key_file,
                "pass_file" => &mut pass_file,
                _ => return Err(bad()),
            };
            if slot.is_some() || v.trim().is_empty() {
                return Err(bad());
            }
            *slot = Some(PathBuf::from(v.trim()));
        }
        Ok(KeySpec {
            key_file: key_file.ok_or_else(bad)?,
            pass_file,
        })
    }
}

/// Decrypts the keystore with the passphrase file's contents (empty if none).
pub fn wallet(spec: &KeySpec) -> Result<LocalWallet, McdError> {
    let passphrase = match &spec.pass_file {
        Some(path) => fs::read_to_string(path)?
            .trim_end_matches(['\r', '\n'])
            .to_owned(),
        None => String::new(),
    };
    Ok(LocalWallet::decrypt_keystore(&spec.key_file, passphrase)?)
}

/// Loads the key and checks it signs for `account`.
pub fn wallet_for(spec: &KeySpec, account: Address) -> Result<LocalWallet, McdError> {
    let wallet = wallet(spec)?;
    if wallet.address() != account {
        return Err(McdError::KeyMismatch { key: wallet.address(), account });
    }
    Ok(wallet)
}

// ─────────────────── Vault lifecycle flow ───────────────────

pub async fn vault_flow(
    cfg: &Config,
    account: &str,
    keys: Option<&KeySpec>,
    ilk: &str,
    params: &LifecycleParams,
) -> Result<Outcome> {
    let owner = parse_account(account)?;
    let provider = rpc_client(cfg)?;
    let deployment = load_deployment(cfg, &provider).await?;
    let collateral = deployment.collateral(ilk)?;
    let mut stdout = io::stdout();

    let outcome = match keys {
        Some(spec) => {
            let wallet = wallet_for(spec, owner)?;
            let client = SignerMiddleware::new_with_provider_chain(provider, wallet)
                .await
                .map_err(|e| anyhow!("binding signing key: {e}"))?;
            info!(?owner, chain_id = client.signer().chain_id(), "submitting transactions");
            let mcd = OnChain::new(Arc::new(client), &deployment);
            run_lifecycle(&mcd, collateral, owner, params, Mode::Transact, &mut stdout).await?
        }
        None => {
            info!(?owner, "no signing key, running read-only");
            let mcd = OnChain::new(Arc::new(provider.with_sender(owner)), &deployment);
            run_lifecycle(&mcd, collateral, owner, params, Mode::ReadOnly, &mut stdout).await?
        }
    };

    Ok(outcome)
}

// ─────────────────── Inspect flow (read-only) ───────────────────

pub async fn inspect_flow(cfg: &Config, account: &str, ilk: &str) -> Result<()> {
    let owner = parse_account(account)?;
    let provider = rpc_client(cfg)?;
    let block = provider.get_block_number().await.context("reaching the node")?;
    let deployment = load_deployment(cfg, &provider).await?;
    let collateral = deployment.collateral(ilk)?;
    let mcd = OnChain::new(Arc::new(provider.with_sender(owner)), &deployment);

    println!("Block:              {block}");
    println!("{}", mcd.system().await?);
    println!("{}", mcd.ilk(&collateral.ilk).await?);
    println!("Urn balance: {}", mcd.urn(&collateral.ilk, owner).await?);
    println!("Dai balance: {}", mcd.dai(owner).await?);
    println!("Collateral balance: {}", mcd.gem(&collateral.ilk, owner).await?);
    println!("Token balance: {}", mcd.token_balance(collateral, owner).await?);
    Ok(())
}
