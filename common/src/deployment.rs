// common/src/deployment.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ethers::providers::Middleware;
use ethers::types::Address;
use tracing::{info, warn};

use crate::dss::Ilk;
use crate::error::McdError;

const VAT: &str = "MCD_VAT";
const DAI: &str = "MCD_DAI";
const DAI_JOIN: &str = "MCD_JOIN_DAI";
const JOIN_PREFIX: &str = "MCD_JOIN_";

/// Token and adapter backing one ilk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collateral {
    pub ilk: Ilk,
    /// ERC-20 token joined into the Vat
    pub gem: Address,
    /// GemJoin adapter for `gem`
    pub adapter: Address,
}

/// Addresses of one MCD deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub vat: Address,
    pub dai: Address,
    pub dai_join: Address,
    collaterals: BTreeMap<String, Collateral>,
}

/// Network name used to pick `<network>-addresses.json`.
pub fn network_name(net_version: &str) -> &'static str {
    match net_version {
        "1" => "mainnet",
        "42" => "kovan",
        _ => "testnet",
    }
}

fn address(conf: &BTreeMap<String, String>, key: &str) -> Result<Address, McdError> {
    let raw = conf
        .get(key)
        .ok_or_else(|| McdError::Descriptor(format!("missing {key}")))?;
    Address::from_str(raw).map_err(|_| McdError::Descriptor(format!("{key} is not an address: {raw}")))
}

impl Deployment {
    pub fn new(vat: Address, dai: Address, dai_join: Address, collaterals: Vec<Collateral>) -> Self {
        let collaterals = collaterals
            .into_iter()
            .map(|c| (c.ilk.name().to_owned(), c))
            .collect();
        Deployment { vat, dai, dai_join, collaterals }
    }

    /// Parses a descriptor of `NAME -> address` pairs. Every
    /// `MCD_JOIN_<TOKEN>_<CLASS>` entry other than the Dai join defines the
    /// ilk `<TOKEN>-<CLASS>`, whose token lives under `<TOKEN>`. Joins with
    /// no `<TOKEN>` entry are skipped.
    pub fn from_json(json: &str) -> Result<Self, McdError> {
        let conf: BTreeMap<String, String> = serde_json::from_str(json)?;

        let mut collaterals = Vec::new();
        for key in conf.keys() {
            let Some(suffix) = key.strip_prefix(JOIN_PREFIX) else { continue };
            if key == DAI_JOIN || suffix.is_empty() {
                continue;
            }
            let token = suffix.split('_').next().unwrap_or(suffix);
            if !conf.contains_key(token) {
                warn!(join = %key, token, "no token address for adapter, skipping");
                continue;
            }
            collaterals.push(Collateral {
                ilk: Ilk::new(suffix.replace('_', "-")),
                gem: address(&conf, token)?,
                adapter: address(&conf, key)?,
            });
        }

        Ok(Deployment::new(
            address(&conf, VAT)?,
            address(&conf, DAI)?,
            address(&conf, DAI_JOIN)?,
            collaterals,
        ))
    }

    pub fn from_file(path: &Path) -> Result<Self, McdError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_network(config_dir: &Path, network: &str) -> Result<Self, McdError> {
        Self::from_file(&descriptor_path(config_dir, network))
    }

    /// Picks the descriptor matching the node's network id.
    pub async fn from_node<M: Middleware>(client: &M, config_dir: &Path) -> Result<Self, McdError>
    where
        McdError: From<M::Error>,
    {
        let version = client.get_net_version().await?;
        let network = network_name(&version);
        info!(net_version = %version, network, "loading deployment");
        Self::from_network(config_dir, network)
    }

    pub fn collateral(&self, ilk: &str) -> Result<&Collateral, McdError> {
        self.collaterals
            .get(ilk)
            .ok_or_else(|| McdError::UnknownCollateral(ilk.to_owned()))
    }

    pub fn collaterals(&self) -> impl Iterator<Item = &Collateral> {
        self.collaterals.values()
    }

    /// Serialises back to the descriptor key scheme.
    pub fn to_json(&self) -> Result<String, McdError> {
        let mut conf = BTreeMap::new();
        conf.insert(VAT.to_owned(), format!("{:?}", self.vat));
        conf.insert(DAI.to_owned(), format!("{:?}", self.dai));
        conf.insert(DAI_JOIN.to_owned(), format!("{:?}", self.dai_join));
        for c in self.collaterals.values() {
            let key = c.ilk.name().replace('-', "_");
            let token = key.split('_').next().unwrap_or(&key).to_owned();
            conf.insert(format!("{JOIN_PREFIX}{key}"), format!("{:?}", c.adapter));
            conf.insert(token, format!("{:?}", c.gem));
        }
        Ok(serde_json::to_string_pretty(&conf)?)
    }
}

pub fn descriptor_path(config_dir: &Path, network: &str) -> PathBuf {
    config_dir.join(format!("{network}-addresses.json"))
}
