// common/src/error.rs
use ethers::contract::ContractError;
use ethers::providers::{Middleware, ProviderError};
use ethers::signers::WalletError;
use ethers::types::{Address, TxHash, U256};
use thiserror::Error;

use crate::dss::FrobRejection;

pub type Result<T, E = McdError> = std::result::Result<T, E>;

/// A decimal amount that could not be turned into a fixed-point value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid amount `{0}`")]
pub struct AmountError(pub String);

/// A `key_file=...,pass_file=...` argument that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid key spec `{0}`: expected key_file=<path>[,pass_file=<path>]")]
pub struct KeySpecError(pub String);

#[derive(Debug, Error)]
pub enum McdError {
    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: `{value}`")]
    InvalidEnv { name: &'static str, value: String },

    #[error("invalid RPC endpoint `{0}`")]
    RpcUrl(String),

    #[error("invalid account address `{0}`")]
    Account(String),

    #[error(transparent)]
    KeySpec(#[from] KeySpecError),

    #[error("signing key belongs to {key:?}, not the default account {account:?}")]
    KeyMismatch { key: Address, account: Address },

    #[error("deployment descriptor: {0}")]
    Descriptor(String),

    #[error("unknown collateral type `{0}`")]
    UnknownCollateral(String),

    #[error("ilk name `{0}` does not fit in bytes32")]
    IlkName(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("{0} must not be negative")]
    NegativeAmount(String),

    #[error("on-chain value {0} is out of range for a signed amount")]
    OutOfRange(U256),

    #[error("frob on {ilk} rejected: {reason}")]
    FrobRejected { ilk: String, reason: FrobRejection },

    #[error("{step} transaction {tx_hash:?} reverted")]
    Reverted { step: &'static str, tx_hash: TxHash },

    #[error("{step} transaction {tx_hash:?} was dropped")]
    Dropped { step: &'static str, tx_hash: TxHash },

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<M: Middleware> From<ContractError<M>> for McdError {
    fn from(err: ContractError<M>) -> Self {
        McdError::Contract(err.to_string())
    }
}
