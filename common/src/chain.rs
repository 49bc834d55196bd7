// common/src/chain.rs
use std::sync::Arc;

use async_trait::async_trait;
use ethers::abi::Detokenize;
use ethers::contract::builders::ContractCall;
use ethers::providers::Middleware;
use ethers::types::{Address, TransactionReceipt, TxHash, U256};
use tracing::{debug, info};

use crate::contracts::{Token, TokenAdapter, Vat};
use crate::deployment::{Collateral, Deployment};
use crate::dss::{Ilk, IlkState, SystemState, Urn};
use crate::error::{McdError, Result};
use crate::numeric::{Rad, Ray, Wad};

/// Allowances below this are topped up to `U256::MAX`.
fn large_allowance() -> U256 {
    U256::from(u128::MAX)
}

/// Everything the vault lifecycle reads from or submits to the MCD
/// contracts. Each mutating method returns once the transaction has been
/// mined successfully.
#[async_trait(?Send)]
pub trait McdBackend {
    async fn token_balance(&self, collateral: &Collateral, owner: Address) -> Result<Wad>;
    async fn urn(&self, ilk: &Ilk, owner: Address) -> Result<Urn>;
    async fn ilk(&self, ilk: &Ilk) -> Result<IlkState>;
    async fn system(&self) -> Result<SystemState>;
    /// Internal Dai balance in the Vat.
    async fn dai(&self, owner: Address) -> Result<Rad>;
    /// Unlocked collateral held in the Vat.
    async fn gem(&self, ilk: &Ilk, owner: Address) -> Result<Wad>;

    async fn wrap_native(&self, collateral: &Collateral, amount: Wad) -> Result<()>;
    /// Lets the collateral adapter move `owner`'s tokens and Vat balance.
    async fn approve_collateral(&self, collateral: &Collateral, owner: Address) -> Result<()>;
    async fn join_collateral(&self, collateral: &Collateral, owner: Address, amount: Wad) -> Result<()>;
    async fn exit_collateral(&self, collateral: &Collateral, owner: Address, amount: Wad) -> Result<()>;
    async fn frob(&self, ilk: &Ilk, owner: Address, dink: Wad, dart: Wad) -> Result<()>;
    /// Lets the Dai adapter mint and burn against `owner`'s Vat balance.
    async fn approve_dai(&self, owner: Address) -> Result<()>;
    async fn join_dai(&self, owner: Address, amount: Wad) -> Result<()>;
    async fn exit_dai(&self, owner: Address, amount: Wad) -> Result<()>;
}

/// Submits `call`, waits for it to be mined and fails unless it succeeded.
pub async fn transact<M, D>(step: &'static str, call: ContractCall<M, D>) -> Result<TxHash>
where
    M: Middleware + 'static,
    D: Detokenize,
{
    let pending = call.send().await?;
    let tx_hash = *pending;
    debug!(step, ?tx_hash, "submitted");

    let receipt = pending.await?;
    confirm(step, tx_hash, receipt)
}

/// Status 1 is success; anything else mined is a revert, no receipt a drop.
fn confirm(step: &'static str, tx_hash: TxHash, receipt: Option<TransactionReceipt>) -> Result<TxHash> {
    match receipt {
        Some(receipt) if receipt.status == Some(1u64.into()) => {
            info!(step, ?tx_hash, gas_used = ?receipt.gas_used, "mined");
            Ok(tx_hash)
        }
        Some(_) => Err(McdError::Reverted { step, tx_hash }),
        None => Err(McdError::Dropped { step, tx_hash }),
    }
}

/// MCD backend talking to a node through `M`.
pub struct OnChain<M: Middleware> {
    client: Arc<M>,
    vat: Vat<M>,
    dai: Token<M>,
    dai_join: TokenAdapter<M>,
}

impl<M: Middleware + 'static> OnChain<M> {
    pub fn new(client: Arc<M>, deployment: &Deployment) -> Self {
        OnChain {
            vat: Vat::new(deployment.vat, client.clone()),
            dai: Token::new(deployment.dai, client.clone()),
            dai_join: TokenAdapter::new(deployment.dai_join, client.clone()),
            client,
        }
    }

    async fn hope(&self, owner: Address, operator: Address) -> Result<()> {
        if self.vat.can(owner, operator).call().await?.is_zero() {
            transact("hope", self.vat.hope(operator)).await?;
        } else {
            debug!(?operator, "already permitted in the vat");
        }
        Ok(())
    }

    async fn approve_token(&self, token: &Token<M>, owner: Address, spender: Address) -> Result<()> {
        if token.allowance(owner, spender).call().await? < large_allowance() {
            transact("approve", token.approve(spender, U256::MAX)).await?;
        } else {
            debug!(token = ?token.address(), ?spender, "allowance already in place");
        }
        Ok(())
    }

    fn token(&self, collateral: &Collateral) -> Token<M> {
        Token::new(collateral.gem, self.client.clone())
    }

    fn adapter(&self, collateral: &Collateral) -> TokenAdapter<M> {
        TokenAdapter::new(collateral.adapter, self.client.clone())
    }
}

#[async_trait(?Send)]
impl<M: Middleware + 'static> McdBackend for OnChain<M> {
    async fn token_balance(&self, collateral: &Collateral, owner: Address) -> Result<Wad> {
        let balance = self.token(collateral).balance_of(owner).call().await?;
        Wad::from_uint(balance)
    }

    async fn urn(&self, ilk: &Ilk, owner: Address) -> Result<Urn> {
        let (ink, art) = self.vat.urns(ilk.to_bytes32()?, owner).call().await?;
        Ok(Urn {
            ilk: ilk.clone(),
            address: owner,
            ink: Wad::from_uint(ink)?,
            art: Wad::from_uint(art)?,
        })
    }

    async fn ilk(&self, ilk: &Ilk) -> Result<IlkState> {
        let (art, rate, spot, line, dust) = self.vat.ilks(ilk.to_bytes32()?).call().await?;
        Ok(IlkState {
            ilk: ilk.clone(),
            art: Wad::from_uint(art)?,
            rate: Ray::from_uint(rate)?,
            spot: Ray::from_uint(spot)?,
            line: Rad::from_uint(line)?,
            dust: Rad::from_uint(dust)?,
        })
    }

    async fn system(&self) -> Result<SystemState> {
        let live = self.vat.live().call().await?;
        let debt = self.vat.debt().call().await?;
        let line = self.vat.line().call().await?;
        Ok(SystemState {
            live: !live.is_zero(),
            debt: Rad::from_uint(debt)?,
            line: Rad::from_uint(line)?,
        })
    }

    async fn dai(&self, owner: Address) -> Result<Rad> {
        Rad::from_uint(self.vat.dai(owner).call().await?)
    }

    async fn gem(&self, ilk: &Ilk, owner: Address) -> Result<Wad> {
        Wad::from_uint(self.vat.gem(ilk.to_bytes32()?, owner).call().await?)
    }

    async fn wrap_native(&self, collateral: &Collateral, amount: Wad) -> Result<()> {
        let call = self.token(collateral).deposit().value(amount.to_uint()?);
        transact("deposit", call).await?;
        Ok(())
    }

    async fn approve_collateral(&self, collateral: &Collateral, owner: Address) -> Result<()> {
        self.hope(owner, collateral.adapter).await?;
        self.approve_token(&self.token(collateral), owner, collateral.adapter).await
    }

    async fn join_collateral(&self, collateral: &Collateral, owner: Address, amount: Wad) -> Result<()> {
        let call = self.adapter(collateral).join(owner, amount.to_uint()?);
        transact("gem join", call).await?;
        Ok(())
    }

    async fn exit_collateral(&self, collateral: &Collateral, owner: Address, amount: Wad) -> Result<()> {
        let call = self.adapter(collateral).exit(owner, amount.to_uint()?);
        transact("gem exit", call).await?;
        Ok(())
    }

    async fn frob(&self, ilk: &Ilk, owner: Address, dink: Wad, dart: Wad) -> Result<()> {
        info!(%ilk, ?owner, %dink, %dart, "frob");
        let call = self
            .vat
            .frob(ilk.to_bytes32()?, owner, owner, owner, dink.raw(), dart.raw());
        transact("frob", call).await?;
        Ok(())
    }

    async fn approve_dai(&self, owner: Address) -> Result<()> {
        self.hope(owner, self.dai_join.address()).await?;
        self.approve_token(&self.dai, owner, self.dai_join.address()).await
    }

    async fn join_dai(&self, owner: Address, amount: Wad) -> Result<()> {
        transact("dai join", self.dai_join.join(owner, amount.to_uint()?)).await?;
        Ok(())
    }

    async fn exit_dai(&self, owner: Address, amount: Wad) -> Result<()> {
        transact("dai exit", self.dai_join.exit(owner, amount.to_uint()?)).await?;
        Ok(())
    }
}
