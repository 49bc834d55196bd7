// common/src/lifecycle.rs
use std::io::Write;

use ethers::types::Address;
use tracing::{info, warn};

use crate::chain::McdBackend;
use crate::deployment::Collateral;
use crate::dss::{check_frob, Ilk};
use crate::error::{McdError, Result};
use crate::numeric::Wad;

/// What to lock and draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleParams {
    pub collateral_amount: Wad,
    pub dai_amount: Wad,
    /// Deposit native currency into the collateral token before joining.
    pub wrap_native: bool,
}

impl LifecycleParams {
    pub fn new(collateral_amount: Wad, dai_amount: Wad, wrap_native: bool) -> Result<Self> {
        let params = LifecycleParams { collateral_amount, dai_amount, wrap_native };
        params.validate()?;
        Ok(params)
    }

    /// Both amounts are locked or drawn first and only negated on unwind.
    fn validate(&self) -> Result<()> {
        for amount in [self.collateral_amount, self.dai_amount] {
            if amount.is_negative() {
                return Err(McdError::NegativeAmount(amount.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No signing key: only reads are made.
    ReadOnly,
    Transact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Token balance did not exceed the collateral amount; nothing was attempted.
    NotEnoughCollateral { balance: Wad },
    /// Read-only run with sufficient balance.
    Observed,
    /// Position was opened and fully unwound.
    Unwound,
}

/// Reads the urn, ilk and system state and refuses a frob the Vat would revert.
pub async fn checked_frob<B>(mcd: &B, ilk: &Ilk, owner: Address, dink: Wad, dart: Wad) -> Result<()>
where
    B: McdBackend + ?Sized,
{
    let urn = mcd.urn(ilk, owner).await?;
    let state = mcd.ilk(ilk).await?;
    let system = mcd.system().await?;
    if let Err(reason) = check_frob(&state, &urn, &system, dink, dart) {
        warn!(%ilk, %dink, %dart, %reason, "refusing frob");
        return Err(McdError::FrobRejected { ilk: ilk.to_string(), reason });
    }
    mcd.frob(ilk, owner, dink, dart).await
}

/// Opens a vault position against `collateral`, draws and repays Dai, then
/// unwinds everything, printing balances to `out` along the way.
///
/// Any failed step returns immediately; later steps never run.
pub async fn run_lifecycle<B, W>(
    mcd: &B,
    collateral: &Collateral,
    owner: Address,
    params: &LifecycleParams,
    mode: Mode,
    out: &mut W,
) -> Result<Outcome>
where
    B: McdBackend + ?Sized,
    W: Write,
{
    params.validate()?;
    let ilk = &collateral.ilk;
    let transact = mode == Mode::Transact;
    let collateral_amount = params.collateral_amount;
    let dai_amount = params.dai_amount;

    let balance = mcd.token_balance(collateral, owner).await?;
    info!(%ilk, ?owner, %balance, ?mode, "starting vault lifecycle");

    let outcome = if balance > collateral_amount {
        if transact && params.wrap_native {
            mcd.wrap_native(collateral, collateral_amount).await?;
        }

        if transact {
            mcd.approve_collateral(collateral, owner).await?;
            mcd.join_collateral(collateral, owner, collateral_amount).await?;
            checked_frob(mcd, ilk, owner, collateral_amount, Wad::zero()).await?;
            checked_frob(mcd, ilk, owner, Wad::zero(), dai_amount).await?;
        }
        writeln!(out, "Urn balance: {}", mcd.urn(ilk, owner).await?)?;
        writeln!(out, "Dai balance: {}", mcd.dai(owner).await?)?;

        if transact {
            mcd.approve_dai(owner).await?;
            mcd.exit_dai(owner, dai_amount).await?;
            writeln!(out, "Dai balance after withdrawal:  {}", mcd.dai(owner).await?)?;

            mcd.join_dai(owner, dai_amount).await?;
            writeln!(out, "Dai balance after repayment:   {}", mcd.dai(owner).await?)?;

            // stability fee accrued since the draw can make these revert
            checked_frob(mcd, ilk, owner, Wad::zero(), -dai_amount).await?;
            checked_frob(mcd, ilk, owner, -collateral_amount, Wad::zero()).await?;
            mcd.exit_collateral(collateral, owner, collateral_amount).await?;
            writeln!(out, "Dai balance w/o collateral:    {}", mcd.dai(owner).await?)?;
            Outcome::Unwound
        } else {
            Outcome::Observed
        }
    } else {
        writeln!(out, "Not enough {ilk} to join to the vat")?;
        Outcome::NotEnoughCollateral { balance }
    };

    writeln!(out, "Collateral balance: {}", mcd.gem(ilk, owner).await?)?;
    Ok(outcome)
}
