#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use async_trait::async_trait;
use ethers::types::{Address, TxHash};
use mcd_common::{Collateral, Ilk, IlkState, McdBackend, McdError, Rad, Ray, SystemState, Urn, Wad};

pub const DAI_JOIN: Address = Address::repeat_byte(0xda);

pub fn wad(s: &str) -> Wad {
    s.parse().unwrap()
}

pub fn eth_a() -> Collateral {
    Collateral {
        ilk: Ilk::new("ETH-A"),
        gem: Address::repeat_byte(0xee),
        adapter: Address::repeat_byte(0xaa),
    }
}

pub fn owner() -> Address {
    Address::repeat_byte(0x01)
}

/// Single-account Vat with one collateral type, enough accounting to follow
/// the lifecycle.
#[derive(Debug, Clone)]
pub struct State {
    pub native: Wad,
    pub token: Wad,
    pub token_allowance: bool,
    pub dai_token: Wad,
    pub dai_allowance: bool,
    pub hoped: HashSet<Address>,

    pub vat_gem: Wad,
    pub vat_dai: Rad,
    pub ink: Wad,
    pub art: Wad,

    pub ilk_art: Wad,
    pub rate: Ray,
    pub spot: Ray,
    pub line: Rad,
    pub dust: Rad,
    pub live: bool,
    pub debt: Rad,
    pub system_line: Rad,

    /// Mutating steps in submission order, including one that reverted.
    pub submitted: Vec<&'static str>,
    pub urn_reads: Vec<Urn>,
}

pub struct SimVat {
    pub state: RefCell<State>,
    revert_on: Option<&'static str>,
}

impl SimVat {
    pub fn with_token_balance(balance: &str) -> Self {
        SimVat {
            state: RefCell::new(State {
                native: wad("100"),
                token: wad(balance),
                token_allowance: false,
                dai_token: Wad::zero(),
                dai_allowance: false,
                hoped: HashSet::new(),
                vat_gem: Wad::zero(),
                vat_dai: Rad::zero(),
                ink: Wad::zero(),
                art: Wad::zero(),
                ilk_art: Wad::zero(),
                rate: "1".parse().unwrap(),
                spot: "150".parse().unwrap(),
                line: "1000000".parse().unwrap(),
                dust: "10".parse().unwrap(),
                live: true,
                debt: Rad::zero(),
                system_line: "10000000".parse().unwrap(),
                submitted: Vec::new(),
                urn_reads: Vec::new(),
            }),
            revert_on: None,
        }
    }

    /// The first submission of `step` reverts.
    pub fn reverting_on(mut self, step: &'static str) -> Self {
        self.revert_on = Some(step);
        self
    }

    pub fn snapshot(&self) -> State {
        self.state.borrow().clone()
    }

    pub fn submitted(&self) -> Vec<&'static str> {
        self.state.borrow().submitted.clone()
    }

    fn submit(&self, step: &'static str) -> Result<std::cell::RefMut<'_, State>, McdError> {
        let mut state = self.state.borrow_mut();
        state.submitted.push(step);
        let first = state.submitted.iter().filter(|s| **s == step).count() == 1;
        if self.revert_on == Some(step) && first {
            return Err(revert(step));
        }
        Ok(state)
    }
}

fn revert(step: &'static str) -> McdError {
    McdError::Reverted { step, tx_hash: TxHash::zero() }
}

#[async_trait(?Send)]
impl McdBackend for SimVat {
    async fn token_balance(&self, _collateral: &Collateral, _owner: Address) -> Result<Wad, McdError> {
        Ok(self.state.borrow().token)
    }

    async fn urn(&self, ilk: &Ilk, owner: Address) -> Result<Urn, McdError> {
        let mut state = self.state.borrow_mut();
        let urn = Urn { ilk: ilk.clone(), address: owner, ink: state.ink, art: state.art };
        state.urn_reads.push(urn.clone());
        Ok(urn)
    }

    async fn ilk(&self, ilk: &Ilk) -> Result<IlkState, McdError> {
        let state = self.state.borrow();
        Ok(IlkState {
            ilk: ilk.clone(),
            art: state.ilk_art,
            rate: state.rate,
            spot: state.spot,
            line: state.line,
            dust: state.dust,
        })
    }

    async fn system(&self) -> Result<SystemState, McdError> {
        let state = self.state.borrow();
        Ok(SystemState { live: state.live, debt: state.debt, line: state.system_line })
    }

    async fn dai(&self, _owner: Address) -> Result<Rad, McdError> {
        Ok(self.state.borrow().vat_dai)
    }

    async fn gem(&self, _ilk: &Ilk, _owner: Address) -> Result<Wad, McdError> {
        Ok(self.state.borrow().vat_gem)
    }

    async fn wrap_native(&self, _collateral: &Collateral, amount: Wad) -> Result<(), McdError> {
        let mut state = self.submit("deposit")?;
        if state.native < amount {
            return Err(revert("deposit"));
        }
        state.native = state.native - amount;
        state.token = state.token + amount;
        Ok(())
    }

    async fn approve_collateral(&self, collateral: &Collateral, _owner: Address) -> Result<(), McdError> {
        if !self.state.borrow().hoped.contains(&collateral.adapter) {
            self.submit("hope")?.hoped.insert(collateral.adapter);
        }
        if !self.state.borrow().token_allowance {
            self.submit("approve")?.token_allowance = true;
        }
        Ok(())
    }

    async fn join_collateral(&self, _collateral: &Collateral, _owner: Address, amount: Wad) -> Result<(), McdError> {
        let mut state = self.submit("gem join")?;
        if !state.token_allowance || state.token < amount {
            return Err(revert("gem join"));
        }
        state.token = state.token - amount;
        state.vat_gem = state.vat_gem + amount;
        Ok(())
    }

    async fn exit_collateral(&self, _collateral: &Collateral, _owner: Address, amount: Wad) -> Result<(), McdError> {
        let mut state = self.submit("gem exit")?;
        if state.vat_gem < amount {
            return Err(revert("gem exit"));
        }
        state.vat_gem = state.vat_gem - amount;
        state.token = state.token + amount;
        Ok(())
    }

    async fn frob(&self, _ilk: &Ilk, _owner: Address, dink: Wad, dart: Wad) -> Result<(), McdError> {
        let mut state = self.submit("frob")?;
        let gem = state.vat_gem - dink;
        let dtab = state.rate * dart;
        let dai = state.vat_dai + dtab;
        if gem.is_negative() || dai.is_negative() {
            return Err(revert("frob"));
        }
        state.vat_gem = gem;
        state.vat_dai = dai;
        state.ink = state.ink + dink;
        state.art = state.art + dart;
        state.ilk_art = state.ilk_art + dart;
        state.debt = state.debt + dtab;
        Ok(())
    }

    async fn approve_dai(&self, _owner: Address) -> Result<(), McdError> {
        if !self.state.borrow().hoped.contains(&DAI_JOIN) {
            self.submit("hope")?.hoped.insert(DAI_JOIN);
        }
        if !self.state.borrow().dai_allowance {
            self.submit("approve")?.dai_allowance = true;
        }
        Ok(())
    }

    async fn join_dai(&self, _owner: Address, amount: Wad) -> Result<(), McdError> {
        let mut state = self.submit("dai join")?;
        if !state.dai_allowance || state.dai_token < amount {
            return Err(revert("dai join"));
        }
        state.dai_token = state.dai_token - amount;
        state.vat_dai = state.vat_dai + Rad::from(amount);
        Ok(())
    }

    async fn exit_dai(&self, _owner: Address, amount: Wad) -> Result<(), McdError> {
        let mut state = self.submit("dai exit")?;
        let dai = state.vat_dai - Rad::from(amount);
        if !state.hoped.contains(&DAI_JOIN) || dai.is_negative() {
            return Err(revert("dai exit"));
        }
        state.vat_dai = dai;
        state.dai_token = state.dai_token + amount;
        Ok(())
    }
}
