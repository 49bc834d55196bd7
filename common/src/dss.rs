// common/src/dss.rs
use std::fmt;

use ethers::types::Address;
use ethers::utils::format_bytes32_string;
use tracing::debug;

use crate::error::McdError;
use crate::numeric::{Rad, Ray, Wad};

/// A named collateral type in the Vat, e.g. `ETH-A`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ilk {
    name: String,
}

impl Ilk {
    pub fn new(name: impl Into<String>) -> Self {
        Ilk { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Right-zero-padded bytes32 as the Vat keys its mappings.
    pub fn to_bytes32(&self) -> Result<[u8; 32], McdError> {
        format_bytes32_string(&self.name).map_err(|_| McdError::IlkName(self.name.clone()))
    }
}

impl fmt::Display for Ilk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One account's position for one ilk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Urn {
    pub ilk: Ilk,
    pub address: Address,
    /// locked collateral
    pub ink: Wad,
    /// normalised debt
    pub art: Wad,
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Urn('{:?}')[{}] ink={} art={}",
            self.address, self.ilk, self.ink, self.art
        )
    }
}

/// `Vat.ilks(ilk)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IlkState {
    pub ilk: Ilk,
    /// total normalised debt
    pub art: Wad,
    pub rate: Ray,
    pub spot: Ray,
    pub line: Rad,
    pub dust: Rad,
}

impl fmt::Display for IlkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ilk('{}') Art={} rate={} spot={} line={} dust={}",
            self.ilk, self.art, self.rate, self.spot, self.line, self.dust
        )
    }
}

/// System-wide Vat values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemState {
    pub live: bool,
    pub debt: Rad,
    pub line: Rad,
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vat live={} debt={} Line={}", self.live, self.debt, self.line)
    }
}

/// The Vat `require` a frob would fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrobRejection {
    NotLive,
    IlkNotInitialised,
    Underflow,
    IlkCeilingExceeded,
    SystemCeilingExceeded,
    Unsafe,
    Dusty,
}

impl fmt::Display for FrobRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FrobRejection::NotLive => "vat is not live",
            FrobRejection::IlkNotInitialised => "ilk has not been initialised",
            FrobRejection::Underflow => "urn ink or art would go below zero",
            FrobRejection::IlkCeilingExceeded => "ilk debt ceiling would be exceeded",
            FrobRejection::SystemCeilingExceeded => "system debt ceiling would be exceeded",
            FrobRejection::Unsafe => "urn would be unsafe",
            FrobRejection::Dusty => "urn debt would be below the dust cutoff",
        };
        f.write_str(msg)
    }
}

/// Mirrors the Vat's frob checks against freshly read state so a doomed
/// transaction is never submitted.
pub fn check_frob(
    ilk: &IlkState,
    urn: &Urn,
    system: &SystemState,
    dink: Wad,
    dart: Wad,
) -> Result<(), FrobRejection> {
    if !system.live {
        return Err(FrobRejection::NotLive);
    }
    if ilk.rate.is_zero() {
        return Err(FrobRejection::IlkNotInitialised);
    }

    let ink = urn.ink + dink;
    let art = urn.art + dart;
    if ink.is_negative() || art.is_negative() {
        return Err(FrobRejection::Underflow);
    }

    let ilk_debt = ilk.rate * (ilk.art + dart);
    let debt = system.debt + ilk.rate * dart;
    let tab = ilk.rate * art;
    debug!(
        ilk = %ilk.ilk, %dink, %dart, %ink, %art, %tab, %debt,
        "checking frob"
    );

    if dart > Wad::zero() {
        if ilk_debt > ilk.line {
            return Err(FrobRejection::IlkCeilingExceeded);
        }
        if debt > system.line {
            return Err(FrobRejection::SystemCeilingExceeded);
        }
    }

    let less_risky = dart <= Wad::zero() && dink >= Wad::zero();
    if !less_risky && tab > ink * ilk.spot {
        return Err(FrobRejection::Unsafe);
    }

    if !art.is_zero() && tab < ilk.dust {
        return Err(FrobRejection::Dusty);
    }

    Ok(())
}
