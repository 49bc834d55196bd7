// common/src/numeric.rs
//
// Fixed-point amounts as the Vat stores them: Wad (18 decimals), Ray (27)
// and Rad (45). Values are signed so frob deltas can be negated directly.
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use ethers::types::{I256, U256};
use ethers::utils::{format_units, parse_units, ParseUnits};

use crate::error::{AmountError, McdError};

macro_rules! fixed_point {
    ($(#[$meta:meta])* $name:ident, $decimals:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(I256);

        impl $name {
            pub const DECIMALS: u32 = $decimals;

            pub fn zero() -> Self {
                $name(I256::zero())
            }

            /// Wraps a raw on-chain integer already scaled by `DECIMALS`.
            pub fn from_raw(value: I256) -> Self {
                $name(value)
            }

            /// Wraps an unsigned value read from a contract.
            pub fn from_uint(value: U256) -> Result<Self, McdError> {
                I256::try_from(value)
                    .map($name)
                    .map_err(|_| McdError::OutOfRange(value))
            }

            pub fn raw(self) -> I256 {
                self.0
            }

            pub fn is_zero(self) -> bool {
                self.0.is_zero()
            }

            pub fn is_negative(self) -> bool {
                self.0.is_negative()
            }

            /// Converts to the unsigned form contract arguments expect.
            pub fn to_uint(self) -> Result<U256, McdError> {
                if self.0.is_negative() {
                    return Err(McdError::NegativeAmount(self.to_string()));
                }
                Ok(self.0.into_raw())
            }
        }

        impl FromStr for $name {
            type Err = AmountError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let parsed = parse_units(trimmed, Self::DECIMALS)
                    .map_err(|_| AmountError(s.to_owned()))?;
                let value = match parsed {
                    ParseUnits::I256(v) => v,
                    ParseUnits::U256(v) => {
                        I256::try_from(v).map_err(|_| AmountError(s.to_owned()))?
                    }
                };
                Ok($name(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match format_units(self.0, Self::DECIMALS) {
                    Ok(s) => f.write_str(&s),
                    Err(_) => write!(f, "{}e-{}", self.0, Self::DECIMALS),
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Add for $name {
            type Output = $name;

            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;

            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = $name;

            fn neg(self) -> $name {
                $name(-self.0)
            }
        }
    };
}

fixed_point!(
    /// Token and debt quantities.
    Wad,
    18
);

fixed_point!(
    /// Rates and prices.
    Ray,
    27
);

fixed_point!(
    /// Internal Dai balances and debt ceilings; the product of a Ray and a Wad.
    Rad,
    45
);

impl Mul<Wad> for Ray {
    type Output = Rad;

    fn mul(self, rhs: Wad) -> Rad {
        Rad(self.0 * rhs.0)
    }
}

impl Mul<Ray> for Wad {
    type Output = Rad;

    fn mul(self, rhs: Ray) -> Rad {
        rhs * self
    }
}

impl From<Wad> for Rad {
    fn from(wad: Wad) -> Rad {
        Rad(wad.0 * I256::from_raw(U256::exp10((Rad::DECIMALS - Wad::DECIMALS) as usize)))
    }
}
