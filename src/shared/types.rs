//! Common types used across the application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Opaque 20-byte identifier for venues, factories, tokens and accounts.
///
/// Rendered as a `0x`-prefixed hex string. The all-zero value is the null
/// address and never identifies a real participant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Fresh random address, used for demo accounts and executor custody.
    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("address must be exactly 20 bytes: {}", s))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Raw reserve snapshot of a liquidity pool, in the pool's own token order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub reserve0: u128,
    pub reserve1: u128,
    /// Unix timestamp of the last reserve update
    pub updated_at: i64,
}

/// Pool reserves flipped so `reserve_in` lines up with the requested input token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedReserves {
    pub reserve_in: u128,
    pub reserve_out: u128,
}

/// Result of a best-venue price discovery scan.
///
/// `venue: None` with `amount_out: 0` means no registered venue had a usable
/// pool for the pair. That is a valid empty result, not an error; callers must
/// check it before attempting a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub amount_out: u128,
    pub venue: Option<Address>,
    pub path: Vec<Address>,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.venue.is_none()
    }
}

/// Settled swap, as reported back by the chosen venue.
///
/// `amounts` holds the realized amount at every hop boundary, starting with
/// the input; `amount_out` is always its last element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub id: Uuid,
    pub venue: Address,
    pub path: Vec<Address>,
    pub amount_in: u128,
    pub amount_out: u128,
    pub amounts: Vec<u128>,
}
