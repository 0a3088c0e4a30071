use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::shared::types::Address;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCfg {
    pub owner: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeCfg {
    /// Default min-out floor applied when the caller does not pin one
    pub slippage_bps: u32,
    /// Deadline slack added to "now" when the caller does not supply a deadline
    pub deadline_secs: i64,
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            slippage_bps: 100,
            deadline_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCfg {
    pub symbol: String,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolCfg {
    pub token_a: String,
    pub token_b: String,
    pub reserve_a: u128,
    pub reserve_b: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueCfg {
    pub name: String,
    pub address: Option<Address>,
    /// Venue fee in basis points; the conventional 0.3% when omitted
    pub fee_bps: Option<u32>,
    #[serde(default)]
    pub pools: Vec<PoolCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoCfg {
    pub caller: Address,
    #[serde(default)]
    pub balances: Vec<BalanceCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceCfg {
    pub token: String,
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub admin: AdminCfg,
    #[serde(default)]
    pub trade: TradeCfg,
    #[serde(default)]
    pub tokens: Vec<TokenCfg>,
    #[serde(default)]
    pub venues: Vec<VenueCfg>,
    /// Connector tokens allowed as the middle hop, by symbol or address
    #[serde(default)]
    pub connectors: Vec<String>,
    pub demo: Option<DemoCfg>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config file")?;
        Ok(cfg)
    }

    /// Resolve a token given either a configured symbol or a hex address
    pub fn resolve_token(&self, s: &str) -> Result<Address> {
        if let Some(token) = self.tokens.iter().find(|t| t.symbol == s) {
            return Ok(token.address);
        }
        s.parse()
            .with_context(|| format!("unknown token symbol or bad address: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        connectors = ["USDC"]

        [admin]
        owner = "0x00000000000000000000000000000000000000aa"

        [trade]
        slippage_bps = 50
        deadline_secs = 60

        [[tokens]]
        symbol = "WETH"
        address = "0x0000000000000000000000000000000000000001"

        [[tokens]]
        symbol = "USDC"
        address = "0x0000000000000000000000000000000000000002"

        [[venues]]
        name = "alpha"

        [[venues.pools]]
        token_a = "WETH"
        token_b = "USDC"
        reserve_a = 1000
        reserve_b = 3000

        [demo]
        caller = "0x00000000000000000000000000000000000000cc"

        [[demo.balances]]
        token = "WETH"
        amount = 500
    "#;

    #[test]
    fn parses_full_config() {
        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.trade.slippage_bps, 50);
        assert_eq!(cfg.venues.len(), 1);
        assert_eq!(cfg.venues[0].pools.len(), 1);
        assert_eq!(cfg.connectors, vec!["USDC".to_string()]);
        assert_eq!(cfg.demo.unwrap().balances[0].amount, 500);
    }

    #[test]
    fn resolve_token_by_symbol_and_address() {
        let cfg: Config = toml::from_str(SAMPLE).unwrap();
        let weth = cfg.resolve_token("WETH").unwrap();
        assert_eq!(weth.as_bytes()[19], 1);
        let raw = cfg
            .resolve_token("0x00000000000000000000000000000000000000ff")
            .unwrap();
        assert_eq!(raw.as_bytes()[19], 0xff);
        assert!(cfg.resolve_token("NOPE").is_err());
    }
}
