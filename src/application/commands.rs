//! CLI commands and handlers
//!
//! Every invocation builds the in-memory venue environment from the config
//! file, registers the configured venues and connectors as the owner, then
//! runs one command against it.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::application::AggregatorService;
use crate::domain::pricing;
use crate::domain::venue::{PoolFactory, VenueRouter};
use crate::infrastructure::memory::{InMemoryLedger, InMemoryVenue};
use crate::shared::config::Config;
use crate::shared::types::Address;

#[derive(Parser)]
#[command(name = "deroute")]
#[command(version, about = "Multi-venue AMM swap aggregator")]
pub struct Cli {
    /// Path to config file
    #[arg(long, default_value = "deroute.toml")]
    pub config: String,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the venue offering the best output for a token pair
    Quote {
        /// Input amount, in the token's smallest unit
        #[arg(long)]
        amount_in: u128,

        /// Input token, by configured symbol or hex address
        #[arg(long)]
        token_in: String,

        /// Output token, by configured symbol or hex address
        #[arg(long)]
        token_out: String,
    },

    /// Execute a swap against an allow-listed venue
    Swap {
        /// Input amount, in the token's smallest unit
        #[arg(long)]
        amount_in: u128,

        /// Comma-separated token path, 2 or 3 entries (symbols or addresses)
        #[arg(long)]
        path: String,

        /// Venue name or address; the best-quoted venue when omitted
        #[arg(long)]
        venue: Option<String>,

        /// Minimum acceptable output; derived from a fresh quote and
        /// trade.slippage_bps when omitted
        #[arg(long)]
        min_out: Option<u128>,

        /// Absolute unix deadline; now + trade.deadline_secs when omitted
        #[arg(long)]
        deadline: Option<i64>,
    },

    /// Show the registered venues and connector allow-list
    Venues,
}

/// The in-memory world one CLI run operates on
pub struct DemoEnv {
    pub ledger: Arc<InMemoryLedger>,
    pub service: AggregatorService,
    pub venues: Vec<Arc<InMemoryVenue>>,
    pub caller: Address,
}

pub async fn build_environment(cfg: &Config) -> Result<DemoEnv> {
    let ledger = Arc::new(InMemoryLedger::new());
    let service = AggregatorService::new(cfg.admin.owner, ledger.clone());

    let mut venues = Vec::new();
    for venue_cfg in &cfg.venues {
        let mut builder = InMemoryVenue::builder(&venue_cfg.name, ledger.clone());
        if let Some(address) = venue_cfg.address {
            builder = builder.with_address(address);
        }
        if let Some(fee_bps) = venue_cfg.fee_bps {
            builder = builder.with_fee(fee_bps);
        }
        for pool in &venue_cfg.pools {
            let token_a = cfg.resolve_token(&pool.token_a)?;
            let token_b = cfg.resolve_token(&pool.token_b)?;
            builder = builder.with_pool(token_a, pool.reserve_a, token_b, pool.reserve_b);
        }
        let venue = builder.build();
        venue.set_payer(service.custody());
        info!(name = venue.name(), address = %venue.address(), "venue ready");
        venues.push(venue);
    }

    service
        .set_routers(
            cfg.admin.owner,
            venues
                .iter()
                .map(|v| v.clone() as Arc<dyn VenueRouter>)
                .collect(),
        )
        .await
        .context("register venues")?;

    let connectors = cfg
        .connectors
        .iter()
        .map(|c| cfg.resolve_token(c))
        .collect::<Result<Vec<_>>>()?;
    service
        .set_connectors(cfg.admin.owner, connectors)
        .await
        .context("register connectors")?;

    let caller = match &cfg.demo {
        Some(demo) => {
            for balance in &demo.balances {
                let token = cfg.resolve_token(&balance.token)?;
                ledger.mint(token, demo.caller, balance.amount);
            }
            demo.caller
        }
        None => Address::random(),
    };

    Ok(DemoEnv {
        ledger,
        service,
        venues,
        caller,
    })
}

pub async fn run(cli: Cli) -> Result<()> {
    let cfg = Config::from_file(&cli.config)?;
    let env = build_environment(&cfg).await?;

    match cli.command {
        Commands::Quote {
            amount_in,
            token_in,
            token_out,
        } => {
            let token_in = cfg.resolve_token(&token_in)?;
            let token_out = cfg.resolve_token(&token_out)?;
            let quote = env.service.quote(amount_in, token_in, token_out).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else if quote.is_empty() {
                println!("❌ No liquidity found across {} venue(s)", env.venues.len());
            } else {
                let venue = quote.venue.unwrap();
                let name = venue_name(&env, venue);
                println!("✅ Best venue: {} ({})", name, venue);
                println!("   {} in -> {} out", amount_in, quote.amount_out);
            }
        }

        Commands::Swap {
            amount_in,
            path,
            venue,
            min_out,
            deadline,
        } => {
            let path = parse_path(&cfg, &path)?;
            let venue = resolve_venue(&cfg, &env, venue.as_deref(), amount_in, &path).await?;
            let min_out = match min_out {
                Some(value) => value,
                None => {
                    let quote = env
                        .service
                        .quote(amount_in, path[0], *path.last().unwrap())
                        .await?;
                    if quote.is_empty() {
                        return Err(anyhow!("no liquidity to derive --min-out from"));
                    }
                    pricing::min_out(quote.amount_out, cfg.trade.slippage_bps)
                }
            };
            let deadline =
                deadline.unwrap_or_else(|| Utc::now().timestamp() + cfg.trade.deadline_secs);

            let receipt = env
                .service
                .swap(env.caller, amount_in, min_out, venue, &path, deadline)
                .await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                println!("✅ Swap {} settled on {}", receipt.id, venue_name(&env, venue));
                println!(
                    "   {} in -> {} out (per-hop: {:?})",
                    receipt.amount_in, receipt.amount_out, receipt.amounts
                );
            }
        }

        Commands::Venues => {
            let routers = env.service.registry().routers().await;
            let connectors = env.service.registry().connectors().await;
            println!("Registered venues ({}):", routers.len());
            for entry in &routers {
                println!(
                    "  {} ({}) factory {}",
                    venue_name(&env, entry.address()),
                    entry.address(),
                    entry.factory.address()
                );
            }
            println!("Allowed connectors ({}):", connectors.len());
            for connector in &connectors {
                println!("  {}", connector);
            }
        }
    }

    Ok(())
}

/// Comma-separated symbols or addresses into a token path
fn parse_path(cfg: &Config, raw: &str) -> Result<Vec<Address>> {
    raw.split(',')
        .map(|s| cfg.resolve_token(s.trim()))
        .collect()
}

async fn resolve_venue(
    cfg: &Config,
    env: &DemoEnv,
    venue: Option<&str>,
    amount_in: u128,
    path: &[Address],
) -> Result<Address> {
    match venue {
        Some(s) => {
            if let Some(venue) = env.venues.iter().find(|v| v.name() == s) {
                return Ok(venue.address());
            }
            s.parse()
                .with_context(|| format!("unknown venue name or bad address: {}", s))
        }
        None => {
            if path.len() != 2 {
                return Err(anyhow!("--venue is required for connector paths"));
            }
            let quote = env.service.quote(amount_in, path[0], path[1]).await?;
            quote
                .venue
                .ok_or_else(|| anyhow!("no venue has liquidity for this pair"))
        }
    }
}

fn venue_name(env: &DemoEnv, address: Address) -> String {
    env.venues
        .iter()
        .find(|v| v.address() == address)
        .map(|v| v.name().to_string())
        .unwrap_or_else(|| address.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_CONFIG: &str = r#"
        connectors = ["USDC"]

        [admin]
        owner = "0x00000000000000000000000000000000000000aa"

        [[tokens]]
        symbol = "WETH"
        address = "0x0000000000000000000000000000000000000001"

        [[tokens]]
        symbol = "USDC"
        address = "0x0000000000000000000000000000000000000002"

        [[tokens]]
        symbol = "DAI"
        address = "0x0000000000000000000000000000000000000003"

        [[venues]]
        name = "alpha"

        [[venues.pools]]
        token_a = "WETH"
        token_b = "USDC"
        reserve_a = 1000000
        reserve_b = 3000000

        [[venues]]
        name = "beta"
        fee_bps = 25

        [[venues.pools]]
        token_a = "WETH"
        token_b = "USDC"
        reserve_a = 2000000
        reserve_b = 6000000

        [[venues.pools]]
        token_a = "USDC"
        token_b = "DAI"
        reserve_a = 5000000
        reserve_b = 5000000

        [demo]
        caller = "0x00000000000000000000000000000000000000cc"

        [[demo.balances]]
        token = "WETH"
        amount = 100000
    "#;

    #[tokio::test]
    async fn environment_registers_everything_from_config() {
        let cfg: Config = toml::from_str(DEMO_CONFIG).unwrap();
        let env = build_environment(&cfg).await.unwrap();

        let routers = env.service.registry().routers().await;
        assert_eq!(routers.len(), 2);
        let usdc = cfg.resolve_token("USDC").unwrap();
        assert!(env.service.registry().is_allowed_connector(usdc).await);

        let weth = cfg.resolve_token("WETH").unwrap();
        assert_eq!(env.ledger.balance_of(weth, env.caller), 100_000);
    }

    #[tokio::test]
    async fn quote_and_swap_through_the_demo_environment() {
        let cfg: Config = toml::from_str(DEMO_CONFIG).unwrap();
        let env = build_environment(&cfg).await.unwrap();
        let weth = cfg.resolve_token("WETH").unwrap();
        let usdc = cfg.resolve_token("USDC").unwrap();
        let dai = cfg.resolve_token("DAI").unwrap();

        // beta is deeper and cheaper, it must win the quote
        let quote = env.service.quote(10_000, weth, usdc).await.unwrap();
        let beta = env.venues.iter().find(|v| v.name() == "beta").unwrap();
        assert_eq!(quote.venue, Some(beta.address()));

        let receipt = env
            .service
            .swap(
                env.caller,
                10_000,
                pricing::min_out(quote.amount_out, cfg.trade.slippage_bps),
                beta.address(),
                &[weth, usdc],
                Utc::now().timestamp() + cfg.trade.deadline_secs,
            )
            .await
            .unwrap();
        assert_eq!(receipt.amount_out, quote.amount_out);

        // Connector path WETH -> USDC -> DAI on beta
        let receipt = env
            .service
            .swap(
                env.caller,
                10_000,
                1,
                beta.address(),
                &[weth, usdc, dai],
                Utc::now().timestamp() + cfg.trade.deadline_secs,
            )
            .await
            .unwrap();
        assert_eq!(receipt.amounts.len(), 3);
        assert_eq!(env.ledger.balance_of(dai, env.caller), receipt.amount_out);
    }

    #[test]
    fn parse_path_resolves_symbols_and_addresses() {
        let cfg: Config = toml::from_str(DEMO_CONFIG).unwrap();
        let path = parse_path(&cfg, "WETH, USDC").unwrap();
        assert_eq!(path.len(), 2);
        assert!(parse_path(&cfg, "WETH,NOPE").is_err());
    }
}
