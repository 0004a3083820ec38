//! Remasc simulator.
//!
//! Replays a synthetic chain through the Remasc contract in memory and prints
//! the final contract state and account balances as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use remasc::RemascContract;
use remasc_core::config::RemascConfig;
use remasc_core::constants::{NetworkType, REMASC_ADDRESS};
use remasc_core::memory::MemoryWorld;
use remasc_core::types::{Address, Block, BlockHeader, Hash256, Transaction};

/// Remasc simulator: run the fee distribution over a synthetic chain.
#[derive(Parser, Debug)]
#[command(
    name = "remasc-sim",
    version,
    about = "Replay a synthetic chain through the Remasc fee distribution"
)]
struct Args {
    /// Network preset (mainnet, testnet, regtest)
    #[arg(long, default_value = "regtest")]
    network: NetworkType,

    /// TOML file overriding preset parameters.
    ///
    /// Defaults to `<config dir>/remasc/<network>.toml` when that file exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of blocks to produce, genesis included
    #[arg(long, default_value_t = 200)]
    blocks: u64,

    /// Fees paid by every main-chain block
    #[arg(long, default_value_t = 1_000_000)]
    fees: u64,

    /// Include one uncle of the previous height every K blocks (0 disables)
    #[arg(long, default_value_t = 0)]
    uncle_every: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let config_path = args.config.clone().or_else(|| default_config_path(args.network));
    let config = RemascConfig::load(args.network, config_path.as_deref())
        .with_context(|| format!("failed to load {} configuration", args.network.name()))?;

    info!(
        network = args.network.name(),
        maturity = config.maturity,
        synthetic_span = config.synthetic_span,
        blocks = args.blocks,
        "starting simulation"
    );

    let contract = RemascContract::new(config);
    let mut state = MemoryWorld::new();
    let mut store = MemoryWorld::new();
    let mut parent = Hash256::ZERO;

    for number in 0..args.blocks {
        let block = make_block(number, parent, args.fees, args.uncle_every);
        parent = block.hash();
        store.insert_block(block.clone());
        state.credit(REMASC_ADDRESS, args.fees);

        let snapshot = contract
            .execute(&mut state, &store, &block, &Transaction::remasc(number))
            .with_context(|| format!("remasc failed at height {number}"))?;
        debug!(height = number, %snapshot, "block processed");
    }

    let final_state = contract_state(&state)?;
    let balances: BTreeMap<String, String> = state
        .balances()
        .map(|(address, amount)| (address.to_string(), amount.to_string()))
        .collect();

    let report = serde_json::json!({
        "network": args.network.name(),
        "blocks": args.blocks,
        "config": contract.config(),
        "state": final_state,
        "balances": balances,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn default_config_path(network: NetworkType) -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join("remasc")
        .join(format!("{}.toml", network.name()));
    path.exists().then_some(path)
}

/// Miner of main-chain block `number`.
fn miner(number: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&number.to_be_bytes());
    bytes[0] = 0x4D;
    Address(bytes)
}

/// Miner of the uncle at `number`.
fn uncle_miner(number: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&number.to_be_bytes());
    bytes[0] = 0x55;
    Address(bytes)
}

fn make_block(number: u64, parent_hash: Hash256, fees: u64, uncle_every: u64) -> Block {
    let header = BlockHeader {
        number,
        parent_hash,
        coinbase: miner(number),
        timestamp: number,
        paid_fees: fees,
        nonce: 0,
        hash: Hash256::ZERO,
    }
    .seal();

    let mut uncles = Vec::new();
    if uncle_every > 0 && number > 0 && number % uncle_every == 0 {
        uncles.push(
            BlockHeader {
                number: number - 1,
                parent_hash: Hash256::ZERO,
                coinbase: uncle_miner(number - 1),
                timestamp: number,
                paid_fees: fees / 2,
                nonce: number,
                hash: Hash256::ZERO,
            }
            .seal(),
        );
    }

    Block {
        header,
        uncles,
        transactions: vec![Transaction::remasc(number)],
    }
}

fn contract_state(world: &MemoryWorld) -> Result<remasc::RemascState> {
    let provider = remasc::RemascStorageProvider::load(world, REMASC_ADDRESS)
        .context("contract storage unreadable")?;
    Ok(provider.snapshot())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. Logs go to stderr so stdout stays JSON.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncle_cadence() {
        assert!(make_block(0, Hash256::ZERO, 10, 2).uncles.is_empty());
        assert!(make_block(3, Hash256::ZERO, 10, 2).uncles.is_empty());
        let block = make_block(4, Hash256::ZERO, 10, 2);
        assert_eq!(block.uncles.len(), 1);
        assert_eq!(block.uncles[0].number, 3);
        assert_eq!(block.uncles[0].paid_fees, 5);
        assert!(make_block(4, Hash256::ZERO, 10, 0).uncles.is_empty());
    }

    #[test]
    fn miners_are_distinct() {
        assert_ne!(miner(7), uncle_miner(7));
        assert_ne!(miner(7), miner(8));
    }

    #[test]
    fn args_parse_network() {
        let args = Args::parse_from(["remasc-sim", "--network", "testnet", "--uncle-every", "3"]);
        assert_eq!(args.network, NetworkType::Testnet);
        assert_eq!(args.uncle_every, 3);
        assert_eq!(args.blocks, 200);
    }
}
