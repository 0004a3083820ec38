//! Protocol constants: the Remasc contract address, its storage cell keys,
//! and the per-network reward parameters.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::types::Address;

/// Well-known address of the Remasc precompiled contract.
///
/// Block fees are credited here during execution; every payout debits it.
pub const REMASC_ADDRESS: Address = Address([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x08,
]);

/// Protocol beneficiary on every public network.
pub const RSK_LABS_ADDRESS: Address = Address([
    0x14, 0xd3, 0x06, 0x5c, 0x8e, 0xb8, 0x98, 0x95, 0xf4, 0xdf, //
    0x12, 0x45, 0x0e, 0xc6, 0xb1, 0x30, 0x04, 0x9f, 0x80, 0x34,
]);

// --- Storage cell keys under REMASC_ADDRESS ---

pub const CELL_REWARD_BALANCE: &[u8] = b"REWARD_BALANCE";
pub const CELL_BURNED_BALANCE: &[u8] = b"BURNED_BALANCE";
pub const CELL_BROKEN_SELECTION_RULE: &[u8] = b"BROKEN_SELECTION_RULE";
pub const CELL_SIBLINGS: &[u8] = b"SIBLINGS";

// --- Reward parameters shared by all presets ---

pub const DEFAULT_RSK_LABS_DIVISOR: u64 = 5;
pub const DEFAULT_FEDERATION_DIVISOR: u64 = 100;
pub const DEFAULT_PUBLISHERS_DIVISOR: u64 = 10;
pub const DEFAULT_PUNISHMENT_DIVISOR: u64 = 10;
pub const DEFAULT_PAID_FEES_MULTIPLIER: u64 = 2;
pub const DEFAULT_PAID_FEES_DIVISOR: u64 = 1;
pub const DEFAULT_LATE_UNCLE_INCLUSION_PUNISHMENT_DIVISOR: u64 = 10;

/// Network type: Mainnet, Testnet, or Regtest.
///
/// Selects the maturity and smoothing span. Regtest matures quickly so that
/// local chains reach the payout phase within a few dozen blocks.
///
/// # Examples
///
/// ```
/// use remasc_core::constants::NetworkType;
/// let net = NetworkType::default();
/// assert_eq!(net, NetworkType::Mainnet);
/// assert_eq!(net.maturity(), 4000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network.
    Testnet,
    /// Local regression-test network.
    Regtest,
}

impl NetworkType {
    /// Blocks a block's fees wait before entering the reward balance.
    ///
    /// # Examples
    ///
    /// ```
    /// use remasc_core::constants::NetworkType;
    /// assert_eq!(NetworkType::Regtest.maturity(), 10);
    /// ```
    pub fn maturity(&self) -> u64 {
        match self {
            Self::Mainnet | Self::Testnet => 4000,
            Self::Regtest => 10,
        }
    }

    /// Denominator over which the reward balance is smoothed.
    ///
    /// # Examples
    ///
    /// ```
    /// use remasc_core::constants::NetworkType;
    /// assert_eq!(NetworkType::Mainnet.synthetic_span(), 2000);
    /// ```
    pub fn synthetic_span(&self) -> u64 {
        match self {
            Self::Mainnet | Self::Testnet => 2000,
            Self::Regtest => 50,
        }
    }

    /// Lowercase network name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }
}

impl FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            _ => Err(ConfigError::UnknownNetwork(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remasc_address_hex() {
        assert_eq!(
            REMASC_ADDRESS.to_string(),
            "0000000000000000000000000000000001000008"
        );
    }

    #[test]
    fn rsk_labs_address_hex() {
        assert_eq!(
            RSK_LABS_ADDRESS.to_string(),
            "14d3065c8eb89895f4df12450ec6b130049f8034"
        );
    }

    #[test]
    fn cell_keys_are_distinct() {
        let keys = [
            CELL_REWARD_BALANCE,
            CELL_BURNED_BALANCE,
            CELL_BROKEN_SELECTION_RULE,
            CELL_SIBLINGS,
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn regtest_matures_faster_than_mainnet() {
        assert!(NetworkType::Regtest.maturity() < NetworkType::Mainnet.maturity());
        assert!(NetworkType::Regtest.synthetic_span() < NetworkType::Mainnet.synthetic_span());
    }

    #[test]
    fn testnet_shares_mainnet_schedule() {
        assert_eq!(NetworkType::Testnet.maturity(), NetworkType::Mainnet.maturity());
        assert_eq!(
            NetworkType::Testnet.synthetic_span(),
            NetworkType::Mainnet.synthetic_span()
        );
    }

    #[test]
    fn network_names() {
        assert_eq!(NetworkType::Mainnet.name(), "mainnet");
        assert_eq!(NetworkType::Testnet.name(), "testnet");
        assert_eq!(NetworkType::Regtest.name(), "regtest");
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Regtest".parse::<NetworkType>().unwrap(), NetworkType::Regtest);
        for net in [NetworkType::Mainnet, NetworkType::Testnet, NetworkType::Regtest] {
            assert_eq!(net.name().parse::<NetworkType>().unwrap(), net);
        }
        assert_eq!(
            "devnet".parse::<NetworkType>().unwrap_err(),
            ConfigError::UnknownNetwork("devnet".into())
        );
    }
}
