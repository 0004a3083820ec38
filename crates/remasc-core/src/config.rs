//! Reward-engine configuration.
//!
//! [`RemascConfig`] is built once at node start from a [`NetworkType`]
//! preset, optionally overlaid by a TOML file and `REMASC_*` environment
//! variables, validated, and then never reloaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    NetworkType, DEFAULT_FEDERATION_DIVISOR, DEFAULT_LATE_UNCLE_INCLUSION_PUNISHMENT_DIVISOR,
    DEFAULT_PAID_FEES_DIVISOR, DEFAULT_PAID_FEES_MULTIPLIER, DEFAULT_PUBLISHERS_DIVISOR,
    DEFAULT_PUNISHMENT_DIVISOR, DEFAULT_RSK_LABS_DIVISOR, RSK_LABS_ADDRESS,
};
use crate::error::ConfigError;
use crate::types::Address;

/// Prefix for environment overrides, e.g. `REMASC_MATURITY=20`.
pub const ENV_PREFIX: &str = "REMASC";

/// Parameters of the reward distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemascConfig {
    /// Blocks before a block's fees are accrued into the reward balance.
    pub maturity: u64,
    /// Each payout withdraws `1 / synthetic_span` of the reward balance.
    pub synthetic_span: u64,
    /// Protocol beneficiary receives `1 / rsk_labs_divisor` of each payout.
    pub rsk_labs_divisor: u64,
    /// Federation cut divisor. Carried for parameter parity; the federation
    /// payout itself is not enabled.
    pub federation_divisor: u64,
    /// Publishers (includers of siblings) share `1 / publishers_divisor` of
    /// the sibling pool.
    pub publishers_divisor: u64,
    /// Burned fraction `1 / punishment_divisor` after a broken selection rule.
    pub punishment_divisor: u64,
    /// Per-block-late penalty fraction for sibling miners.
    pub late_uncle_inclusion_punishment_divisor: u64,
    /// Selection rule fee threshold is `multiplier * fees / divisor`.
    pub paid_fees_multiplier: u64,
    pub paid_fees_divisor: u64,
    /// Protocol beneficiary address.
    pub rsk_labs_address: Address,
}

impl Default for RemascConfig {
    fn default() -> Self {
        Self::for_network(NetworkType::Mainnet)
    }
}

impl RemascConfig {
    /// Preset parameters for a network.
    pub fn for_network(network: NetworkType) -> Self {
        Self {
            maturity: network.maturity(),
            synthetic_span: network.synthetic_span(),
            rsk_labs_divisor: DEFAULT_RSK_LABS_DIVISOR,
            federation_divisor: DEFAULT_FEDERATION_DIVISOR,
            publishers_divisor: DEFAULT_PUBLISHERS_DIVISOR,
            punishment_divisor: DEFAULT_PUNISHMENT_DIVISOR,
            late_uncle_inclusion_punishment_divisor: DEFAULT_LATE_UNCLE_INCLUSION_PUNISHMENT_DIVISOR,
            paid_fees_multiplier: DEFAULT_PAID_FEES_MULTIPLIER,
            paid_fees_divisor: DEFAULT_PAID_FEES_DIVISOR,
            rsk_labs_address: RSK_LABS_ADDRESS,
        }
    }

    /// Check that every count and divisor is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("maturity", self.maturity),
            ("synthetic_span", self.synthetic_span),
            ("rsk_labs_divisor", self.rsk_labs_divisor),
            ("federation_divisor", self.federation_divisor),
            ("publishers_divisor", self.publishers_divisor),
            ("punishment_divisor", self.punishment_divisor),
            (
                "late_uncle_inclusion_punishment_divisor",
                self.late_uncle_inclusion_punishment_divisor,
            ),
            ("paid_fees_multiplier", self.paid_fees_multiplier),
            ("paid_fees_divisor", self.paid_fees_divisor),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroParameter(*name)),
            None => Ok(()),
        }
    }

    /// Build a validated configuration from a preset, an optional file, and
    /// the environment, later sources overriding earlier ones.
    pub fn load(network: NetworkType, path: Option<&Path>) -> Result<Self, ConfigError> {
        let preset = config::Config::try_from(&Self::for_network(network))
            .map_err(|e| ConfigError::Source(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(preset);
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Source(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
