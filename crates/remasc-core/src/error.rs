//! Error types for the Remasc engine and its collaborators.
use thiserror::Error;

use crate::types::{Address, Hash256};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("truncated: need {need} bytes, have {have}")] Truncated { need: usize, have: usize },
    #[error("trailing bytes: {0}")] TrailingBytes(usize),
    #[error("non-canonical integer: leading zero byte")] NonCanonicalInteger,
    #[error("integer too wide: {0} bytes")] IntegerTooWide(usize),
    #[error("invalid length for {field}: got {got}, expected {expected}")] InvalidLength { field: &'static str, got: usize, expected: usize },
    #[error("invalid boolean byte: {0:#04x}")] InvalidBool(u8),
    #[error("heights not strictly ascending: {prev} then {next}")] UnsortedHeights { prev: u64, next: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance in {address}: have {have}, need {need}")] InsufficientBalance { address: Address, have: String, need: String },
    #[error("state: {0}")] State(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("parameter must be positive: {0}")] ZeroParameter(&'static str),
    #[error("config source: {0}")] Source(String),
    #[error("unknown network: {0}")] UnknownNetwork(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemascError {
    #[error("invalid invocation: {0}")] InvalidInvocation(String),
    #[error("corrupt state in cell {cell}: {source}")] CorruptState { cell: &'static str, source: CodecError },
    #[error("ancestor missing at depth {depth} from {hash}")] AncestorMissing { hash: Hash256, depth: u64 },
    #[error("consensus violation: {0}")] ConsensusViolation(String),
    #[error("storage: {0}")] Storage(String),
    #[error("invalid config: {0}")] InvalidConfig(#[from] ConfigError),
}

impl From<TransferError> for RemascError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::InsufficientBalance { .. } => Self::ConsensusViolation(e.to_string()),
            TransferError::State(msg) => Self::Storage(msg),
        }
    }
}
