//! Core protocol types: addresses, hashes, headers, blocks, transactions.
//!
//! Fee amounts carried by headers are `u64` in the smallest unit. All reward
//! arithmetic performed on them by the engine is done in [`BigUint`].

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::constants::REMASC_ADDRESS;

/// Decode a hex string (with or without `0x`) into a fixed-size array.
fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], hex::FromHexError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out)?;
    Ok(out)
}

/// A 20-byte account address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Byte length of an address.
    pub const LEN: usize = 20;

    /// The all-zero address. Sender of the synthetic Remasc transaction.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create an address from a byte array.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
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
        s.parse().map_err(de::Error::custom)
    }
}

/// A 32-byte hash value.
///
/// `Ord` is lexicographic over the bytes, which is the ordering the
/// selection rule uses to compare a sibling against the main-chain block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Byte length of a hash.
    pub const LEN: usize = 32;

    /// The zero hash (32 zero bytes). Parent of the genesis block.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Serialize a [`BigUint`] as a decimal string.
///
/// JSON numbers lose precision past 2^53, so balances go out as strings.
pub fn serialize_biguint<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(10))
}

/// Block header as seen by the reward engine.
///
/// `hash` is carried alongside the header fields, the way a block store
/// returns it. [`BlockHeader::seal`] recomputes it from the other fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Height of this block. Genesis is 0.
    pub number: u64,
    /// Hash of the parent block header.
    pub parent_hash: Hash256,
    /// Address credited as the miner of this block.
    pub coinbase: Address,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Total transaction fees paid in this block.
    pub paid_fees: u64,
    /// Proof-of-work nonce.
    pub nonce: u64,
    /// Header hash.
    pub hash: Hash256,
}

impl BlockHeader {
    /// Size of the fixed hashing layout (4 u64 fields + hash + address).
    const HASH_SIZE: usize = 4 * 8 + Hash256::LEN + Address::LEN;

    /// Compute the header hash (double SHA-256).
    ///
    /// Layout: number || parent_hash || coinbase || timestamp || paid_fees ||
    /// nonce, integers little-endian. The `hash` field itself is excluded.
    pub fn compute_hash(&self) -> Hash256 {
        let mut data = Vec::with_capacity(Self::HASH_SIZE);
        data.extend_from_slice(&self.number.to_le_bytes());
        data.extend_from_slice(self.parent_hash.as_bytes());
        data.extend_from_slice(self.coinbase.as_bytes());
        data.extend_from_slice(&self.timestamp.to_le_bytes());
        data.extend_from_slice(&self.paid_fees.to_le_bytes());
        data.extend_from_slice(&self.nonce.to_le_bytes());
        let first = Sha256::digest(&data);
        let second = Sha256::digest(first);
        Hash256(second.into())
    }

    /// Return this header with `hash` set from its contents.
    pub fn seal(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }
}

/// A block: header, uncle headers, and transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    /// Uncle (sibling) headers referenced by this block, in inclusion order.
    pub uncles: Vec<BlockHeader>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Height of this block.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Hash of this block's header.
    pub fn hash(&self) -> Hash256 {
        self.header.hash
    }

    /// Hash of the parent block.
    pub fn parent_hash(&self) -> Hash256 {
        self.header.parent_hash
    }

    /// Miner address of this block.
    pub fn coinbase(&self) -> Address {
        self.header.coinbase
    }
}

/// Transaction variant tag.
///
/// `Remasc` is produced only by the block builder via
/// [`Transaction::remasc`]; a signed user transaction can never decode into
/// it, whatever its sender or receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TxKind {
    /// Ordinary user-signed transaction.
    #[default]
    Signed,
    /// Synthetic final transaction of each block that triggers reward payout.
    Remasc,
}

/// A transaction. Only the fields the reward engine and its host care about.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TxKind,
    pub nonce: u64,
    pub sender: Address,
    pub receiver: Address,
    pub value: u64,
    pub data: Vec<u8>,
    /// Empty for the synthetic Remasc transaction.
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Build the synthetic Remasc transaction for the block at `block_number`.
    pub fn remasc(block_number: u64) -> Self {
        Self {
            kind: TxKind::Remasc,
            nonce: block_number.saturating_sub(1),
            sender: Address::ZERO,
            receiver: REMASC_ADDRESS,
            value: 0,
            data: Vec::new(),
            signature: Vec::new(),
        }
    }

    /// Whether this is the synthetic Remasc transaction.
    pub fn is_remasc(&self) -> bool {
        self.kind == TxKind::Remasc
    }
}
