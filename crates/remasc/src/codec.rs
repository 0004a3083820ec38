//! Byte encoding of the contract's storage cells.
//!
//! - Integers: big-endian, minimal length, empty bytes for zero. A leading
//!   zero byte is rejected as non-canonical.
//! - Booleans: one byte, `0x00` or `0x01`. An empty (never written) cell
//!   reads as `false`.
//! - Siblings map: `u32` entry count, then per entry the height as a
//!   length-prefixed integer, a `u32` sibling count, and each sibling as its
//!   five fields in declaration order, each length-prefixed. Heights are
//!   written ascending and must be strictly ascending on read.
//!
//! Length prefixes and counts are big-endian `u32`. Decoders consume the
//! whole input and reject trailing bytes.

use bytes::{Buf, BufMut, BytesMut};
use num_bigint::BigUint;
use num_traits::Zero;

use remasc_core::error::CodecError;
use remasc_core::types::{Address, Hash256};

use crate::sibling::{Sibling, SiblingsMap};

// ------------------------------------------------------------------
// Scalars
// ------------------------------------------------------------------

/// Encode a non-negative integer as minimal big-endian bytes.
pub fn encode_biguint(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}

/// Decode minimal big-endian bytes into an integer.
pub fn decode_biguint(bytes: &[u8]) -> Result<BigUint, CodecError> {
    if bytes.first() == Some(&0) {
        return Err(CodecError::NonCanonicalInteger);
    }
    Ok(BigUint::from_bytes_be(bytes))
}

/// Encode a `u64` as minimal big-endian bytes.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

/// Decode minimal big-endian bytes into a `u64`.
pub fn decode_u64(bytes: &[u8]) -> Result<u64, CodecError> {
    if bytes.first() == Some(&0) {
        return Err(CodecError::NonCanonicalInteger);
    }
    if bytes.len() > 8 {
        return Err(CodecError::IntegerTooWide(bytes.len()));
    }
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

pub fn encode_bool(value: bool) -> Vec<u8> {
    vec![u8::from(value)]
}

pub fn decode_bool(bytes: &[u8]) -> Result<bool, CodecError> {
    match bytes {
        [] | [0x00] => Ok(false),
        [0x01] => Ok(true),
        [other] => Err(CodecError::InvalidBool(*other)),
        _ => Err(CodecError::InvalidLength {
            field: "bool",
            got: bytes.len(),
            expected: 1,
        }),
    }
}

// ------------------------------------------------------------------
// Siblings map
// ------------------------------------------------------------------

fn put_field(buf: &mut BytesMut, field: &[u8]) {
    buf.put_u32(field.len() as u32);
    buf.put_slice(field);
}

fn put_sibling(buf: &mut BytesMut, sibling: &Sibling) {
    put_field(buf, sibling.hash.as_bytes());
    put_field(buf, sibling.coinbase.as_bytes());
    put_field(buf, &encode_u64(sibling.paid_fees));
    put_field(buf, &encode_u64(sibling.included_height));
    put_field(buf, sibling.included_block_coinbase.as_bytes());
}

/// Encode the siblings map. Heights come out ascending because the map is
/// ordered.
pub fn encode_siblings(map: &SiblingsMap) -> Vec<u8> {
    let mut buf = BytesMut::new();
    buf.put_u32(map.len() as u32);
    for (height, siblings) in map {
        put_field(&mut buf, &encode_u64(*height));
        buf.put_u32(siblings.len() as u32);
        for sibling in siblings {
            put_sibling(&mut buf, sibling);
        }
    }
    buf.to_vec()
}

/// Cursor over an encoded cell with bounds-checked reads.
struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn need(&self, n: usize) -> Result<(), CodecError> {
        if self.buf.remaining() < n {
            return Err(CodecError::Truncated {
                need: n,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    fn field(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.u32()? as usize;
        self.need(len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    fn fixed<const N: usize>(&mut self, name: &'static str) -> Result<[u8; N], CodecError> {
        let field = self.field()?;
        field.try_into().map_err(|_| CodecError::InvalidLength {
            field: name,
            got: field.len(),
            expected: N,
        })
    }

    fn finish(self) -> Result<(), CodecError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

fn read_sibling(reader: &mut Reader<'_>) -> Result<Sibling, CodecError> {
    Ok(Sibling {
        hash: Hash256(reader.fixed::<32>("hash")?),
        coinbase: Address(reader.fixed::<20>("coinbase")?),
        paid_fees: decode_u64(reader.field()?)?,
        included_height: decode_u64(reader.field()?)?,
        included_block_coinbase: Address(reader.fixed::<20>("included_block_coinbase")?),
    })
}

/// Decode the siblings map. An empty cell is an empty map.
pub fn decode_siblings(bytes: &[u8]) -> Result<SiblingsMap, CodecError> {
    let mut map = SiblingsMap::new();
    if bytes.is_empty() {
        return Ok(map);
    }
    let mut reader = Reader::new(bytes);
    let entries = reader.u32()?;
    let mut prev: Option<u64> = None;
    for _ in 0..entries {
        let height = decode_u64(reader.field()?)?;
        if let Some(prev) = prev {
            if height <= prev {
                return Err(CodecError::UnsortedHeights { prev, next: height });
            }
        }
        prev = Some(height);

        let count = reader.u32()?;
        let mut siblings = Vec::new();
        for _ in 0..count {
            siblings.push(read_sibling(&mut reader)?);
        }
        map.insert(height, siblings);
    }
    reader.finish()?;
    Ok(map)
}
