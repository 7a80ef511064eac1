use std::fmt;

use anyhow::{anyhow, Result};
use num_bigint::BigUint;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

/// Width of the identifier space in bits. Finger table index `i` covers the
/// arc starting at `local + 2^i`, so this is also the finger table size.
pub const ID_BITS: usize = 160;

/// Width of the identifier space in bytes (one SHA-1 digest).
pub const ID_BYTES: usize = 20;

/// A position on the identifier ring: an unsigned 160-bit integer in
/// `[0, 2^160)` with wrap-around at the top.
///
/// Stored most-significant-byte first, so the derived ordering is numeric
/// order. The wire form is the 40-character lowercase hex of the integer.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id([u8; ID_BYTES]);

impl Id {
    /// Derives the ring position of a network endpoint.
    ///
    /// The digest of `"{host}:{port}"` is interpreted little-endian: byte 0
    /// of the SHA-1 output is the least significant byte of the position.
    pub fn from_endpoint(host: &str, port: u16) -> Self {
        let digest = Sha1::digest(format!("{}:{}", host, port).as_bytes());
        let mut value = [0u8; ID_BYTES];
        for (i, byte) in digest.iter().enumerate() {
            value[ID_BYTES - 1 - i] = *byte;
        }
        Self(value)
    }

    /// Fixed-width lowercase hex of the integer value, 40 characters.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Parses the fixed-width hex form produced by [`Id::to_hex`].
    /// Rejects any input that is not exactly 40 hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != ID_BYTES * 2 {
            return Err(anyhow!(
                "identifier must be {} hex characters, got {}",
                ID_BYTES * 2,
                s.len()
            ));
        }
        let bytes = hex::decode(s).map_err(|e| anyhow!("invalid identifier hex: {}", e))?;
        let mut value = [0u8; ID_BYTES];
        value.copy_from_slice(&bytes);
        Ok(Self(value))
    }

    /// The start of finger `i` relative to this id: `(self + 2^i) mod 2^160`.
    pub fn finger_start(self, i: usize) -> Self {
        let sum = BigUint::from(self) + BigUint::from(2u8).pow(i as u32);
        Self::from(sum)
    }
}

impl From<Id> for BigUint {
    fn from(id: Id) -> BigUint {
        BigUint::from_bytes_be(&id.0)
    }
}

impl From<BigUint> for Id {
    fn from(value: BigUint) -> Self {
        let reduced = value % (BigUint::from(2u8).pow(ID_BITS as u32));
        let bytes = reduced.to_bytes_be();
        let mut padded = [0u8; ID_BYTES];
        padded[ID_BYTES - bytes.len()..].copy_from_slice(&bytes);
        Self(padded)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Id({})", self.to_hex())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Tests membership of `id` in the half-open arc `(start, end]`.
///
/// When `start >= end` the arc wraps through zero; when the bounds coincide
/// the arc covers the entire ring. Used to decide whether an identifier is
/// owned by a node's successor.
pub fn in_range_inclusive(id: Id, start: Id, end: Id) -> bool {
    if start == end {
        true
    } else if start < end {
        id > start && id <= end
    } else {
        id > start || id <= end
    }
}

/// Tests membership of `key` in the open arc `(start, end)`, wrap-around
/// handled as in [`in_range_inclusive`]. When the bounds coincide the arc
/// covers the entire ring. Used to decide whether a finger lies strictly
/// between a node and a lookup target.
pub fn in_range_exclusive(key: Id, start: Id, end: Id) -> bool {
    if start == end {
        true
    } else if start < end {
        key > start && key < end
    } else {
        key > start || key < end
    }
}
