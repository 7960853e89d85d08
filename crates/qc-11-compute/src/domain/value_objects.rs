//! # Value Objects
//!
//! Immutable domain primitives for the compute module.
//! These types represent concepts that are defined by their value, not identity.

use crate::errors::DecodeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bech32::primitives::decode::CheckedHrpstring;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for coin amounts
pub use primitive_types::U256;

// =============================================================================
// ACCOUNT ADDRESS (0..=32 bytes)
// =============================================================================

/// An account or contract address.
///
/// Rendered as bech32 with the [`AccAddress::BECH32_HRP`] prefix. The empty
/// address is a valid value and renders as `""`, so shaping a response around
/// an absent address can never fail.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccAddress(Vec<u8>);

impl AccAddress {
    /// Bech32 human-readable prefix.
    pub const BECH32_HRP: &'static str = "secret";

    /// Maximum address length in bytes.
    pub const MAX_LEN: usize = 32;

    /// Canonical account address length.
    pub const LEN: usize = 20;

    /// The empty address.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Creates an address from a slice. Fails when longer than [`Self::MAX_LEN`].
    pub fn from_slice(slice: &[u8]) -> Result<Self, DecodeError> {
        if slice.len() > Self::MAX_LEN {
            return Err(DecodeError::Address(format!(
                "address length {} exceeds {}",
                slice.len(),
                Self::MAX_LEN
            )));
        }
        Ok(Self(slice.to_vec()))
    }

    /// Creates a canonical 20-byte address.
    #[must_use]
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes.to_vec())
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if this is the empty address.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders an optional address, using `""` when absent.
    #[must_use]
    pub fn render(address: Option<&Self>) -> String {
        address.map(ToString::to_string).unwrap_or_default()
    }
}

impl fmt::Display for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let hrp = bech32::Hrp::parse_unchecked(Self::BECH32_HRP);
        // Length is bounded by MAX_LEN, so encoding stays under the bech32 limit.
        match bech32::encode::<bech32::Bech32>(hrp, &self.0) {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => Ok(()),
        }
    }
}

impl fmt::Debug for AccAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccAddress(0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

impl FromStr for AccAddress {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::empty());
        }
        // Only the canonical lowercase bech32 form is accepted
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(DecodeError::Address(format!("not lowercase: {s}")));
        }
        let checked = CheckedHrpstring::new::<bech32::Bech32>(s)
            .map_err(|e| DecodeError::Address(e.to_string()))?;
        let hrp = checked.hrp();
        let expected = bech32::Hrp::parse_unchecked(Self::BECH32_HRP);
        if hrp != expected {
            return Err(DecodeError::Address(format!(
                "invalid prefix: expected '{}', got '{}'",
                Self::BECH32_HRP,
                hrp
            )));
        }
        let data: Vec<u8> = checked.byte_iter().collect();
        Self::from_slice(&data)
    }
}

impl Serialize for AccAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl From<[u8; 20]> for AccAddress {
    fn from(bytes: [u8; 20]) -> Self {
        Self::new(bytes)
    }
}

// =============================================================================
// CODE ID
// =============================================================================

/// Identifier of a stored bytecode artifact.
///
/// Assigned monotonically by the keeper; `0` is the "none assigned" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(pub u64);

impl CodeId {
    /// The sentinel value returned when no code was stored.
    pub const NONE: Self = Self(0);

    /// Creates a code id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns true for the sentinel value.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Big-endian bytes, used for address derivation.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CODE HASH (32 bytes)
// =============================================================================

/// SHA-256 of a stored bytecode artifact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CodeHash(pub [u8; 32]);

impl CodeHash {
    /// Hashes the given bytecode.
    #[must_use]
    pub fn of(code: &[u8]) -> Self {
        let digest = Sha256::digest(code);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeHash({self})")
    }
}

// =============================================================================
// BINARY (variable length, base64 on the wire)
// =============================================================================

/// Opaque byte payload (bytecode, contract messages, response data).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    /// Creates an empty payload.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a payload from a slice.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }

    /// Returns the underlying slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the underlying vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Returns the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard base64 rendering.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Parses standard base64.
    pub fn from_base64(encoded: &str) -> Result<Self, DecodeError> {
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| DecodeError::Tx(format!("invalid base64: {e}")))
    }
}

impl fmt::Debug for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binary({})", self.to_base64())
    }
}

impl From<Vec<u8>> for Binary {
    fn from(vec: Vec<u8>) -> Self {
        Self(vec)
    }
}

impl From<&[u8]> for Binary {
    fn from(slice: &[u8]) -> Self {
        Self::from_slice(slice)
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Binary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Binary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// COINS
// =============================================================================

/// A single denomination/amount pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination, e.g. `uscrt`.
    pub denom: String,
    /// Amount as a decimal string on the wire.
    #[serde(with = "decimal_u256")]
    pub amount: U256,
}

impl Coin {
    /// Creates a coin.
    #[must_use]
    pub fn new(amount: impl Into<U256>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// An ordered set of coins.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(pub Vec<Coin>);

impl Coins {
    /// No funds.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns true when no coins are carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the coins.
    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    /// Checks denom syntax, non-zero amounts, ascending order and uniqueness.
    pub fn validate(&self) -> Result<(), String> {
        let mut previous: Option<&str> = None;
        for coin in &self.0 {
            if !is_valid_denom(&coin.denom) {
                return Err(format!("invalid denom: {}", coin.denom));
            }
            if coin.amount.is_zero() {
                return Err(format!("coin {} amount is not positive", coin.denom));
            }
            if let Some(prev) = previous {
                if coin.denom.as_str() <= prev {
                    return Err(format!(
                        "denomination {} is not sorted or duplicated",
                        coin.denom
                    ));
                }
            }
            previous = Some(&coin.denom);
        }
        Ok(())
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        Self(coins)
    }
}

/// `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`
fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    if !(3..=128).contains(&bytes.len()) || !bytes[0].is_ascii_alphabetic() {
        return false;
    }
    bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'))
}

mod decimal_u256 {
    use super::U256;
    use crate::errors::DecodeError;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_dec_str(&s)
            .map_err(|e| DecodeError::Amount(format!("{s}: {e:?}")))
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================
