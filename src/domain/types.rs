//! Value types shared by the encrypt/decrypt facades.

use crate::error::{Error, Result};
use primitive_types::U256;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Plaintext widths accepted by the FHE instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BitWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
    W256,
}

impl BitWidth {
    pub const ALL: [BitWidth; 6] = [
        BitWidth::W8,
        BitWidth::W16,
        BitWidth::W32,
        BitWidth::W64,
        BitWidth::W128,
        BitWidth::W256,
    ];

    pub fn bits(self) -> u32 {
        match self {
            BitWidth::W8 => 8,
            BitWidth::W16 => 16,
            BitWidth::W32 => 32,
            BitWidth::W64 => 64,
            BitWidth::W128 => 128,
            BitWidth::W256 => 256,
        }
    }

    /// Largest plaintext representable at this width (`2^bits - 1`).
    pub fn max_value(self) -> U256 {
        match self {
            BitWidth::W256 => U256::MAX,
            other => (U256::one() << other.bits()) - U256::one(),
        }
    }

    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(BitWidth::W8),
            16 => Ok(BitWidth::W16),
            32 => Ok(BitWidth::W32),
            64 => Ok(BitWidth::W64),
            128 => Ok(BitWidth::W128),
            256 => Ok(BitWidth::W256),
            other => Err(Error::UnsupportedWidth(other)),
        }
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        BitWidth::W32
    }
}

impl fmt::Display for BitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for BitWidth {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_u32(self.bits())
    }
}

/// A plaintext before coercion to an unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlainValue {
    Bool(bool),
    Uint(U256),
    /// Signed input; only non-negative values survive coercion.
    Int(i128),
    /// Magnitude of a negative decimal string, kept whole so any size reports a range error.
    Negative(U256),
}

impl PlainValue {
    /// Coerces to an unsigned integer and checks `0 <= v <= 2^bits - 1`.
    pub fn to_uint(self, width: BitWidth) -> Result<U256> {
        let value = match self {
            PlainValue::Bool(b) => {
                if b {
                    U256::one()
                } else {
                    U256::zero()
                }
            }
            PlainValue::Uint(v) => v,
            PlainValue::Int(i) if i < 0 => return Err(range_error(i.to_string(), width)),
            PlainValue::Int(i) => U256::from(i as u128),
            PlainValue::Negative(m) if m.is_zero() => U256::zero(),
            PlainValue::Negative(m) => return Err(range_error(format!("-{}", m), width)),
        };
        if value > width.max_value() {
            return Err(range_error(value.to_string(), width));
        }
        Ok(value)
    }

    /// Accepts JSON booleans, integers and decimal strings.
    pub fn from_json(v: &JsonValue) -> Result<Self> {
        match v {
            JsonValue::Bool(b) => Ok(PlainValue::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    return Ok(PlainValue::Uint(U256::from(u)));
                }
                if let Some(i) = n.as_i64() {
                    return Ok(PlainValue::Int(i as i128));
                }
                Err(Error::InvalidInput(format!("expected an integer, got {}", n)))
            }
            JsonValue::String(s) => s.parse(),
            JsonValue::Null => Err(Error::InvalidInput("Value is required".to_string())),
            other => Err(Error::InvalidInput(format!("expected an integer, got {}", other))),
        }
    }
}

impl FromStr for PlainValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "true" => return Ok(PlainValue::Bool(true)),
            "false" => return Ok(PlainValue::Bool(false)),
            _ => {}
        }
        let not_integer = || Error::InvalidInput(format!("expected an integer, got {:?}", s));
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        // A single optional leading minus, then decimal digits only.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(not_integer());
        }
        let magnitude = U256::from_dec_str(digits).map_err(|_| not_integer())?;
        Ok(if negative {
            PlainValue::Negative(magnitude)
        } else {
            PlainValue::Uint(magnitude)
        })
    }
}

impl fmt::Display for PlainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlainValue::Bool(b) => write!(f, "{}", b),
            PlainValue::Uint(v) => write!(f, "{}", v),
            PlainValue::Int(i) => write!(f, "{}", i),
            PlainValue::Negative(m) => write!(f, "-{}", m),
        }
    }
}

impl From<bool> for PlainValue {
    fn from(b: bool) -> Self {
        PlainValue::Bool(b)
    }
}

impl From<U256> for PlainValue {
    fn from(v: U256) -> Self {
        PlainValue::Uint(v)
    }
}

macro_rules! plain_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for PlainValue {
            fn from(v: $t) -> Self {
                PlainValue::Uint(U256::from(v))
            }
        })*
    };
}

macro_rules! plain_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for PlainValue {
            fn from(v: $t) -> Self {
                PlainValue::Int(v as i128)
            }
        })*
    };
}

plain_from_unsigned!(u8, u16, u32, u64, u128);
plain_from_signed!(i8, i16, i32, i64, i128);

fn range_error(value: String, width: BitWidth) -> Error {
    Error::Range {
        value,
        bits: width.bits(),
        max: width.max_value().to_string(),
    }
}

/// Opaque ciphertext produced by the FHE instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedValue(pub Vec<u8>);

impl EncryptedValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        crate::util::to_hex_string(&self.0)
    }
}

impl From<Vec<u8>> for EncryptedValue {
    fn from(v: Vec<u8>) -> Self {
        EncryptedValue(v)
    }
}

impl Serialize for EncryptedValue {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

/// Contract-side reference to an encrypted value, carried together with its width.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EncryptedHandle {
    raw: String,
    bits: BitWidth,
}

impl EncryptedHandle {
    pub fn new(raw: impl Into<String>, bits: BitWidth) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidHandle("handle must not be empty".to_string()));
        }
        Ok(Self {
            raw: trimmed.to_string(),
            bits,
        })
    }

    /// Handles returned as `uint256` by a contract call.
    pub fn from_uint(v: U256, bits: BitWidth) -> Self {
        Self {
            raw: v.to_string(),
            bits,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn bits(&self) -> BitWidth {
        self.bits
    }
}

impl fmt::Display for EncryptedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Plaintext recovered by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptedValue {
    Bool(bool),
    Uint(U256),
}

impl DecryptedValue {
    pub fn as_uint(&self) -> U256 {
        match self {
            DecryptedValue::Bool(true) => U256::one(),
            DecryptedValue::Bool(false) => U256::zero(),
            DecryptedValue::Uint(v) => *v,
        }
    }

    /// Parses a gateway JSON payload (bool, number or decimal/hex string).
    pub fn from_json(v: &JsonValue) -> Result<Self> {
        match v {
            JsonValue::Bool(b) => Ok(DecryptedValue::Bool(*b)),
            JsonValue::Number(n) => n
                .as_u64()
                .map(|u| DecryptedValue::Uint(U256::from(u)))
                .ok_or_else(|| Error::Instance(format!("unexpected plaintext {}", n))),
            JsonValue::String(s) => {
                let parsed = match s.strip_prefix("0x") {
                    Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
                    None => U256::from_dec_str(s).ok(),
                };
                parsed
                    .map(DecryptedValue::Uint)
                    .ok_or_else(|| Error::Instance(format!("unexpected plaintext {:?}", s)))
            }
            other => Err(Error::Instance(format!("unexpected plaintext {}", other))),
        }
    }
}

impl Serialize for DecryptedValue {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DecryptedValue::Bool(b) => s.serialize_bool(*b),
            DecryptedValue::Uint(v) => s.serialize_str(&v.to_string()),
        }
    }
}

impl fmt::Display for DecryptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptedValue::Bool(b) => write!(f, "{}", b),
            DecryptedValue::Uint(v) => write!(f, "{}", v),
        }
    }
}

/// Options for authorized (EIP-712) decryption.
#[derive(Debug, Clone, Default)]
pub struct DecryptOptions {
    pub user_address: String,
    pub contract_address: String,
    /// Pre-computed signature; generated through the signing provider when absent.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptResult {
    pub value: DecryptedValue,
    pub handle: EncryptedHandle,
    pub bits: BitWidth,
}

/// Reencryption keypair minted by the instance for a single decryption request.
#[derive(Debug, Clone)]
pub struct ReencryptionKeyPair {
    pub public_key: String,
    pub private_key: String,
}
