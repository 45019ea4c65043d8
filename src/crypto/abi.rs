// Minimal Solidity ABI encoding for the handful of calls the SDK makes.

use crate::error::{Error, Result};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    Bool(bool),
    Bytes(Vec<u8>),
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of `keccak256("name(types)")`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn uint_word(v: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word
}

/// Head/tail encoding of `tokens` as a function argument tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Bool(b) => head.extend_from_slice(&uint_word(U256::from(*b as u8))),
            Token::Bytes(bytes) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&uint_word(U256::from(offset)));
                tail.extend_from_slice(&uint_word(U256::from(bytes.len())));
                tail.extend_from_slice(bytes);
                let pad = (WORD - bytes.len() % WORD) % WORD;
                tail.extend(std::iter::repeat(0u8).take(pad));
            }
        }
    }
    head.extend_from_slice(&tail);
    head
}

pub fn encode_call(signature: &str, tokens: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend_from_slice(&encode(tokens));
    out
}

/// Reads the `index`-th static word of return data as a uint256.
pub fn decode_uint(data: &[u8], index: usize) -> Result<U256> {
    let start = index * WORD;
    let word = data
        .get(start..start + WORD)
        .ok_or_else(|| Error::Serialization(format!("return data too short for word {}", index)))?;
    Ok(U256::from_big_endian(word))
}

pub fn decode_bool(data: &[u8], index: usize) -> Result<bool> {
    let v = decode_uint(data, index)?;
    if v > U256::one() {
        return Err(Error::Serialization(format!("word {} is not a bool", index)));
    }
    Ok(!v.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_selectors() {
        // transfer(address,uint256)
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        // balanceOf(address)
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn dynamic_bytes_use_offsets_and_padding() {
        let encoded = encode(&[
            Token::Bytes(vec![0xaa; 3]),
            Token::Uint(U256::from(7u32)),
        ]);
        // head: offset(64), 7 ; tail: len(3), data padded to 32
        assert_eq!(encoded.len(), 4 * WORD);
        assert_eq!(decode_uint(&encoded, 0).unwrap(), U256::from(64u32));
        assert_eq!(decode_uint(&encoded, 1).unwrap(), U256::from(7u32));
        assert_eq!(decode_uint(&encoded, 2).unwrap(), U256::from(3u32));
        assert_eq!(&encoded[3 * WORD..3 * WORD + 3], &[0xaa, 0xaa, 0xaa]);
        assert!(encoded[3 * WORD + 3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn bools_decode_strictly() {
        let data = encode(&[Token::Bool(true), Token::Uint(U256::from(2u32))]);
        assert!(decode_bool(&data, 0).unwrap());
        assert!(decode_bool(&data, 1).is_err());
        assert!(decode_uint(&data, 2).is_err());
    }
}
