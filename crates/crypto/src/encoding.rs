//! Padding-less base32 encodings for the text boundary.
//!
//! Two alphabets are in use: a general-purpose one for raw bytes (public
//! keys, signatures) and the RFC 4648 alphabet for key ids, which are
//! rendered in groups of four characters separated by `-` for human
//! consumption. Neither encoding emits padding, and decoding tolerates
//! non-zero trailing bits in the final symbol.

use data_encoding::{DecodeKind, Encoding, Specification};
use once_cell::sync::Lazy;

/// Alphabet for raw byte values. Chosen to avoid characters that are easily
/// confused with each other.
const BYTES_ALPHABET: &str = "23456789CDGHJKNPTVXZcdghjknptvxz";

/// RFC 4648 alphabet used for grouped key ids.
const KEY_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Number of characters per key-id group.
const KEY_GROUP_SIZE: usize = 4;

/// Separator between key-id groups.
const KEY_SEPARATOR: char = '-';

static BYTES_ENCODING: Lazy<Encoding> = Lazy::new(|| base32_encoding(BYTES_ALPHABET));
static KEY_ENCODING: Lazy<Encoding> = Lazy::new(|| base32_encoding(KEY_ALPHABET));

fn base32_encoding(alphabet: &str) -> Encoding {
    let mut spec = Specification::new();
    spec.symbols.push_str(alphabet);
    spec.check_trailing_bits = false;
    spec.encoding().expect("alphabet is a valid base32 symbol set")
}

/// Errors produced when decoding boundary text back into bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// The input contains a character outside the alphabet.
    #[error("illegal symbol at position {position}")]
    IllegalSymbol { position: usize },
    /// The input length cannot result from encoding whole bytes.
    #[error("invalid encoding length at position {position}")]
    InvalidLength { position: usize },
    /// A key-id group that is neither the final group nor exactly
    /// [`KEY_GROUP_SIZE`] characters long.
    #[error("invalid group size {size} in group {group}")]
    InvalidGroupSize { group: usize, size: usize },
}

impl From<data_encoding::DecodeError> for EncodingError {
    fn from(err: data_encoding::DecodeError) -> Self {
        match err.kind {
            DecodeKind::Length => Self::InvalidLength { position: err.position },
            _ => Self::IllegalSymbol { position: err.position },
        }
    }
}

/// Encodes raw bytes with the general-purpose alphabet.
pub fn encode(bytes: &[u8]) -> String {
    BYTES_ENCODING.encode(bytes)
}

/// Decodes general-purpose alphabet text back into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, EncodingError> {
    Ok(BYTES_ENCODING.decode(text.as_bytes())?)
}

/// Encodes key bytes as a grouped key id: groups of four characters from the
/// key alphabet, joined with single `-` separators. The final group may be
/// shorter.
pub fn encode_key(key: &[u8]) -> String {
    let encoded = KEY_ENCODING.encode(key);

    let mut result = String::with_capacity(encoded.len() + encoded.len() / KEY_GROUP_SIZE);
    for (i, chunk) in encoded.as_bytes().chunks(KEY_GROUP_SIZE).enumerate() {
        if i > 0 {
            result.push(KEY_SEPARATOR);
        }
        // Chunks of an ASCII alphabet stay valid UTF-8.
        result.push_str(std::str::from_utf8(chunk).expect("base32 output is ASCII"));
    }

    result
}

/// Decodes a grouped key id.
///
/// Every group but the last must be exactly [`KEY_GROUP_SIZE`] characters
/// long; the final group may be shorter but not empty. Group sizes are
/// validated before symbol legality.
pub fn decode_key(text: &str) -> Result<Vec<u8>, EncodingError> {
    let groups: Vec<&str> = text.split(KEY_SEPARATOR).collect();

    let mut compact = String::with_capacity(text.len());
    for (index, group) in groups.iter().enumerate() {
        let is_last = index == groups.len() - 1;
        let size = group.chars().count();
        if size > KEY_GROUP_SIZE || size == 0 || (!is_last && size != KEY_GROUP_SIZE) {
            return Err(EncodingError::InvalidGroupSize { group: index, size });
        }
        compact.push_str(group);
    }

    Ok(KEY_ENCODING.decode(compact.as_bytes())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_short_lengths() {
        // Pseudo-random but deterministic contents for lengths 0..29.
        for len in 0..29usize {
            let bytes: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(37).wrapping_add(11)).collect();
            let text = encode(&bytes);
            assert_eq!(decode(&text).unwrap(), bytes, "length {len}");
        }
    }

    #[test]
    fn rejects_symbols_outside_the_alphabet() {
        // '0' and '1' are deliberately absent from the byte alphabet.
        assert!(matches!(decode("01"), Err(EncodingError::IllegalSymbol { .. })));
    }

    #[test]
    fn key_ids_come_in_groups_of_four() {
        let id = encode_key(&[0u8; 16]);
        let groups: Vec<&str> = id.split('-').collect();

        // 16 bytes encode to 26 symbols: six full groups and one of two.
        assert_eq!(groups.len(), 7);
        for group in &groups[..6] {
            assert_eq!(group.len(), 4);
        }
        assert_eq!(groups[6].len(), 2);
    }

    #[test]
    fn grouped_round_trip() {
        let key = [0xde, 0xad, 0xbe, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab];
        assert_eq!(decode_key(&encode_key(&key)).unwrap(), key);
    }

    #[test]
    fn short_final_group_decodes() {
        assert!(decode_key("ABCD-ABCD-AB").is_ok());
    }

    #[test]
    fn short_inner_group_is_a_group_size_error() {
        assert!(matches!(
            decode_key("ABCD-AB-AB"),
            Err(EncodingError::InvalidGroupSize { group: 1, size: 2 })
        ));
    }

    #[test]
    fn bad_symbol_in_a_well_formed_group_is_an_illegal_symbol() {
        assert!(matches!(
            decode_key("ABCD-ABC?-AB"),
            Err(EncodingError::IllegalSymbol { .. })
        ));
    }
}
