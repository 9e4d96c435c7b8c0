//! `0x`-prefixed hex quantity encoding used by JSON-RPC and the reference API

use crate::errors::HexError;

/// Decode a `0x`-prefixed base-16 quantity
pub fn parse_hex_quantity(value: &str) -> Result<i64, HexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| HexError::MissingPrefix {
            value: value.to_string(),
        })?;

    if digits.is_empty() {
        return Err(HexError::Empty);
    }

    // from_str_radix would accept a leading sign
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::Invalid {
            value: value.to_string(),
            reason: "contains non-hex characters".to_string(),
        });
    }

    i64::from_str_radix(digits, 16).map_err(|e| HexError::Invalid {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a non-negative quantity the way nodes report it
pub fn to_hex_quantity(value: u64) -> String {
    format!("{:#x}", value)
}
