//! Hex quantity codec for JSON-RPC numeric results.

use crate::error::{HealthError, HealthResult};

/// Decode a JSON-RPC quantity such as `"0x1b4"` into an integer.
///
/// The `0x`/`0X` prefix is optional and digits are case-insensitive.
/// Empty digit strings, signs, whitespace, and values wider than 64 bits
/// are rejected.
pub fn decode_quantity(value: &str) -> HealthResult<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HealthError::Protocol(format!("invalid hex quantity {value:?}")));
    }

    u64::from_str_radix(digits, 16)
        .map_err(|_| HealthError::Protocol(format!("hex quantity {value:?} does not fit in 64 bits")))
}

/// Encode an integer as a JSON-RPC quantity, e.g. `26` → `"0x1a"`.
pub fn encode_quantity(value: u64) -> String {
    format!("{value:#x}")
}
