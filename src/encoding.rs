//! Hex codec and constant-time byte comparison.

use subtle::ConstantTimeEq;

use crate::error::Error;

/// Encode bytes as lowercase hex without a prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a hex string, accepting either case and an optional `0x` prefix.
/// Fails on odd length or non-hex characters.
pub fn hex_decode(input: &str) -> Result<Vec<u8>, Error> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|_| Error::BadJsonFormat)
}

/// Decode hex into a fixed-size array; the decoded length must match exactly.
pub fn hex_decode_array<const N: usize>(input: &str) -> Result<[u8; N], Error> {
    let bytes = hex_decode(input)?;
    let arr: [u8; N] = bytes.try_into().map_err(|_| Error::BadJsonFormat)?;
    Ok(arr)
}

/// Compare two byte slices in time independent of the position of the first
/// differing byte. Length is not hidden.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
