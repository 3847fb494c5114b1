//! Fixed bounds for the signer.
//!
//! All limits are compile-time constants so resource usage stays predictable;
//! exceeding a bound surfaces as an error, never as dynamic growth.

/// Request buffer size in bytes. A request that does not fit is rejected.
pub const MAX_BUF: usize = 32768;

/// Maximum number of request headers we parse.
pub const MAX_HEADERS: usize = 100;

/// Maximum number of BLS key pairs the vault holds.
pub const MAX_KEYS: usize = 10;

/// Buffered bytes after which a request with unterminated headers is
/// discarded instead of waiting for more input.
pub const HEADER_DISCARD_THRESHOLD: usize = 300;

/// Upper bound on scrypt `n * r * p` accepted during keystore import.
/// The EIP-2335 default parameters (n=262144, r=8, p=1) sit at 2^21.
pub const MAX_SCRYPT_WORK: u64 = 1 << 23;

/// Maximum response body size in bytes. ListKeys at capacity is the largest
/// body the signer produces.
pub const MAX_RESPONSE_BODY: usize = 4096;

/// BLS12-381 compressed G1 public key size.
pub const BLS_PUBKEY_SIZE: usize = 48;

/// BLS12-381 compressed G2 signature size.
pub const BLS_SIGNATURE_SIZE: usize = 96;

/// BLS secret scalar size.
pub const BLS_SECRET_SIZE: usize = 32;

/// Signing roots are 32-byte Merkle roots.
pub const SIGNING_ROOT_SIZE: usize = 32;

/// Public key length as hex (no 0x prefix).
pub const BLS_PUBKEY_HEX_LEN: usize = BLS_PUBKEY_SIZE * 2;

/// Validate a signing root length
#[inline]
pub fn validate_signing_root_size(size: usize) -> Result<(), &'static str> {
    if size != SIGNING_ROOT_SIZE {
        Err("signing root must be exactly 32 bytes")
    } else {
        Ok(())
    }
}

/// Validate a request buffer length against the fixed cap
#[inline]
pub fn validate_buffer_size(size: usize) -> Result<(), &'static str> {
    if size > MAX_BUF {
        Err("request exceeds maximum buffer size")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_root_validation() {
        assert!(validate_signing_root_size(32).is_ok());
        assert!(validate_signing_root_size(0).is_err());
        assert!(validate_signing_root_size(31).is_err());
        assert!(validate_signing_root_size(33).is_err());
    }

    #[test]
    fn test_buffer_size_validation() {
        assert!(validate_buffer_size(0).is_ok());
        assert!(validate_buffer_size(MAX_BUF).is_ok());
        assert!(validate_buffer_size(MAX_BUF + 1).is_err());
    }

    #[test]
    fn test_scrypt_ceiling_admits_eip2335_defaults() {
        let work = 262144u64 * 8 * 1;
        assert!(work <= MAX_SCRYPT_WORK);
    }
}
