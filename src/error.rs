//! Signer error types.
//!
//! The import pipeline deliberately collapses every failure to a plain
//! 400 at the HTTP boundary so the network never learns which step failed;
//! the variants below exist for internal flow and logging only.

use thiserror::Error;

/// Errors produced by the signer core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed HTTP request, unknown path, or malformed JSON body
    #[error("malformed request")]
    BadRequest,

    /// Signing public key is not present in the vault
    #[error("public key not found")]
    NotFound,

    /// EIP-2335 checksum mismatch (wrong password or corrupted keystore)
    #[error("keystore checksum mismatch")]
    BadPassword,

    /// Missing or wrongly typed EIP-2335 field, or undecodable hex
    #[error("malformed keystore")]
    BadJsonFormat,

    /// scrypt parameters exceed the configured work ceiling
    #[error("kdf parameters exceed work ceiling")]
    KdfTooExpensive,

    /// Vault is at capacity
    #[error("keystore is full")]
    Full,

    /// Imported secret already present in the vault
    #[error("duplicate secret key")]
    DuplicateSecret,

    /// Entropy source failure
    #[error("entropy source failure")]
    Rng,

    /// Primitive failure that should not occur in normal operation
    #[error("crypto backend failure")]
    Internal,
}
