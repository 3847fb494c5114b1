//! Signer configuration.
//!
//! The signer is built for a fixed environment, so configuration is a plain
//! struct of build-time defaults drawn from `limits`; there are no config
//! files and no persisted state.

use crate::limits;

/// Tunables for a signer instance.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Maximum number of key pairs the vault accepts.
    pub keystore_capacity: usize,
    /// Upper bound on scrypt `n * r * p` during import.
    pub scrypt_work_ceiling: u64,
    /// Key-info bytes passed to BLS keygen for generated keys.
    pub keygen_info: Vec<u8>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            keystore_capacity: limits::MAX_KEYS,
            scrypt_work_ceiling: limits::MAX_SCRYPT_WORK,
            keygen_info: Vec::new(),
        }
    }
}
