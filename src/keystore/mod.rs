//! In-memory vault of BLS key pairs.
//!
//! The vault is process-wide state owned by the service: initialized empty at
//! startup, bounded at a fixed capacity, torn down only by [`Keystore::reset`].
//! Indices are stable for the lifetime of the process. Every stored secret has
//! the matching public key derived from it, and no two entries share a secret.

pub mod eip2335;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::bls::SecretKey;
use crate::encoding::ct_eq;
use crate::error::Error;
use crate::limits::{BLS_PUBKEY_SIZE, BLS_SECRET_SIZE, BLS_SIGNATURE_SIZE, MAX_KEYS};
use crate::rng::EntropySource;

struct KeyEntry {
    secret: SecretKey,
    public: [u8; BLS_PUBKEY_SIZE],
}

/// Bounded, ordered collection of BLS key pairs.
pub struct Keystore {
    entries: Vec<KeyEntry>,
    capacity: usize,
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}

impl Keystore {
    /// Empty vault with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_KEYS)
    }

    /// Empty vault with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of stored key pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity remaining for imports.
    pub fn remaining(&self) -> usize {
        self.capacity - self.entries.len()
    }

    /// Generate a fresh key pair: 32 bytes of entropy are hashed with SHA-256
    /// into the IKM for BLS keygen. Returns the index of the new entry.
    pub fn generate(
        &mut self,
        entropy: &mut dyn EntropySource,
        info: &[u8],
    ) -> Result<usize, Error> {
        if self.entries.len() >= self.capacity {
            return Err(Error::Full);
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        entropy.fill(&mut seed[..])?;
        let ikm = Zeroizing::new(<[u8; 32]>::from(Sha256::digest(&seed[..])));

        let secret = SecretKey::generate(&ikm[..], info)?;
        let public = secret.public_key()?;
        self.entries.push(KeyEntry { secret, public });

        let index = self.entries.len() - 1;
        info!("generated key {} (0x{})", index, hex::encode(public));
        Ok(index)
    }

    /// Insert a secret scalar imported from a keystore. Rejects duplicates by
    /// constant-time comparison of the scalar bytes. The entry only becomes
    /// visible once the public key has been derived.
    pub fn import_secret(&mut self, secret_bytes: &[u8; BLS_SECRET_SIZE]) -> Result<usize, Error> {
        if self.entries.len() >= self.capacity {
            return Err(Error::Full);
        }
        for entry in &self.entries {
            if ct_eq(entry.secret.as_bytes(), secret_bytes) {
                return Err(Error::DuplicateSecret);
            }
        }

        let secret = SecretKey::from_bytes(secret_bytes)?;
        let public = secret.public_key()?;
        self.entries.push(KeyEntry { secret, public });

        let index = self.entries.len() - 1;
        debug!("imported key {} (0x{})", index, hex::encode(public));
        Ok(index)
    }

    /// Find a key pair by its compressed public key.
    pub fn lookup(&self, public_key: &[u8; BLS_PUBKEY_SIZE]) -> Option<usize> {
        self.entries.iter().position(|e| e.public == *public_key)
    }

    /// Stored public keys in insertion order.
    pub fn public_keys(&self) -> impl Iterator<Item = &[u8; BLS_PUBKEY_SIZE]> {
        self.entries.iter().map(|e| &e.public)
    }

    /// Sign a 32-byte signing root with the key at `index`.
    pub fn sign(&self, index: usize, root: &[u8]) -> Result<[u8; BLS_SIGNATURE_SIZE], Error> {
        let entry = self.entries.get(index).ok_or(Error::NotFound)?;
        entry.secret.sign(root)
    }

    /// Drop entries beyond `len`, zeroizing their secrets. Used to roll back
    /// a partially applied import batch.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Zeroize all secret material and empty the vault.
    pub fn reset(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        info!("keystore reset, {} keys destroyed", dropped);
    }
}
