//! BLS12-381 facade over `blst`.
//!
//! Keys follow the Eth2 convention: 32-byte secret scalars in Fr, 48-byte
//! compressed public keys in G1, 96-byte compressed signatures in G2.
//! Signing takes the raw 32-byte signing root; hash-to-curve happens inside
//! `blst` under the Eth2 domain separation tag.

use blst::min_pk;
use blst::BLST_ERROR;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;
use crate::limits::{BLS_PUBKEY_SIZE, BLS_SECRET_SIZE, BLS_SIGNATURE_SIZE};

/// Domain separation tag used by Eth2 consensus signatures.
pub const ETH2_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// BLS secret key. The scalar bytes are zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; BLS_SECRET_SIZE]);

impl SecretKey {
    /// Derive a secret key from input keying material, RFC-style `KeyGen`.
    /// `ikm` must be at least 32 bytes; `info` is caller-supplied key info.
    pub fn generate(ikm: &[u8], info: &[u8]) -> Result<Self, Error> {
        let sk = min_pk::SecretKey::key_gen(ikm, info).map_err(|_| Error::Internal)?;
        Ok(Self(sk.to_bytes()))
    }

    /// Load a secret scalar, rejecting out-of-range values.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let sk = min_pk::SecretKey::from_bytes(bytes).map_err(|_| Error::Internal)?;
        Ok(Self(sk.to_bytes()))
    }

    /// Raw scalar bytes, big-endian.
    pub fn as_bytes(&self) -> &[u8; BLS_SECRET_SIZE] {
        &self.0
    }

    /// Compressed G1 public key for this secret.
    pub fn public_key(&self) -> Result<[u8; BLS_PUBKEY_SIZE], Error> {
        Ok(self.scalar()?.sk_to_pk().compress())
    }

    /// Sign a message; hash-to-curve is performed internally with [`ETH2_DST`].
    pub fn sign(&self, message: &[u8]) -> Result<[u8; BLS_SIGNATURE_SIZE], Error> {
        Ok(self.scalar()?.sign(message, ETH2_DST, &[]).compress())
    }

    fn scalar(&self) -> Result<min_pk::SecretKey, Error> {
        // Stored bytes come from blst itself, so failure here means memory
        // corruption rather than bad input.
        min_pk::SecretKey::from_bytes(&self.0).map_err(|_| Error::Internal)
    }
}

/// Verify a compressed signature over `message` under a compressed public key.
pub fn verify(public_key: &[u8; BLS_PUBKEY_SIZE], message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk) = min_pk::PublicKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = min_pk::Signature::from_bytes(signature) else {
        return false;
    };
    sig.verify(true, message, ETH2_DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}
