//! EIP-2335 keystore decryption.
//!
//! Takes a version-4 keystore JSON and a password, and recovers the 32-byte
//! BLS secret scalar: derive the decryption key with the declared KDF
//! (scrypt or PBKDF2-HMAC-SHA256), verify the SHA-256 checksum, then strip
//! the AES-128-CTR layer. All failures collapse to the same response at the
//! HTTP boundary; the distinct error kinds exist for logging and tests.

use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use pbkdf2::pbkdf2_hmac;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::encoding::{ct_eq, hex_decode};
use crate::error::Error;
use crate::limits::BLS_SECRET_SIZE;

type Aes128Ctr = Ctr128BE<Aes128>;

const DKLEN: usize = 32;
const IV_SIZE: usize = 16;
const CHECKSUM_SIZE: usize = 32;

/// EIP-2335 keystore, version 4. Only the `crypto` section drives
/// decryption; the remaining fields are metadata.
#[derive(Debug, Deserialize)]
pub struct EncryptedKeystore {
    pub crypto: Crypto,
    #[serde(default)]
    pub pubkey: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Crypto {
    pub kdf: KdfModule,
    pub checksum: ChecksumModule,
    pub cipher: CipherModule,
}

#[derive(Debug, Deserialize)]
pub struct KdfModule {
    pub function: String,
    pub params: KdfParams,
}

/// Union of scrypt and PBKDF2 parameters; presence is validated per function.
#[derive(Debug, Deserialize)]
pub struct KdfParams {
    pub dklen: Option<u64>,
    pub salt: Option<String>,
    pub c: Option<u32>,
    pub prf: Option<String>,
    pub n: Option<u64>,
    pub r: Option<u32>,
    pub p: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChecksumModule {
    pub function: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CipherModule {
    pub function: String,
    pub params: CipherParams,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

/// Normalize a password the way EIP-2335 requires: NFKD, then strip C0, C1
/// and DEL control codes. The result is the byte string fed to the KDF.
pub fn normalize_password(password: &str) -> Zeroizing<Vec<u8>> {
    let filtered: String = password
        .nfkd()
        .filter(|c| !matches!(*c, '\u{0000}'..='\u{001f}' | '\u{007f}'..='\u{009f}'))
        .collect();
    Zeroizing::new(filtered.into_bytes())
}

/// Decrypt an EIP-2335 keystore with `password`, yielding the secret scalar.
pub fn decrypt(
    keystore: &EncryptedKeystore,
    password: &str,
    scrypt_work_ceiling: u64,
) -> Result<Zeroizing<[u8; BLS_SECRET_SIZE]>, Error> {
    let crypto = &keystore.crypto;

    let cipher_message = hex_decode(&crypto.cipher.message)?;
    if cipher_message.len() != BLS_SECRET_SIZE {
        return Err(Error::BadJsonFormat);
    }
    if crypto.cipher.function != "aes-128-ctr" {
        return Err(Error::BadJsonFormat);
    }
    let iv: [u8; IV_SIZE] = hex_decode(&crypto.cipher.params.iv)?
        .try_into()
        .map_err(|_| Error::BadJsonFormat)?;
    let checksum: [u8; CHECKSUM_SIZE] = hex_decode(&crypto.checksum.message)?
        .try_into()
        .map_err(|_| Error::BadJsonFormat)?;

    let normalized = normalize_password(password);
    let dk = derive_key(&crypto.kdf, &normalized, scrypt_work_ceiling)?;

    let mut hasher = Sha256::new();
    hasher.update(&dk[16..32]);
    hasher.update(&cipher_message);
    let computed = hasher.finalize();
    if !ct_eq(&computed, &checksum) {
        return Err(Error::BadPassword);
    }

    let mut secret = Zeroizing::new([0u8; BLS_SECRET_SIZE]);
    secret.copy_from_slice(&cipher_message);
    let mut cipher =
        Aes128Ctr::new_from_slices(&dk[..16], &iv).map_err(|_| Error::Internal)?;
    cipher.apply_keystream(&mut secret[..]);

    Ok(secret)
}

/// Run the declared KDF over the normalized password.
fn derive_key(
    kdf: &KdfModule,
    password: &[u8],
    scrypt_work_ceiling: u64,
) -> Result<Zeroizing<[u8; DKLEN]>, Error> {
    let params = &kdf.params;
    if params.dklen != Some(DKLEN as u64) {
        return Err(Error::BadJsonFormat);
    }
    let salt = hex_decode(params.salt.as_deref().ok_or(Error::BadJsonFormat)?)?;

    let mut dk = Zeroizing::new([0u8; DKLEN]);
    match kdf.function.as_str() {
        "pbkdf2" => {
            if params.prf.as_deref() != Some("hmac-sha256") {
                return Err(Error::BadJsonFormat);
            }
            let c = params.c.filter(|c| *c > 0).ok_or(Error::BadJsonFormat)?;
            pbkdf2_hmac::<Sha256>(password, &salt, c, &mut dk[..]);
        }
        "scrypt" => {
            let n = params.n.ok_or(Error::BadJsonFormat)?;
            let r = params.r.ok_or(Error::BadJsonFormat)?;
            let p = params.p.ok_or(Error::BadJsonFormat)?;
            if n < 2 || !n.is_power_of_two() || r == 0 || p == 0 {
                return Err(Error::BadJsonFormat);
            }
            let work = n
                .checked_mul(u64::from(r))
                .and_then(|w| w.checked_mul(u64::from(p)))
                .ok_or(Error::KdfTooExpensive)?;
            if work > scrypt_work_ceiling {
                return Err(Error::KdfTooExpensive);
            }
            let log_n = n.trailing_zeros() as u8;
            let sp = scrypt::Params::new(log_n, r, p, DKLEN).map_err(|_| Error::BadJsonFormat)?;
            scrypt::scrypt(password, &salt, &sp, &mut dk[..]).map_err(|_| Error::Internal)?;
        }
        _ => return Err(Error::BadJsonFormat),
    }

    Ok(dk)
}

/// Official EIP-2335 test vectors, shared by the unit tests here and the
/// handler tests. Both keystores wrap the same secret under the password
/// "𝔱𝔢𝔰𝔱𝔭𝔞𝔰𝔰𝔴𝔬𝔯𝔡🔑" (NFKD: "testpassword🔑").
#[cfg(test)]
pub mod test_vectors {
    pub const VECTOR_PASSWORD: &str = "\u{1d531}\u{1d522}\u{1d530}\u{1d531}\u{1d52d}\u{1d51e}\u{1d530}\u{1d530}\u{1d534}\u{1d52c}\u{1d52f}\u{1d521}\u{1f511}";
    pub const VECTOR_SECRET: &str =
        "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";

    pub const SCRYPT_VECTOR: &str = r#"{
        "crypto": {
            "kdf": {
                "function": "scrypt",
                "params": {
                    "dklen": 32,
                    "n": 262144,
                    "p": 1,
                    "r": 8,
                    "salt": "d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
                },
                "message": ""
            },
            "checksum": {
                "function": "sha256",
                "params": {},
                "message": "d2217fe5f3e9a1e34581ef8a78f7c9928e436d36dacc5e846690a5581e8ea484"
            },
            "cipher": {
                "function": "aes-128-ctr",
                "params": {
                    "iv": "264daa3f303d7259501c93d997d84fe6"
                },
                "message": "06ae90d55fe0a6e9c5c3bc5b170827b2e5cce3929ed3f116c2811e6366dfe20f"
            }
        },
        "description": "This is a test keystore that uses scrypt to secure the secret.",
        "pubkey": "9612d7a727c9d0a22e185a1c768478dfe919cada9266988cb32359c11f2b7b27f4ae4040902382ae2910c15e2b420d07",
        "path": "m/12381/60/3141592653/589793238",
        "uuid": "1d85ae20-35c5-4611-98e8-aa14a633906f",
        "version": 4
    }"#;

    pub const PBKDF2_VECTOR: &str = r#"{
        "crypto": {
            "kdf": {
                "function": "pbkdf2",
                "params": {
                    "dklen": 32,
                    "c": 262144,
                    "prf": "hmac-sha256",
                    "salt": "d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3"
                },
                "message": ""
            },
            "checksum": {
                "function": "sha256",
                "params": {},
                "message": "8a9f5d9912ed7e75ea794bc5a89bca5f193721d30868ade6f73043c6ea6febf1"
            },
            "cipher": {
                "function": "aes-128-ctr",
                "params": {
                    "iv": "264daa3f303d7259501c93d997d84fe6"
                },
                "message": "cee03fde2af33149775b7223e7845e4fb2c8ae1792e5f99fe9ecf474cc8c16ad"
            }
        },
        "description": "This is a test keystore that uses PBKDF2 to secure the secret.",
        "pubkey": "9612d7a727c9d0a22e185a1c768478dfe919cada9266988cb32359c11f2b7b27f4ae4040902382ae2910c15e2b420d07",
        "path": "m/12381/60/0/0",
        "uuid": "64625def-3331-4eea-ab6f-782f3ed16a83",
        "version": 4
    }"#;
}

#[cfg(test)]
mod tests {
    use super::test_vectors::*;
    use super::*;
    use crate::limits::MAX_SCRYPT_WORK;

    fn parse(json: &str) -> EncryptedKeystore {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_password_normalization() {
        assert_eq!(
            normalize_password(VECTOR_PASSWORD).as_slice(),
            "testpassword\u{1f511}".as_bytes()
        );
        // control codes are stripped
        assert_eq!(normalize_password("a\u{0007}b\u{007f}c").as_slice(), b"abc");
    }

    #[test]
    fn test_decrypt_pbkdf2_vector() {
        let secret = decrypt(&parse(PBKDF2_VECTOR), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap();
        assert_eq!(hex::encode(&secret[..]), VECTOR_SECRET);
    }

    #[test]
    fn test_decrypt_scrypt_vector() {
        let secret = decrypt(&parse(SCRYPT_VECTOR), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap();
        assert_eq!(hex::encode(&secret[..]), VECTOR_SECRET);
    }

    #[test]
    fn test_pre_normalized_password_is_equivalent() {
        let secret = decrypt(&parse(PBKDF2_VECTOR), "testpassword\u{1f511}", MAX_SCRYPT_WORK)
            .unwrap();
        assert_eq!(hex::encode(&secret[..]), VECTOR_SECRET);
    }

    #[test]
    fn test_wrong_password_is_checksum_mismatch() {
        let err = decrypt(&parse(PBKDF2_VECTOR), "testpassword", MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadPassword);
    }

    #[test]
    fn test_tampered_ciphertext_is_checksum_mismatch() {
        let tampered = PBKDF2_VECTOR.replace(
            "cee03fde2af33149775b7223e7845e4fb2c8ae1792e5f99fe9ecf474cc8c16ad",
            "cee03fde2af33149775b7223e7845e4fb2c8ae1792e5f99fe9ecf474cc8c16ae",
        );
        let err = decrypt(&parse(&tampered), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadPassword);
    }

    #[test]
    fn test_missing_field_is_format_error() {
        let no_salt = PBKDF2_VECTOR.replace("\"salt\"", "\"pepper\"");
        let err = decrypt(&parse(&no_salt), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }

    #[test]
    fn test_wrong_dklen_is_format_error() {
        let bad = PBKDF2_VECTOR.replace("\"dklen\": 32", "\"dklen\": 16");
        let err = decrypt(&parse(&bad), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }

    #[test]
    fn test_unknown_prf_is_format_error() {
        let bad = PBKDF2_VECTOR.replace("hmac-sha256", "hmac-sha512");
        let err = decrypt(&parse(&bad), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }

    #[test]
    fn test_unknown_kdf_is_format_error() {
        let bad = SCRYPT_VECTOR.replace("\"function\": \"scrypt\"", "\"function\": \"argon2id\"");
        let err = decrypt(&parse(&bad), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }

    #[test]
    fn test_non_power_of_two_n_is_format_error() {
        let bad = SCRYPT_VECTOR.replace("\"n\": 262144", "\"n\": 262143");
        let err = decrypt(&parse(&bad), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }

    #[test]
    fn test_scrypt_work_ceiling() {
        let err = decrypt(&parse(SCRYPT_VECTOR), VECTOR_PASSWORD, 1 << 20).unwrap_err();
        assert_eq!(err, Error::KdfTooExpensive);
    }

    #[test]
    fn test_bad_iv_hex_is_format_error() {
        let bad = PBKDF2_VECTOR.replace("264daa3f303d7259501c93d997d84fe6", "not-hex");
        let err = decrypt(&parse(&bad), VECTOR_PASSWORD, MAX_SCRYPT_WORK).unwrap_err();
        assert_eq!(err, Error::BadJsonFormat);
    }
}
