//! Endpoint handlers for the Web3Signer surface.
//!
//! [`SignerService`] owns the key vault and turns a complete request into a
//! rendered response. Import failures deliberately collapse to an empty 400:
//! the wire never learns whether the password, the KDF parameters, or the
//! JSON shape was at fault.

use serde::Deserialize;
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::config::SignerConfig;
use crate::encoding::{hex_decode, hex_encode};
use crate::error::Error;
use crate::http::response::{ContentType, Response};
use crate::http::{parse, AcceptType, Endpoint, ParseOutcome, Request};
use crate::keystore::eip2335::{self, EncryptedKeystore};
use crate::keystore::Keystore;
use crate::limits::{BLS_PUBKEY_SIZE, SIGNING_ROOT_SIZE};

/// Body of a sign request.
#[derive(Debug, Deserialize)]
struct SignRequest {
    #[serde(rename = "signingRoot")]
    signing_root: String,
}

/// Body of a keystore import request. Keystores arrive as embedded JSON
/// objects, passwords as plain strings, pairwise.
#[derive(Deserialize)]
struct ImportRequest {
    keystores: Vec<serde_json::Value>,
    passwords: Vec<String>,
}

impl Drop for ImportRequest {
    fn drop(&mut self) {
        for password in &mut self.passwords {
            password.zeroize();
        }
    }
}

/// What the transport should do after feeding bytes to the core.
#[derive(Debug, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// Keep reading; the buffer does not hold a full request yet.
    Incomplete,
    /// Write this buffer in full and close the connection.
    Respond(Vec<u8>),
}

/// The signer core: a key vault plus the request dispatcher.
pub struct SignerService {
    keystore: Keystore,
    config: SignerConfig,
}

impl Default for SignerService {
    fn default() -> Self {
        Self::new(SignerConfig::default())
    }
}

impl SignerService {
    pub fn new(config: SignerConfig) -> Self {
        Self {
            keystore: Keystore::with_capacity(config.keystore_capacity),
            config,
        }
    }

    /// Access to the vault, for provisioning outside the HTTP surface.
    pub fn keystore_mut(&mut self) -> &mut Keystore {
        &mut self.keystore
    }

    pub fn keystore(&self) -> &Keystore {
        &self.keystore
    }

    /// Bytes in, bytes out. Call with everything read so far on the current
    /// connection; a `Respond` outcome ends the request cycle.
    pub fn process(&mut self, buffer: &[u8]) -> ServiceOutcome {
        match parse(buffer) {
            ParseOutcome::Incomplete => ServiceOutcome::Incomplete,
            ParseOutcome::Invalid => {
                debug!("rejecting malformed request of {} bytes", buffer.len());
                ServiceOutcome::Respond(Response::bad_request().into_bytes())
            }
            ParseOutcome::Complete(request) => {
                ServiceOutcome::Respond(self.handle(&request).into_bytes())
            }
        }
    }

    /// Dispatch a classified request.
    pub fn handle(&mut self, request: &Request<'_>) -> Response {
        match &request.endpoint {
            Endpoint::Upcheck => Response::ok(ContentType::TextPlain, Vec::new()),
            Endpoint::ListKeys => {
                Response::ok(ContentType::ApplicationJson, self.render_public_keys())
            }
            Endpoint::Sign { public_key } => self.sign(public_key, request),
            Endpoint::Import => self.import(request.body),
        }
    }

    fn sign(&mut self, public_key: &[u8; BLS_PUBKEY_SIZE], request: &Request<'_>) -> Response {
        let Some(index) = self.keystore.lookup(public_key) else {
            debug!("sign request for unknown key 0x{}", hex_encode(public_key));
            return Response::not_found();
        };

        let root = match signing_root(request.body) {
            Ok(root) => root,
            Err(_) => return Response::bad_request(),
        };
        let signature = match self.keystore.sign(index, &root) {
            Ok(signature) => signature,
            Err(err) => {
                warn!("signing failed for key {}: {}", index, err);
                return Response::bad_request();
            }
        };

        let sig_hex = hex_encode(&signature);
        info!("signed root with key {}", index);
        match request.accept {
            AcceptType::TextPlain => {
                Response::ok(ContentType::TextPlain, format!("0x{}", sig_hex).into_bytes())
            }
            AcceptType::ApplicationJson => Response::ok(
                ContentType::ApplicationJson,
                format!("{{\"signature\": \"0x{}\"}}", sig_hex).into_bytes(),
            ),
        }
    }

    fn import(&mut self, body: &[u8]) -> Response {
        match self.import_batch(body) {
            Ok(count) => {
                info!("imported {} keystores", count);
                Response::ok(ContentType::ApplicationJson, self.render_public_keys())
            }
            Err(err) => {
                warn!("keystore import rejected: {}", err);
                Response::bad_request()
            }
        }
    }

    /// All-or-nothing import: either every keystore decrypts and every secret
    /// inserts, or the vault is restored to its pre-request state.
    fn import_batch(&mut self, body: &[u8]) -> Result<usize, Error> {
        let request: ImportRequest =
            serde_json::from_slice(body).map_err(|_| Error::BadRequest)?;
        if request.keystores.is_empty() || request.keystores.len() != request.passwords.len() {
            return Err(Error::BadRequest);
        }
        if request.keystores.len() > self.keystore.remaining() {
            return Err(Error::Full);
        }

        let checkpoint = self.keystore.len();
        for (blob, password) in request.keystores.iter().zip(&request.passwords) {
            if let Err(err) = self.import_one(blob, password) {
                self.keystore.truncate(checkpoint);
                return Err(err);
            }
        }
        Ok(request.keystores.len())
    }

    fn import_one(&mut self, blob: &serde_json::Value, password: &str) -> Result<(), Error> {
        let keystore: EncryptedKeystore =
            serde_json::from_value(blob.clone()).map_err(|_| Error::BadJsonFormat)?;
        let secret = eip2335::decrypt(&keystore, password, self.config.scrypt_work_ceiling)?;
        self.keystore.import_secret(&secret)?;
        Ok(())
    }

    /// Render the ListKeys body: `[\n"0x<hex>",\n…"0x<hex>"\n]`, with the
    /// comma only between entries. An empty vault renders as `[\n]`.
    fn render_public_keys(&self) -> Vec<u8> {
        let total = self.keystore.len();
        let mut body = Vec::from(&b"[\n"[..]);
        for (i, public_key) in self.keystore.public_keys().enumerate() {
            body.push(b'"');
            body.extend_from_slice(b"0x");
            body.extend_from_slice(hex_encode(public_key).as_bytes());
            body.push(b'"');
            if i + 1 < total {
                body.push(b',');
            }
            body.push(b'\n');
        }
        body.push(b']');
        body
    }
}

fn signing_root(body: &[u8]) -> Result<[u8; SIGNING_ROOT_SIZE], Error> {
    let request: SignRequest = serde_json::from_slice(body).map_err(|_| Error::BadRequest)?;
    let bytes = hex_decode(&request.signing_root).map_err(|_| Error::BadRequest)?;
    bytes.try_into().map_err(|_| Error::BadRequest)
}
