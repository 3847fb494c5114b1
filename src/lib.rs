//! Remote BLS signing service for Eth2 validators.
//!
//! The signer holds BLS12-381 key pairs in an in-memory vault and exposes a
//! Web3Signer-style HTTP surface to a consensus client:
//! - `GET /upcheck` — liveness probe
//! - `GET /api/v1/eth2/publicKeys` — list provisioned public keys
//! - `POST /api/v1/eth2/sign/0x<pubkey>` — sign a 32-byte signing root
//! - `POST /eth/v1/keystores` — import encrypted EIP-2335 keystores
//!
//! Private key material never crosses the API: callers only ever see public
//! keys and signatures. The protocol core is sans-IO (bytes in, bytes out);
//! `main.rs` provides a serial TCP harness around it.

use clap::Parser;

pub mod bls;
pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod keystore;
pub mod limits;
pub mod rng;

pub const SIGNER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI arguments for the signer harness
#[derive(Parser, Debug, Clone)]
#[command(name = "bls-remote-signer")]
#[command(about = "Remote BLS signing service with a Web3Signer-style API")]
#[command(version = SIGNER_VERSION)]
pub struct Args {
    /// TCP address to listen on
    #[arg(long, env = "SIGNER_LISTEN", default_value = "127.0.0.1:9000")]
    pub listen: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SIGNER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "SIGNER_LOG_JSON")]
    pub log_json: bool,
}

pub use config::SignerConfig;
pub use error::Error;
pub use http::api::{ServiceOutcome, SignerService};
pub use keystore::Keystore;
