//! Transport harness for the signer core.
//!
//! The protocol core is sans-IO; this binary is the byte pump around it. It
//! accepts TCP connections one at a time (the core is single-threaded and
//! non-reentrant), reads into a fixed buffer until the parser stops asking
//! for more, writes the rendered response in full, and closes. A disconnect
//! mid-request just discards the buffer; the vault is never left half-mutated.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use bls_remote_signer::limits::MAX_BUF;
use bls_remote_signer::{Args, ServiceOutcome, SignerConfig, SignerService, SIGNER_VERSION};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_json);

    info!("starting bls-remote-signer v{}", SIGNER_VERSION);

    let mut service = SignerService::new(SignerConfig::default());
    let listener = TcpListener::bind(&args.listen)
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("listening on {}", args.listen);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = serve_connection(&mut service, stream) {
                    debug!("connection ended: {}", err);
                }
            }
            Err(err) => warn!("accept failed: {}", err),
        }
    }

    Ok(())
}

/// Read one request, answer it, close. The read buffer is bounded; a peer
/// that keeps sending past the cap gets the canonical 400.
fn serve_connection(service: &mut SignerService, mut stream: TcpStream) -> Result<()> {
    let mut buffer = vec![0u8; MAX_BUF];
    let mut filled = 0;

    loop {
        let read = stream
            .read(&mut buffer[filled..])
            .context("read failed")?;
        if read == 0 {
            // Peer went away mid-request; drop the partial buffer.
            return Ok(());
        }
        filled += read;

        // A buffer at the cap can no longer be Incomplete: the parser turns
        // anything that large into a 400.
        match service.process(&buffer[..filled]) {
            ServiceOutcome::Incomplete => continue,
            ServiceOutcome::Respond(bytes) => {
                stream.write_all(&bytes).context("write failed")?;
                return Ok(());
            }
        }
    }
}

fn init_logging(level: &str, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
