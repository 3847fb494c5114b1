//! Web3Signer HTTP surface: request parsing, dispatch, response composition.

pub mod api;
pub mod response;

use crate::encoding::hex_decode_array;
use crate::limits::{BLS_PUBKEY_HEX_LEN, BLS_PUBKEY_SIZE, HEADER_DISCARD_THRESHOLD, MAX_BUF, MAX_HEADERS};

const UPCHECK_PATH: &str = "/upcheck";
const PUBLIC_KEYS_PATH: &str = "/api/v1/eth2/publicKeys";
const SIGN_PATH_PREFIX: &str = "/api/v1/eth2/sign/0x";
const KEYSTORES_PATH: &str = "/eth/v1/keystores";

/// Response body flavor requested via the `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptType {
    TextPlain,
    ApplicationJson,
}

/// Recognized endpoint of a complete request.
#[derive(Debug, PartialEq, Eq)]
pub enum Endpoint {
    Upcheck,
    ListKeys,
    Sign { public_key: [u8; BLS_PUBKEY_SIZE] },
    Import,
}

/// A complete, classified request. `body` borrows from the read buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct Request<'a> {
    pub endpoint: Endpoint,
    pub accept: AcceptType,
    pub body: &'a [u8],
}

/// Result of feeding the read buffer to the parser.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseOutcome<'a> {
    /// A full request is present and classified.
    Complete(Request<'a>),
    /// More bytes are needed; not an error.
    Incomplete,
    /// The buffer can never become a valid request; answer 400 and close.
    Invalid,
}

/// Parse the bytes read so far. The caller appends to `buffer` until the
/// outcome is no longer [`ParseOutcome::Incomplete`].
pub fn parse(buffer: &[u8]) -> ParseOutcome<'_> {
    if buffer.len() > MAX_BUF {
        return ParseOutcome::Invalid;
    }

    // Method gate before any header work. While the buffer is still shorter
    // than the method token, stay Incomplete only if it could become GET/POST.
    let is_get = buffer.starts_with(b"GET ");
    let is_post = buffer.starts_with(b"POST");
    if !is_get && !is_post {
        if b"GET ".starts_with(buffer) || b"POST".starts_with(buffer) {
            return ParseOutcome::Incomplete;
        }
        return ParseOutcome::Invalid;
    }

    // Headers must terminate within a bounded prefix of the buffer.
    if find_crlf_crlf(buffer).is_none() {
        if buffer.len() < HEADER_DISCARD_THRESHOLD && buffer.len() < MAX_BUF {
            return ParseOutcome::Incomplete;
        }
        return ParseOutcome::Invalid;
    }

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Request::new(&mut headers);
    let head_len = match parsed.parse(buffer) {
        Ok(httparse::Status::Complete(n)) => n,
        // The terminator is present, so a partial parse means the head is
        // malformed in a way httparse cannot get past.
        Ok(httparse::Status::Partial) => return ParseOutcome::Invalid,
        Err(_) => return ParseOutcome::Invalid,
    };

    let (Some(method), Some(path)) = (parsed.method, parsed.path) else {
        return ParseOutcome::Invalid;
    };
    let accept = accept_type(&parsed);

    match method {
        "GET" => {
            let endpoint = match path {
                UPCHECK_PATH => Endpoint::Upcheck,
                PUBLIC_KEYS_PATH => Endpoint::ListKeys,
                _ => return ParseOutcome::Invalid,
            };
            ParseOutcome::Complete(Request {
                endpoint,
                accept,
                body: &[],
            })
        }
        "POST" => {
            let Some(content_length) = content_length(&parsed) else {
                return ParseOutcome::Invalid;
            };
            let Some(expected) = head_len.checked_add(content_length) else {
                return ParseOutcome::Invalid;
            };
            if expected > MAX_BUF {
                return ParseOutcome::Invalid;
            }
            if buffer.len() < expected {
                return ParseOutcome::Incomplete;
            }
            if buffer.len() > expected {
                return ParseOutcome::Invalid;
            }
            let body = &buffer[head_len..expected];

            let endpoint = if let Some(pk_hex) = path.strip_prefix(SIGN_PATH_PREFIX) {
                if pk_hex.len() != BLS_PUBKEY_HEX_LEN {
                    return ParseOutcome::Invalid;
                }
                let Ok(public_key) = hex_decode_array::<BLS_PUBKEY_SIZE>(pk_hex) else {
                    return ParseOutcome::Invalid;
                };
                Endpoint::Sign { public_key }
            } else if path == KEYSTORES_PATH {
                if body.is_empty() {
                    return ParseOutcome::Invalid;
                }
                Endpoint::Import
            } else {
                return ParseOutcome::Invalid;
            };

            ParseOutcome::Complete(Request {
                endpoint,
                accept,
                body,
            })
        }
        _ => ParseOutcome::Invalid,
    }
}

fn find_crlf_crlf(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Header names compare case-insensitively; values are matched exactly.
fn header_value<'a>(parsed: &httparse::Request<'_, 'a>, name: &str) -> Option<&'a [u8]> {
    parsed
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value)
}

fn accept_type(parsed: &httparse::Request<'_, '_>) -> AcceptType {
    match header_value(parsed, "accept") {
        Some(b"application/json") | Some(b"*/*") => AcceptType::ApplicationJson,
        _ => AcceptType::TextPlain,
    }
}

fn content_length(parsed: &httparse::Request<'_, '_>) -> Option<usize> {
    let value = header_value(parsed, "content-length")?;
    std::str::from_utf8(value).ok()?.trim().parse().ok()
}
