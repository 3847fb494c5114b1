//! HTTP response composition.
//!
//! Responses are whole-buffer writes with no chunking: status line, a fixed
//! Content-Type, a Content-Length measured from the rendered body, a blank
//! line, and the body. Oversized bodies are rejected at this boundary rather
//! than truncated.

use tracing::error;

use crate::limits::MAX_RESPONSE_BODY;

/// Response status codes the signer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
}

impl Status {
    fn line(self) -> &'static str {
        match self {
            Status::Ok => "HTTP/1.1 200 OK",
            Status::BadRequest => "HTTP/1.1 400 Bad Request",
            Status::NotFound => "HTTP/1.1 404 Not Found",
        }
    }
}

/// Content types the signer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    TextPlain,
    ApplicationJson,
}

impl ContentType {
    fn header_value(self) -> &'static str {
        match self {
            ContentType::TextPlain => "text/plain; charset=utf-8",
            ContentType::ApplicationJson => "application/json",
        }
    }
}

/// A fully determined response, ready to render.
#[derive(Debug, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub content_type: ContentType,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(content_type: ContentType, body: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            content_type,
            body,
        }
    }

    /// Canonical empty 400. Malformed input and import failures all collapse
    /// to this so the wire carries no failure detail.
    pub fn bad_request() -> Self {
        Self {
            status: Status::BadRequest,
            content_type: ContentType::ApplicationJson,
            body: Vec::new(),
        }
    }

    /// Canonical empty 404 for a signing key that is not in the vault.
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            content_type: ContentType::ApplicationJson,
            body: Vec::new(),
        }
    }

    /// Render the response to wire bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        if self.body.len() > MAX_RESPONSE_BODY {
            error!("response body of {} bytes exceeds cap", self.body.len());
            return Response::bad_request().into_bytes();
        }

        let head = format!(
            "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.status.line(),
            self.content_type.header_value(),
            self.body.len()
        );
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_length_of(bytes: &[u8]) -> usize {
        let text = std::str::from_utf8(bytes).unwrap();
        let line = text
            .lines()
            .find(|l| l.to_ascii_lowercase().starts_with("content-length:"))
            .unwrap();
        line.split(':').nth(1).unwrap().trim().parse().unwrap()
    }

    fn body_of(bytes: &[u8]) -> &[u8] {
        let pos = bytes.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
        &bytes[pos + 4..]
    }

    #[test]
    fn test_content_length_matches_body() {
        let response = Response::ok(ContentType::ApplicationJson, b"[\n]".to_vec());
        let bytes = response.into_bytes();
        assert_eq!(content_length_of(&bytes), 3);
        assert_eq!(body_of(&bytes), b"[\n]");
    }

    #[test]
    fn test_empty_body_has_zero_length() {
        let bytes = Response::ok(ContentType::TextPlain, Vec::new()).into_bytes();
        assert_eq!(content_length_of(&bytes), 0);
        assert!(body_of(&bytes).is_empty());
        assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn test_error_responses_are_empty_json() {
        let bad = Response::bad_request().into_bytes();
        assert!(bad.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(content_length_of(&bad), 0);

        let missing = Response::not_found().into_bytes();
        assert!(missing.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
        assert!(std::str::from_utf8(&missing)
            .unwrap()
            .contains("Content-Type: application/json"));
    }

    #[test]
    fn test_oversized_body_collapses_to_bad_request() {
        let huge = vec![b'x'; MAX_RESPONSE_BODY + 1];
        let bytes = Response::ok(ContentType::TextPlain, huge).into_bytes();
        assert!(bytes.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
