//! Client upgrade request.
//!
//! From [RFC-6455 Section 4.1](https://datatracker.ietf.org/doc/html/rfc6455#section-4.1):
//!
//! Once a connection to the server has been established (including a
//! connection via a proxy or over a TLS-encrypted tunnel), the client
//! MUST send an opening handshake to the server.  The handshake consists
//! of an HTTP Upgrade request, along with a list of required and
//! optional header fields.
//!
//! Example:
//!
//! ```text
//! GET /path HTTP/1.1
//! host: www.example.com
//! upgrade: websocket
//! connection: upgrade
//! sec-websocket-key: dGhlIHNhbXBsZSBub25jZQ==
//! sec-websocket-version: 13
//! ```
//!
//! Two parsers are provided. [`scan`] is the line scan the relay has
//! always used, [`parse`] runs the request through `httparse`.

use super::{Upgrade, MAX_ALLOW_HEADERS};
use super::{SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_PROTOCOL};

use crate::content::Content;
use crate::error::HandshakeError;

/// Scan the lines of `buf` for the key and protocol headers.
///
/// Header names are matched case sensitive, as a literal prefix
/// followed by a colon. Nothing else is validated.
pub fn scan(buf: &[u8]) -> Result<Upgrade, HandshakeError> {
    let text = Content::new(buf).as_latin1();

    let header = |name: &str| {
        text.lines().find_map(|line| {
            line.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|value| value.trim().to_string())
        })
    };

    let sec_key = header(SEC_WEBSOCKET_KEY)
        .filter(|k| !k.is_empty())
        .ok_or(HandshakeError::SecWebSocketKey)?;

    Ok(Upgrade {
        sec_key,
        protocol: header(SEC_WEBSOCKET_PROTOCOL),
    })
}

/// Parse `buf` as a complete http request.
///
/// The method must be `GET` and the version `HTTP/1.1`.
/// Header names are case insensitive.
/// If the buffer does not contain a complete request,
/// a [`HandshakeError::NotEnoughData`] error will be returned.
pub fn parse(buf: &[u8]) -> Result<Upgrade, HandshakeError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_ALLOW_HEADERS];
    let mut request = httparse::Request::new(&mut headers);

    match request.parse(buf)? {
        httparse::Status::Complete(_) => {}
        httparse::Status::Partial => return Err(HandshakeError::NotEnoughData),
    };

    if request.method != Some("GET") {
        return Err(HandshakeError::HttpMethod);
    }

    if request.version != Some(1) {
        return Err(HandshakeError::HttpVersion);
    }

    let header = |name: &str| {
        request
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| Content::new(h.value).as_latin1().trim().to_string())
    };

    let sec_key = header(SEC_WEBSOCKET_KEY)
        .filter(|k| !k.is_empty())
        .ok_or(HandshakeError::SecWebSocketKey)?;

    Ok(Upgrade {
        sec_key,
        protocol: header(SEC_WEBSOCKET_PROTOCOL),
    })
}
