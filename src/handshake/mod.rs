//! Websocket handshake.
//!
//! The upgrade request is answered locally and never forwarded.

pub mod key;
pub mod request;

pub use key::{new_sec_key, derive_accept_key};

use crate::content::{encode_ascii, latin1_bytes};
use crate::dialect::Dialect;
use crate::error::HandshakeError;

/// 32
pub const MAX_ALLOW_HEADERS: usize = 32;

/// 258EAFA5-E914-47DA-95CA-C5AB0DC85B11
pub const GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// GET
pub const HTTP_METHOD: &[u8] = b"GET";

/// CRLF
pub const HTTP_LINE_BREAK: &str = "\r\n";

/// HTTP/1.1 101 Switching Protocols
pub const HTTP_STATUS_LINE: &str = "HTTP/1.1 101 Switching Protocols";

/// HTTP/1.1 400 Bad Request
pub const HTTP_BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request";

/// Sec-WebSocket-Key
pub const SEC_WEBSOCKET_KEY: &str = "Sec-WebSocket-Key";

/// Sec-WebSocket-Protocol
pub const SEC_WEBSOCKET_PROTOCOL: &str = "Sec-WebSocket-Protocol";

/// Fields of an upgrade request the relay cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upgrade {
    pub sec_key: String,
    pub protocol: Option<String>,
}

impl Upgrade {
    /// Read from an inbound chunk with the given dialect.
    /// The chunk must start with `GET`.
    #[inline]
    pub fn from_request(buf: &[u8], dialect: Dialect) -> Result<Self, HandshakeError> {
        if !is_upgrade_request(buf) {
            return Err(HandshakeError::NotARequest);
        }

        match dialect {
            Dialect::Legacy => request::scan(buf),
            Dialect::Rfc6455 => request::parse(buf),
        }
    }

    /// Derive `sec-websocket-accept`.
    #[inline]
    pub fn accept_key(&self) -> String { derive_accept_key(&latin1_bytes(&self.sec_key)) }

    /// Encode the `101 Switching Protocols` response, with `server` as the
    /// value of the server header. The protocol header is echoed if present.
    pub fn response(&self, server: &str) -> Vec<u8> {
        let mut s = String::with_capacity(256);

        macro_rules! push_line {
            ($($arg: tt)*) => {{
                s.push_str(&format!($($arg)*));
                s.push_str(HTTP_LINE_BREAK);
            }};
        }

        push_line!("{}", HTTP_STATUS_LINE);
        push_line!("Server: {}", server);
        push_line!("Connection: Upgrade");
        push_line!("Upgrade: websocket");
        push_line!("Sec-WebSocket-Version: 13");
        if let Some(protocol) = &self.protocol {
            push_line!("{}: {}", SEC_WEBSOCKET_PROTOCOL, protocol);
        }
        push_line!("Sec-WebSocket-Accept: {}", self.accept_key());
        s.push_str(HTTP_LINE_BREAK);

        encode_ascii(&s)
    }
}

/// Whether the chunk looks like an upgrade request.
/// Only the method is checked.
#[inline]
pub fn is_upgrade_request(buf: &[u8]) -> bool { buf.starts_with(HTTP_METHOD) }

/// `HTTP/1.1 400 Bad Request`, without any header.
#[inline]
pub fn bad_request() -> Vec<u8> { HTTP_BAD_REQUEST.to_vec() }
