//! Websocket endpoint.
//!
//! An [`Endpoint`] is the server side of one websocket session. It answers
//! the upgrade request, decodes client frames and encodes server frames.
//! It does not perform any io, the caller moves the bytes.
//!
//! ```ignore
//! {
//!     let mut ws = Endpoint::new(Dialect::Legacy, "relay");
//!     if ws.is_websocket_request(&chunk) {
//!         conn.write_all(&ws.create_websocket_response(&chunk))?;
//!     }
//!     // later
//!     let payload = ws.unwrap(&chunk)?;
//!     conn.write_all(&ws.wrap(payload.binary, &reply))?;
//! }
//! ```

use log::{debug, warn};

use crate::dialect::Dialect;
use crate::error::FrameError;
use crate::frame::{self, Payload};
use crate::handshake::{self, Upgrade};

/// Server side websocket session.
#[derive(Debug, Clone)]
pub struct Endpoint {
    open: bool,
    dialect: Dialect,
    server_name: String,
}

impl Endpoint {
    /// Create a closed session.
    pub fn new(dialect: Dialect, server_name: impl Into<String>) -> Self {
        Self {
            open: false,
            dialect,
            server_name: server_name.into(),
        }
    }

    /// Whether the handshake has completed.
    #[inline]
    pub const fn is_open(&self) -> bool { self.open }

    #[inline]
    pub const fn dialect(&self) -> Dialect { self.dialect }

    /// Mark the session closed. It can not be opened again.
    #[inline]
    pub fn close(&mut self) { self.open = false; }

    /// Whether the chunk looks like an upgrade request.
    #[inline]
    pub fn is_websocket_request(&self, chunk: &[u8]) -> bool {
        handshake::is_upgrade_request(chunk)
    }

    /// Answer an upgrade request.
    ///
    /// On success the session becomes open and a `101 Switching Protocols`
    /// response is returned. A request without `Sec-WebSocket-Key` gets
    /// `400 Bad Request` and leaves the session untouched.
    pub fn create_websocket_response(&mut self, chunk: &[u8]) -> Vec<u8> {
        match Upgrade::from_request(chunk, self.dialect) {
            Ok(upgrade) => {
                debug!("websocket upgrade accepted, protocol: {:?}", upgrade.protocol);
                self.open = true;
                upgrade.response(&self.server_name)
            }
            Err(e) => {
                warn!("websocket upgrade rejected: {}", e);
                self.create_bad_request_response()
            }
        }
    }

    /// `HTTP/1.1 400 Bad Request`.
    #[inline]
    pub fn create_bad_request_response(&self) -> Vec<u8> { handshake::bad_request() }

    /// Decode a client frame.
    #[inline]
    pub fn unwrap(&self, chunk: &[u8]) -> Result<Payload, FrameError> {
        frame::unwrap(chunk, self.dialect)
    }

    /// Encode a server frame.
    #[inline]
    pub fn wrap(&self, binary: bool, content: &[u8]) -> Vec<u8> {
        frame::wrap(binary, content, self.dialect)
    }
}
