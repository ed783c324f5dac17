//! Wire dialect.
//!
//! The relay has always spoken a slightly loose version of RFC-6455:
//!
//! - Frames written back to the client carry the bare opcode, without the fin bit.
//! - Extended payload lengths of incoming frames are derived from the size of
//!   the received chunk instead of the extended length bytes.
//! - Payloads over 65535 bytes are written without any length bytes.
//! - The upgrade request is found by a plain line scan.
//!
//! Peers depending on that behavior keep working with [`Dialect::Legacy`].
//! [`Dialect::Rfc6455`] follows the wire format exactly.

/// Frame and handshake dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Loose behavior, see module docs.
    #[default]
    Legacy,

    /// Exact RFC-6455 framing and httparse based handshake parsing.
    Rfc6455,
}

impl Dialect {
    /// Whether this is the exact wire format.
    #[inline]
    pub const fn is_strict(self) -> bool { matches!(self, Dialect::Rfc6455) }
}
