//! Websocket data frame.
//!
//! [RFC-6455 Section5](https://datatracker.ietf.org/doc/html/rfc6455#section-5)
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+ - - - - - - - - - - - - - - - +
//! |     Extended payload length continued, if payload len == 127  |
//! + - - - - - - - - - - - - - - - +-------------------------------+
//! |                               |Masking-key, if MASK set to 1  |
//! +-------------------------------+-------------------------------+
//! | Masking-key (continued)       |          Payload Data         |
//! +-------------------------------- - - - - - - - - - - - - - - - +
//! :                     Payload Data continued ...                :
//! + - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - - +
//! |                     Payload Data continued ...                |
//! +---------------------------------------------------------------+
//! ```
//!
//! Each inbound chunk is treated as exactly one frame.
//! Fragmented messages are not supported.

pub mod flag;
pub mod length;
pub mod mask;

pub use flag::{Fin, OpCode};
pub use length::PayloadLen;
pub use mask::{Mask, apply_mask};

use log::warn;

use crate::dialect::Dialect;
use crate::error::FrameError;

/// Websocket frame head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHead {
    pub fin: Fin,
    pub opcode: OpCode,
    pub mask: Mask,
    pub length: PayloadLen,
}

impl FrameHead {
    /// Constructor.
    #[inline]
    pub const fn new(fin: Fin, opcode: OpCode, mask: Mask, length: PayloadLen) -> Self {
        Self {
            fin,
            opcode,
            mask,
            length,
        }
    }

    /// Append the encoded head to `buf`, returns the count of written bytes.
    pub fn encode(&self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();

        // fin, opcode
        buf.push(self.fin as u8 | self.opcode.to_flag());

        // mask, payload length
        buf.push(self.mask.to_flag() | self.length.to_flag());

        // extended payload length
        match &self.length {
            PayloadLen::Standard(_) => {}
            PayloadLen::Extended1(v) => buf.extend_from_slice(&v.to_be_bytes()),
            PayloadLen::Extended2(v) => buf.extend_from_slice(&v.to_be_bytes()),
        };

        // mask key
        if let Mask::Key(k) = &self.mask {
            buf.extend_from_slice(k);
        }

        buf.len() - start
    }

    /// Parse from provided buffer, returns [`FrameHead`] and the count of read bytes
    /// if the parse succeeds.
    /// If there is not enough data to parse, a [`FrameError::NotEnoughData`] error
    /// will be returned.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FrameError> {
        if buf.len() < 2 {
            return Err(FrameError::NotEnoughData);
        }

        let mut n: usize = 2;

        // fin, opcode
        let b1 = buf[0];

        // mask, payload length
        let b2 = buf[1];

        let fin = Fin::from_flag(b1)?;
        let opcode = OpCode::from_flag(b1);

        let mut mask = Mask::from_flag(b2);
        let mut length = PayloadLen::from_flag(b2);

        match length {
            PayloadLen::Standard(_) => {}
            PayloadLen::Extended1(_) => {
                let b: [u8; 2] = read_array(buf, n)?;
                length = PayloadLen::from_byte2(b);
                n += 2;
            }
            PayloadLen::Extended2(_) => {
                let b: [u8; 8] = read_array(buf, n)?;
                length = PayloadLen::from_byte8(b);
                n += 8;
            }
        };

        if let Mask::Key(_) = mask {
            mask = Mask::Key(read_array(buf, n)?);
            n += 4;
        }

        Ok((
            FrameHead {
                fin,
                opcode,
                mask,
                length,
            },
            n,
        ))
    }
}

#[inline]
fn read_array<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N], FrameError> {
    buf.get(at..at + N)
        .and_then(|b| b.try_into().ok())
        .ok_or(FrameError::NotEnoughData)
}

/// Decoded frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub opcode: OpCode,
    pub binary: bool,
    pub content: Vec<u8>,
}

/// Decode one frame, unmasking its payload.
pub fn unwrap(buf: &[u8], dialect: Dialect) -> Result<Payload, FrameError> {
    match dialect {
        Dialect::Legacy => unwrap_legacy(buf),
        Dialect::Rfc6455 => unwrap_strict(buf),
    }
}

fn unwrap_legacy(buf: &[u8]) -> Result<Payload, FrameError> {
    if buf.len() < 2 {
        return Err(FrameError::NotEnoughData);
    }

    let b1 = buf[0];
    let b2 = buf[1];

    // text bit wins over binary bit
    let binary = b1 & 0x02 != 0 && b1 & 0x01 == 0;
    let opcode = OpCode::from_flag(b1);

    let masked = Mask::from_flag(b2) != Mask::None;
    let mut n = 2 + PayloadLen::from_flag(b2).extended_len();
    let len = PayloadLen::legacy_len(b2, masked, buf.len());

    let key = if masked {
        let key: [u8; 4] = read_array(buf, n)?;
        n += 4;
        Some(key)
    } else {
        None
    };

    if n > buf.len() {
        return Err(FrameError::NotEnoughData);
    }

    let end = n.saturating_add(len).min(buf.len());
    if end - n < len {
        warn!("frame announces {} bytes, only {} received", len, end - n);
    }

    let mut content = buf[n..end].to_vec();
    if let Some(key) = key {
        apply_mask(key, &mut content);
    }

    Ok(Payload {
        opcode,
        binary,
        content,
    })
}

fn unwrap_strict(buf: &[u8]) -> Result<Payload, FrameError> {
    let (head, n) = FrameHead::decode(buf)?;

    let len = usize::try_from(head.length.to_num()).map_err(|_| FrameError::UnsupportedLength)?;
    let end = n.checked_add(len).ok_or(FrameError::UnsupportedLength)?;
    if end > buf.len() {
        return Err(FrameError::NotEnoughData);
    }

    let mut content = buf[n..end].to_vec();
    if let Mask::Key(key) = head.mask {
        apply_mask(key, &mut content);
    }

    Ok(Payload {
        opcode: head.opcode,
        binary: head.opcode == OpCode::Binary,
        content,
    })
}

/// Encode `content` as one unmasked text or binary frame.
pub fn wrap(binary: bool, content: &[u8], dialect: Dialect) -> Vec<u8> {
    let opcode = if binary { OpCode::Binary } else { OpCode::Text };
    let length = PayloadLen::from_num(content.len() as u64);

    let mut buf = Vec::with_capacity(content.len() + 10);

    match dialect {
        Dialect::Legacy => {
            buf.push(opcode.to_flag());
            match length {
                PayloadLen::Standard(v) => buf.push(v),
                PayloadLen::Extended1(v) => {
                    buf.push(126);
                    buf.extend_from_slice(&v.to_be_bytes());
                }
                PayloadLen::Extended2(v) => {
                    warn!("payload of {} bytes is too large, length is omitted", v);
                }
            }
        }
        Dialect::Rfc6455 => {
            FrameHead::new(Fin::Y, opcode, Mask::None, length).encode(&mut buf);
        }
    }

    buf.extend_from_slice(content);
    buf
}

/// Encode `content` as one masked frame, the way a client sends it.
pub fn wrap_masked(opcode: OpCode, key: [u8; 4], content: &[u8]) -> Vec<u8> {
    let head = FrameHead::new(
        Fin::Y,
        opcode,
        Mask::Key(key),
        PayloadLen::from_num(content.len() as u64),
    );

    let mut buf = Vec::with_capacity(content.len() + 14);
    let n = head.encode(&mut buf);
    buf.extend_from_slice(content);
    apply_mask(key, &mut buf[n..]);
    buf
}
