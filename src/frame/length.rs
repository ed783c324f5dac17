//! Payload length.

/// Payload length.
///
/// Could be 7 bits, 7+16 bits, or 7+64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLen {
    /// 0 - 125
    Standard(u8),
    /// 126 - 65535
    Extended1(u16),
    /// over 65536
    Extended2(u64),
}

impl PayloadLen {
    /// Parse from number.
    #[inline]
    pub const fn from_num(n: u64) -> Self {
        if n < 126 {
            PayloadLen::Standard(n as u8)
        } else if n < 65536 {
            PayloadLen::Extended1(n as u16)
        } else {
            PayloadLen::Extended2(n)
        }
    }

    /// Convert to number.
    #[inline]
    pub const fn to_num(self) -> u64 {
        use PayloadLen::*;
        match self {
            Standard(v) => v as u64,
            Extended1(v) => v as u64,
            Extended2(v) => v,
        }
    }

    /// Read the flag which indicates the kind of length.
    ///
    /// If extended length is used, the caller should read the next 2 or 8 bytes
    /// to get the real length.
    #[inline]
    pub const fn from_flag(b: u8) -> Self {
        match b & 0x7f {
            126 => PayloadLen::Extended1(0),
            127 => PayloadLen::Extended2(0),
            b => PayloadLen::Standard(b),
        }
    }

    /// Generate the flag byte.
    /// If `length <= 125`, it represents the real length.
    #[inline]
    pub const fn to_flag(&self) -> u8 {
        use PayloadLen::*;
        match self {
            Standard(b) => *b,
            Extended1(_) => 126,
            Extended2(_) => 127,
        }
    }

    /// Number of extended length bytes following the flag byte.
    #[inline]
    pub const fn extended_len(&self) -> usize {
        use PayloadLen::*;
        match self {
            Standard(_) => 0,
            Extended1(_) => 2,
            Extended2(_) => 8,
        }
    }

    /// Read as 16-bit length.
    #[inline]
    pub const fn from_byte2(buf: [u8; 2]) -> Self { PayloadLen::Extended1(u16::from_be_bytes(buf)) }

    /// Read as 64-bit length.
    #[inline]
    pub const fn from_byte8(buf: [u8; 8]) -> Self { PayloadLen::Extended2(u64::from_be_bytes(buf)) }

    /// Length as the relay has always computed it: the inline value for short
    /// frames, otherwise whatever is left of the buffer after a fixed head size.
    ///
    /// `total` is the length of the whole buffer the frame starts in.
    /// The fixed head sizes are `8`/`4` (masked/unmasked) for the 16-bit form
    /// and `14`/`4` for the 64-bit form.
    #[inline]
    pub const fn legacy_len(flag: u8, masked: bool, total: usize) -> usize {
        match PayloadLen::from_flag(flag) {
            PayloadLen::Standard(v) => v as usize,
            PayloadLen::Extended1(_) => {
                total.saturating_sub(if masked { 8 } else { 4 })
            }
            PayloadLen::Extended2(_) => {
                total.saturating_sub(if masked { 14 } else { 4 })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boundaries() {
        // (length, flag byte, extended bytes)
        for (n, flag, ext) in [
            (0_u64, 0_u8, 0_usize),
            (125, 125, 0),
            (126, 126, 2),
            (65535, 126, 2),
            (65536, 127, 8),
            (u32::MAX as u64 + 1, 127, 8),
        ] {
            let len = PayloadLen::from_num(n);
            assert_eq!(len.to_num(), n);
            assert_eq!(len.to_flag(), flag);
            assert_eq!(len.extended_len(), ext);
            assert_eq!(PayloadLen::from_flag(flag | 0x80).extended_len(), ext);
        }

        assert_eq!(PayloadLen::from_byte2(300_u16.to_be_bytes()).to_num(), 300);
        assert_eq!(PayloadLen::from_byte8(70000_u64.to_be_bytes()).to_num(), 70000);
    }

    #[test]
    fn legacy() {
        // mask bit is ignored by the flag parser
        assert_eq!(PayloadLen::legacy_len(0x84, true, 10), 4);
        assert_eq!(PayloadLen::legacy_len(0xfe, true, 208), 200);
        assert_eq!(PayloadLen::legacy_len(0x7e, false, 204), 200);
        assert_eq!(PayloadLen::legacy_len(0xff, true, 70014), 70000);
        assert_eq!(PayloadLen::legacy_len(0x7f, false, 3), 0);
    }
}
