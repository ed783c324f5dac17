//!  Mask flag and key.

/// Payload mask with a 32-bit key.
///
/// Frames written by the relay use `Mask::None`,
/// frames written by a client carry `Mask::Key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mask {
    Key([u8; 4]),
    None,
}

impl Mask {
    /// Read the flag which indicates whether mask is used.
    /// A set flag yields a zero key, the caller should read the real one.
    #[inline]
    pub const fn from_flag(b: u8) -> Self {
        match b & 0x80 {
            0x80 => Mask::Key([0; 4]),
            _ => Mask::None,
        }
    }

    /// Get the flag byte.
    #[inline]
    pub const fn to_flag(&self) -> u8 {
        match self {
            Mask::Key(_) => 0x80,
            Mask::None => 0x00,
        }
    }
}

/// Generate a new random key.
#[inline]
pub fn new_rand_key() -> [u8; 4] { rand::random::<[u8; 4]>() }

/// Mask the buffer, byte by byte.
///
/// `buf[i] ^= key[i % 4]`, applying it twice restores the input.
#[inline]
pub fn apply_mask(key: [u8; 4], buf: &mut [u8]) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b ^= key[i & 0x03];
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask_store() {
        for v in [0x00, 0x80] {
            assert_eq!(Mask::from_flag(v).to_flag(), v);
        }
    }

    #[test]
    fn mask_sample() {
        let mut buf = [0x1a, 0x7a, 0x95, 0x3b];
        apply_mask([0x4e, 0x1f, 0xe6, 0x4f], &mut buf);
        assert_eq!(&buf, b"Test");
    }

    #[test]
    fn mask_byte() {
        for len in [0, 1, 3, 4, 5, 127, 1024] {
            let key = new_rand_key();
            let buf: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();

            let mut buf2 = buf.clone();
            apply_mask(key, &mut buf2);
            apply_mask(key, &mut buf2);

            assert_eq!(buf, buf2);
        }
    }
}
