//! Byte content helpers.
//!
//! [`Content`] is a read-only view over a received buffer, used to
//! render chunks in logs and to scan handshake text.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Result, Write};

use rand::Rng;

/// CRLF
const LINE_BREAK: &str = "\r\n";

/// Read-only view of a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Content<'a> {
    data: &'a [u8],
}

impl<'a> Content<'a> {
    /// Wrap a buffer.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self { Self { data } }

    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] { self.data }

    #[inline]
    pub const fn len(&self) -> usize { self.data.len() }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Decode as UTF-8, invalid sequences are replaced.
    #[inline]
    pub fn as_string(&self) -> Cow<'a, str> { String::from_utf8_lossy(self.data) }

    /// Decode as ISO-8859-1, every byte maps to one char.
    #[inline]
    pub fn as_latin1(&self) -> String { self.data.iter().map(|&b| b as char).collect() }

    /// Number of CRLF separated lines.
    ///
    /// `text\r\nmoreText` counts as 2, an empty buffer as 1.
    pub fn lines_count(&self) -> usize { self.as_string().matches(LINE_BREAK).count() + 1 }

    /// Join the lines of the text with `separator` instead of line breaks.
    pub fn with_line_separation(&self, separator: &str) -> String {
        self.as_string().lines().collect::<Vec<_>>().join(separator)
    }

    /// Write the raw bytes to `out`.
    pub fn print<W: Write>(&self, mut out: W) -> Result<&Self> {
        out.write_all(self.data)?;
        out.flush()?;
        Ok(self)
    }

    /// Hex rendering, 16 bytes per line.
    pub fn dump(&self) -> String {
        let mut s = String::with_capacity(self.data.len() * 3);
        for (i, line) in self.data.chunks(16).enumerate() {
            if i > 0 {
                s.push('\n');
            }
            let _ = write!(s, "{:08x} ", i * 16);
            for b in line {
                let _ = write!(s, " {:02x}", b);
            }
        }
        s
    }
}

impl<'a> From<&'a [u8]> for Content<'a> {
    fn from(data: &'a [u8]) -> Self { Content::new(data) }
}

impl std::fmt::Display for Content<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Encode as ISO-8859-1, chars out of range become `?`.
pub fn latin1_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Encode as US-ASCII, chars out of range become `?`.
pub fn encode_ascii(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

/// Random upper case text (`[A-Z]`) of `len` chars.
pub fn generate_data(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'A'..=b'Z') as char).collect()
}
