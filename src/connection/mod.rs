//! Connection abstraction.
//!
//! Handlers are written once against [`Connection`]. Whether a read waits
//! for data or returns at once is decided by the concrete connection,
//! see [`TcpConnection`].

mod tcp;

pub use tcp::TcpConnection;

use std::io::{Result, Write};
use std::net::SocketAddr;
use std::time::Duration;

/// Result of one read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Some bytes were read.
    Data(usize),

    /// No data yet, the peer is still there.
    Empty,

    /// The peer closed its side.
    Eof,
}

/// Readable, writable, closable byte stream with known endpoints.
pub trait Connection: Write {
    /// Read once into `buf`, telling empty reads apart from EOF.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome>;

    /// Called after an empty read, before the next attempt.
    fn idle(&mut self, interval: Duration);

    fn peer_addr(&self) -> Result<SocketAddr>;

    fn local_addr(&self) -> Result<SocketAddr>;

    fn is_blocking(&self) -> bool;

    /// Close both directions. Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::collections::VecDeque;
    use std::io::{Error, ErrorKind};

    /// In-memory connection replaying scripted reads.
    /// An exhausted script reads as EOF.
    #[derive(Debug, Default)]
    pub struct ScriptedConnection {
        pub reads: VecDeque<Option<Vec<u8>>>,
        pub written: Vec<u8>,
        pub read_count: usize,
        pub idle_count: usize,
        pub close_count: usize,
        /// `close` reports an error, after counting.
        pub fail_close: bool,
    }

    impl ScriptedConnection {
        /// `None` is an empty read.
        pub fn new<I: IntoIterator<Item = Option<Vec<u8>>>>(reads: I) -> Self {
            Self {
                reads: reads.into_iter().collect(),
                ..Default::default()
            }
        }
    }

    impl Write for ScriptedConnection {
        fn write(&mut self, buf: &[u8]) -> Result<usize> {
            if self.close_count > 0 {
                return Err(Error::from(ErrorKind::BrokenPipe));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<()> { Ok(()) }
    }

    impl Connection for ScriptedConnection {
        fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
            self.read_count += 1;
            match self.reads.pop_front() {
                None => Ok(ReadOutcome::Eof),
                Some(None) => Ok(ReadOutcome::Empty),
                Some(Some(data)) => {
                    buf[..data.len()].copy_from_slice(&data);
                    Ok(ReadOutcome::Data(data.len()))
                }
            }
        }

        fn idle(&mut self, _: Duration) { self.idle_count += 1; }

        fn peer_addr(&self) -> Result<SocketAddr> { Ok(SocketAddr::from(([127, 0, 0, 1], 40000))) }

        fn local_addr(&self) -> Result<SocketAddr> { Ok(SocketAddr::from(([127, 0, 0, 1], 19381))) }

        fn is_blocking(&self) -> bool { false }

        fn close(&mut self) -> Result<()> {
            self.close_count += 1;
            if self.fail_close {
                return Err(Error::from(ErrorKind::NotConnected));
            }
            Ok(())
        }
    }
}
