use std::io::{ErrorKind, Read, Result, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use super::{Connection, ReadOutcome};
use crate::config::{IoMode, WRITE_RETRY_INTERVAL};

/// Tcp stream in blocking or non-blocking mode.
///
/// A blocking stream waits up to one poll interval in each read,
/// a non-blocking stream returns at once and sleeps in [`idle`](Connection::idle).
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    mode: IoMode,
    closed: bool,
}

impl TcpConnection {
    /// Configure the stream for `mode`.
    pub fn new(stream: TcpStream, mode: IoMode, poll_interval: Duration) -> Result<Self> {
        match mode {
            IoMode::Blocking => {
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(Some(poll_interval))?;
            }
            IoMode::NonBlocking => stream.set_nonblocking(true)?,
        }

        Ok(Self {
            stream,
            mode,
            closed: false,
        })
    }

    #[inline]
    pub fn mode(&self) -> IoMode { self.mode }
}

impl AsRef<TcpStream> for TcpConnection {
    #[inline]
    fn as_ref(&self) -> &TcpStream { &self.stream }
}

impl Write for TcpConnection {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        loop {
            match self.stream.write(buf) {
                // a non-blocking socket may be full for a moment
                Err(e) if e.kind() == ErrorKind::WouldBlock => std::thread::sleep(WRITE_RETRY_INTERVAL),
                ret => return ret,
            }
        }
    }

    fn flush(&mut self) -> Result<()> { self.stream.flush() }
}

impl Connection for TcpConnection {
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => Ok(ReadOutcome::Eof),
            Ok(0) => Ok(ReadOutcome::Empty),
            Ok(n) => Ok(ReadOutcome::Data(n)),
            Err(e) => match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
                    Ok(ReadOutcome::Empty)
                }
                _ => Err(e),
            },
        }
    }

    fn idle(&mut self, interval: Duration) {
        // a blocking read has already waited
        if self.mode == IoMode::NonBlocking {
            std::thread::sleep(interval);
        }
    }

    #[inline]
    fn peer_addr(&self) -> Result<SocketAddr> { self.stream.peer_addr() }

    #[inline]
    fn local_addr(&self) -> Result<SocketAddr> { self.stream.local_addr() }

    #[inline]
    fn is_blocking(&self) -> bool { self.mode == IoMode::Blocking }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}
