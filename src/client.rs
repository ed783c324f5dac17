//! Outbound client.
//!
//! [`Upstream`] owns one connection to the forward target. Each
//! [`send`](Upstream::send) writes a request and returns whatever answer
//! arrives within one read, plus a single retry after a short sleep.

use std::io::{ErrorKind, Read, Result, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use log::{debug, error, info, trace};

use crate::config::{IoMode, UPSTREAM_BUFFER_CAP, UPSTREAM_RETRY_INTERVAL, WRITE_RETRY_INTERVAL};
use crate::content::Content;

/// Connection to the upstream endpoint.
#[derive(Debug)]
pub struct Upstream {
    host: String,
    port: u16,
    mode: IoMode,
    stream: Option<TcpStream>,
}

impl Upstream {
    /// Connect to `host:port`.
    ///
    /// In blocking mode a read waits up to `read_timeout`,
    /// `None` waits forever.
    pub fn connect(
        host: &str,
        port: u16,
        mode: IoMode,
        read_timeout: Option<Duration>,
    ) -> Result<Self> {
        let stream = TcpStream::connect((host, port))?;
        match mode {
            IoMode::Blocking => stream.set_read_timeout(read_timeout)?,
            IoMode::NonBlocking => stream.set_nonblocking(true)?,
        }
        trace!("connected to {}:{} ({:?})", host, port, mode);

        Ok(Self {
            host: host.to_string(),
            port,
            mode,
            stream: Some(stream),
        })
    }

    /// `host:port` label.
    #[inline]
    pub fn connection(&self) -> String { format!("{}:{}", self.host, self.port) }

    #[inline]
    pub fn is_connected(&self) -> bool { self.stream.is_some() }

    #[inline]
    pub fn mode(&self) -> IoMode { self.mode }

    /// Write `content` and return the response.
    ///
    /// Never fails: an io error closes the connection and yields an
    /// empty buffer, EOF closes the connection and yields what was read.
    pub fn send(&mut self, content: &[u8]) -> Vec<u8> {
        match self.exchange(content) {
            Ok(buf) => buf,
            Err(e) => {
                error!("exchange with {} failed: {}", self.connection(), e);
                self.close();
                Vec::new()
            }
        }
    }

    /// [`send`](Self::send) for text, decoded as UTF-8.
    pub fn send_str(&mut self, content: &str) -> String {
        let response = self.send(content.as_bytes());
        Content::new(&response).as_string().into_owned()
    }

    fn exchange(&mut self, content: &[u8]) -> Result<Vec<u8>> {
        let label = self.connection();
        let stream = match self.stream.as_mut() {
            Some(stream) => stream,
            None => return Err(ErrorKind::NotConnected.into()),
        };

        trace!("send {} bytes to {}", content.len(), label);
        write_all(stream, content)?;

        debug!("wait for response from {}..", label);
        let mut buf = vec![0u8; UPSTREAM_BUFFER_CAP];

        let mut read = read_once(stream, &mut buf)?;
        if read == Some(0) {
            trace!("re-read from {}..", label);
            std::thread::sleep(UPSTREAM_RETRY_INTERVAL);
            read = read_once(stream, &mut buf)?;
        }

        let n = match read {
            None => {
                trace!("received EOF from {}, closing", label);
                self.close();
                0
            }
            Some(0) => {
                trace!("received no data from {}", label);
                0
            }
            Some(n) => {
                trace!("received {} bytes from {}: {}", n, label, Content::new(&buf[..n]));
                n
            }
        };

        buf.truncate(n);
        Ok(buf)
    }

    /// Shut down and drop the connection.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            info!("close upstream connection {}", self.connection());
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for Upstream {
    fn drop(&mut self) { self.close(); }
}

/// `None` on EOF, `Some(0)` if nothing is available yet.
fn read_once(stream: &mut TcpStream, buf: &mut [u8]) -> Result<Option<usize>> {
    match stream.read(buf) {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(e) => match e.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => Ok(Some(0)),
            _ => Err(e),
        },
    }
}

fn write_all(stream: &mut TcpStream, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        match stream.write(buf) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == ErrorKind::WouldBlock => std::thread::sleep(WRITE_RETRY_INTERVAL),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    stream.flush()
}
