//! Forward handler.
//!
//! Relays each inbound chunk to the upstream and writes the answer back.
//! With websocket support the upgrade request is answered locally, and
//! once the session is open only frame payloads travel upstream:
//!
//! ```text
//! client --frame--> relay --payload--> upstream
//! client <--frame-- relay <--payload-- upstream
//! ```

use std::io::Write;

use log::{debug, error, info, trace, warn};

use super::{Exit, Flow, Handler, Session, StopHandle};
use crate::client::Upstream;
use crate::config::ForwardConfig;
use crate::connection::Connection;
use crate::content::Content;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::frame::OpCode;

/// Relay handler.
#[derive(Debug)]
pub struct ForwardHandler {
    config: ForwardConfig,
    session: Session,
}

impl ForwardHandler {
    pub fn new(config: ForwardConfig) -> Self {
        let session = Session::new(config.idle_timeout, config.poll_interval);
        Self { config, session }
    }

    #[inline]
    pub fn config(&self) -> &ForwardConfig { &self.config }
}

impl Handler for ForwardHandler {
    fn handle<C: Connection>(&mut self, conn: &mut C) -> Result<Exit, Error> {
        let config = &self.config;
        let local = conn.local_addr().ok();
        info!(
            "connection (blocking={}) accepted from {:?} on {:?}, forward to {}",
            conn.is_blocking(),
            conn.peer_addr().ok(),
            local,
            config.upstream()
        );

        let mut upstream = match Upstream::connect(
            &config.upstream_host,
            config.upstream_port,
            config.upstream_io_mode,
            config.upstream_read_timeout,
        ) {
            Ok(upstream) => upstream,
            Err(e) => {
                error!("failed to connect to {}: {}", config.upstream(), e);
                if let Err(close_err) = conn.close() {
                    warn!("failed to close connection: {}", close_err);
                }
                return Err(e.into());
            }
        };
        trace!("forward client created for {:?} -> {}", local, upstream.connection());

        let mut ws = config
            .websocket
            .then(|| Endpoint::new(config.dialect, config.server_name.as_str()));

        let exit = self
            .session
            .drive(conn, |conn, chunk| bridge(conn, chunk, &mut upstream, ws.as_mut()));

        info!("close connections for forward handler");
        if let Err(e) = conn.close() {
            warn!("failed to close connection: {}", e);
        }
        upstream.close();
        if let Some(ws) = ws.as_mut() {
            ws.close();
        }

        exit
    }

    fn stop_handle(&self) -> StopHandle { self.session.stop_handle() }
}

/// Process one inbound chunk.
fn bridge<C: Connection>(
    conn: &mut C,
    chunk: &[u8],
    upstream: &mut Upstream,
    ws: Option<&mut Endpoint>,
) -> Result<Flow, Error> {
    let response = match ws {
        None => forward(upstream, chunk),
        Some(ws) if ws.is_open() => match ws.unwrap(chunk) {
            Ok(payload) if payload.opcode.is_data() => {
                let response = forward(upstream, &payload.content);
                ws.wrap(payload.binary, &response)
            }
            Ok(payload) if payload.opcode == OpCode::Close => {
                debug!("websocket close frame received");
                ws.close();
                return Ok(Flow::Close);
            }
            Ok(payload) => {
                warn!("dropping unsupported {:?} frame", payload.opcode);
                return Ok(Flow::Continue);
            }
            Err(e) => {
                warn!("failed to decode frame: {}", e);
                ws.create_bad_request_response()
            }
        },
        Some(ws) if ws.is_websocket_request(chunk) => {
            trace!("received websocket upgrade request");
            ws.create_websocket_response(chunk)
        }
        Some(ws) => {
            warn!("expected websocket upgrade request");
            ws.create_bad_request_response()
        }
    };

    conn.write_all(&response)?;
    conn.flush()?;
    trace!("wrote {} bytes back: '{}'", response.len(), Content::new(&response));

    if !upstream.is_connected() {
        info!("upstream {} is gone", upstream.connection());
        return Ok(Flow::Close);
    }

    Ok(Flow::Continue)
}

fn forward(upstream: &mut Upstream, content: &[u8]) -> Vec<u8> {
    debug!(
        "forward {} bytes to {}: '{}'",
        content.len(),
        upstream.connection(),
        Content::new(content)
    );
    upstream.send(content)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::IdleTimeout;
    use crate::connection::test::ScriptedConnection;
    use crate::dialect::Dialect;
    use crate::frame::{self, mask};
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    const REQUEST: &[u8] = b"\
    GET /ws HTTP/1.1\r\n\
    Host: www.example.com\r\n\
    Upgrade: websocket\r\n\
    Connection: Upgrade\r\n\
    Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
    Sec-WebSocket-Version: 13\r\n\r\n";

    /// Upstream answering in upper case, returns everything it received.
    fn upper_upstream() -> (u16, JoinHandle<Vec<u8>>) {
        let lis = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = lis.local_addr().unwrap().port();

        let t = thread::spawn(move || {
            let (mut tcp, _) = lis.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = match tcp.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                received.extend_from_slice(&buf[..n]);
                tcp.write_all(&buf[..n].to_ascii_uppercase()).unwrap();
            }
            received
        });

        (port, t)
    }

    fn config(port: u16) -> ForwardConfig {
        ForwardConfig::new("127.0.0.1", port).with_idle_timeout(IdleTimeout::from_secs(1))
    }

    #[test]
    fn forward_raw() {
        let (port, upstream) = upper_upstream();
        let mut conn = ScriptedConnection::new([Some(b"abc".to_vec()), None, Some(b"def".to_vec())]);

        let mut handler = ForwardHandler::new(config(port).with_websocket(false));
        assert_eq!(handler.handle(&mut conn).unwrap(), Exit::Eof);

        assert_eq!(conn.written, b"ABCDEF");
        assert_eq!(conn.close_count, 1);
        assert_eq!(upstream.join().unwrap(), b"abcdef");
    }

    #[test]
    fn forward_websocket() {
        let (port, upstream) = upper_upstream();
        let key = mask::new_rand_key();
        let mut conn = ScriptedConnection::new([
            Some(REQUEST.to_vec()),
            Some(frame::wrap_masked(OpCode::Text, key, b"hello")),
            Some(frame::wrap_masked(OpCode::Binary, key, b"bin")),
        ]);

        let mut handler = ForwardHandler::new(config(port));
        assert_eq!(handler.handle(&mut conn).unwrap(), Exit::Eof);

        let mut expected = Endpoint::new(Dialect::Legacy, "relayws websocket")
            .create_websocket_response(REQUEST);
        expected.extend_from_slice(&[0x01, 0x05]);
        expected.extend_from_slice(b"HELLO");
        expected.extend_from_slice(&[0x02, 0x03]);
        expected.extend_from_slice(b"BIN");
        assert_eq!(conn.written, expected);

        // the handshake stays local
        assert_eq!(upstream.join().unwrap(), b"hellobin");
    }

    #[test]
    fn forward_websocket_strict() {
        let (port, upstream) = upper_upstream();
        let mut conn = ScriptedConnection::new([
            Some(REQUEST.to_vec()),
            Some(frame::wrap_masked(OpCode::Text, [1, 2, 3, 4], b"hello")),
        ]);

        let mut handler = ForwardHandler::new(config(port).with_dialect(Dialect::Rfc6455));
        handler.handle(&mut conn).unwrap();

        assert!(conn.written.ends_with(&[0x81, 0x05, b'H', b'E', b'L', b'L', b'O']));
        assert_eq!(upstream.join().unwrap(), b"hello");
    }

    #[test]
    fn forward_bad_request() {
        let (port, upstream) = upper_upstream();
        let mut conn = ScriptedConnection::new([
            Some(b"hello".to_vec()),
            Some(b"GET /ws HTTP/1.1\r\nHost: a\r\n\r\n".to_vec()),
            // session is still closed
            Some(frame::wrap_masked(OpCode::Text, [1, 2, 3, 4], b"hello")),
        ]);

        let mut handler = ForwardHandler::new(config(port));
        handler.handle(&mut conn).unwrap();

        assert_eq!(conn.written, b"HTTP/1.1 400 Bad RequestHTTP/1.1 400 Bad RequestHTTP/1.1 400 Bad Request");
        assert!(upstream.join().unwrap().is_empty());
    }

    #[test]
    fn forward_close_frame() {
        let (port, upstream) = upper_upstream();
        let mut conn = ScriptedConnection::new([
            Some(REQUEST.to_vec()),
            Some(frame::wrap_masked(OpCode::Ping, [1, 2, 3, 4], b"")),
            Some(frame::wrap_masked(OpCode::Close, [1, 2, 3, 4], b"")),
            Some(frame::wrap_masked(OpCode::Text, [1, 2, 3, 4], b"late")),
        ]);

        let mut handler = ForwardHandler::new(config(port));
        assert_eq!(handler.handle(&mut conn).unwrap(), Exit::Closed);
        assert_eq!(conn.read_count, 3);
        assert!(upstream.join().unwrap().is_empty());
    }

    #[test]
    fn forward_timeout() {
        let (port, upstream) = upper_upstream();
        let mut conn = ScriptedConnection::new(std::iter::repeat(None).take(100));

        let mut handler = ForwardHandler::new(config(port));
        assert_eq!(handler.handle(&mut conn).unwrap(), Exit::Timeout);
        assert_eq!(conn.close_count, 1);
        assert!(upstream.join().unwrap().is_empty());
    }

    #[test]
    fn forward_unreachable() {
        let port = {
            let lis = TcpListener::bind("127.0.0.1:0").unwrap();
            lis.local_addr().unwrap().port()
        };
        let mut conn = ScriptedConnection::new([Some(b"abc".to_vec())]);

        let mut handler = ForwardHandler::new(config(port));
        assert!(matches!(handler.handle(&mut conn), Err(Error::Io(_))));
        assert_eq!(conn.close_count, 1);
        assert!(conn.written.is_empty());
    }

    #[test]
    fn forward_unreachable_close_fails() {
        let port = {
            let lis = TcpListener::bind("127.0.0.1:0").unwrap();
            lis.local_addr().unwrap().port()
        };
        let mut conn = ScriptedConnection::new([Some(b"abc".to_vec())]);
        conn.fail_close = true;

        // the connect error is reported, not the close error
        let mut handler = ForwardHandler::new(config(port));
        match handler.handle(&mut conn) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionRefused),
            x => panic!("unexpected {:?}", x),
        }
        assert_eq!(conn.close_count, 1);
    }

    #[test]
    fn forward_upstream_gone() {
        let lis = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = lis.local_addr().unwrap().port();
        let t = thread::spawn(move || {
            let (tcp, _) = lis.accept().unwrap();
            drop(tcp);
        });

        let mut conn = ScriptedConnection::new([Some(b"abc".to_vec()), Some(b"def".to_vec())]);
        let mut handler = ForwardHandler::new(config(port).with_websocket(false));

        assert_eq!(handler.handle(&mut conn).unwrap(), Exit::Closed);
        assert_eq!(conn.read_count, 1);
        assert!(conn.written.is_empty());
        t.join().unwrap();
    }
}
