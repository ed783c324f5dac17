//! Listening side.
//!
//! The accept loop runs on the calling thread. Every accepted connection
//! is served by a new handler on its own thread, a failing handler only
//! ends its own connection.
//!
//! ```ignore
//! {
//!     let server = Server::bind("127.0.0.1:19381")?;
//!     // blocks until stopped
//!     server.start_forward("127.0.0.1", 19382)?;
//! }
//! ```

use std::io::Result;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::{BounceConfig, ForwardConfig, HandlerConfig, ServerConfig, POLL_INTERVAL};
use crate::connection::TcpConnection;
use crate::handler::{BounceHandler, ForwardHandler, Handler};

/// Tcp relay server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    running: AtomicBool,
}

impl Server {
    /// Bind the listening socket.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!("listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            running: AtomicBool::new(true),
        })
    }

    /// Bind to the configured address.
    #[inline]
    pub fn from_config(config: &ServerConfig) -> Result<Self> { Self::bind(config.addr()) }

    #[inline]
    pub fn local_addr(&self) -> Result<SocketAddr> { self.listener.local_addr() }

    #[inline]
    pub fn is_running(&self) -> bool { self.running.load(Ordering::Acquire) }

    /// Echo every connection, with the default idle timeout.
    pub fn start_bounce(&self) -> Result<()> {
        self.start(HandlerConfig::Bounce(BounceConfig::default()))
    }

    /// Relay every connection to `host:port`, with websocket support
    /// and without idle timeout.
    pub fn start_forward(&self, host: &str, port: u16) -> Result<()> {
        self.start(HandlerConfig::Forward(ForwardConfig::new(host, port)))
    }

    /// Run the accept loop until [`stop`](Self::stop) is observed.
    pub fn start(&self, config: HandlerConfig) -> Result<()> {
        let port = self.local_addr()?.port();

        while self.is_running() {
            info!("waiting for connection on port {} ({:?})", port, kind(&config));

            let (stream, peer) = match accepted(self.listener.accept(), POLL_INTERVAL) {
                Some(x) => x,
                None => continue,
            };

            if !self.is_running() {
                debug!("server stopped, drop connection from {}", peer);
                break;
            }

            let config = config.clone();
            let spawned = thread::Builder::new()
                .name(format!("relay-{}", peer))
                .spawn(move || {
                    info!("connection accepted on port {} from {}", port, peer);
                    dispatch(stream, config);
                });

            if let Err(e) = spawned {
                error!("failed to spawn handler for {}: {}", peer, e);
            }
        }

        info!("server on port {} stopped", port);
        Ok(())
    }

    /// Stop accepting. A pending accept has to return first.
    pub fn stop(&self) { self.running.store(false, Ordering::Release); }
}

/// Unwrap an accept result. Errors are logged, then the caller waits
/// `backoff` so a persistent failure does not spin.
fn accepted<T>(ret: Result<T>, backoff: Duration) -> Option<T> {
    match ret {
        Ok(x) => Some(x),
        Err(e) => {
            warn!("failed to accept connection: {}, retry in {:?}", e, backoff);
            thread::sleep(backoff);
            None
        }
    }
}

fn kind(config: &HandlerConfig) -> &'static str {
    match config {
        HandlerConfig::Bounce(_) => "bounce",
        HandlerConfig::Forward(_) => "forward",
    }
}

/// Serve one connection with a fresh handler.
fn dispatch(stream: TcpStream, config: HandlerConfig) {
    let mut conn = match TcpConnection::new(stream, config.io_mode(), config.poll_interval()) {
        Ok(conn) => conn,
        Err(e) => {
            error!("failed to set up connection: {}", e);
            return;
        }
    };

    let ret = match config {
        HandlerConfig::Bounce(c) => BounceHandler::new(&c).handle(&mut conn),
        HandlerConfig::Forward(c) => ForwardHandler::new(c).handle(&mut conn),
    };

    match ret {
        Ok(exit) => debug!("handler finished: {:?}", exit),
        Err(e) => error!("handler failed: {}", e),
    }
}
