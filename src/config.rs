//! Relay configuration.

use std::time::Duration;

use crate::dialect::Dialect;

/// Wait between two empty reads of an inbound connection.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Wait before retrying a write a non-blocking socket refused.
pub const WRITE_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Wait before the single re-read of an upstream response.
pub const UPSTREAM_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound of a blocking upstream read.
pub const UPSTREAM_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// 1024
pub const INBOUND_BUFFER_CAP: usize = 1024;

/// 64KiB
pub const UPSTREAM_BUFFER_CAP: usize = 64 * 1024;

/// 10
pub const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 10;

/// Value of the `Server` header in upgrade responses.
pub const DEFAULT_SERVER_NAME: &str = "relayws websocket";

/// How long a connection may stay without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleTimeout {
    /// Never expire.
    Daemon,

    /// Expire after the given time of empty reads.
    After(Duration),
}

impl IdleTimeout {
    /// Negative seconds select daemon mode.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            IdleTimeout::Daemon
        } else {
            IdleTimeout::After(Duration::from_secs(secs as u64))
        }
    }

    #[inline]
    pub const fn is_daemon(&self) -> bool { matches!(self, IdleTimeout::Daemon) }

    /// Number of empty reads allowed, polling every `interval`.
    /// `None` in daemon mode.
    pub fn budget(&self, interval: Duration) -> Option<u64> {
        match self {
            IdleTimeout::Daemon => None,
            IdleTimeout::After(d) => {
                let interval = interval.as_millis().max(1);
                Some((d.as_millis() / interval) as u64)
            }
        }
    }
}

impl Default for IdleTimeout {
    fn default() -> Self { IdleTimeout::from_secs(DEFAULT_IDLE_TIMEOUT_SECS) }
}

/// Blocking or non-blocking socket io.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoMode {
    /// Reads wait for data, up to a deadline.
    #[default]
    Blocking,

    /// Reads return at once, empty if there is no data.
    NonBlocking,
}

/// Bounce handler options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BounceConfig {
    pub idle_timeout: IdleTimeout,
    pub poll_interval: Duration,
    pub io_mode: IoMode,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            idle_timeout: IdleTimeout::default(),
            poll_interval: POLL_INTERVAL,
            io_mode: IoMode::default(),
        }
    }
}

impl BounceConfig {
    #[inline]
    pub fn with_idle_timeout(mut self, idle_timeout: IdleTimeout) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    #[inline]
    pub fn with_io_mode(mut self, io_mode: IoMode) -> Self {
        self.io_mode = io_mode;
        self
    }
}

/// Forward handler options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardConfig {
    pub upstream_host: String,
    pub upstream_port: u16,
    pub websocket: bool,
    pub dialect: Dialect,
    pub server_name: String,
    pub idle_timeout: IdleTimeout,
    pub poll_interval: Duration,
    pub io_mode: IoMode,
    pub upstream_io_mode: IoMode,
    pub upstream_read_timeout: Option<Duration>,
}

impl ForwardConfig {
    /// Websocket enabled, no idle timeout.
    pub fn new(upstream_host: impl Into<String>, upstream_port: u16) -> Self {
        Self {
            upstream_host: upstream_host.into(),
            upstream_port,
            websocket: true,
            dialect: Dialect::default(),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            idle_timeout: IdleTimeout::Daemon,
            poll_interval: POLL_INTERVAL,
            io_mode: IoMode::default(),
            upstream_io_mode: IoMode::default(),
            upstream_read_timeout: Some(UPSTREAM_READ_TIMEOUT),
        }
    }

    #[inline]
    pub fn with_websocket(mut self, websocket: bool) -> Self {
        self.websocket = websocket;
        self
    }

    #[inline]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[inline]
    pub fn with_idle_timeout(mut self, idle_timeout: IdleTimeout) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    #[inline]
    pub fn with_io_mode(mut self, io_mode: IoMode) -> Self {
        self.io_mode = io_mode;
        self
    }

    #[inline]
    pub fn with_upstream_io_mode(mut self, io_mode: IoMode) -> Self {
        self.upstream_io_mode = io_mode;
        self
    }

    /// `host:port` of the upstream.
    #[inline]
    pub fn upstream(&self) -> String { format!("{}:{}", self.upstream_host, self.upstream_port) }
}

/// What to do with an accepted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerConfig {
    Bounce(BounceConfig),
    Forward(ForwardConfig),
}

impl HandlerConfig {
    /// Io mode of accepted connections.
    #[inline]
    pub fn io_mode(&self) -> IoMode {
        match self {
            HandlerConfig::Bounce(c) => c.io_mode,
            HandlerConfig::Forward(c) => c.io_mode,
        }
    }

    /// Poll interval of accepted connections.
    #[inline]
    pub fn poll_interval(&self) -> std::time::Duration {
        match self {
            HandlerConfig::Bounce(c) => c.poll_interval,
            HandlerConfig::Forward(c) => c.poll_interval,
        }
    }
}

/// Listening address plus handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub handler: HandlerConfig,
}

impl ServerConfig {
    /// Bounce server on `host:port`.
    pub fn bounce(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            handler: HandlerConfig::Bounce(BounceConfig::default()),
        }
    }

    /// Forward server on `host:port`, relaying to `upstream_host:upstream_port`.
    pub fn forward(
        host: impl Into<String>,
        port: u16,
        upstream_host: impl Into<String>,
        upstream_port: u16,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            handler: HandlerConfig::Forward(ForwardConfig::new(upstream_host, upstream_port)),
        }
    }

    /// `host:port` to bind.
    #[inline]
    pub fn addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}
