//! Connection handlers.
//!
//! A handler owns one accepted connection for its whole lifetime. Both
//! handlers share the same read loop, [`Session::drive`]:
//!
//! - data: handed to the handler, the answer is written back.
//! - empty read: counts against the idle budget, then waits one poll interval.
//! - EOF: the loop ends.
//!
//! The connection is closed on every exit path.

pub mod bounce;
pub mod forward;

pub use bounce::BounceHandler;
pub use forward::ForwardHandler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::config::{IdleTimeout, INBOUND_BUFFER_CAP};
use crate::connection::{Connection, ReadOutcome};
use crate::content::Content;
use crate::error::Error;

/// Handles one connection.
pub trait Handler {
    /// Run the read loop until it ends, then close the connection.
    fn handle<C: Connection>(&mut self, conn: &mut C) -> Result<Exit, Error>;

    /// Handle to end the read loop from elsewhere.
    fn stop_handle(&self) -> StopHandle;

    /// End the read loop after the current read returns.
    fn stop(&self) { self.stop_handle().stop() }
}

/// What the handler wants after processing a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Why a read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Peer closed the connection.
    Eof,
    /// Idle budget exhausted.
    Timeout,
    /// Stopped through a [`StopHandle`].
    Stopped,
    /// Handler asked to close.
    Closed,
}

/// Shared run flag of a read loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    #[inline]
    pub fn stop(&self) { self.0.store(true, Ordering::Release) }

    #[inline]
    pub fn is_stopped(&self) -> bool { self.0.load(Ordering::Acquire) }

    #[inline]
    fn reset(&self) { self.0.store(false, Ordering::Release) }
}

/// Empty reads left before the loop gives up.
/// Received data does not restore the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleCounter {
    remaining: Option<u64>,
}

impl IdleCounter {
    pub fn new(timeout: IdleTimeout, interval: Duration) -> Self {
        Self {
            remaining: timeout.budget(interval),
        }
    }

    /// Count one empty read, returns true if no retry is left.
    /// A budget of `n` allows `n` retries, the read after them gives up.
    /// Never exhausted in daemon mode.
    pub fn tick(&mut self) -> bool {
        match &mut self.remaining {
            None => false,
            Some(0) => true,
            Some(n) => {
                *n -= 1;
                false
            }
        }
    }

    #[inline]
    pub fn remaining(&self) -> Option<u64> { self.remaining }
}

/// Per-connection read loop state.
#[derive(Debug)]
pub struct Session {
    run: StopHandle,
    timeout: IdleTimeout,
    idle: IdleCounter,
    poll_interval: Duration,
    buf: Vec<u8>,
}

impl Session {
    pub fn new(timeout: IdleTimeout, poll_interval: Duration) -> Self {
        Self {
            run: StopHandle::default(),
            timeout,
            idle: IdleCounter::new(timeout, poll_interval),
            poll_interval,
            buf: vec![0u8; INBOUND_BUFFER_CAP],
        }
    }

    #[inline]
    pub fn stop_handle(&self) -> StopHandle { self.run.clone() }

    /// Read from `conn` until EOF, idle timeout, stop, or until `on_data`
    /// returns [`Flow::Close`]. Each chunk is passed to `on_data` with the
    /// connection to answer on.
    pub fn drive<C, F>(&mut self, conn: &mut C, mut on_data: F) -> Result<Exit, Error>
    where
        C: Connection,
        F: FnMut(&mut C, &[u8]) -> Result<Flow, Error>,
    {
        self.run.reset();
        self.idle = IdleCounter::new(self.timeout, self.poll_interval);
        debug!("wait for input data (blocking={})..", conn.is_blocking());

        loop {
            if self.run.is_stopped() {
                debug!("session stopped");
                return Ok(Exit::Stopped);
            }

            match conn.read_chunk(&mut self.buf)? {
                ReadOutcome::Eof => {
                    trace!("received EOF");
                    return Ok(Exit::Eof);
                }
                ReadOutcome::Empty => {
                    if self.idle.tick() {
                        debug!("idle timeout reached");
                        return Ok(Exit::Timeout);
                    }
                    trace!(
                        "waiting for data (daemon={}, counter={:?})..",
                        self.timeout.is_daemon(),
                        self.idle.remaining()
                    );
                    conn.idle(self.poll_interval);
                }
                ReadOutcome::Data(n) => {
                    let chunk = &self.buf[..n];
                    trace!("received {} bytes: '{}'", n, Content::new(chunk));

                    let flow = on_data(conn, chunk)?;
                    self.buf[..n].fill(0);

                    if flow == Flow::Close {
                        return Ok(Exit::Closed);
                    }
                }
            }
        }
    }
}
