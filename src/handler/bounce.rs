//! Bounce handler, writes every received chunk back unchanged.

use std::io::Write;

use log::{info, trace, warn};

use super::{Exit, Flow, Handler, Session, StopHandle};
use crate::config::BounceConfig;
use crate::connection::Connection;
use crate::error::Error;

/// Echo handler.
#[derive(Debug)]
pub struct BounceHandler {
    session: Session,
}

impl BounceHandler {
    pub fn new(config: &BounceConfig) -> Self {
        Self {
            session: Session::new(config.idle_timeout, config.poll_interval),
        }
    }
}

impl Default for BounceHandler {
    fn default() -> Self { Self::new(&BounceConfig::default()) }
}

impl Handler for BounceHandler {
    fn handle<C: Connection>(&mut self, conn: &mut C) -> Result<Exit, Error> {
        info!("connection accepted from {:?}", conn.peer_addr().ok());

        let exit = self.session.drive(conn, |conn, chunk| {
            conn.write_all(chunk)?;
            conn.flush()?;
            trace!("bounced {} bytes", chunk.len());
            Ok(Flow::Continue)
        });

        info!("close connection for bounce handler");
        if let Err(e) = conn.close() {
            warn!("failed to close connection: {}", e);
        }

        exit
    }

    fn stop_handle(&self) -> StopHandle { self.session.stop_handle() }
}
