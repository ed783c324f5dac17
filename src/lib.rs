//! Tcp relay with transparent websocket termination.
//!
//! ## Modes
//! - Bounce: every received chunk is written back unchanged.
//! - Forward: every received chunk is relayed to an upstream, and the
//!   upstream's answer is written back.
//!
//! In forward mode a websocket upgrade request is answered by the relay
//! itself. Afterwards each inbound frame is unwrapped, only its payload goes
//! upstream, and the answer is wrapped into a frame of the same kind.
//!
//! ## High-level API
//!
//! - [`server`]
//! - [`handler`]
//! - [`client`]
//!
//! ```ignore
//! {
//!     // echo server
//!     let bounce = Server::bind("127.0.0.1:19382")?;
//!     bounce.start_bounce()?;
//!
//!     // relay to the echo server, in another process
//!     let forward = Server::bind("127.0.0.1:19381")?;
//!     forward.start_forward("127.0.0.1", 19382)?;
//! }
//! ```
//!
//! ## Low-level API
//!
//! - [`endpoint`]
//! - [`frame`]
//! - [`handshake`]
//!
//! ```ignore
//! {
//!     let mut ws = Endpoint::new(Dialect::Legacy, "relay");
//!     let response = ws.create_websocket_response(&request);
//!     let payload = ws.unwrap(&frame)?;
//!     let frame = ws.wrap(payload.binary, &payload.content);
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod content;
pub mod dialect;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod handler;
pub mod handshake;
pub mod server;

pub use client::Upstream;
pub use config::{BounceConfig, ForwardConfig, HandlerConfig, IdleTimeout, IoMode, ServerConfig};
pub use dialect::Dialect;
pub use endpoint::Endpoint;
pub use error::Error;
pub use server::Server;
