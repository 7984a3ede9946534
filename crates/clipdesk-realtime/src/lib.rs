//! Real-time channel to the rendering engine.
//!
//! [`ConnectionManager`] owns the one live WebSocket, decodes inbound frames
//! into [`clipdesk_models::EngineEvent`]s, and reconnects after a fixed delay
//! whenever the channel drops. Everything it observes reaches the caller
//! through a single dispatch callback as an [`Inbound`] value.

pub mod config;
pub mod error;
pub mod manager;
pub mod metrics;

pub use config::ConnectionConfig;
pub use error::{ChannelError, ChannelResult};
pub use manager::{ConnectionManager, Dispatch, Inbound};
