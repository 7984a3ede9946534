//! Job session: the orchestrator between the user, the engine's
//! request/response API and its real-time event stream.
//!
//! - [`ProgressAggregator`] folds progress-shaped events into one display value.
//! - [`reduce`] is the pure job lifecycle reducer.
//! - [`Session`] applies events to the job state plus clips, progress and log.
//! - [`SessionRunner`] owns a session and the connection manager and drives
//!   both from one event loop; callers use a [`SessionHandle`].

pub mod aggregator;
pub mod config;
pub mod error;
pub mod log;
pub mod metrics;
pub mod reducer;
pub mod runner;
pub mod session;

pub use aggregator::{ProgressAggregator, ProgressView};
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use log::OperatorLog;
pub use reducer::{reduce, Ack, SessionEvent};
pub use runner::{spawn_session, SessionHandle, SessionRunner};
pub use session::{Session, SessionSnapshot};
