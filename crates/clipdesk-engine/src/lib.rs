//! Request/response side of the rendering engine.
//!
//! [`build_request`] turns edited job parameters into the engine's job
//! payload, validating them before anything touches the network.
//! [`EngineClient`] speaks the engine's HTTP API; the session talks to it
//! through the [`EngineApi`] trait so tests can swap in a fake.

pub mod client;
pub mod error;
pub mod request;
pub mod types;

pub use client::{EngineApi, EngineClient, EngineClientConfig};
pub use error::{EngineError, EngineResult};
pub use request::{build_request, resolve_resolution, ValidationError};
pub use types::{HealthResponse, MetadataResponse, StatusResponse};
