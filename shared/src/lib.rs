//! Shared types for the restaurant admin sync client
//!
//! Domain models, socket frames and REST response decoding used by
//! `admin-client` and by anything that talks to the same backend.

pub mod message;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Socket re-exports (for convenient access)
pub use message::{SocketEvent, SocketMessage};

// Response decoding re-exports
pub use response::ListOutcome;
