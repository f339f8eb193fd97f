//! Failure conditions the engine itself can signal through an observer's
//! `error` channel.
//!
//! Anything implementing [`std::error::Error`] travels through a pipeline
//! wrapped in an `Arc`; this module only covers the conditions the engine
//! raises on its own behalf.

use thiserror::Error;

/// Errors originating inside the engine's sources and adapters.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A generator condition or projection reported a failure while
    /// producing the sequence.
    #[error("sequence generator failed: {0}")]
    Generator(String),

    /// A subscription was attempted on an event relay that has been closed.
    #[error("event relay is closed")]
    RelayClosed,
}
