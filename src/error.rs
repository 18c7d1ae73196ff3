//! Error types for buffering and record processing.
//!
//! This module provides [`BufferError`] for slot store and configuration
//! failures, [`PullError`] for what a consumer sees from
//! [`PullAdapter::next`](crate::adapter::PullAdapter::next), and
//! [`ProcessError`] for the record processing loop, plus the [`Result`]
//! convenience type.

use thiserror::Error;

/// Error type for the event buffer and its configuration.
#[derive(Error, Debug)]
pub enum BufferError {
    /// A write reached a full buffer while no reader was waiting.
    ///
    /// Under working flow control this never happens; it means the upstream
    /// source kept emitting after it was paused.
    #[error("Buffer overflow: all {capacity} slots are occupied")]
    Overflow {
        /// Capacity of the buffer that overflowed
        capacity: usize,
    },

    /// A read was issued while another read was still waiting for an event.
    #[error("Re-entrant read: another read is already waiting for an event")]
    ReentrantRead,

    /// Error indicating capacity or watermarks out of range.
    #[error("Invalid buffer configuration: {0}")]
    InvalidConfig(String),

    /// IO error while loading a configuration file.
    #[error("IO error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Malformed configuration JSON.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Error returned to a consumer pulling events.
#[derive(Error, Debug)]
pub enum PullError<E> {
    /// The upstream source reported an error event.
    ///
    /// Delivered exactly once; the adapter is closed afterwards.
    #[error("Upstream error: {0}")]
    Upstream(E),

    /// The buffer rejected the read.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

impl<E> PullError<E> {
    /// Returns the upstream error, if this is one.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            PullError::Upstream(e) => Some(e),
            PullError::Buffer(_) => None,
        }
    }
}

/// Error from [`process_records`](crate::process::process_records).
#[derive(Error, Debug)]
pub enum ProcessError<E> {
    /// Pulling the next record failed.
    #[error("Read error: {0}")]
    Read(PullError<E>),

    /// The record writer failed.
    #[error("Write error: {0}")]
    Write(std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`BufferError`].
pub type Result<T> = std::result::Result<T, BufferError>;
