//! Two-watermark flow control for the upstream source.
//!
//! After every buffer mutation the [`FlowController`] looks at occupancy:
//!
//! - `free <= high_tide` while flowing: pause the source
//! - `fill < low_tide` while paused: resume the source
//!
//! The gap between the two tides keeps the source from toggling on every
//! event when data arrives and drains at about the same rate.
//!
//! An empty buffer is never paused, and always resumes a paused source, even
//! with `high_tide == capacity` or `low_tide == 0`. Otherwise a consumer
//! waiting on an empty buffer and a paused source would wait on each other
//! forever.

use crate::config::BufferConfig;
use crate::source::UpstreamSource;

/// Decision produced by [`FlowController::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    /// Ask the source to stop emitting
    Pause,
    /// Ask the source to emit again
    Resume,
}

/// Pause/resume decisions from buffer occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowController {
    capacity: usize,
    low_tide: usize,
    high_tide: usize,
}

impl FlowController {
    /// Create a controller for a validated configuration.
    #[must_use]
    pub fn new(config: &BufferConfig) -> Self {
        FlowController {
            capacity: config.capacity,
            low_tide: config.low_tide,
            high_tide: config.high_tide,
        }
    }

    /// Decide what to do at occupancy `fill` given the source's pause state.
    ///
    /// Returns `None` when no call to the source is needed. A pause is never
    /// requested from a paused source, nor a resume from a flowing one.
    #[must_use]
    pub fn evaluate(&self, fill: usize, paused: bool) -> Option<FlowAction> {
        let free = self.capacity.saturating_sub(fill);
        if !paused && fill > 0 && free <= self.high_tide {
            Some(FlowAction::Pause)
        } else if paused && fill < self.low_tide.max(1) {
            Some(FlowAction::Resume)
        } else {
            None
        }
    }

    /// Evaluate against `source` and issue the resulting call.
    pub fn apply(&self, fill: usize, source: &dyn UpstreamSource) -> Option<FlowAction> {
        let action = self.evaluate(fill, source.is_paused());
        match action {
            Some(FlowAction::Pause) => {
                tracing::debug!(fill, capacity = self.capacity, "high tide reached, pausing source");
                source.pause();
            },
            Some(FlowAction::Resume) => {
                tracing::debug!(fill, low_tide = self.low_tide, "low tide reached, resuming source");
                source.resume();
            },
            None => {},
        }
        action
    }
}
