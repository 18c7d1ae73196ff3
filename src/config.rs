//! Buffer sizing and watermark configuration.
//!
//! [`BufferConfig`] fixes the capacity of the slot store and the two tides
//! that drive pause/resume decisions for the upstream source.
//!
//! # Examples
//!
//! ```
//! use fix880::BufferConfig;
//!
//! // Defaults: 10 slots, resume below 3 buffered, pause at 3 free slots
//! let config = BufferConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let config = BufferConfig::default()
//!     .with_capacity(5)
//!     .with_watermarks(2, 1);
//! assert_eq!(config.capacity, 5);
//! ```

use crate::error::{BufferError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capacity and watermarks for a [`PullAdapter`](crate::adapter::PullAdapter).
///
/// - `capacity` must be at least 1
/// - `low_tide` must be below `capacity`
/// - `high_tide` must not exceed `capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of slots in the ring buffer
    pub capacity: usize,
    /// Resume the upstream source once fewer than this many events are buffered
    pub low_tide: usize,
    /// Pause the upstream source once this many or fewer slots are free
    pub high_tide: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            low_tide: 3,
            high_tide: 3,
        }
    }
}

impl BufferConfig {
    /// Create a configuration, checking the ranges.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::InvalidConfig` if any value is out of range.
    pub fn new(capacity: usize, low_tide: usize, high_tide: usize) -> Result<Self> {
        let config = Self {
            capacity,
            low_tide,
            high_tide,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set both watermarks.
    #[must_use]
    pub fn with_watermarks(mut self, low_tide: usize, high_tide: usize) -> Self {
        self.low_tide = low_tide;
        self.high_tide = high_tide;
        self
    }

    /// Check capacity and watermark ranges.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::InvalidConfig` describing the first violated range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BufferError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.low_tide >= self.capacity {
            return Err(BufferError::InvalidConfig(format!(
                "low_tide {} must be below capacity {}",
                self.low_tide, self.capacity
            )));
        }
        if self.high_tide > self.capacity {
            return Err(BufferError::InvalidConfig(format!(
                "high_tide {} must not exceed capacity {}",
                self.high_tide, self.capacity
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::ConfigParse` for malformed JSON and
    /// `BufferError::InvalidConfig` for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `BufferError::ConfigIo` if the file cannot be read, otherwise
    /// the same errors as [`BufferConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BufferConfig::default();
        assert_eq!(config.capacity, 10);
        assert_eq!(config.low_tide, 3);
        assert_eq!(config.high_tide, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_new_valid() {
        let config = BufferConfig::new(5, 2, 1).unwrap();
        assert_eq!(config, BufferConfig::default().with_capacity(5).with_watermarks(2, 1));

        // Boundary values are accepted
        assert!(BufferConfig::new(1, 0, 0).is_ok());
        assert!(BufferConfig::new(1, 0, 1).is_ok());
        assert!(BufferConfig::new(4, 3, 4).is_ok());
    }

    #[test]
    fn test_config_zero_capacity() {
        let err = BufferConfig::new(0, 0, 0).unwrap_err();
        assert!(matches!(err, BufferError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_low_tide_out_of_range() {
        assert!(BufferConfig::new(5, 5, 1).is_err());
        assert!(BufferConfig::new(5, 9, 1).is_err());
    }

    #[test]
    fn test_config_high_tide_out_of_range() {
        let err = BufferConfig::new(5, 2, 6).unwrap_err();
        assert_eq!(
            format!("{err}"),
            "Invalid buffer configuration: high_tide 6 must not exceed capacity 5"
        );
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = BufferConfig::from_json_str(r#"{"capacity": 50}"#).unwrap();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.low_tide, 3);
        assert_eq!(config.high_tide, 3);
    }

    #[test]
    fn test_config_from_json_invalid() {
        assert!(matches!(
            BufferConfig::from_json_str(r#"{"capacity": 2, "low_tide": 2}"#),
            Err(BufferError::InvalidConfig(_))
        ));
        assert!(matches!(
            BufferConfig::from_json_str("{capacity"),
            Err(BufferError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_config_from_missing_file() {
        assert!(matches!(
            BufferConfig::from_json_file("/nonexistent/buffer.json"),
            Err(BufferError::ConfigIo(_))
        ));
    }
}
