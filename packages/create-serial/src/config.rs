//! Link configuration.

use std::time::Duration;

/// Baud rate of the Create 2 and Roomba 500/600 series.
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Baud rate of the first-generation Create.
pub const CREATE_1_BAUD_RATE: u32 = 57600;

/// Tunables for a [`Link`](crate::Link).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Serial baud rate. Only used when opening a serial port.
    pub baud_rate: u32,

    /// How long to wait after a mode change before sending anything else.
    pub settle_time: Duration,

    /// How long a sensor query, or the rest of a stream frame once its
    /// header was seen, may take to arrive.
    pub query_timeout: Duration,

    /// Number of decoded stream frames buffered for the consumer before new
    /// frames are dropped.
    pub stream_capacity: usize,

    /// Read timeout handed to the serial port driver.
    pub read_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            settle_time: Duration::from_secs(1),
            query_timeout: Duration::from_secs(1),
            stream_capacity: 64,
            read_timeout: Duration::from_secs(30),
        }
    }
}

impl LinkConfig {
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_settle_time(mut self, settle_time: Duration) -> Self {
        self.settle_time = settle_time;
        self
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Capacity is clamped to at least one frame.
    pub fn with_stream_capacity(mut self, stream_capacity: usize) -> Self {
        self.stream_capacity = stream_capacity.max(1);
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.settle_time, Duration::from_secs(1));
        assert_eq!(config.query_timeout, Duration::from_secs(1));
        assert_eq!(config.stream_capacity, 64);
    }

    #[test]
    fn builders() {
        let config = LinkConfig::default()
            .with_baud_rate(CREATE_1_BAUD_RATE)
            .with_settle_time(Duration::from_millis(20))
            .with_stream_capacity(0);

        assert_eq!(config.baud_rate, 57600);
        assert_eq!(config.settle_time, Duration::from_millis(20));
        assert_eq!(config.stream_capacity, 1);
    }
}
