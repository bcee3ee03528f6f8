//! Dispatcher runtime configuration.

/// Timing for the dispatch loop.
///
/// [`DispatchConfig::default()`] polls at 1 kHz, fast enough that a host
/// polling the control cell over a serial link never waits on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchConfig {
    /// How often the register file is polled, in Hz. Default: 1000.
    pub poll_frequency_hz: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_frequency_hz: 1000,
        }
    }
}

impl DispatchConfig {
    /// Delay between two polls in microseconds.
    ///
    /// A frequency of `0` is treated as 1 Hz.
    pub fn poll_period_us(&self) -> u64 {
        1_000_000 / self.poll_frequency_hz.max(1) as u64
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
