/// Construction parameters for an [`Integrator`](crate::Integrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntegratorConfig {
    /// Window length after which the auto-reset accumulator is published and cleared.
    pub auto_reset_interval_us: u64,
    pub coning_compensation: bool,
}

impl IntegratorConfig {
    /// 250 Hz publication cadence.
    pub const DEFAULT_AUTO_RESET_INTERVAL_US: u64 = 4000;

    pub fn new(auto_reset_interval_us: u64, coning_compensation: bool) -> Self {
        Self {
            auto_reset_interval_us,
            coning_compensation,
        }
    }

    /// Interval rounded down to whole microseconds. A rate of zero yields
    /// the default interval.
    pub fn from_rate_hz(rate_hz: u32, coning_compensation: bool) -> Self {
        let auto_reset_interval_us = if rate_hz == 0 {
            Self::DEFAULT_AUTO_RESET_INTERVAL_US
        } else {
            1_000_000 / rate_hz as u64
        };
        Self::new(auto_reset_interval_us, coning_compensation)
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_AUTO_RESET_INTERVAL_US, false)
    }
}
