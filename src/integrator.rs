use nalgebra::Vector3;

use crate::{Clock, IntegratorConfig};

pub type ResetCallback = fn(&IntegralDelta);

/// Published when the auto-reset window closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegralDelta {
    pub timestamp: u64, // us
    /// Integral accumulated since the previous auto-reset.
    pub integral: Vector3<f32>,
    pub dt: u64, // us
}

#[cfg(feature = "defmt")]
impl defmt::Format for IntegralDelta {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "IntegralDelta {{ timestamp: {}, integral: {} {} {}, dt: {} }}",
            self.timestamp,
            self.integral.x,
            self.integral.y,
            self.integral.z,
            self.dt,
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Uninitialized,
    Running {
        last_integration: u64,
        last_val: Vector3<f32>,
    },
}

/// Trapezoidal integrator with two independently resettable accumulators.
///
/// `integral_auto` is published and cleared every time more than
/// `auto_reset_interval` microseconds pass since the last publication.
/// `integral_read` accumulates the same increments but is only cleared by
/// [`Integrator::read`].
///
/// Timestamps must be monotonically non-decreasing. This is not checked: a
/// timestamp going backwards integrates with a negative `dt` and never
/// closes the auto-reset window.
pub struct Integrator<F = ResetCallback> {
    auto_reset_interval: u64,
    coning_compensation: bool,
    state: State,
    last_auto: u64,
    integral_auto: Vector3<f32>,
    integral_read: Vector3<f32>,
    last_delta: Vector3<f32>,
    auto_callback: Option<F>,
}

impl Integrator {
    pub fn new(auto_reset_interval: u64, coning_compensation: bool) -> Self {
        Self::with_optional_callback(auto_reset_interval, coning_compensation, None)
    }

    pub fn from_config(config: IntegratorConfig) -> Self {
        Self::new(config.auto_reset_interval_us, config.coning_compensation)
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::from_config(IntegratorConfig::default())
    }
}

impl<F: FnMut(&IntegralDelta)> Integrator<F> {
    /// `callback` runs inside [`Integrator::put`] at every auto-reset, before
    /// the accumulator is cleared.
    pub fn with_callback(auto_reset_interval: u64, coning_compensation: bool, callback: F) -> Self {
        Self::with_optional_callback(auto_reset_interval, coning_compensation, Some(callback))
    }

    fn with_optional_callback(
        auto_reset_interval: u64,
        coning_compensation: bool,
        auto_callback: Option<F>,
    ) -> Self {
        Self {
            auto_reset_interval,
            coning_compensation,
            state: State::Uninitialized,
            last_auto: 0,
            integral_auto: Vector3::zeros(),
            integral_read: Vector3::zeros(),
            last_delta: Vector3::zeros(),
            auto_callback,
        }
    }

    pub fn set_callback(&mut self, callback: F) {
        self.auto_callback = Some(callback);
    }

    pub fn clear_callback(&mut self) {
        self.auto_callback = None;
    }

    /// Put a sample into the integral.
    ///
    /// The first sample only starts the integrator and contributes nothing.
    /// Returns the pre-reset integral if this sample closed the auto-reset
    /// window, in which case it should be published.
    pub fn put(&mut self, timestamp: u64, val: Vector3<f32>) -> Option<IntegralDelta> {
        let (last_integration, last_val) = match self.state {
            State::Uninitialized => {
                log_debug!("integrator started at {}us", timestamp);
                self.state = State::Running {
                    last_integration: timestamp,
                    last_val: val,
                };
                self.last_auto = timestamp;
                return None;
            }
            State::Running {
                last_integration,
                last_val,
            } => (last_integration, last_val),
        };

        let dt_us = timestamp.wrapping_sub(last_integration) as i64;
        if dt_us <= 0 {
            log_warn!("non-increasing timestamp, dt = {}us", dt_us);
        }
        let dt = dt_us as f64 / 1_000_000.0;
        let mut i = (val + last_val) * (dt * 0.5) as f32;

        if self.coning_compensation {
            // Second order coning correction, see Tian et al. (2010), "Three-loop
            // Integration of GPS and Strapdown INS with Coning and Sculling Compensation"
            i += (self.integral_auto + self.last_delta * (1.0 / 6.0)).cross(&i) * 0.5;
        }

        self.integral_auto += i;
        self.integral_read += i;

        self.state = State::Running {
            last_integration: timestamp,
            last_val: val,
        };
        self.last_delta = i;

        let elapsed = timestamp
            .checked_sub(self.last_auto)
            .filter(|elapsed| *elapsed > self.auto_reset_interval)?;

        let delta = IntegralDelta {
            timestamp,
            integral: self.integral_auto,
            dt: elapsed,
        };
        if let Some(callback) = self.auto_callback.as_mut() {
            callback(&delta);
        }
        log_trace!("auto reset at {}us after {}us", timestamp, elapsed);

        self.last_auto = timestamp;
        self.integral_auto = Vector3::zeros();

        Some(delta)
    }

    /// [`Integrator::put`] with the sample stamped by `clock`.
    pub fn put_now(&mut self, clock: &impl Clock, val: Vector3<f32>) -> Option<IntegralDelta> {
        self.put(clock.now_us(), val)
    }

    /// The integral since the last auto-reset.
    pub fn get(&self) -> Vector3<f32> {
        self.integral_auto
    }

    /// The integral since the last read-reset, cleared when `auto_reset` is set.
    pub fn read(&mut self, auto_reset: bool) -> Vector3<f32> {
        let val = self.integral_read;
        if auto_reset {
            self.integral_read = Vector3::zeros();
        }
        val
    }

    /// Start of the current auto-reset window, `None` before the first sample.
    pub fn current_integral_start(&self) -> Option<u64> {
        match self.state {
            State::Uninitialized => None,
            State::Running { .. } => Some(self.last_auto),
        }
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn auto_reset_interval(&self) -> u64 {
        self.auto_reset_interval
    }

    pub fn coning_compensation(&self) -> bool {
        self.coning_compensation
    }
}
