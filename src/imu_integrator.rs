use nalgebra::Vector3;

use crate::{Integrator, IntegratorConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuReading {
    pub timestamp_us: u64,
    pub acc: Vector3<f32>,  // m/s^2
    pub gyro: Vector3<f32>, // rad/s
}

#[cfg(feature = "defmt")]
impl defmt::Format for ImuReading {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ImuReading {{ timestamp_us: {}, acc: {} {} {}, gyro: {} {} {} }}",
            self.timestamp_us,
            self.acc.x,
            self.acc.y,
            self.acc.z,
            self.gyro.x,
            self.gyro.y,
            self.gyro.z,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuDelta {
    pub timestamp_us: u64,
    pub delta_angle: Vector3<f32>,    // rad
    pub delta_velocity: Vector3<f32>, // m/s
    pub dt_us: u64,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ImuDelta {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "ImuDelta {{ timestamp_us: {}, delta_angle: {} {} {}, delta_velocity: {} {} {}, dt_us: {} }}",
            self.timestamp_us,
            self.delta_angle.x,
            self.delta_angle.y,
            self.delta_angle.z,
            self.delta_velocity.x,
            self.delta_velocity.y,
            self.delta_velocity.z,
            self.dt_us,
        )
    }
}

/// Integrates gyro and accelerometer readings into delta angles and delta
/// velocities published at a fixed cadence. The gyro integrator runs with
/// coning compensation, the accelerometer one without.
pub struct ImuIntegrator {
    gyro: Integrator,
    acc: Integrator,
}

impl ImuIntegrator {
    pub fn new(auto_reset_interval_us: u64) -> Self {
        Self {
            gyro: Integrator::from_config(IntegratorConfig::new(auto_reset_interval_us, true)),
            acc: Integrator::from_config(IntegratorConfig::new(auto_reset_interval_us, false)),
        }
    }

    pub fn put(&mut self, reading: &ImuReading) -> Option<ImuDelta> {
        let gyro = self.gyro.put(reading.timestamp_us, reading.gyro);
        let acc = self.acc.put(reading.timestamp_us, reading.acc);

        // both integrators see the same timestamps, so they always reset together
        gyro.zip(acc).map(|(gyro, acc)| ImuDelta {
            timestamp_us: reading.timestamp_us,
            delta_angle: gyro.integral,
            delta_velocity: acc.integral,
            dt_us: gyro.dt,
        })
    }

    /// Delta angle and delta velocity since the last read-reset.
    pub fn read(&mut self, auto_reset: bool) -> (Vector3<f32>, Vector3<f32>) {
        (self.gyro.read(auto_reset), self.acc.read(auto_reset))
    }

    pub fn gyro(&self) -> &Integrator {
        &self.gyro
    }

    pub fn acc(&self) -> &Integrator {
        &self.acc
    }
}

impl Default for ImuIntegrator {
    fn default() -> Self {
        Self::new(IntegratorConfig::DEFAULT_AUTO_RESET_INTERVAL_US)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    use super::*;
    use crate::tests::init_logger;

    fn reading(timestamp_us: u64) -> ImuReading {
        ImuReading {
            timestamp_us,
            acc: Vector3::new(0.0, 0.0, -9.81),
            gyro: Vector3::new(0.0, 0.0, 0.5),
        }
    }

    #[test]
    fn publishes_delta_angle_and_velocity() {
        init_logger();
        let mut imu = ImuIntegrator::default();
        assert!(imu.gyro().coning_compensation());
        assert!(!imu.acc().coning_compensation());

        // 1 kHz samples, 250 Hz output
        let deltas = (0..=10u64)
            .filter_map(|n| imu.put(&reading(1000 + n * 1000)))
            .collect::<std::vec::Vec<_>>();

        assert_eq!(deltas.len(), 2);
        for delta in &deltas {
            assert_eq!(delta.dt_us, 5000);
            assert_abs_diff_eq!(
                delta.delta_angle,
                Vector3::new(0.0, 0.0, 0.0025),
                epsilon = 1e-6
            );
            assert_abs_diff_eq!(
                delta.delta_velocity,
                Vector3::new(0.0, 0.0, -0.04905),
                epsilon = 1e-5
            );
        }
        assert_eq!(deltas[0].timestamp_us, 6000);
        assert_eq!(deltas[1].timestamp_us, 11000);
    }

    #[test]
    fn read_drains_both_accumulators() {
        init_logger();
        let mut imu = ImuIntegrator::new(1_000_000);
        imu.put(&reading(1000));
        imu.put(&reading(3000));

        let (delta_angle, delta_velocity) = imu.read(true);
        assert_abs_diff_eq!(delta_angle, Vector3::new(0.0, 0.0, 0.001), epsilon = 1e-7);
        assert_abs_diff_eq!(
            delta_velocity,
            Vector3::new(0.0, 0.0, -0.01962),
            epsilon = 1e-6
        );

        let (delta_angle, delta_velocity) = imu.read(false);
        assert_eq!(delta_angle, Vector3::zeros());
        assert_eq!(delta_velocity, Vector3::zeros());
        assert_abs_diff_eq!(
            imu.gyro().get(),
            Vector3::new(0.0, 0.0, 0.001),
            epsilon = 1e-7
        );
    }
}
