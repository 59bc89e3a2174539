#![cfg_attr(not(test), no_std)]

mod fmt;

pub use clock::Clock;
pub use config::IntegratorConfig;
pub use imu_integrator::{ImuDelta, ImuIntegrator, ImuReading};
pub use integrator::{IntegralDelta, Integrator, ResetCallback};

mod clock;
mod config;
mod imu_integrator;
mod integrator;

#[cfg(test)]
mod tests;
