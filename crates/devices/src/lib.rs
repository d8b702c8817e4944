//! Smart Device Management API client and typed device views.

pub mod client;
pub mod device;
pub mod error;
pub mod thermostat;

pub use {
    client::DeviceClient,
    device::{Device, DeviceKind},
    error::DeviceError,
    thermostat::{HvacMode, HvacStatus, Setpoint, TemperatureScale, Thermostat},
};
