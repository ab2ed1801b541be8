//! Biblioteca Rust para el IMU combinado LSM6DS33 + LIS3MDL
//!
//! Esta biblioteca localiza ambos chips en el bus I2C, traduce los códigos de
//! configuración a los registros de control, arbitra la tasa de sondeo y
//! convierte cada lectura a un vector físico en el marco del cuerpo.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub mod base;
pub mod config;
pub mod conversion;
pub mod device;
pub mod interface;
pub mod rate;
pub mod register;
pub mod types;

// Re-exports públicos
pub use base::{SampleSink, TimeSource};
pub use config::ImuSettings;
pub use device::{Lsm6ds33, Lsm6ds33Error};
pub use rate::SampleTiming;
pub use types::{
    AccelBandwidth, AccelFullScale, AccelSampleRate, CompassFullScale, CompassSampleRate,
    CompassXyMode, CompassZMode, GyroFullScale, GyroSampleRate, ImuSample, ImuType,
};

use crate::interface::I2cInterface;

/// Crea un nuevo driver LSM6DS33 + LIS3MDL sobre un bus I2C
pub fn new_i2c_device<I, D, E>(
    i2c: I,
    delay: D,
    settings: ImuSettings,
) -> Lsm6ds33<I2cInterface<I>, D>
where
    I: I2c<Error = E>,
    D: DelayNs,
{
    let interface = I2cInterface::new(i2c);
    Lsm6ds33::new(interface, delay, settings)
}
