//! Funciones de conversión para datos del LSM6DS33 y del LIS3MDL
//!
//! Los dos chips entregan cada eje como un entero de 16 bits en complemento a
//! dos, byte bajo primero (X_L, X_H, Y_L, Y_H, Z_L, Z_H).

use crate::register::BURST_LEN;
use crate::types::{AxisSigns, ImuSample, Validity, Vector3};

/// Decodifica una ráfaga de seis bytes en los tres ejes con signo
#[inline]
pub fn burst_to_raw(burst: &[u8; BURST_LEN]) -> [i16; 3] {
    [
        i16::from_le_bytes([burst[0], burst[1]]),
        i16::from_le_bytes([burst[2], burst[3]]),
        i16::from_le_bytes([burst[4], burst[5]]),
    ]
}

/// Multiplica cada eje por el factor de escala
///
/// # Arguments
/// * `raw` - Valores brutos [x, y, z]
/// * `scale` - Unidades físicas por LSB
pub fn raw_to_physical(raw: [i16; 3], scale: f32) -> Vector3 {
    [
        raw[0] as f32 * scale,
        raw[1] as f32 * scale,
        raw[2] as f32 * scale,
    ]
}

/// Convierte una ráfaga directamente a unidades físicas
#[inline]
pub fn burst_to_physical(burst: &[u8; BURST_LEN], scale: f32) -> Vector3 {
    raw_to_physical(burst_to_raw(burst), scale)
}

/// Aplica una tabla de signos por eje
#[inline]
pub fn apply_signs(v: Vector3, signs: Vector3) -> Vector3 {
    [v[0] * signs[0], v[1] * signs[1], v[2] * signs[2]]
}

/// Ráfagas brutas de una lectura completa
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawBursts {
    pub gyro: [u8; BURST_LEN],
    pub accel: [u8; BURST_LEN],
    pub compass: [u8; BURST_LEN],
}

/// Factores de escala de cada grupo de canales
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub gyro: f32,
    pub accel: f32,
    pub compass: f32,
}

/// Convierte, reorienta y marca una lectura completa
pub fn build_sample(
    bursts: &RawBursts,
    scales: &Scales,
    axes: &AxisSigns,
    timestamp_us: u64,
) -> ImuSample {
    ImuSample {
        timestamp_us,
        gyro: apply_signs(burst_to_physical(&bursts.gyro, scales.gyro), axes.gyro),
        accel: apply_signs(burst_to_physical(&bursts.accel, scales.accel), axes.accel),
        compass: apply_signs(
            burst_to_physical(&bursts.compass, scales.compass),
            axes.compass,
        ),
        validity: Validity::MOTION,
    }
}
