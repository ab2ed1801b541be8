//! Codificación de la configuración del LSM6DS33 y del LIS3MDL
//!
//! Los ajustes llegan como códigos numéricos (tal y como se guardan en la
//! configuración persistente). Aquí se validan contra sus enumeraciones, se
//! empaquetan en los registros de control y se derivan los factores de escala
//! y las tasas nominales de cada subsistema.

use core::f32::consts::PI;

use crate::device::Lsm6ds33Error;
use crate::register::{lis3mdl, lsm6ds33};
use crate::types::{
    AccelBandwidth, AccelFullScale, AccelSampleRate, CompassFullScale, CompassSampleRate,
    CompassXyMode, CompassZMode, GyroFullScale, GyroSampleRate, Setting,
};

/// Conversión de grados a radianes
pub const DEGREE_TO_RAD: f32 = PI / 180.0;

/// Mitad del rango de un entero de 16 bits con signo
pub const HALF_RANGE_16: f32 = 32768.0;

/// Multiplicador de la unidad del magnetómetro (gauss x 100)
pub const COMPASS_UNIT_MULTIPLIER: f32 = 100.0;

/// Códigos de configuración del IMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImuSettings {
    pub accel_sample_rate: u8,
    pub accel_fsr: u8,
    pub accel_bandwidth: u8,
    pub gyro_sample_rate: u8,
    pub gyro_fsr: u8,
    pub compass_sample_rate: u8,
    pub compass_xy_mode: u8,
    pub compass_fsr: u8,
    pub compass_z_mode: u8,
}

impl Default for ImuSettings {
    fn default() -> Self {
        Self {
            accel_sample_rate: AccelSampleRate::Hz104.code(),
            accel_fsr: AccelFullScale::Fs8G.code(),
            accel_bandwidth: AccelBandwidth::Hz400.code(),
            gyro_sample_rate: GyroSampleRate::Hz104.code(),
            gyro_fsr: GyroFullScale::Fs500Dps.code(),
            compass_sample_rate: CompassSampleRate::Hz10.code(),
            compass_xy_mode: CompassXyMode::UltraHighPerformance.code(),
            compass_fsr: CompassFullScale::Fs4Gauss.code(),
            compass_z_mode: CompassZMode::UltraHighPerformance.code(),
        }
    }
}

impl ImuSettings {
    pub fn with_accel(
        mut self,
        rate: AccelSampleRate,
        fsr: AccelFullScale,
        bandwidth: AccelBandwidth,
    ) -> Self {
        self.accel_sample_rate = rate.code();
        self.accel_fsr = fsr.code();
        self.accel_bandwidth = bandwidth.code();
        self
    }

    pub fn with_gyro(mut self, rate: GyroSampleRate, fsr: GyroFullScale) -> Self {
        self.gyro_sample_rate = rate.code();
        self.gyro_fsr = fsr.code();
        self
    }

    pub fn with_compass(
        mut self,
        rate: CompassSampleRate,
        fsr: CompassFullScale,
        xy_mode: CompassXyMode,
        z_mode: CompassZMode,
    ) -> Self {
        self.compass_sample_rate = rate.code();
        self.compass_fsr = fsr.code();
        self.compass_xy_mode = xy_mode.code();
        self.compass_z_mode = z_mode.code();
        self
    }
}

/// Valida un código contra su enumeración
fn validate<T: TryFrom<u8, Error = u8>>(setting: Setting, code: u8) -> Result<T, Lsm6ds33Error> {
    T::try_from(code).map_err(|code| {
        log::error!("Código ilegal {} para {:?}", code, setting);
        Lsm6ds33Error::InvalidConfiguration { setting, code }
    })
}

/// Escritura de un registro de control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegWrite {
    pub reg: u8,
    pub value: u8,
}

/// CTRL1_XL: ODR_XL[7:4] | FS_XL[3:2] | BW_XL[1:0]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ctrl1Xl {
    pub odr: AccelSampleRate,
    pub fs: AccelFullScale,
    pub bw: AccelBandwidth,
}

impl Ctrl1Xl {
    pub fn bits(self) -> u8 {
        use lsm6ds33::bits::*;
        (self.odr.code() << ODR_SHIFT) | (self.fs.code() << FS_SHIFT) | (self.bw.code() << BW_SHIFT)
    }

    /// Decodifica el valor de un registro leído del chip
    pub fn from_bits(value: u8) -> Result<Self, Lsm6ds33Error> {
        use lsm6ds33::bits::*;
        Ok(Self {
            odr: validate(Setting::AccelSampleRate, (value >> ODR_SHIFT) & FIELD_MASK_4)?,
            fs: validate(Setting::AccelFullScale, (value >> FS_SHIFT) & FIELD_MASK_2)?,
            bw: validate(Setting::AccelBandwidth, (value >> BW_SHIFT) & FIELD_MASK_2)?,
        })
    }
}

/// CTRL2_G: ODR_G[7:4] | FS_G[3:2]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ctrl2G {
    pub odr: GyroSampleRate,
    pub fs: GyroFullScale,
}

impl Ctrl2G {
    pub fn bits(self) -> u8 {
        use lsm6ds33::bits::*;
        (self.odr.code() << ODR_SHIFT) | (self.fs.code() << FS_SHIFT)
    }

    pub fn from_bits(value: u8) -> Result<Self, Lsm6ds33Error> {
        use lsm6ds33::bits::*;
        Ok(Self {
            odr: validate(Setting::GyroSampleRate, (value >> ODR_SHIFT) & FIELD_MASK_4)?,
            fs: validate(Setting::GyroFullScale, (value >> FS_SHIFT) & FIELD_MASK_2)?,
        })
    }
}

/// CTRL_REG1 del LIS3MDL: OM[6:5] | DO[4:2]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagCtrl1 {
    pub xy_mode: CompassXyMode,
    pub odr: CompassSampleRate,
}

impl MagCtrl1 {
    pub fn bits(self) -> u8 {
        use lis3mdl::bits::*;
        (self.xy_mode.code() << OM_SHIFT) | (self.odr.code() << DO_SHIFT)
    }

    pub fn from_bits(value: u8) -> Result<Self, Lsm6ds33Error> {
        use lis3mdl::bits::*;
        Ok(Self {
            xy_mode: validate(Setting::CompassXyMode, (value >> OM_SHIFT) & FIELD_MASK_2)?,
            odr: validate(Setting::CompassSampleRate, (value >> DO_SHIFT) & FIELD_MASK_3)?,
        })
    }
}

/// CTRL_REG2 del LIS3MDL: FS[6:5]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagCtrl2 {
    pub fs: CompassFullScale,
}

impl MagCtrl2 {
    pub fn bits(self) -> u8 {
        self.fs.code() << lis3mdl::bits::FS_SHIFT
    }
}

/// CTRL_REG3 del LIS3MDL: siempre en conversión continua
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MagCtrl3;

impl MagCtrl3 {
    pub fn bits(self) -> u8 {
        lis3mdl::bits::MD_CONTINUOUS
    }
}

/// CTRL_REG4 del LIS3MDL: OMZ[3:2]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagCtrl4 {
    pub z_mode: CompassZMode,
}

impl MagCtrl4 {
    pub fn bits(self) -> u8 {
        self.z_mode.code() << lis3mdl::bits::OMZ_SHIFT
    }
}

/// Configuración codificada del acelerómetro
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelConfig {
    pub ctrl1_xl: Ctrl1Xl,
    /// g por LSB
    pub scale: f32,
    /// Tasa nominal (Hz)
    pub rate_hz: u32,
}

impl AccelConfig {
    pub fn register_write(&self) -> RegWrite {
        RegWrite {
            reg: lsm6ds33::CTRL1_XL,
            value: self.ctrl1_xl.bits(),
        }
    }
}

/// Configuración codificada del giroscopio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroConfig {
    pub ctrl2_g: Ctrl2G,
    /// rad/s por LSB
    pub scale: f32,
    /// Tasa nominal (Hz)
    pub rate_hz: u32,
}

impl GyroConfig {
    pub fn register_write(&self) -> RegWrite {
        RegWrite {
            reg: lsm6ds33::CTRL2_G,
            value: self.ctrl2_g.bits(),
        }
    }
}

/// Configuración codificada del magnetómetro
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassConfig {
    pub ctrl1: MagCtrl1,
    pub ctrl2: MagCtrl2,
    pub ctrl3: MagCtrl3,
    pub ctrl4: MagCtrl4,
    /// gauss x 100 por LSB
    pub scale: f32,
    /// Tasa usada para el arbitraje (Hz, redondeada hacia arriba)
    pub rate_hz: u32,
}

impl CompassConfig {
    /// Escrituras de CTRL_REG1..CTRL_REG4, en el orden en que se aplican
    pub fn register_writes(&self) -> [RegWrite; 4] {
        [
            RegWrite {
                reg: lis3mdl::CTRL_REG1,
                value: self.ctrl1.bits(),
            },
            RegWrite {
                reg: lis3mdl::CTRL_REG2,
                value: self.ctrl2.bits(),
            },
            RegWrite {
                reg: lis3mdl::CTRL_REG3,
                value: self.ctrl3.bits(),
            },
            RegWrite {
                reg: lis3mdl::CTRL_REG4,
                value: self.ctrl4.bits(),
            },
        ]
    }
}

/// Configuración completa, validada antes de tocar el bus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedConfig {
    pub accel: AccelConfig,
    pub gyro: GyroConfig,
    pub compass: CompassConfig,
}

/// Valida y codifica el acelerómetro
pub fn encode_accel(settings: &ImuSettings) -> Result<AccelConfig, Lsm6ds33Error> {
    let odr: AccelSampleRate = validate(Setting::AccelSampleRate, settings.accel_sample_rate)?;
    let bw: AccelBandwidth = validate(Setting::AccelBandwidth, settings.accel_bandwidth)?;
    let fs: AccelFullScale = validate(Setting::AccelFullScale, settings.accel_fsr)?;

    Ok(AccelConfig {
        ctrl1_xl: Ctrl1Xl { odr, fs, bw },
        scale: fs.range_g() / HALF_RANGE_16,
        rate_hz: odr.hz(),
    })
}

/// Valida y codifica el giroscopio
pub fn encode_gyro(settings: &ImuSettings) -> Result<GyroConfig, Lsm6ds33Error> {
    let odr: GyroSampleRate = validate(Setting::GyroSampleRate, settings.gyro_sample_rate)?;
    let fs: GyroFullScale = validate(Setting::GyroFullScale, settings.gyro_fsr)?;

    Ok(GyroConfig {
        ctrl2_g: Ctrl2G { odr, fs },
        scale: fs.range_dps() / HALF_RANGE_16 * DEGREE_TO_RAD,
        rate_hz: odr.hz(),
    })
}

/// Valida y codifica el magnetómetro
pub fn encode_compass(settings: &ImuSettings) -> Result<CompassConfig, Lsm6ds33Error> {
    let odr: CompassSampleRate =
        validate(Setting::CompassSampleRate, settings.compass_sample_rate)?;
    let xy_mode: CompassXyMode = validate(Setting::CompassXyMode, settings.compass_xy_mode)?;
    let fs: CompassFullScale = validate(Setting::CompassFullScale, settings.compass_fsr)?;
    let z_mode: CompassZMode = validate(Setting::CompassZMode, settings.compass_z_mode)?;

    Ok(CompassConfig {
        ctrl1: MagCtrl1 { xy_mode, odr },
        ctrl2: MagCtrl2 { fs },
        ctrl3: MagCtrl3,
        ctrl4: MagCtrl4 { z_mode },
        scale: COMPASS_UNIT_MULTIPLIER * fs.range_gauss() / HALF_RANGE_16,
        rate_hz: odr.arbitration_hz(),
    })
}

/// Valida y codifica los tres subsistemas
pub fn encode(settings: &ImuSettings) -> Result<EncodedConfig, Lsm6ds33Error> {
    let config = EncodedConfig {
        accel: encode_accel(settings)?,
        gyro: encode_gyro(settings)?,
        compass: encode_compass(settings)?,
    };
    log::debug!(
        "CTRL1_XL=0x{:02X} CTRL2_G=0x{:02X} CTRL_REG1=0x{:02X} CTRL_REG2=0x{:02X} CTRL_REG4=0x{:02X}",
        config.accel.ctrl1_xl.bits(),
        config.gyro.ctrl2_g.bits(),
        config.compass.ctrl1.bits(),
        config.compass.ctrl2.bits(),
        config.compass.ctrl4.bits()
    );
    Ok(config)
}
