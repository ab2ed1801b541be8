//! Definiciones de tipos y constantes comunes para el LSM6DS33 + LIS3MDL

/// Genera una enumeración de códigos de configuración con su conversión
/// validada desde el código numérico
macro_rules! config_codes {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $val:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $val),*
        }

        impl $name {
            /// Todos los códigos legales, en orden
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Código de bits que se escribe en el registro
            pub fn code(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $name {
            /// El código rechazado
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $(v if v == $val => Ok($name::$variant),)*
                    other => Err(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }
    };
}

config_codes! {
    /// Tasas de muestreo del acelerómetro (ODR_XL)
    AccelSampleRate {
        Hz13 = 1,
        Hz26 = 2,
        Hz52 = 3,
        Hz104 = 4,
        Hz208 = 5,
        Hz416 = 6,
        Hz833 = 7,
        Hz1660 = 8,
        Hz3330 = 9,
        Hz6660 = 10,
    }
}

impl AccelSampleRate {
    /// Frecuencia nominal en Hz
    pub fn hz(self) -> u32 {
        match self {
            AccelSampleRate::Hz13 => 13,
            AccelSampleRate::Hz26 => 26,
            AccelSampleRate::Hz52 => 52,
            AccelSampleRate::Hz104 => 104,
            AccelSampleRate::Hz208 => 208,
            AccelSampleRate::Hz416 => 416,
            AccelSampleRate::Hz833 => 833,
            AccelSampleRate::Hz1660 => 1660,
            AccelSampleRate::Hz3330 => 3330,
            AccelSampleRate::Hz6660 => 6660,
        }
    }
}

config_codes! {
    /// Escalas completas del acelerómetro (FS_XL)
    AccelFullScale {
        /// ±2g
        Fs2G = 0,
        /// ±16g
        Fs16G = 1,
        /// ±4g
        Fs4G = 2,
        /// ±8g
        Fs8G = 3,
    }
}

impl AccelFullScale {
    /// Rango en g
    pub fn range_g(self) -> f32 {
        match self {
            AccelFullScale::Fs2G => 2.0,
            AccelFullScale::Fs4G => 4.0,
            AccelFullScale::Fs8G => 8.0,
            AccelFullScale::Fs16G => 16.0,
        }
    }
}

config_codes! {
    /// Ancho de banda del filtro anti-aliasing del acelerómetro (BW_XL)
    AccelBandwidth {
        Hz400 = 0,
        Hz200 = 1,
        Hz100 = 2,
        Hz50 = 3,
    }
}

config_codes! {
    /// Tasas de muestreo del giroscopio (ODR_G)
    GyroSampleRate {
        Hz13 = 1,
        Hz26 = 2,
        Hz52 = 3,
        Hz104 = 4,
        Hz208 = 5,
        Hz416 = 6,
        Hz833 = 7,
        Hz1660 = 8,
    }
}

impl GyroSampleRate {
    /// Frecuencia nominal en Hz
    pub fn hz(self) -> u32 {
        match self {
            GyroSampleRate::Hz13 => 13,
            GyroSampleRate::Hz26 => 26,
            GyroSampleRate::Hz52 => 52,
            GyroSampleRate::Hz104 => 104,
            GyroSampleRate::Hz208 => 208,
            GyroSampleRate::Hz416 => 416,
            GyroSampleRate::Hz833 => 833,
            GyroSampleRate::Hz1660 => 1660,
        }
    }
}

config_codes! {
    /// Escalas completas del giroscopio (FS_G)
    GyroFullScale {
        /// ±245 dps
        Fs245Dps = 0,
        /// ±500 dps
        Fs500Dps = 1,
        /// ±1000 dps
        Fs1000Dps = 2,
        /// ±2000 dps
        Fs2000Dps = 3,
    }
}

impl GyroFullScale {
    /// Rango en grados/segundo
    pub fn range_dps(self) -> f32 {
        match self {
            GyroFullScale::Fs245Dps => 245.0,
            GyroFullScale::Fs500Dps => 500.0,
            GyroFullScale::Fs1000Dps => 1000.0,
            GyroFullScale::Fs2000Dps => 2000.0,
        }
    }
}

config_codes! {
    /// Tasas de muestreo del magnetómetro (DO)
    CompassSampleRate {
        Hz0_625 = 0,
        Hz1_25 = 1,
        Hz2_5 = 2,
        Hz5 = 3,
        Hz10 = 4,
        Hz20 = 5,
        Hz40 = 6,
        Hz80 = 7,
    }
}

impl CompassSampleRate {
    /// Frecuencia nominal en Hz
    pub fn hz(self) -> f32 {
        match self {
            CompassSampleRate::Hz0_625 => 0.625,
            CompassSampleRate::Hz1_25 => 1.25,
            CompassSampleRate::Hz2_5 => 2.5,
            CompassSampleRate::Hz5 => 5.0,
            CompassSampleRate::Hz10 => 10.0,
            CompassSampleRate::Hz20 => 20.0,
            CompassSampleRate::Hz40 => 40.0,
            CompassSampleRate::Hz80 => 80.0,
        }
    }

    /// Frecuencia entera usada para arbitrar la tasa de sondeo.
    /// Las tasas fraccionarias se redondean hacia arriba.
    pub fn arbitration_hz(self) -> u32 {
        match self {
            CompassSampleRate::Hz0_625 => 1,
            CompassSampleRate::Hz1_25 => 2,
            CompassSampleRate::Hz2_5 => 3,
            CompassSampleRate::Hz5 => 5,
            CompassSampleRate::Hz10 => 10,
            CompassSampleRate::Hz20 => 20,
            CompassSampleRate::Hz40 => 40,
            CompassSampleRate::Hz80 => 80,
        }
    }
}

config_codes! {
    /// Escalas completas del magnetómetro (FS)
    CompassFullScale {
        /// ±4 gauss
        Fs4Gauss = 0,
        /// ±8 gauss
        Fs8Gauss = 1,
        /// ±12 gauss
        Fs12Gauss = 2,
        /// ±16 gauss
        Fs16Gauss = 3,
    }
}

impl CompassFullScale {
    /// Rango en gauss
    pub fn range_gauss(self) -> f32 {
        match self {
            CompassFullScale::Fs4Gauss => 4.0,
            CompassFullScale::Fs8Gauss => 8.0,
            CompassFullScale::Fs12Gauss => 12.0,
            CompassFullScale::Fs16Gauss => 16.0,
        }
    }
}

config_codes! {
    /// Modo de operación de los ejes X/Y del magnetómetro (OM)
    CompassXyMode {
        LowPower = 0,
        MediumPerformance = 1,
        HighPerformance = 2,
        UltraHighPerformance = 3,
    }
}

config_codes! {
    /// Modo de operación del eje Z del magnetómetro (OMZ)
    CompassZMode {
        LowPower = 0,
        MediumPerformance = 1,
        HighPerformance = 2,
        UltraHighPerformance = 3,
    }
}

/// Chips que componen el paquete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chip {
    /// LSM6DS33 (acelerómetro + giroscopio)
    AccelGyro,
    /// LIS3MDL
    Magnetometer,
}

impl Chip {
    pub fn name(self) -> &'static str {
        match self {
            Chip::AccelGyro => "LSM6DS33",
            Chip::Magnetometer => "LIS3MDL",
        }
    }
}

/// Subsistemas configurables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Accel,
    Gyro,
    Compass,
}

/// Ajustes individuales, para informar de códigos inválidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    AccelSampleRate,
    AccelFullScale,
    AccelBandwidth,
    GyroSampleRate,
    GyroFullScale,
    CompassSampleRate,
    CompassXyMode,
    CompassFullScale,
    CompassZMode,
}

impl Setting {
    pub fn subsystem(self) -> Subsystem {
        match self {
            Setting::AccelSampleRate | Setting::AccelFullScale | Setting::AccelBandwidth => {
                Subsystem::Accel
            }
            Setting::GyroSampleRate | Setting::GyroFullScale => Subsystem::Gyro,
            Setting::CompassSampleRate
            | Setting::CompassXyMode
            | Setting::CompassFullScale
            | Setting::CompassZMode => Subsystem::Compass,
        }
    }
}

/// Vector de tres ejes [x, y, z]
pub type Vector3 = [f32; 3];

/// Signos aplicados a cada eje para llevar las lecturas al marco del cuerpo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSigns {
    pub gyro: Vector3,
    pub accel: Vector3,
    pub compass: Vector3,
}

/// Orientación de la placa LSM6DS33 + LIS3MDL: giroscopio Y/Z invertidos,
/// acelerómetro X invertido, magnetómetro Y/Z invertidos
pub const LSM6DS33_LIS3MDL_AXES: AxisSigns = AxisSigns {
    gyro: [1.0, -1.0, -1.0],
    accel: [-1.0, 1.0, 1.0],
    compass: [1.0, -1.0, -1.0],
};

/// Familia de IMUs soportadas por el driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImuType {
    /// LSM6DS33 (acelerómetro/giroscopio) + LIS3MDL (magnetómetro)
    Lsm6ds33Lis3mdl,
}

impl ImuType {
    /// Nombre legible del dispositivo
    pub fn name(self) -> &'static str {
        match self {
            ImuType::Lsm6ds33Lis3mdl => "LSM6DS33 + LIS3MDL",
        }
    }

    /// Identificador numérico del tipo de IMU
    pub fn type_id(self) -> u8 {
        match self {
            ImuType::Lsm6ds33Lis3mdl => 11,
        }
    }

    /// Tabla de corrección de ejes de la variante
    pub fn axes(self) -> &'static AxisSigns {
        match self {
            ImuType::Lsm6ds33Lis3mdl => &LSM6DS33_LIS3MDL_AXES,
        }
    }
}

/// Indicadores de validez de cada canal de una muestra
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    pub fusion_pose: bool,
    pub fusion_qpose: bool,
    pub gyro: bool,
    pub accel: bool,
    pub compass: bool,
    pub pressure: bool,
    pub temperature: bool,
    pub humidity: bool,
}

impl Validity {
    /// Canales que produce este driver: giroscopio, acelerómetro y magnetómetro
    pub const MOTION: Validity = Validity {
        fusion_pose: false,
        fusion_qpose: false,
        gyro: true,
        accel: true,
        compass: true,
        pressure: false,
        temperature: false,
        humidity: false,
    };
}

/// Muestra sincronizada en unidades físicas y en el marco del cuerpo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    /// Marca de tiempo de captura (µs)
    pub timestamp_us: u64,
    /// Velocidad angular (rad/s)
    pub gyro: Vector3,
    /// Aceleración (g)
    pub accel: Vector3,
    /// Campo magnético (gauss x 100, equivalente a µT)
    pub compass: Vector3,
    pub validity: Validity,
}
