//! Definiciones de registros para el LSM6DS33 y el LIS3MDL
//!
//! Las direcciones y posiciones de bits son las del datasheet de cada chip.

/// Registros del acelerómetro/giroscopio LSM6DS33
pub mod lsm6ds33 {
    /// Dirección I2C con SA0 a nivel bajo
    pub const ADDRESS0: u8 = 0x6A;
    /// Dirección I2C con SA0 a nivel alto
    pub const ADDRESS1: u8 = 0x6B;

    // Registros de identificación
    pub const WHO_AM_I: u8 = 0x0F;
    pub const ID: u8 = 0x69;

    // Registros de control
    pub const CTRL1_XL: u8 = 0x10;
    pub const CTRL2_G: u8 = 0x11;

    /// Valor de arranque escrito en CTRL1_XL y CTRL2_G antes de configurar
    pub const BOOT_VALUE: u8 = 0x80;

    // Registros de estado
    pub const STATUS_REG: u8 = 0x1E;

    // Registros de datos (X_L, X_H, Y_L, Y_H, Z_L, Z_H)
    pub const OUTX_L_G: u8 = 0x22;
    pub const OUTX_L_XL: u8 = 0x28;

    /// Posiciones de los campos de CTRL1_XL / CTRL2_G
    pub mod bits {
        pub const ODR_SHIFT: u8 = 4;
        pub const FS_SHIFT: u8 = 2;
        pub const BW_SHIFT: u8 = 0;
        pub const FIELD_MASK_2: u8 = 0x03;
        pub const FIELD_MASK_4: u8 = 0x0F;

        // Bits de STATUS_REG
        pub const XLDA: u8 = 0x01;
        pub const GDA: u8 = 0x02;
        pub const DATA_READY_MASK: u8 = XLDA | GDA;
    }
}

/// Registros del magnetómetro LIS3MDL
pub mod lis3mdl {
    /// Dirección I2C con SDO/SA1 a nivel bajo
    pub const ADDRESS0: u8 = 0x1C;
    /// Dirección I2C con SDO/SA1 a nivel alto
    pub const ADDRESS1: u8 = 0x1E;

    // Registros de identificación
    pub const WHO_AM_I: u8 = 0x0F;
    pub const ID: u8 = 0x3D;

    // Registros de control
    pub const CTRL_REG1: u8 = 0x20;
    pub const CTRL_REG2: u8 = 0x21;
    pub const CTRL_REG3: u8 = 0x22;
    pub const CTRL_REG4: u8 = 0x23;

    // Registros de estado
    pub const STATUS_REG: u8 = 0x27;

    // Registros de datos (X_L, X_H, Y_L, Y_H, Z_L, Z_H)
    pub const OUT_X_L: u8 = 0x28;

    pub mod bits {
        // CTRL_REG1: OM[6:5], DO[4:2]
        pub const OM_SHIFT: u8 = 5;
        pub const DO_SHIFT: u8 = 2;
        // CTRL_REG2: FS[6:5]
        pub const FS_SHIFT: u8 = 5;
        // CTRL_REG3: MD[1:0], 00 = conversión continua
        pub const MD_CONTINUOUS: u8 = 0x00;
        // CTRL_REG4: OMZ[3:2]
        pub const OMZ_SHIFT: u8 = 2;

        pub const FIELD_MASK_2: u8 = 0x03;
        pub const FIELD_MASK_3: u8 = 0x07;

        // Bits de STATUS_REG
        pub const XDA: u8 = 0x01;
        pub const YDA: u8 = 0x02;
        pub const DATA_READY_MASK: u8 = XDA | YDA;
    }
}

/// Número de bytes de una ráfaga de datos de tres ejes
pub const BURST_LEN: usize = 6;
