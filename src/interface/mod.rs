//! Módulo de abstracción para el bus compartido por el LSM6DS33 y el LIS3MDL
//!
//! Los dos chips cuelgan del mismo bus I2C, por lo que cada operación recibe
//! la dirección del dispositivo destino.

use embedded_hal::i2c::I2c;

#[cfg(test)]
pub(crate) mod mock;

/// Error genérico para interfaces de comunicación
#[derive(Debug, Clone)]
pub enum InterfaceError<E> {
    /// Error de comunicación I2C
    I2cError(E),
    /// Parámetro inválido
    InvalidParameter,
}

/// Trait para abstraer la comunicación con los chips del IMU
pub trait Interface {
    /// Tipo de error que puede producir la interfaz
    type Error;

    /// Prepara el bus para las escrituras de configuración
    fn open(&mut self) -> Result<(), Self::Error> {
        // Por defecto no hace nada, el bus ya está abierto al construirlo
        Ok(())
    }

    /// Escribe uno o varios registros consecutivos
    fn write_reg(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Lee uno o varios registros consecutivos
    fn read_reg(&mut self, addr: u8, reg: u8, data: &mut [u8]) -> Result<(), Self::Error>;
}

/// Implementación de Interface para I2C
pub struct I2cInterface<I2C> {
    i2c: I2C,
}

impl<I2C, E> I2cInterface<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Crea una nueva interfaz I2C
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Consume la interfaz y devuelve el dispositivo I2C subyacente
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> Interface for I2cInterface<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = InterfaceError<E>;

    fn write_reg(&mut self, addr: u8, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        let mut buffer = [0u8; 17];
        if data.len() > 16 {
            return Err(InterfaceError::InvalidParameter);
        }

        buffer[0] = reg;
        buffer[1..data.len() + 1].copy_from_slice(data);

        self.i2c
            .write(addr, &buffer[0..data.len() + 1])
            .map_err(InterfaceError::I2cError)
    }

    fn read_reg(&mut self, addr: u8, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Err(InterfaceError::InvalidParameter);
        }

        self.i2c
            .write_read(addr, &[reg], data)
            .map_err(InterfaceError::I2cError)
    }
}
