//! Traits base compartidos por el driver y sus consumidores

use crate::types::ImuSample;

/// Trait para obtener un timestamp en microsegundos.
/// Permite implementar diferentes fuentes (sistema o externa).
pub trait TimeSource {
    /// Retorna el timestamp (en microsegundos)
    fn get_timestamp_us(&self) -> u64;
}

/// Implementación por defecto usando el reloj del sistema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn get_timestamp_us(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros() as u64
    }
}

/// Fuente de tiempo fijada desde fuera (reloj de la aplicación o pruebas).
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTimeSource {
    pub timestamp_us: u64,
}

impl TimeSource for ManualTimeSource {
    fn get_timestamp_us(&self) -> u64 {
        self.timestamp_us
    }
}

/// Consumidor de las muestras producidas en cada ciclo de sondeo
/// (corrección de bias, calibración del compás, fusión).
pub trait SampleSink {
    fn consume(&mut self, sample: ImuSample);
}

impl<F> SampleSink for F
where
    F: FnMut(ImuSample),
{
    fn consume(&mut self, sample: ImuSample) {
        self(sample)
    }
}
