//! Arbitraje de la tasa de sondeo entre acelerómetro, giroscopio y magnetómetro

/// Tasa base de la familia de dispositivos (Hz)
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 100;

/// Referencia para el intervalo de sondeo: por encima de esta tasa se sondea
/// con el intervalo mínimo
pub const POLL_RATE_REFERENCE_HZ: u32 = 400;

/// Intervalo mínimo de sondeo (ms)
pub const MIN_POLL_INTERVAL_MS: u32 = 1;

/// Temporización resultante, fija tras la inicialización
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleTiming {
    /// Tasa de muestreo resuelta (Hz)
    pub sample_rate_hz: u32,
    /// Intervalo de sondeo recomendado (ms)
    pub poll_interval_ms: u32,
    /// Intervalo nominal entre muestras (µs)
    pub sample_interval_us: u64,
}

/// Acumulador del máximo de las tasas de cada subsistema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateArbiter {
    max_rate_hz: u32,
}

impl Default for RateArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateArbiter {
    pub fn new() -> Self {
        Self::with_baseline(DEFAULT_SAMPLE_RATE_HZ)
    }

    pub fn with_baseline(baseline_hz: u32) -> Self {
        Self {
            max_rate_hz: baseline_hz,
        }
    }

    /// Incorpora la tasa de un subsistema
    pub fn update(self, rate_hz: u32) -> Self {
        Self {
            max_rate_hz: self.max_rate_hz.max(rate_hz),
        }
    }

    /// Tasa acumulada hasta el momento
    pub fn current(&self) -> u32 {
        self.max_rate_hz
    }

    /// Cierra el arbitraje y calcula los intervalos
    pub fn finalize(self) -> SampleTiming {
        // La tasa nunca es 0: con la base por defecto es al menos 100 Hz
        let rate = self.max_rate_hz.max(1);
        SampleTiming {
            sample_rate_hz: rate,
            poll_interval_ms: poll_interval_ms(rate),
            sample_interval_us: 1_000_000 / rate as u64,
        }
    }
}

/// Intervalo de sondeo recomendado para una tasa dada
pub fn poll_interval_ms(rate_hz: u32) -> u32 {
    if rate_hz > POLL_RATE_REFERENCE_HZ {
        return MIN_POLL_INTERVAL_MS;
    }
    POLL_RATE_REFERENCE_HZ / rate_hz.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_default_rate() {
        let timing = RateArbiter::new().finalize();
        assert_eq!(timing.sample_rate_hz, 100);
        assert_eq!(timing.poll_interval_ms, 4);
        assert_eq!(timing.sample_interval_us, 10_000);
    }

    #[test]
    fn test_resolved_rate_is_maximum_in_any_order() {
        let rates = [104, 833, 80];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let arbiter = order
                .iter()
                .fold(RateArbiter::new(), |acc, &i| acc.update(rates[i]));
            assert_eq!(arbiter.finalize().sample_rate_hz, 833);
        }
    }

    #[test]
    fn test_low_rates_keep_baseline() {
        let arbiter = RateArbiter::new().update(13).update(26).update(1);
        assert_eq!(arbiter.current(), 100);
    }

    #[test]
    fn test_poll_interval_values() {
        assert_eq!(poll_interval_ms(100), 4);
        assert_eq!(poll_interval_ms(104), 3);
        assert_eq!(poll_interval_ms(208), 1);
        assert_eq!(poll_interval_ms(400), 1);
        assert_eq!(poll_interval_ms(401), 1);
        assert_eq!(poll_interval_ms(6660), 1);
        assert_eq!(poll_interval_ms(13), 30);
    }

    #[test]
    fn test_poll_interval_is_non_increasing() {
        let mut previous = u32::MAX;
        for rate in 1..=7000 {
            let interval = poll_interval_ms(rate);
            assert!(interval <= previous);
            assert!(interval >= 1);
            previous = interval;
        }
    }

    #[test]
    fn test_sample_interval_us() {
        let timing = RateArbiter::new().update(1660).finalize();
        assert_eq!(timing.sample_interval_us, 602);
        assert_eq!(timing.poll_interval_ms, 1);
    }
}
