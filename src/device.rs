use core::fmt;

use crate::base::{SampleSink, SystemTimeSource, TimeSource};
use crate::config::{self, EncodedConfig, ImuSettings, RegWrite};
use crate::conversion::{build_sample, RawBursts, Scales};
use crate::interface::Interface;
use crate::rate::{RateArbiter, SampleTiming};
use crate::register::{lis3mdl, lsm6ds33, BURST_LEN};
use crate::types::{Chip, ImuSample, ImuType, Setting};
use embedded_hal::delay::DelayNs;

/// Espera tras el arranque de los registros de control del LSM6DS33 (ms)
pub const BOOT_DELAY_MS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lsm6ds33Error {
    /// Ninguna de las dos direcciones candidatas respondió con el WHO_AM_I esperado
    DeviceNotFound(Chip),
    /// Código de configuración fuera de su conjunto legal
    InvalidConfiguration { setting: Setting, code: u8 },
    /// Fallo de lectura o escritura de un registro
    BusTransaction { chip: Chip, register: u8 },
    /// No se pudo abrir el bus
    BusOpen,
    /// Lectura antes de completar `init`
    NotInitialized,
}

impl fmt::Display for Lsm6ds33Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lsm6ds33Error::DeviceNotFound(chip) => write!(f, "{} no detectado", chip.name()),
            Lsm6ds33Error::InvalidConfiguration { setting, code } => write!(
                f,
                "configuración inválida en {:?}: código {} ilegal para {:?}",
                setting.subsystem(),
                code,
                setting
            ),
            Lsm6ds33Error::BusTransaction { chip, register } => write!(
                f,
                "fallo de transacción con {} en el registro 0x{:02X}",
                chip.name(),
                register
            ),
            Lsm6ds33Error::BusOpen => write!(f, "no se pudo abrir el bus"),
            Lsm6ds33Error::NotInitialized => write!(f, "dispositivo no inicializado"),
        }
    }
}

impl std::error::Error for Lsm6ds33Error {}

/// Estado fijado al completar la inicialización, de solo lectura después
#[derive(Debug, Clone, Copy)]
struct DeviceState {
    accel_gyro_addr: u8,
    mag_addr: u8,
    config: EncodedConfig,
    timing: SampleTiming,
}

impl DeviceState {
    fn scales(&self) -> Scales {
        Scales {
            gyro: self.config.gyro.scale,
            accel: self.config.accel.scale,
            compass: self.config.compass.scale,
        }
    }
}

/// Driver del par LSM6DS33 + LIS3MDL
pub struct Lsm6ds33<I, D, T = SystemTimeSource> {
    pub(crate) interface: I,
    pub(crate) delay: D,
    time: T,
    imu_type: ImuType,
    settings: ImuSettings,
    state: Option<DeviceState>,
}

impl<I, D, E> Lsm6ds33<I, D>
where
    I: Interface<Error = E>,
    D: DelayNs,
{
    /// Create a new instance of Lsm6ds33
    pub fn new(interface: I, delay: D, settings: ImuSettings) -> Self {
        Self {
            interface,
            delay,
            time: SystemTimeSource,
            imu_type: ImuType::Lsm6ds33Lis3mdl,
            settings,
            state: None,
        }
    }
}

impl<I, D, T, E> Lsm6ds33<I, D, T>
where
    I: Interface<Error = E>,
    D: DelayNs,
    T: TimeSource,
{
    /// Sustituye la fuente de marcas de tiempo de las muestras
    pub fn with_time_source<T2: TimeSource>(self, time: T2) -> Lsm6ds33<I, D, T2> {
        Lsm6ds33 {
            interface: self.interface,
            delay: self.delay,
            time,
            imu_type: self.imu_type,
            settings: self.settings,
            state: self.state,
        }
    }

    pub fn imu_type(&self) -> ImuType {
        self.imu_type
    }

    pub fn name(&self) -> &'static str {
        self.imu_type.name()
    }

    pub fn settings(&self) -> &ImuSettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Dirección I2C resuelta del LSM6DS33
    pub fn accel_gyro_address(&self) -> Option<u8> {
        self.state.map(|s| s.accel_gyro_addr)
    }

    /// Dirección I2C resuelta del LIS3MDL
    pub fn magnetometer_address(&self) -> Option<u8> {
        self.state.map(|s| s.mag_addr)
    }

    /// Configuración aplicada al chip
    pub fn config(&self) -> Option<&EncodedConfig> {
        self.state.as_ref().map(|s| &s.config)
    }

    /// Temporización resuelta. Antes de `init` refleja la tasa base de la familia.
    pub fn timing(&self) -> SampleTiming {
        match self.state {
            Some(state) => state.timing,
            None => RateArbiter::new().finalize(),
        }
    }

    /// Intervalo de sondeo recomendado (ms)
    pub fn poll_interval_ms(&self) -> u32 {
        self.timing().poll_interval_ms
    }

    /// Tasa de muestreo resuelta (Hz)
    pub fn sample_rate_hz(&self) -> u32 {
        self.timing().sample_rate_hz
    }

    /// Consume el driver y devuelve la interfaz
    pub fn release(self) -> I {
        self.interface
    }

    fn read_u8(&mut self, chip: Chip, addr: u8, reg: u8) -> Result<u8, Lsm6ds33Error> {
        let mut data = [0u8];
        self.interface
            .read_reg(addr, reg, &mut data)
            .map_err(|_| Lsm6ds33Error::BusTransaction { chip, register: reg })?;
        Ok(data[0])
    }

    fn write_u8(&mut self, chip: Chip, addr: u8, write: RegWrite) -> Result<(), Lsm6ds33Error> {
        self.interface
            .write_reg(addr, write.reg, &[write.value])
            .map_err(|_| {
                log::error!(
                    "Fallo al escribir 0x{:02X} en el registro 0x{:02X} de {}",
                    write.value,
                    write.reg,
                    chip.name()
                );
                Lsm6ds33Error::BusTransaction {
                    chip,
                    register: write.reg,
                }
            })
    }

    /// Busca el chip en sus dos direcciones candidatas comprobando WHO_AM_I
    pub fn locate(&mut self, chip: Chip) -> Result<u8, Lsm6ds33Error> {
        let (candidates, who_am_i, id) = match chip {
            Chip::AccelGyro => (
                [lsm6ds33::ADDRESS0, lsm6ds33::ADDRESS1],
                lsm6ds33::WHO_AM_I,
                lsm6ds33::ID,
            ),
            Chip::Magnetometer => (
                [lis3mdl::ADDRESS0, lis3mdl::ADDRESS1],
                lis3mdl::WHO_AM_I,
                lis3mdl::ID,
            ),
        };

        for addr in candidates {
            // Un fallo de lectura equivale a una identidad distinta
            match self.read_u8(chip, addr, who_am_i) {
                Ok(value) if value == id => {
                    log::debug!("{} detectado en 0x{:02X}", chip.name(), addr);
                    return Ok(addr);
                }
                Ok(value) => log::debug!(
                    "WHO_AM_I 0x{:02X} en 0x{:02X}, esperado 0x{:02X}",
                    value,
                    addr,
                    id
                ),
                Err(_) => log::debug!("Sin respuesta de {} en 0x{:02X}", chip.name(), addr),
            }
        }

        log::error!("{} no detectado", chip.name());
        Err(Lsm6ds33Error::DeviceNotFound(chip))
    }

    /// Inicializa ambos chips.
    ///
    /// Todos los códigos se validan antes de la primera transacción, por lo que
    /// una configuración inválida nunca deja escrituras parciales.
    pub fn init(&mut self) -> Result<(), Lsm6ds33Error> {
        self.state = None;
        let config = config::encode(&self.settings)?;

        let accel_gyro_addr = self.locate(Chip::AccelGyro)?;

        self.interface.open().map_err(|_| Lsm6ds33Error::BusOpen)?;

        // Arranque de acelerómetro y giroscopio
        for reg in [lsm6ds33::CTRL1_XL, lsm6ds33::CTRL2_G] {
            self.write_u8(
                Chip::AccelGyro,
                accel_gyro_addr,
                RegWrite {
                    reg,
                    value: lsm6ds33::BOOT_VALUE,
                },
            )?;
        }
        self.delay.delay_ms(BOOT_DELAY_MS);

        let mut arbiter = RateArbiter::new();

        self.write_u8(Chip::AccelGyro, accel_gyro_addr, config.accel.register_write())?;
        arbiter = arbiter.update(config.accel.rate_hz);

        self.write_u8(Chip::AccelGyro, accel_gyro_addr, config.gyro.register_write())?;
        arbiter = arbiter.update(config.gyro.rate_hz);

        log::info!("LSM6DS33 init complete");

        let mag_addr = self.locate(Chip::Magnetometer)?;
        for write in config.compass.register_writes() {
            self.write_u8(Chip::Magnetometer, mag_addr, write)?;
        }
        arbiter = arbiter.update(config.compass.rate_hz);

        let timing = arbiter.finalize();
        log::debug!(
            "Tasa resuelta {} Hz, sondeo cada {} ms",
            timing.sample_rate_hz,
            timing.poll_interval_ms
        );

        self.state = Some(DeviceState {
            accel_gyro_addr,
            mag_addr,
            config,
            timing,
        });

        log::info!("{} init complete", self.name());
        Ok(())
    }

    /// Lee seis registros de datos consecutivos, byte a byte.
    /// El LIS3MDL solo autoincrementa con el MSB de la subdirección activo.
    fn read_burst(
        &mut self,
        chip: Chip,
        addr: u8,
        base: u8,
    ) -> Result<[u8; BURST_LEN], Lsm6ds33Error> {
        let mut burst = [0u8; BURST_LEN];
        for (i, byte) in burst.iter_mut().enumerate() {
            *byte = self.read_u8(chip, addr, base + i as u8)?;
        }
        Ok(burst)
    }

    /// Ejecuta un ciclo de sondeo.
    ///
    /// Devuelve `Ok(None)` si alguno de los chips no tiene datos nuevos. Un fallo
    /// de bus aborta el ciclo completo sin producir muestra parcial.
    pub fn read(&mut self) -> Result<Option<ImuSample>, Lsm6ds33Error> {
        let state = self.state.ok_or(Lsm6ds33Error::NotInitialized)?;

        let status = self.read_u8(Chip::AccelGyro, state.accel_gyro_addr, lsm6ds33::STATUS_REG)?;
        let cstatus = self.read_u8(Chip::Magnetometer, state.mag_addr, lis3mdl::STATUS_REG)?;

        if (status & lsm6ds33::bits::DATA_READY_MASK) == 0
            || (cstatus & lis3mdl::bits::DATA_READY_MASK) == 0
        {
            log::trace!("Sin datos nuevos (status=0x{:02X}, cstatus=0x{:02X})", status, cstatus);
            return Ok(None);
        }

        let bursts = RawBursts {
            gyro: self.read_burst(Chip::AccelGyro, state.accel_gyro_addr, lsm6ds33::OUTX_L_G)?,
            accel: self.read_burst(Chip::AccelGyro, state.accel_gyro_addr, lsm6ds33::OUTX_L_XL)?,
            compass: self.read_burst(Chip::Magnetometer, state.mag_addr, lis3mdl::OUT_X_L)?,
        };

        let timestamp_us = self.time.get_timestamp_us();
        Ok(Some(build_sample(
            &bursts,
            &state.scales(),
            self.imu_type.axes(),
            timestamp_us,
        )))
    }

    /// Ejecuta un ciclo de sondeo y entrega la muestra al consumidor.
    /// Devuelve si se entregó una muestra.
    pub fn read_into<S: SampleSink>(&mut self, sink: &mut S) -> Result<bool, Lsm6ds33Error> {
        match self.read()? {
            Some(sample) => {
                sink.consume(sample);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ManualTimeSource;
    use crate::interface::mock::{MockInterface, NoopDelay, Transaction};
    use crate::types::{
        AccelBandwidth, AccelFullScale, AccelSampleRate, GyroFullScale, GyroSampleRate, Validity,
    };

    const AG: u8 = lsm6ds33::ADDRESS0;
    const MAG: u8 = lis3mdl::ADDRESS0;

    fn mock_with_chips() -> MockInterface {
        let mut mock = MockInterface::new();
        mock.set_reg(AG, lsm6ds33::WHO_AM_I, lsm6ds33::ID);
        mock.set_reg(MAG, lis3mdl::WHO_AM_I, lis3mdl::ID);
        mock.set_regs(AG, lsm6ds33::OUTX_L_G, &[0; 6]);
        mock.set_regs(AG, lsm6ds33::OUTX_L_XL, &[0; 6]);
        mock.set_regs(MAG, lis3mdl::OUT_X_L, &[0; 6]);
        mock
    }

    fn device(
        mock: MockInterface,
        settings: ImuSettings,
    ) -> Lsm6ds33<MockInterface, NoopDelay, ManualTimeSource> {
        Lsm6ds33::new(mock, NoopDelay::default(), settings)
            .with_time_source(ManualTimeSource { timestamp_us: 1234 })
    }

    fn initialized(settings: ImuSettings) -> Lsm6ds33<MockInterface, NoopDelay, ManualTimeSource> {
        let mut dev = device(mock_with_chips(), settings);
        dev.init().unwrap();
        dev.interface.clear_transactions();
        dev
    }

    fn set_status(dev: &mut Lsm6ds33<MockInterface, NoopDelay, ManualTimeSource>, ag: u8, mag: u8) {
        dev.interface.set_reg(AG, lsm6ds33::STATUS_REG, ag);
        dev.interface.set_reg(MAG, lis3mdl::STATUS_REG, mag);
    }

    #[test]
    fn test_init_writes_registers_in_order() {
        let mut dev = device(mock_with_chips(), ImuSettings::default());
        dev.init().unwrap();

        assert_eq!(
            dev.interface.writes(),
            vec![
                (AG, lsm6ds33::CTRL1_XL, 0x80),
                (AG, lsm6ds33::CTRL2_G, 0x80),
                (AG, lsm6ds33::CTRL1_XL, 0x4C),
                (AG, lsm6ds33::CTRL2_G, 0x44),
                (MAG, lis3mdl::CTRL_REG1, 0x70),
                (MAG, lis3mdl::CTRL_REG2, 0x00),
                (MAG, lis3mdl::CTRL_REG3, 0x00),
                (MAG, lis3mdl::CTRL_REG4, 0x0C),
            ]
        );
        assert!(dev.interface.transactions().contains(&Transaction::Open));
        assert_eq!(dev.delay.total_ns, 100_000_000);
        assert_eq!(dev.accel_gyro_address(), Some(AG));
        assert_eq!(dev.magnetometer_address(), Some(MAG));
        assert_eq!(dev.sample_rate_hz(), 104);
        assert_eq!(dev.poll_interval_ms(), 3);
        assert_eq!(dev.timing().sample_interval_us, 9615);
    }

    #[test]
    fn test_locate_falls_back_to_second_address() {
        let mut mock = MockInterface::new();
        mock.set_reg(AG, lsm6ds33::WHO_AM_I, 0x00);
        mock.set_reg(lsm6ds33::ADDRESS1, lsm6ds33::WHO_AM_I, lsm6ds33::ID);
        mock.set_reg(lis3mdl::ADDRESS1, lis3mdl::WHO_AM_I, lis3mdl::ID);

        let mut dev = device(mock, ImuSettings::default());
        dev.init().unwrap();

        assert_eq!(dev.accel_gyro_address(), Some(lsm6ds33::ADDRESS1));
        assert_eq!(dev.magnetometer_address(), Some(lis3mdl::ADDRESS1));
        assert!(dev
            .interface
            .writes()
            .iter()
            .all(|(addr, _, _)| *addr == lsm6ds33::ADDRESS1 || *addr == lis3mdl::ADDRESS1));
    }

    #[test]
    fn test_wrong_identity_is_device_not_found() {
        let mut mock = MockInterface::new();
        mock.set_reg(lsm6ds33::ADDRESS0, lsm6ds33::WHO_AM_I, 0xAA);
        mock.set_reg(lsm6ds33::ADDRESS1, lsm6ds33::WHO_AM_I, 0xAA);

        let mut dev = device(mock, ImuSettings::default());
        assert_eq!(
            dev.init(),
            Err(Lsm6ds33Error::DeviceNotFound(Chip::AccelGyro))
        );
        assert!(dev.interface.writes().is_empty());
        assert_eq!(
            dev.interface.reads(),
            vec![
                (lsm6ds33::ADDRESS0, lsm6ds33::WHO_AM_I),
                (lsm6ds33::ADDRESS1, lsm6ds33::WHO_AM_I)
            ]
        );
        assert!(!dev.is_initialized());
    }

    #[test]
    fn test_missing_magnetometer_fails_init() {
        let mut mock = MockInterface::new();
        mock.set_reg(AG, lsm6ds33::WHO_AM_I, lsm6ds33::ID);

        let mut dev = device(mock, ImuSettings::default());
        assert_eq!(
            dev.init(),
            Err(Lsm6ds33Error::DeviceNotFound(Chip::Magnetometer))
        );
        assert!(!dev.is_initialized());
        assert!(matches!(dev.read(), Err(Lsm6ds33Error::NotInitialized)));
    }

    #[test]
    fn test_invalid_configuration_touches_no_register() {
        let settings = ImuSettings {
            compass_z_mode: 4,
            ..ImuSettings::default()
        };
        let mut dev = device(mock_with_chips(), settings);
        assert_eq!(
            dev.init(),
            Err(Lsm6ds33Error::InvalidConfiguration {
                setting: Setting::CompassZMode,
                code: 4
            })
        );
        assert!(dev.interface.transactions().is_empty());
    }

    #[test]
    fn test_write_failure_names_register() {
        let mut mock = mock_with_chips();
        mock.fail_write(MAG, lis3mdl::CTRL_REG2);

        let mut dev = device(mock, ImuSettings::default());
        assert_eq!(
            dev.init(),
            Err(Lsm6ds33Error::BusTransaction {
                chip: Chip::Magnetometer,
                register: lis3mdl::CTRL_REG2
            })
        );
        assert!(!dev.is_initialized());
    }

    #[test]
    fn test_open_failure_aborts_before_writes() {
        let mut mock = mock_with_chips();
        mock.fail_open();

        let mut dev = device(mock, ImuSettings::default());
        assert_eq!(dev.init(), Err(Lsm6ds33Error::BusOpen));
        assert!(dev.interface.writes().is_empty());
    }

    #[test]
    fn test_fast_configuration_polls_at_minimum_interval() {
        let settings = ImuSettings::default()
            .with_accel(
                AccelSampleRate::Hz833,
                AccelFullScale::Fs2G,
                AccelBandwidth::Hz100,
            )
            .with_gyro(GyroSampleRate::Hz208, GyroFullScale::Fs245Dps);
        let dev = initialized(settings);
        assert_eq!(dev.sample_rate_hz(), 833);
        assert_eq!(dev.poll_interval_ms(), 1);
    }

    #[test]
    fn test_poll_interval_before_init_uses_baseline() {
        let dev = device(mock_with_chips(), ImuSettings::default());
        assert_eq!(dev.sample_rate_hz(), 100);
        assert_eq!(dev.poll_interval_ms(), 4);
    }

    #[test]
    fn test_status_zero_is_not_ready_without_data_reads() {
        let mut dev = initialized(ImuSettings::default());
        set_status(&mut dev, 0x00, 0x0F);

        assert_eq!(dev.read(), Ok(None));
        assert_eq!(
            dev.interface.reads(),
            vec![(AG, lsm6ds33::STATUS_REG), (MAG, lis3mdl::STATUS_REG)]
        );
    }

    #[test]
    fn test_magnetometer_not_ready_is_not_ready() {
        let mut dev = initialized(ImuSettings::default());
        set_status(&mut dev, 0x03, 0x08);

        assert_eq!(dev.read(), Ok(None));
        assert_eq!(dev.interface.reads().len(), 2);
    }

    #[test]
    fn test_ready_status_reads_all_groups() {
        let mut dev = initialized(ImuSettings::default());
        set_status(&mut dev, 0x01, 0x01);

        let sample = dev.read().unwrap().expect("muestra esperada");
        assert_eq!(sample.timestamp_us, 1234);
        assert_eq!(sample.validity, Validity::MOTION);
        // 2 estados + 3 grupos de 6 bytes
        assert_eq!(dev.interface.reads().len(), 2 + 18);
        assert_eq!(dev.interface.reads()[2], (AG, lsm6ds33::OUTX_L_G));
        assert_eq!(dev.interface.reads()[8], (AG, lsm6ds33::OUTX_L_XL));
        assert_eq!(dev.interface.reads()[14], (MAG, lis3mdl::OUT_X_L));
    }

    #[test]
    fn test_known_burst_converts_and_reorients() {
        let mut dev = initialized(ImuSettings::default());
        set_status(&mut dev, 0x03, 0x03);
        let burst = [0x00, 0x40, 0x00, 0x40, 0x00, 0x40];
        dev.interface.set_regs(AG, lsm6ds33::OUTX_L_G, &burst);
        dev.interface.set_regs(AG, lsm6ds33::OUTX_L_XL, &burst);
        dev.interface.set_regs(MAG, lis3mdl::OUT_X_L, &burst);

        let config = *dev.config().unwrap();
        let sample = dev.read().unwrap().unwrap();

        let g = 16384.0 * config.gyro.scale;
        let a = 16384.0 * config.accel.scale;
        let m = 16384.0 * config.compass.scale;
        assert_eq!(sample.gyro, [g, -g, -g]);
        assert_eq!(sample.accel, [-a, a, a]);
        assert_eq!(sample.compass, [m, -m, -m]);
        // ±8g: media escala son 4g
        assert_eq!(sample.accel[1], 4.0);
        // ±4 gauss: media escala son 200 unidades
        assert_eq!(sample.compass[0], 200.0);
    }

    #[test]
    fn test_data_read_failure_discards_cycle() {
        let mut dev = initialized(ImuSettings::default());
        set_status(&mut dev, 0x03, 0x03);
        dev.interface.fail_read(MAG, lis3mdl::OUT_X_L + 3);

        let mut delivered = Vec::new();
        let mut sink = |s: ImuSample| delivered.push(s);
        assert_eq!(
            dev.read_into(&mut sink),
            Err(Lsm6ds33Error::BusTransaction {
                chip: Chip::Magnetometer,
                register: lis3mdl::OUT_X_L + 3
            })
        );
        assert!(delivered.is_empty());
    }

    #[test]
    fn test_status_read_failure_is_transaction_failure() {
        let mut dev = initialized(ImuSettings::default());
        dev.interface.fail_read(AG, lsm6ds33::STATUS_REG);
        assert_eq!(
            dev.read(),
            Err(Lsm6ds33Error::BusTransaction {
                chip: Chip::AccelGyro,
                register: lsm6ds33::STATUS_REG
            })
        );
    }

    #[test]
    fn test_read_into_delivers_sample() {
        let mut dev = initialized(ImuSettings::default());
        let mut delivered = Vec::new();

        set_status(&mut dev, 0x00, 0x00);
        assert_eq!(dev.read_into(&mut |s: ImuSample| delivered.push(s)), Ok(false));

        set_status(&mut dev, 0x02, 0x02);
        assert_eq!(dev.read_into(&mut |s: ImuSample| delivered.push(s)), Ok(true));
        assert_eq!(delivered.len(), 1);
    }

    #[test]
    fn test_error_display_names_context() {
        let err = Lsm6ds33Error::InvalidConfiguration {
            setting: Setting::GyroSampleRate,
            code: 12,
        };
        let text = err.to_string();
        assert!(text.contains("Gyro"));
        assert!(text.contains("12"));
        assert_eq!(
            Lsm6ds33Error::DeviceNotFound(Chip::Magnetometer).to_string(),
            "LIS3MDL no detectado"
        );
    }
}
