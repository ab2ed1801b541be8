use lsm6ds33::{self, GyroFullScale, GyroSampleRate, ImuSettings};
use linux_embedded_hal::{Delay, I2cdev};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread;
use std::time::Duration;

fn main() {
    println!("LSM6DS33 + LIS3MDL - Ejemplo básico");

    // Flag para controlar la ejecución del programa
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Configurar el manejador para Ctrl+C
    ctrlc::set_handler(move || {
        println!("\nDeteniendo el programa...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error al configurar el manejador de Ctrl+C");

    // Crear instancia de I2C para Linux
    let i2c = match I2cdev::new("/dev/i2c-1") {
        Ok(i2c) => i2c,
        Err(e) => {
            eprintln!("Error al abrir dispositivo I2C: {:?}", e);
            return;
        }
    };

    let settings =
        ImuSettings::default().with_gyro(GyroSampleRate::Hz208, GyroFullScale::Fs1000Dps);
    let mut device = lsm6ds33::new_i2c_device(i2c, Delay {}, settings);

    // Inicializar el dispositivo
    if let Err(e) = device.init() {
        eprintln!("Error al inicializar el dispositivo: {}", e);
        return;
    }
    println!(
        "{} inicializado: {} Hz, sondeo cada {} ms",
        device.name(),
        device.sample_rate_hz(),
        device.poll_interval_ms()
    );

    // Leer datos continuamente hasta que se presione Ctrl+C
    println!("Leyendo datos. Presiona Ctrl+C para detener...");
    let interval = Duration::from_millis(device.poll_interval_ms() as u64);

    while running.load(Ordering::SeqCst) {
        match device.read() {
            Ok(Some(sample)) => {
                println!(
                    "[{}] Giroscopio: x={:.3} y={:.3} z={:.3} rad/s",
                    sample.timestamp_us, sample.gyro[0], sample.gyro[1], sample.gyro[2]
                );
                println!(
                    "Aceleración: x={:.3}G, y={:.3}G, z={:.3}G",
                    sample.accel[0], sample.accel[1], sample.accel[2]
                );
                println!(
                    "Magnetómetro: x={:.2}µT, y={:.2}µT, z={:.2}µT",
                    sample.compass[0], sample.compass[1], sample.compass[2]
                );
            }
            // Sin datos nuevos: se vuelve a sondear en el siguiente intervalo
            Ok(None) => {}
            Err(e) => eprintln!("Error de lectura: {}", e),
        }
        thread::sleep(interval);
    }

    println!("Ejemplo finalizado");
}
