//! Outer Rim watch face firmware
//! ========================================
//! source ~/export-esp.sh
//! cargo run --release --features esp32s3
//! ========================================
//!
//! Draws the analog face on the GC9A01 panel. Ticks once a minute; a tap on
//! the case shows the second hand for a few seconds.

//% CHIPS: esp32s3
//% FEATURES: esp-hal/unstable

#![no_std]
#![no_main]

// Application descriptor checked by the bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

use core::cell::RefCell;

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use embedded_hal_bus::i2c::RefCellDevice;
use esp_backtrace as _;
use esp_hal::{
    i2c::master::{Config as I2cConfig, I2c},
    main, ram,
    time::Rate,
    timer::systimer::{SystemTimer, Unit},
    Config,
};
use log::{info, warn};

use outer_rim::{
    display::{setup_display, GraphicsCanvas, RESOLUTION},
    face::{FaceOptions, WatchFace},
    host::HostEvent,
    motion::TapDetector,
    qmi8658::{self, Qmi8658, ALT_I2C_ADDR, DEFAULT_I2C_ADDR},
    rtc::{DateTime, Pcf85063},
    scheduler::Scheduler,
    wiring::{init_board_pins, BoardPins},
};

#[ram]
static mut DISPLAY_BUF: [u8; 1024] = [0; 1024];

const IMU_POLL_MS: u64 = 20;
const RTC_RESET: DateTime = DateTime {
    year: 2025,
    month: 1,
    day: 1,
    hour: 0,
    minute: 0,
    second: 0,
};
// Superseded timers stay queued until they fire; a 3 s window with a 160 ms
// tap cooldown leaves at most 19 in flight.
const TIMER_SLOTS: usize = 24;

fn now_ms() -> u64 {
    let t = SystemTimer::unit_value(Unit::Unit0);
    t.saturating_mul(1000) / SystemTimer::ticks_per_second()
}

#[main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(Config::default());
    let BoardPins { display, sensors } = init_board_pins(peripherals);

    // IMU and RTC share I2C0.
    let i2c = I2c::new(
        sensors.i2c0,
        I2cConfig::default().with_frequency(Rate::from_khz(400)),
    )
    .expect("I2C config rejected")
    .with_sda(sensors.sda)
    .with_scl(sensors.scl);
    let bus = RefCell::new(i2c);

    let mut rtc = Pcf85063::new(RefCellDevice::new(&bus));
    let seconds_of_day = match rtc.seconds_of_day() {
        Ok(Some(secs)) => secs,
        Ok(None) => {
            warn!("RTC lost power, restarting it from 00:00:00");
            // Restarts the oscillator and clears the voltage-low flag.
            if let Err(e) = rtc.set_datetime(&RTC_RESET) {
                warn!("RTC write failed: {:?}", e);
            }
            0
        }
        Err(e) => {
            warn!("RTC read failed: {:?}", e);
            0
        }
    };

    let mut imu = {
        let mut dev = RefCellDevice::new(&bus);
        match qmi8658::probe(&mut dev, &[DEFAULT_I2C_ADDR, ALT_I2C_ADDR]) {
            Some(addr) => match Qmi8658::new(dev, addr) {
                Ok(imu) => {
                    info!("QMI8658 at 0x{:02X}", addr);
                    Some(imu)
                }
                Err(e) => {
                    warn!("QMI8658 init failed: {:?}", e);
                    None
                }
            },
            None => {
                warn!("no IMU answered; taps disabled");
                None
            }
        }
    };
    let mut taps = TapDetector::default_rough();

    // Safe because DISPLAY_BUF is only borrowed here.
    let mut panel = setup_display(display, unsafe { &mut *core::ptr::addr_of_mut!(DISPLAY_BUF) });
    let bounds = Rectangle::new(Point::zero(), Size::new(RESOLUTION, RESOLUTION));

    let services: Scheduler<TIMER_SLOTS> = Scheduler::new(now_ms(), seconds_of_day);
    let mut face = WatchFace::attach(bounds, FaceOptions::default(), services);
    info!("face attached, {:?}", face.layout());

    let mut next_imu_poll = 0u64;
    loop {
        let now = now_ms();
        face.services_mut().advance_to(now);
        while let Some(event) = face.services_mut().poll() {
            face.dispatch(event);
        }

        if now >= next_imu_poll {
            next_imu_poll = now + IMU_POLL_MS;
            if let Some(imu) = imu.as_mut() {
                match imu.read_sample() {
                    Ok(sample) => {
                        if let Some(tap) = taps.update(now, &sample) {
                            face.dispatch(HostEvent::Motion(tap));
                        }
                    }
                    Err(e) => warn!("IMU read failed: {:?}", e),
                }
            }
        }

        if face.is_dirty() && face.redraw(&mut GraphicsCanvas::new(&mut panel)).is_err() {
            warn!("panel write failed");
        }
    }
}
