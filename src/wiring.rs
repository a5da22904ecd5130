// Board pin mapping for the Waveshare ESP32-S3 1.28" round board.
//! The following wiring is assumed:
//! - LCD SCK  => GPIO10 (SPI2)
//! - LCD MOSI => GPIO11 (SPI2)
//! - LCD CS   => GPIO9
//! - LCD DC   => GPIO8
//! - LCD RST  => GPIO14
//! - LCD BL   => GPIO2
//! - I2C SDA  => GPIO6 (QMI8658 IMU, PCF85063 RTC)
//! - I2C SCL  => GPIO7

use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{Peripherals, GPIO10, GPIO11, GPIO6, GPIO7, I2C0, SPI2};

pub struct DisplayPins<'a> {
    pub spi2: SPI2<'a>,
    pub spi_sck: GPIO10<'a>,
    pub spi_mosi: GPIO11<'a>,
    pub lcd_cs: Output<'a>,
    pub lcd_dc: Output<'a>,
    pub lcd_rst: Output<'a>,
    pub lcd_bl: Output<'a>,
}

pub struct SensorPins<'a> {
    pub i2c0: I2C0<'a>,
    pub sda: GPIO6<'a>,
    pub scl: GPIO7<'a>,
}

pub struct BoardPins<'a> {
    pub display: DisplayPins<'a>,
    pub sensors: SensorPins<'a>,
}

pub fn init_board_pins(p: Peripherals) -> BoardPins<'static> {
    // LCD control pins; GPIO10/11 stay raw for the SPI peripheral.
    let lcd_cs = Output::new(p.GPIO9, Level::High, OutputConfig::default());
    let lcd_dc = Output::new(p.GPIO8, Level::Low, OutputConfig::default());
    let lcd_rst = Output::new(p.GPIO14, Level::High, OutputConfig::default());
    let lcd_bl = Output::new(p.GPIO2, Level::Low, OutputConfig::default());

    BoardPins {
        display: DisplayPins {
            spi2: p.SPI2,
            spi_sck: p.GPIO10,
            spi_mosi: p.GPIO11,
            lcd_cs,
            lcd_dc,
            lcd_rst,
            lcd_bl,
        },
        sensors: SensorPins {
            i2c0: p.I2C0,
            sda: p.GPIO6,
            scl: p.GPIO7,
        },
    }
}
