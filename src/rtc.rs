// RTC driver for PCF85063A/PCF85063TP real-time clock chips.
// Datasheet: https://files.waveshare.com/wiki/common/Pcf85063atl1118-NdPQpTGE-loeW7GbZ7.pdf
//
// The face only needs time of day; the date is read so a corrupted register
// file can be told apart from a valid one.

use embedded_hal::i2c::I2c;

pub const PCF85063_ADDR: u8 = 0x51;
const REG_SECONDS: u8 = 0x04;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,  // full year, e.g., 2024
    pub month: u8,  // 1-12
    pub day: u8,    // 1-31
    pub hour: u8,   // 0-23
    pub minute: u8, // 0-59
    pub second: u8, // 0-59
}

impl DateTime {
    pub fn is_valid(&self) -> bool {
        (2020..=2099).contains(&self.year)
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

pub struct Pcf85063<I2C> {
    i2c: I2C,
}

impl<I2C, E> Pcf85063<I2C>
where
    I2C: I2c<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    // Returns (dt, vl_flag); vl_flag == true means the oscillator stopped (power loss).
    pub fn read_datetime(&mut self) -> Result<(DateTime, bool), E> {
        let mut buf = [0u8; 7];
        // sec, min, hour, day, weekday, month, year
        self.i2c.write_read(PCF85063_ADDR, &[REG_SECONDS], &mut buf)?;
        let vl = (buf[0] & 0x80) != 0;
        let dt = DateTime {
            year: 2000 + bcd_decode(buf[6]) as u16,
            month: bcd_decode(buf[5] & 0x1F),
            day: bcd_decode(buf[3] & 0x3F),
            hour: bcd_decode(buf[2] & 0x3F),
            minute: bcd_decode(buf[1] & 0x7F),
            second: bcd_decode(buf[0] & 0x7F),
        };
        Ok((dt, vl))
    }

    /// Time of day in seconds, or `None` when the chip lost power or holds garbage.
    pub fn seconds_of_day(&mut self) -> Result<Option<u32>, E> {
        let (dt, vl) = self.read_datetime()?;
        Ok((!vl && dt.is_valid()).then(|| dt.seconds_of_day()))
    }

    // Ignores the weekday field. Writing the seconds register clears the VL flag.
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), E> {
        let data = [
            REG_SECONDS,
            bcd_encode(dt.second),
            bcd_encode(dt.minute),
            bcd_encode(dt.hour),
            bcd_encode(dt.day),
            0,
            bcd_encode(dt.month),
            bcd_encode((dt.year % 100) as u8),
        ];
        self.i2c.write(PCF85063_ADDR, &data)
    }
}

fn bcd_decode(v: u8) -> u8 {
    (v & 0x0F) + ((v >> 4) * 10)
}

fn bcd_encode(v: u8) -> u8 {
    ((v / 10) << 4) | (v % 10)
}
