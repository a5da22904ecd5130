//! Minimal QMI8658 IMU bring-up.
//! The register values are conservative defaults for the Waveshare ESP32-S3
//! boards (QMI8658 on the touch I2C bus).

use embedded_hal::i2c;

pub const DEFAULT_I2C_ADDR: u8 = 0x6B; // AD0 pulled high on the Waveshare board
pub const ALT_I2C_ADDR: u8 = 0x6A;

const REG_WHO_AM_I: u8 = 0x00;
const REG_CTRL1: u8 = 0x02; // accel config
const REG_CTRL2: u8 = 0x03; // gyro config
const REG_CTRL7: u8 = 0x08; // power / enable
const REG_CTRL8: u8 = 0x09; // reset/power settings
const REG_ACC_START: u8 = 0x35; // AX_L .. GZ_H

// Some revisions report 0x05, others 0x0F.
const WHO_AM_I_IDS: [u8; 2] = [0x05, 0x0F];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImuSample {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

impl ImuSample {
    #[inline]
    pub fn accel_mag_sq(&self) -> i64 {
        mag_sq(&self.accel)
    }

    #[inline]
    pub fn gyro_mag_sq(&self) -> i64 {
        mag_sq(&self.gyro)
    }
}

fn mag_sq(v: &[i16; 3]) -> i64 {
    v.iter().map(|&c| (c as i64) * (c as i64)).sum()
}

#[derive(Debug, PartialEq, Eq)]
pub enum ImuError<E> {
    Bus(E),
    BadWhoAmI(u8),
}

impl<E> From<E> for ImuError<E> {
    fn from(e: E) -> Self {
        ImuError::Bus(e)
    }
}

/// Return the first address in `candidates` that answers a WHO_AM_I read.
pub fn probe<I2C: i2c::I2c>(bus: &mut I2C, candidates: &[u8]) -> Option<u8> {
    candidates.iter().copied().find(|&addr| {
        let mut who = [0u8];
        bus.write_read(addr, &[REG_WHO_AM_I], &mut who).is_ok()
    })
}

pub struct Qmi8658<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Qmi8658<I2C>
where
    I2C: i2c::I2c,
{
    pub fn new(i2c: I2C, address: u8) -> Result<Self, ImuError<I2C::Error>> {
        let mut this = Self { i2c, address };
        this.init()?;
        Ok(this)
    }

    pub fn who_am_i(&mut self) -> Result<u8, ImuError<I2C::Error>> {
        self.read_reg(REG_WHO_AM_I)
    }

    fn init(&mut self) -> Result<(), ImuError<I2C::Error>> {
        let who = self.who_am_i()?;
        if !WHO_AM_I_IDS.contains(&who) {
            return Err(ImuError::BadWhoAmI(who));
        }

        // Soft reset and clear low-power.
        self.write_reg(REG_CTRL8, 0x10)?;
        // Accelerometer: +/-8g, ~1 kHz ODR
        self.write_reg(REG_CTRL1, 0x60)?;
        // Gyro: +/-512 dps, ~1 kHz ODR
        self.write_reg(REG_CTRL2, 0x64)?;
        // Enable accel + gyro
        self.write_reg(REG_CTRL7, 0x03)?;

        Ok(())
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), ImuError<I2C::Error>> {
        self.i2c
            .write(self.address, &[reg, val])
            .map_err(ImuError::Bus)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, ImuError<I2C::Error>> {
        let mut out = [0u8];
        self.i2c
            .write_read(self.address, &[reg], &mut out)
            .map_err(ImuError::Bus)?;
        Ok(out[0])
    }

    pub fn read_sample(&mut self) -> Result<ImuSample, ImuError<I2C::Error>> {
        let mut buf = [0u8; 12];
        self.i2c
            .write_read(self.address, &[REG_ACC_START], &mut buf)
            .map_err(ImuError::Bus)?;

        let word = |i: usize| i16::from_le_bytes([buf[2 * i], buf[2 * i + 1]]);
        Ok(ImuSample {
            accel: [word(0), word(1), word(2)],
            gyro: [word(3), word(4), word(5)],
        })
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeBus;
    use super::*;

    #[test]
    fn init_configures_accel_and_gyro() {
        let mut bus = FakeBus::new(DEFAULT_I2C_ADDR);
        bus.regs[REG_WHO_AM_I as usize] = 0x05;

        let imu = Qmi8658::new(bus, DEFAULT_I2C_ADDR).unwrap();
        let bus = imu.into_inner();
        assert_eq!(
            bus.writes,
            [(REG_CTRL8, 0x10), (REG_CTRL1, 0x60), (REG_CTRL2, 0x64), (REG_CTRL7, 0x03)]
        );
    }

    #[test]
    fn unknown_chip_is_rejected() {
        let mut bus = FakeBus::new(DEFAULT_I2C_ADDR);
        bus.regs[REG_WHO_AM_I as usize] = 0x42;
        assert!(matches!(
            Qmi8658::new(bus, DEFAULT_I2C_ADDR),
            Err(ImuError::BadWhoAmI(0x42))
        ));
    }

    #[test]
    fn sample_is_little_endian() {
        let mut bus = FakeBus::new(DEFAULT_I2C_ADDR);
        bus.regs[REG_WHO_AM_I as usize] = 0x0F;
        let words: [i16; 6] = [1000, -2, 300, -4000, 5, 32767];
        for (i, w) in words.iter().enumerate() {
            let [lo, hi] = w.to_le_bytes();
            bus.regs[REG_ACC_START as usize + 2 * i] = lo;
            bus.regs[REG_ACC_START as usize + 2 * i + 1] = hi;
        }

        let mut imu = Qmi8658::new(bus, DEFAULT_I2C_ADDR).unwrap();
        let s = imu.read_sample().unwrap();
        assert_eq!(s.accel, [1000, -2, 300]);
        assert_eq!(s.gyro, [-4000, 5, 32767]);
        assert_eq!(s.accel_mag_sq(), 1_000_000 + 4 + 90_000);
    }

    #[test]
    fn probe_finds_alternate_address() {
        let mut bus = FakeBus::new(ALT_I2C_ADDR);
        assert_eq!(probe(&mut bus, &[DEFAULT_I2C_ADDR, ALT_I2C_ADDR]), Some(ALT_I2C_ADDR));
        assert_eq!(probe(&mut bus, &[DEFAULT_I2C_ADDR]), None);
    }
}
