//! Motion events and a tap detector that produces them from raw IMU samples.

use crate::qmi8658::ImuSample;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

/// A qualifying motion, delivered by whatever motion source the host has.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotionEvent {
    pub axis: Axis,
    pub direction: Direction,
}

/// Flags sharp acceleration spikes (a wrist flick or a tap on the case).
///
/// A sample counts when its magnitude clears `threshold`, it rose by at least
/// `rise` since the previous sample, the gyro is quiet enough (unless the spike
/// is very large), the previous sample was not near zero-g, and the last hit is
/// older than the cooldown. The event carries the dominant axis and its sign.
pub struct TapDetector {
    threshold_sq: i64,
    rise_threshold_sq: i64,
    freefall_sq: i64,
    gyro_limit_sq: i64,
    cooldown_ms: u32,
    last_mag_sq: i64,
    last_freefall: bool,
    last_trigger_ms: Option<u64>,
}

impl TapDetector {
    pub fn new(threshold_raw: i32, rise_raw: i32, gyro_limit_raw: i32, freefall_raw: i32, cooldown_ms: u32) -> Self {
        let sq = |v: i32| (v as i64) * (v as i64);
        Self {
            threshold_sq: sq(threshold_raw),
            rise_threshold_sq: sq(rise_raw),
            freefall_sq: sq(freefall_raw),
            gyro_limit_sq: sq(gyro_limit_raw),
            cooldown_ms,
            last_mag_sq: 0,
            last_freefall: false,
            last_trigger_ms: None,
        }
    }

    /// Raw units for ~1000 counts per g (+/-8g range): ~1.8g threshold, ~0.7g rise.
    pub fn default_rough() -> Self {
        Self::new(1_800, 700, 60_000, 200, 160)
    }

    pub fn update(&mut self, now_ms: u64, sample: &ImuSample) -> Option<MotionEvent> {
        let mag_sq = sample.accel_mag_sq();
        let gyro_sq = sample.gyro_mag_sq();

        let in_cooldown = self
            .last_trigger_ms
            .is_some_and(|t| now_ms.saturating_sub(t) < self.cooldown_ms as u64);

        // A spike straight after near zero-g is a drop landing, not a tap.
        let freefall_guard = self.last_freefall;
        self.last_freefall = mag_sq < self.freefall_sq;

        let rising_fast = mag_sq.saturating_sub(self.last_mag_sq) >= self.rise_threshold_sq;
        self.last_mag_sq = mag_sq;

        let gyro_ok = mag_sq > self.threshold_sq.saturating_mul(4) || gyro_sq < self.gyro_limit_sq;

        let hit = !in_cooldown && !freefall_guard && mag_sq >= self.threshold_sq && rising_fast && gyro_ok;
        if !hit {
            return None;
        }

        self.last_trigger_ms = Some(now_ms);
        Some(dominant_axis(sample))
    }
}

fn dominant_axis(sample: &ImuSample) -> MotionEvent {
    let [x, y, z] = sample.accel.map(|v| v as i32);
    let (axis, value) = [(Axis::X, x), (Axis::Y, y), (Axis::Z, z)]
        .into_iter()
        .fold((Axis::X, 0i32), |best, cur| if cur.1.abs() > best.1.abs() { cur } else { best });

    let direction = if value < 0 {
        Direction::Negative
    } else {
        Direction::Positive
    };
    MotionEvent { axis, direction }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(accel: [i16; 3]) -> ImuSample {
        ImuSample { accel, gyro: [0; 3] }
    }

    const REST: [i16; 3] = [0, 0, 1000];

    #[test]
    fn resting_wrist_stays_quiet() {
        let mut d = TapDetector::default_rough();
        for t in 0..50 {
            assert_eq!(d.update(t * 10, &sample(REST)), None);
        }
    }

    #[test]
    fn spike_reports_dominant_axis() {
        let mut d = TapDetector::default_rough();
        d.update(0, &sample(REST));
        let ev = d.update(10, &sample([-2500, 100, 1000]));
        assert_eq!(
            ev,
            Some(MotionEvent {
                axis: Axis::X,
                direction: Direction::Negative
            })
        );
    }

    #[test]
    fn vertical_knock_reports_z_axis() {
        let mut d = TapDetector::default_rough();
        d.update(0, &sample(REST));
        let ev = d.update(10, &sample([300, -200, -2900]));
        assert_eq!(
            ev,
            Some(MotionEvent {
                axis: Axis::Z,
                direction: Direction::Negative
            })
        );
    }

    #[test]
    fn cooldown_swallows_ringing() {
        let mut d = TapDetector::default_rough();
        d.update(0, &sample(REST));
        assert!(d.update(10, &sample([0, 2600, 1000])).is_some());
        d.update(20, &sample(REST));
        assert!(d.update(60, &sample([0, 2600, 1000])).is_none());
        d.update(300, &sample(REST));
        assert!(d.update(310, &sample([0, 2600, 1000])).is_some());
    }

    #[test]
    fn landing_after_freefall_is_ignored() {
        let mut d = TapDetector::default_rough();
        d.update(0, &sample([0, 0, 0]));
        assert!(d.update(10, &sample([0, 0, 3000])).is_none());
    }

    #[test]
    fn slow_tilt_is_not_a_tap() {
        let mut d = TapDetector::default_rough();
        d.update(0, &sample(REST));
        assert!(d.update(10, &sample([0, 1200, 1000])).is_none());
        assert!(d.update(20, &sample([0, 1400, 1000])).is_none());
        // Above threshold but barely rising.
        assert!(d.update(30, &sample([0, 1500, 1000])).is_none());
    }

    #[test]
    fn spinning_wrist_needs_a_bigger_spike() {
        let mut d = TapDetector::new(1_800, 700, 20_000, 200, 160);
        d.update(0, &sample(REST));
        let spin = ImuSample {
            accel: [0, 0, 2500],
            gyro: [20_000, 20_000, 0],
        };
        assert!(d.update(10, &spin).is_none());
    }
}
