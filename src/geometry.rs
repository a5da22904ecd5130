//! Hand geometry for the analog face.
//!
//! This module provides:
//! - `Angle`, an integer fraction of a full turn (`TRIG_MAX_ANGLE` units per turn)
//! - `ClockReading` and `LayoutParams`, the inputs of a frame
//! - `hands`, which maps a reading and a layout to the points the face draws
//!
//! Angle 0 points up and angles grow clockwise, so a point at `angle` and `radius`
//! from the center is `(sin * r + cx, -cos * r + cy)`. Everything here is pure.

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};

/// Units per full turn in the angular-fraction representation.
pub const TRIG_MAX_ANGLE: u32 = 0x1_0000;

const SECONDS_PER_DAY: u32 = 86_400;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Angle(u32);

impl Angle {
    /// `num / den` of a full turn, reduced modulo one turn.
    pub const fn from_turns(num: u32, den: u32) -> Self {
        let raw = (TRIG_MAX_ANGLE as u64 * num as u64) / den as u64;
        Angle((raw % TRIG_MAX_ANGLE as u64) as u32)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn radians(self) -> f32 {
        self.0 as f32 * (core::f32::consts::TAU / TRIG_MAX_ANGLE as f32)
    }
}

/// Wall-clock time as the face sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ClockReading {
    pub hour: u8,   // 0-11
    pub minute: u8, // 0-59
    pub second: u8, // 0-59
}

impl ClockReading {
    /// Hour may be given on a 24h clock; it is reduced to hour-of-12.
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        debug_assert!(minute < 60, "minute out of range: {minute}");
        debug_assert!(second < 60, "second out of range: {second}");
        Self {
            hour: hour % 12,
            minute,
            second,
        }
    }

    pub fn from_seconds_of_day(secs: u32) -> Self {
        let secs = secs % SECONDS_PER_DAY;
        Self::new(
            (secs / 3600) as u8,
            ((secs / 60) % 60) as u8,
            (secs % 60) as u8,
        )
    }
}

/// Per-session layout, derived once from the display bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutParams {
    pub center: Point,
    pub face_radius: i32,
    pub second_hand_radius: i32,
    pub inner_radius: i32,
    pub inner_dot: i32,
    pub outer_hand_length: i32,
    pub inner_hand_length: i32,
}

impl LayoutParams {
    pub fn from_bounds(bounds: Rectangle, margin: i32) -> Self {
        let Size { width, height } = bounds.size;
        let center = bounds.top_left + Point::new((width / 2) as i32, (height / 2) as i32);

        let face_radius = (width / 2) as i32 - margin;
        let inner_radius = face_radius / 5;

        let layout = Self {
            center,
            face_radius,
            second_hand_radius: face_radius * 6 / 10,
            inner_radius,
            inner_dot: inner_radius / 3,
            outer_hand_length: face_radius / 2,
            inner_hand_length: face_radius / 2 + inner_radius,
        };
        debug_assert!(layout.is_valid(), "degenerate layout: {layout:?}");
        layout
    }

    /// Radii strictly positive and ordered, hand lengths inside the face.
    pub fn is_valid(&self) -> bool {
        self.inner_dot > 0
            && self.inner_dot < self.inner_radius
            && self.inner_radius < self.face_radius
            && self.second_hand_radius > 0
            && self.second_hand_radius <= self.face_radius
            && self.outer_hand_length > 0
            && self.outer_hand_length <= self.face_radius
            && self.inner_hand_length > 0
            && self.inner_hand_length <= self.face_radius
    }
}

/// Points for one frame. Dropped once the frame is drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HandGeometry {
    pub minute_start: Point,
    pub minute_end: Point,
    pub hour_end: Point,
    pub second_end: Option<Point>,
}

pub fn minute_angle(minute: u8) -> Angle {
    Angle::from_turns(minute as u32, 60)
}

pub fn second_angle(second: u8) -> Angle {
    Angle::from_turns(second as u32, 60)
}

/// Hour sector plus `minute / 60` of one twelfth of a turn.
pub fn hour_angle(hour: u8, minute: u8) -> Angle {
    Angle::from_turns((hour as u32 % 12) * 60 + minute as u32, 12 * 60)
}

pub fn point_at(center: Point, angle: Angle, radius: i32) -> Point {
    let rad = angle.radians();
    let r = radius as f32;
    Point::new(
        libm::roundf(libm::sinf(rad) * r) as i32 + center.x,
        libm::roundf(-libm::cosf(rad) * r) as i32 + center.y,
    )
}

pub fn hands(reading: ClockReading, layout: &LayoutParams, with_seconds: bool) -> HandGeometry {
    let center = layout.center;

    let min = minute_angle(reading.minute);
    let minute_start = point_at(center, min, layout.face_radius);
    let minute_end = point_at(center, min, layout.face_radius - layout.outer_hand_length);

    let hour_end = point_at(
        center,
        hour_angle(reading.hour, reading.minute),
        layout.inner_hand_length,
    );

    let second_end = with_seconds
        .then(|| point_at(center, second_angle(reading.second), layout.second_hand_radius));

    HandGeometry {
        minute_start,
        minute_end,
        hour_end,
        second_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_180() -> LayoutParams {
        LayoutParams::from_bounds(Rectangle::new(Point::zero(), Size::new(180, 180)), 2)
    }

    #[test]
    fn layout_from_180_square() {
        let l = layout_180();
        assert_eq!(l.center, Point::new(90, 90));
        assert_eq!(l.face_radius, 88);
        assert_eq!(l.second_hand_radius, 52);
        assert_eq!(l.inner_radius, 17);
        assert_eq!(l.inner_dot, 5);
        assert_eq!(l.outer_hand_length, 44);
        assert_eq!(l.inner_hand_length, 61);
        assert!(l.is_valid());
    }

    #[test]
    fn layout_respects_bounds_origin() {
        let l = LayoutParams::from_bounds(Rectangle::new(Point::new(10, 20), Size::new(144, 168)), 2);
        assert_eq!(l.center, Point::new(82, 104));
        assert_eq!(l.face_radius, 70);
    }

    #[test]
    fn invalid_layout_is_detected() {
        let mut l = layout_180();
        l.inner_dot = l.inner_radius;
        assert!(!l.is_valid());

        let mut l = layout_180();
        l.inner_hand_length = l.face_radius + 1;
        assert!(!l.is_valid());
    }

    #[test]
    fn quarter_past_points_at_three() {
        let center = Point::new(90, 90);
        let angle = minute_angle(15);
        assert_eq!(angle.raw(), TRIG_MAX_ANGLE / 4);
        assert_eq!(point_at(center, angle, 88), Point::new(178, 90));
    }

    #[test]
    fn cardinal_points() {
        let c = Point::new(50, 50);
        assert_eq!(point_at(c, minute_angle(0), 10), Point::new(50, 40));
        assert_eq!(point_at(c, minute_angle(30), 10), Point::new(50, 60));
        assert_eq!(point_at(c, minute_angle(45), 10), Point::new(40, 50));
    }

    #[test]
    fn three_o_clock_frame() {
        let l = layout_180();
        let h = hands(ClockReading::new(3, 0, 0), &l, false);
        assert_eq!(h.minute_start, Point::new(90, 2));
        assert_eq!(h.minute_end, Point::new(90, 46));
        assert_eq!(h.hour_end, Point::new(151, 90));
        assert_eq!(h.second_end, None);
    }

    #[test]
    fn second_hand_only_when_asked() {
        let l = layout_180();
        let h = hands(ClockReading::new(10, 10, 30), &l, true);
        assert_eq!(h.second_end, Some(Point::new(90, 142)));
    }

    #[test]
    fn hour_creeps_with_minutes() {
        assert_eq!(hour_angle(3, 30), Angle::from_turns(7, 24));
        assert!(hour_angle(3, 59) < hour_angle(4, 0));
        assert_eq!(hour_angle(15, 20), hour_angle(3, 20));
    }

    #[test]
    fn reading_from_seconds_of_day() {
        let r = ClockReading::from_seconds_of_day(15 * 3600 + 4 * 60 + 5);
        assert_eq!(r, ClockReading { hour: 3, minute: 4, second: 5 });
        assert_eq!(ClockReading::from_seconds_of_day(86_400), ClockReading::default());
    }
}
