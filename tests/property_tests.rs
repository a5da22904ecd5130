//! Property tests for hand geometry and the scheduler clock.

use embedded_graphics::{
    prelude::{Point, Size},
    primitives::Rectangle,
};
use outer_rim::geometry::{
    hands, hour_angle, minute_angle, point_at, ClockReading, LayoutParams, TRIG_MAX_ANGLE,
};
use outer_rim::{host::WallClock, Scheduler};
use proptest::prelude::*;

fn square(side: u32) -> Rectangle {
    Rectangle::new(Point::zero(), Size::new(side, side))
}

proptest! {
    #[test]
    fn hour_hand_creeps_forward_within_an_hour(hour in 0u8..12, minute in 0u8..59) {
        let a = hour_angle(hour, minute).raw();
        let b = hour_angle(hour, minute + 1).raw();
        prop_assert!(b > a);
        prop_assert!(a < TRIG_MAX_ANGLE);
    }

    #[test]
    fn hour_angle_wraps_every_twelve_hours(hour in 0u8..12, minute in 0u8..60) {
        prop_assert_eq!(hour_angle(hour, minute), hour_angle(hour + 12, minute));
    }

    #[test]
    fn hands_stay_inside_the_face(side in 40u32..400, secs in 0u32..86_400) {
        let layout = LayoutParams::from_bounds(square(side), 2);
        prop_assert!(layout.is_valid());

        let reading = ClockReading::from_seconds_of_day(secs);
        let h = hands(reading, &layout, true);
        let within = |p: Point, r: i32| {
            let d = p - layout.center;
            // +1 for rounding to the pixel grid.
            d.x * d.x + d.y * d.y <= (r + 1) * (r + 1)
        };
        prop_assert!(within(h.minute_start, layout.face_radius));
        prop_assert!(within(h.minute_end, layout.face_radius - layout.outer_hand_length));
        prop_assert!(within(h.hour_end, layout.inner_hand_length));
        prop_assert!(within(h.second_end.unwrap(), layout.second_hand_radius));
    }

    #[test]
    fn scheduler_clock_matches_elapsed_time(start in 0u32..86_400, elapsed_s in 0u64..200_000) {
        let mut s: Scheduler<1> = Scheduler::new(0, start);
        s.advance_to(elapsed_s * 1000);
        let expected = ClockReading::from_seconds_of_day(((start as u64 + elapsed_s) % 86_400) as u32);
        prop_assert_eq!(s.now(), expected);
    }
}

#[test]
fn minute_sixty_is_minute_zero() {
    assert_eq!(minute_angle(60), minute_angle(0));
}

#[test]
fn quarter_past_points_at_three_o_clock() {
    let center = Point::new(90, 90);
    assert_eq!(point_at(center, minute_angle(15), 88), Point::new(178, 90));
    assert_eq!(point_at(center, minute_angle(45), 88), Point::new(2, 90));
}
