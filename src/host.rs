//! Services the face consumes from its host.
//!
//! The face never talks to hardware or an OS directly. The host hands it a
//! bundle implementing `TickService`, `TimerService` and `WallClock`, routes
//! `HostEvent`s into `WatchFace::dispatch`, and lends it a `Canvas` to redraw.

use core::fmt;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::Point,
    primitives::Rectangle,
};

use crate::geometry::ClockReading;
use crate::motion::MotionEvent;

/// Tick granularity.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
}

impl TimeUnit {
    pub const fn millis(self) -> u64 {
        match self {
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
        }
    }
}

/// Identifies one arming of the one-shot timer.
pub type TimerToken = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    Tick(TimeUnit),
    Motion(MotionEvent),
    Timeout(TimerToken),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The tick source refused the subscription.
    TickUnavailable,
    /// No room left to hold another pending timer.
    TimerQueueFull,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TickUnavailable => write!(f, "tick subscription unavailable"),
            Self::TimerQueueFull => write!(f, "timer queue full"),
        }
    }
}

/// Periodic tick source. One subscription at a time; subscribing again
/// replaces the previous one.
pub trait TickService {
    fn subscribe(&mut self, unit: TimeUnit) -> Result<(), HostError>;
    fn unsubscribe(&mut self);
}

/// One-shot delayed callbacks. There is no cancellation: the host delivers
/// `HostEvent::Timeout(token)` once at least `delay_ms` has elapsed.
pub trait TimerService {
    fn arm(&mut self, delay_ms: u32, token: TimerToken) -> Result<(), HostError>;
}

pub trait WallClock {
    fn now(&self) -> ClockReading;
}

/// Everything a `WatchFace` owns from its host.
pub trait FaceServices: TickService + TimerService + WallClock {}

impl<T: TickService + TimerService + WallClock> FaceServices for T {}

/// Drawing surface for one redraw. Commands issued during a redraw are
/// presented together by the host.
pub trait Canvas {
    type Error;

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), Self::Error>;

    fn draw_circle(
        &mut self,
        center: Point,
        radius: i32,
        color: Rgb565,
        stroke_width: u32,
    ) -> Result<(), Self::Error>;

    fn fill_circle(&mut self, center: Point, radius: i32, color: Rgb565) -> Result<(), Self::Error>;

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgb565,
        stroke_width: u32,
    ) -> Result<(), Self::Error>;
}
