//! The analog face: layout, transient seconds mode and redraw.
//!
//! This module provides:
//! - `FaceOptions`, the compile-time knobs (margin, motion-triggered seconds, window length)
//! - `Visibility`, the two-state mode machine
//! - `WatchFace`, which owns the host services, reacts to ticks, motion and timeouts,
//!   and redraws through any `Canvas`
//!
//! Minute ticks keep the face current in the normal mode. A motion event shows a
//! second hand and switches to second ticks for `seconds_window_ms`; every new
//! motion event restarts that window. Timers cannot be cancelled, so each arming
//! carries a fresh token and only the latest token may end the window.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::RgbColor,
    primitives::Rectangle,
};
use log::{debug, warn};

use crate::geometry::{self, LayoutParams};
use crate::host::{Canvas, FaceServices, HostEvent, TimeUnit, TimerToken};
use crate::motion::MotionEvent;

/// Face colours.
pub mod palette {
    use super::*;

    pub const FACE_BACKGROUND: Rgb565 = Rgb565::BLACK;
    pub const CIRCLE: Rgb565 = Rgb565::WHITE;
    pub const SECOND_HAND_CIRCLE: Rgb565 = Rgb565::RED;
    pub const OUTER_HAND: Rgb565 = Rgb565::WHITE;
    pub const SECOND_HAND: Rgb565 = Rgb565::BLACK;
    // #FF55AA
    pub const INNER_CIRCLE: Rgb565 = Rgb565::new(31, 21, 21);
    pub const INNER_HAND: Rgb565 = INNER_CIRCLE;
    // #555555
    pub const INNER_DOT: Rgb565 = Rgb565::new(10, 21, 10);
}

const CIRCLE_STROKE: u32 = 1;
const HAND_STROKE: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FaceOptions {
    /// Gap between the face circle and the edge of the display.
    pub margin: i32,
    /// Show a second hand for a while after a motion event.
    pub motion_seconds: bool,
    pub seconds_window_ms: u32,
}

impl Default for FaceOptions {
    fn default() -> Self {
        Self {
            margin: 2,
            motion_seconds: true,
            seconds_window_ms: 3000,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Normal,
    ShowingSeconds,
}

impl Visibility {
    fn tick_unit(self) -> TimeUnit {
        match self {
            Visibility::Normal => TimeUnit::Minute,
            Visibility::ShowingSeconds => TimeUnit::Second,
        }
    }
}

pub struct WatchFace<S> {
    services: S,
    bounds: Rectangle,
    layout: LayoutParams,
    options: FaceOptions,
    visibility: Visibility,
    active_ticks: Option<TimeUnit>,
    // Token of the timer allowed to end the seconds window.
    current_token: TimerToken,
    dirty: bool,
}

impl<S: FaceServices> WatchFace<S> {
    /// Build the face for a display with the given bounds and start minute ticks.
    pub fn attach(bounds: Rectangle, options: FaceOptions, services: S) -> Self {
        let layout = LayoutParams::from_bounds(bounds, options.margin);
        debug!("face attached: {:?}", layout);

        let mut face = Self {
            services,
            bounds,
            layout,
            options,
            visibility: Visibility::Normal,
            active_ticks: None,
            current_token: 0,
            dirty: true,
        };
        face.sync_ticks();
        face
    }

    /// Drop the tick subscription and give the services back to the host.
    pub fn detach(mut self) -> S {
        if self.active_ticks.take().is_some() {
            self.services.unsubscribe();
        }
        self.services
    }

    pub fn layout(&self) -> &LayoutParams {
        &self.layout
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn active_ticks(&self) -> Option<TimeUnit> {
        self.active_ticks
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    /// For the host loop: advancing time and polling events on the services.
    pub fn services_mut(&mut self) -> &mut S {
        &mut self.services
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Tick(unit) => self.on_tick(unit),
            HostEvent::Motion(ev) => self.on_motion(ev),
            HostEvent::Timeout(token) => self.on_timeout(token),
        }
    }

    pub fn on_tick(&mut self, _unit: TimeUnit) {
        self.dirty = true;
        self.sync_ticks();
    }

    pub fn on_motion(&mut self, event: MotionEvent) {
        if !self.options.motion_seconds {
            self.sync_ticks();
            return;
        }

        let was_showing = self.visibility == Visibility::ShowingSeconds;
        if was_showing {
            debug!("motion {:?}: seconds window restarted", event);
        } else {
            debug!("motion {:?}: showing seconds", event);
        }
        self.visibility = Visibility::ShowingSeconds;
        self.dirty = true;
        self.sync_ticks();

        let previous = self.current_token;
        self.current_token = previous.wrapping_add(1);
        if let Err(e) = self.services.arm(self.options.seconds_window_ms, self.current_token) {
            if was_showing {
                // The pending timer still ends the window; it just is not extended.
                warn!("cannot extend seconds window: {}", e);
                self.current_token = previous;
            } else {
                // Nothing would ever end the window.
                warn!("cannot arm seconds timer: {}", e);
                self.revert();
            }
        }
    }

    pub fn on_timeout(&mut self, token: TimerToken) {
        self.sync_ticks();
        if token != self.current_token {
            debug!("timer {} superseded by {}", token, self.current_token);
            return;
        }
        if self.visibility == Visibility::Normal {
            return;
        }
        debug!("seconds window over");
        self.revert();
    }

    /// Paint one frame. Clears the dirty flag.
    pub fn redraw<C: Canvas>(&mut self, canvas: &mut C) -> Result<(), C::Error> {
        let l = &self.layout;
        let showing_seconds = self.visibility == Visibility::ShowingSeconds;
        let hands = geometry::hands(self.services.now(), l, showing_seconds);
        let center = l.center;

        canvas.fill_rect(self.bounds, palette::FACE_BACKGROUND)?;
        canvas.draw_circle(center, l.face_radius, palette::CIRCLE, CIRCLE_STROKE)?;

        // Under the minute hand.
        if let Some(second_end) = hands.second_end {
            canvas.fill_circle(center, l.second_hand_radius, palette::SECOND_HAND_CIRCLE)?;
            canvas.draw_line(center, second_end, palette::SECOND_HAND, HAND_STROKE)?;
        }

        canvas.draw_line(hands.minute_start, hands.minute_end, palette::OUTER_HAND, HAND_STROKE)?;
        canvas.fill_circle(center, l.inner_radius, palette::INNER_CIRCLE)?;
        canvas.draw_line(center, hands.hour_end, palette::INNER_HAND, HAND_STROKE)?;
        canvas.fill_circle(center, l.inner_dot, palette::INNER_DOT)?;

        self.dirty = false;
        Ok(())
    }

    fn revert(&mut self) {
        self.visibility = Visibility::Normal;
        self.dirty = true;
        self.sync_ticks();
    }

    // Bring the tick subscription in line with the mode. The old granularity is
    // always dropped before the new one is requested; a refused request leaves
    // no subscription and is retried on the next event.
    fn sync_ticks(&mut self) {
        let wanted = self.visibility.tick_unit();
        if self.active_ticks == Some(wanted) {
            return;
        }
        if self.active_ticks.take().is_some() {
            self.services.unsubscribe();
        }
        match self.services.subscribe(wanted) {
            Ok(()) => self.active_ticks = Some(wanted),
            Err(e) => warn!("{:?} ticks unavailable, retrying later: {}", wanted, e),
        }
    }
}
