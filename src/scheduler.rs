//! Software tick and one-shot timer service.
//!
//! The scheduler is driven by a monotonic millisecond timestamp supplied by the
//! caller (the system timer on the board, a plain counter in tests) and keeps
//! wall-clock time as a second-of-day anchored at one of those timestamps.
//!
//! - Ticks land on wall-clock boundaries of the subscribed unit. If several
//!   boundaries pass between two polls only one tick is delivered.
//! - Timers sit in a fixed-capacity queue and fire in deadline order. They
//!   cannot be cancelled.

use heapless::Vec;
use log::debug;

use crate::geometry::ClockReading;
use crate::host::{HostError, HostEvent, TickService, TimeUnit, TimerService, TimerToken, WallClock};

const MS_PER_DAY: u64 = 86_400_000;

#[derive(Copy, Clone, Debug)]
struct Subscription {
    unit: TimeUnit,
    next_due_ms: u64,
}

#[derive(Copy, Clone, Debug)]
struct Pending {
    deadline_ms: u64,
    token: TimerToken,
}

pub struct Scheduler<const N: usize> {
    now_ms: u64,
    // Wall time in ms-of-day at `now_ms == 0`.
    epoch_ms_of_day: u64,
    subscription: Option<Subscription>,
    timers: Vec<Pending, N>,
    subscribe_count: u32,
}

impl<const N: usize> Scheduler<N> {
    /// `seconds_of_day` is the wall-clock time at timestamp `now_ms`.
    pub fn new(now_ms: u64, seconds_of_day: u32) -> Self {
        let wall_ms = (seconds_of_day as u64 * 1000) % MS_PER_DAY;
        Self {
            now_ms,
            epoch_ms_of_day: (wall_ms + MS_PER_DAY - now_ms % MS_PER_DAY) % MS_PER_DAY,
            subscription: None,
            timers: Vec::new(),
            subscribe_count: 0,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Time never runs backwards; an older timestamp is ignored.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn subscribed_unit(&self) -> Option<TimeUnit> {
        self.subscription.map(|s| s.unit)
    }

    /// Number of successful subscriptions so far.
    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Earliest timestamp at which `poll` will have something to deliver.
    pub fn next_deadline(&self) -> Option<u64> {
        let timer = self.timers.iter().map(|p| p.deadline_ms).min();
        let tick = self.subscription.map(|s| s.next_due_ms);
        match (timer, tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Next due event at the current time, timers first.
    pub fn poll(&mut self) -> Option<HostEvent> {
        let now = self.now_ms;

        let due = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline_ms <= now)
            .min_by_key(|(_, p)| p.deadline_ms)
            .map(|(i, _)| i);
        if let Some(i) = due {
            let fired = self.timers.swap_remove(i);
            return Some(HostEvent::Timeout(fired.token));
        }

        let Subscription { unit, next_due_ms } = self.subscription?;
        if next_due_ms > now {
            return None;
        }
        self.subscription = Some(Subscription {
            unit,
            next_due_ms: self.next_boundary(unit),
        });
        Some(HostEvent::Tick(unit))
    }

    fn wall_ms(&self) -> u64 {
        (self.epoch_ms_of_day + self.now_ms) % MS_PER_DAY
    }

    // First timestamp strictly after `now_ms` that sits on a `unit` boundary.
    fn next_boundary(&self, unit: TimeUnit) -> u64 {
        let step = unit.millis();
        self.now_ms + (step - self.wall_ms() % step)
    }
}

impl<const N: usize> TickService for Scheduler<N> {
    fn subscribe(&mut self, unit: TimeUnit) -> Result<(), HostError> {
        if self.subscription.is_some() {
            debug!("tick subscription replaced by {:?}", unit);
        }
        self.subscription = Some(Subscription {
            unit,
            next_due_ms: self.next_boundary(unit),
        });
        self.subscribe_count += 1;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscription = None;
    }
}

impl<const N: usize> TimerService for Scheduler<N> {
    fn arm(&mut self, delay_ms: u32, token: TimerToken) -> Result<(), HostError> {
        self.timers
            .push(Pending {
                deadline_ms: self.now_ms + delay_ms as u64,
                token,
            })
            .map_err(|_| HostError::TimerQueueFull)
    }
}

impl<const N: usize> WallClock for Scheduler<N> {
    fn now(&self) -> ClockReading {
        ClockReading::from_seconds_of_day((self.wall_ms() / 1000) as u32)
    }
}
