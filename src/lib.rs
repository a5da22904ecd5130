#![cfg_attr(not(test), no_std)]

pub mod display;
pub mod face;
pub mod geometry;
pub mod host;
pub mod motion;
pub mod qmi8658;
pub mod rtc;
pub mod scheduler;

#[cfg(feature = "firmware")]
pub mod wiring;

pub use face::{FaceOptions, Visibility, WatchFace};
pub use host::{HostError, HostEvent, TimeUnit};
pub use scheduler::Scheduler;
