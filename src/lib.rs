#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Target`**: A (time, brightness percent) anchor point of a schedule
//! - **`TargetStore`**: Fixed-capacity, time-ordered set of targets for one channel
//! - **`Bracket`**: The two targets surrounding "now", with day wraparound
//! - **`FadeLimiter`**: Bounds how fast a committed output may change per tick
//! - **`Channel`**: Schedule, fade state and test mode override of one output
//! - **`MacroOverlay`**: Temporarily replaces all schedules and restores them afterwards
//! - **`Controller`**: The cycle driver that ticks every channel and writes outputs
//! - **`OutputStage`**: Trait to implement for your PWM hardware
//! - **`TimeSource`**: Trait to implement for your clock
//! - **`ScheduleStorage`** / **`MacroStorage`**: Traits to implement for persistence
//!
//! Schedules are expressed in percent (0-100). The controller scales them onto the
//! output range configured in [`DriverConfig`] (4095 for 12-bit PWM by default).

#[macro_use]
mod fmt;

pub mod channel;
pub mod codec;
pub mod colors;
pub mod config;
pub mod controller;
pub mod fade;
pub mod interpolate;
pub mod overlay;
pub mod storage;
pub mod store;
pub mod time;
pub mod types;

pub use channel::Channel;
pub use codec::{ParseError, ParseErrorKind, TimeFormat};
pub use config::{DriverConfig, OutputConfig};
pub use controller::{Controller, ControllerError, DEFAULT_CHANNELS, OutputStage, Status};
pub use fade::{FadeConfig, FadeLimiter};
pub use interpolate::{Anchor, Bracket};
pub use overlay::{MacroActivation, MacroOverlay, OverlayState};
pub use storage::{MacroId, MacroStorage, ScheduleStorage, StorageError};
pub use store::{DEFAULT_MAX_TARGETS, TargetStore};
pub use time::{DayTime, SECONDS_PER_DAY, TickTime, TimeSource};
pub use types::{MAX_PERCENT, StoreError, Target};

// Re-export Srgb from palette for channel colour configuration
pub use palette::Srgb;
