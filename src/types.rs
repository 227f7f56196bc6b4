//! Core value types shared by the schedule engine.

use crate::time::SECONDS_PER_DAY;

/// Highest brightness a target can request, in percent.
pub const MAX_PERCENT: u8 = 100;

/// A brightness anchor point.
///
/// For daily schedules `time` is seconds since midnight. For macros it is
/// seconds elapsed since the macro was activated. Either way it is clamped to
/// `0..=86400` and `value` to `0..=100` percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Target {
    /// Seconds on the schedule axis.
    pub time: u32,

    /// Brightness in percent.
    pub value: u8,
}

impl Target {
    /// Creates a target, clamping time and value into range.
    pub const fn new(time: u32, value: u8) -> Self {
        Self {
            time: if time > SECONDS_PER_DAY {
                SECONDS_PER_DAY
            } else {
                time
            },
            value: if value > MAX_PERCENT {
                MAX_PERCENT
            } else {
                value
            },
        }
    }

    /// Creates a target at a wall-clock time of day.
    pub const fn at(hour: u32, minute: u32, value: u8) -> Self {
        Self::new(hour * 3600 + minute * 60, value)
    }
}

/// Target store errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The store already holds its maximum number of targets.
    CapacityExceeded,

    /// Position does not refer to a stored target.
    IndexOutOfRange,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::CapacityExceeded => write!(f, "target store capacity exceeded"),
            StoreError::IndexOutOfRange => write!(f, "target index out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}
