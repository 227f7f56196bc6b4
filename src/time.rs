//! Time abstraction for the control loop.
//!
//! The controller never reads a clock on its own. Once per tick it asks a
//! [`TimeSource`] for a [`TickTime`] and threads that snapshot through every
//! channel, so interpolation stays a pure function of its inputs.

/// Number of seconds in one schedule cycle.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// A position within the current day with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DayTime {
    secs: u32,
    millis: u16,
}

impl DayTime {
    /// 00:00:00.000
    pub const MIDNIGHT: Self = Self { secs: 0, millis: 0 };

    /// Creates a time of day, carrying excess milliseconds and wrapping at midnight.
    pub const fn new(secs: u32, millis: u16) -> Self {
        let carry = (millis / 1000) as u32;
        Self {
            secs: (secs + carry) % SECONDS_PER_DAY,
            millis: millis % 1000,
        }
    }

    /// Creates a time of day from wall-clock components.
    pub const fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        Self::new(hour * 3600 + minute * 60 + second, 0)
    }

    /// Whole seconds elapsed since midnight.
    #[inline]
    pub const fn seconds(&self) -> u32 {
        self.secs
    }

    /// Sub-second part in milliseconds.
    #[inline]
    pub const fn millis(&self) -> u16 {
        self.millis
    }

    pub const fn hour(&self) -> u32 {
        self.secs / 3600
    }

    pub const fn minute(&self) -> u32 {
        (self.secs % 3600) / 60
    }

    pub const fn second(&self) -> u32 {
        self.secs % 60
    }

    /// Seconds since midnight including the fractional part.
    #[inline]
    pub fn as_secs_f32(&self) -> f32 {
        self.secs as f32 + (self.millis as f32) / 1000.0
    }
}

impl core::fmt::Display for DayTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Time snapshot taken once per tick.
///
/// `time_of_day` drives the daily schedule. `uptime_ms` is a monotonic counter
/// used for everything that must survive a midnight rollover: macro playback
/// and test mode expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickTime {
    pub time_of_day: DayTime,
    pub uptime_ms: u64,
}

impl TickTime {
    pub const fn new(time_of_day: DayTime, uptime_ms: u64) -> Self {
        Self {
            time_of_day,
            uptime_ms,
        }
    }

    /// Milliseconds elapsed since an earlier uptime reading (zero if it lies in the future).
    #[inline]
    pub const fn millis_since(&self, earlier_ms: u64) -> u64 {
        self.uptime_ms.saturating_sub(earlier_ms)
    }
}

/// Trait for abstracting the clock (RTC, NTP-disciplined system time, tests).
pub trait TimeSource {
    /// Returns the current time snapshot.
    fn now(&self) -> TickTime;
}
