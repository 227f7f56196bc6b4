//! Schedule interpolation.
//!
//! Turns a sparse, time-ordered list of [`Target`]s into a brightness for any
//! instant of the day. The schedule is treated as periodic: after the last
//! target of a day the output ramps towards the first target of the next day,
//! and before the first target it is still on the ramp that started with the
//! last target of the previous day.
//!
//! Everything here is a pure function of `(targets, now)`.

use crate::time::SECONDS_PER_DAY;
use crate::types::{MAX_PERCENT, Target};

const DAY: f32 = SECONDS_PER_DAY as f32;

/// A target placed on a continuous time axis.
///
/// Unlike [`Target`], an anchor may lie before midnight (negative time) or
/// after the end of the day once the day boundary has been unwrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub time: f32,
    pub value: f32,
}

impl Anchor {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }

    fn shifted(target: &Target, offset: f32) -> Self {
        Self::new(target.time as f32 + offset, target.value as f32)
    }
}

impl From<Target> for Anchor {
    fn from(target: Target) -> Self {
        Self::shifted(&target, 0.0)
    }
}

/// The two anchors surrounding the current instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Most recent anchor at or before `now`.
    pub last: Anchor,

    /// Next anchor after `now`.
    pub current: Anchor,
}

impl Bracket {
    /// Finds the bracketing pair for `now` (seconds since midnight).
    ///
    /// Returns `None` when there are no targets. A single target yields a flat
    /// line across the whole day.
    pub fn find(targets: &[Target], now: f32) -> Option<Self> {
        match targets {
            [] => None,
            [only] => {
                let value = only.value as f32;
                Some(Self {
                    last: Anchor::new(0.0, value),
                    current: Anchor::new(DAY, value),
                })
            }
            [first, .., last] => {
                let bracket = match targets.iter().position(|t| t.time as f32 > now) {
                    // Before the first target: still ramping from yesterday's last one
                    Some(0) => Self {
                        last: Anchor::shifted(last, -DAY),
                        current: Anchor::from(*first),
                    },
                    Some(i) => Self {
                        last: Anchor::from(targets[i - 1]),
                        current: Anchor::from(targets[i]),
                    },
                    // After the last target: ramping towards tomorrow's first one
                    None => Self {
                        last: Anchor::from(*last),
                        current: Anchor::shifted(first, DAY),
                    },
                };
                Some(bracket)
            }
        }
    }

    /// Rate of change in percent per second.
    pub fn slope(&self) -> f32 {
        let dt = self.current.time - self.last.time;
        if dt <= 0.0 {
            return 0.0;
        }
        (self.current.value - self.last.value) / dt
    }

    /// Linearly interpolated value at `now`.
    ///
    /// The result never passes `current.value` in the direction of travel.
    pub fn value_at(&self, now: f32) -> f32 {
        if self.current.time <= self.last.time {
            return self.current.value;
        }

        let m = self.slope();
        let v = self.last.value + m * (now - self.last.time);
        let v = if m >= 0.0 {
            v.min(self.current.value)
        } else {
            v.max(self.current.value)
        };
        v.clamp(0.0, MAX_PERCENT as f32)
    }
}

/// Desired brightness in percent at `now` (seconds since midnight, fractional).
///
/// A schedule without targets means the channel is off.
pub fn desired_percent(targets: &[Target], now: f32) -> f32 {
    Bracket::find(targets, now).map_or(0.0, |bracket| bracket.value_at(now))
}

/// Scales a percentage onto the output range `0..=max`, truncating.
#[inline]
pub fn percent_to_output(percent: f32, max: u16) -> u16 {
    let percent = percent.clamp(0.0, MAX_PERCENT as f32);
    (max as f32 * percent / MAX_PERCENT as f32) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let d = a - b;
        d < 0.01 && d > -0.01
    }

    #[test]
    fn empty_schedule_is_off() {
        assert!(Bracket::find(&[], 100.0).is_none());
        assert_eq!(desired_percent(&[], 100.0), 0.0);
    }

    #[test]
    fn single_target_spans_whole_day() {
        let bracket = Bracket::find(&[Target::new(43_200, 35)], 10.0).unwrap();
        assert_eq!(bracket.last, Anchor::new(0.0, 35.0));
        assert_eq!(bracket.current, Anchor::new(DAY, 35.0));
    }

    #[test]
    fn bracket_before_first_target_wraps_to_yesterday() {
        let targets = [Target::new(3600, 20), Target::new(82_800, 80)];
        let bracket = Bracket::find(&targets, 0.0).unwrap();
        assert_eq!(bracket.last, Anchor::new(-3600.0, 80.0));
        assert_eq!(bracket.current, Anchor::new(3600.0, 20.0));
        assert!(close(bracket.value_at(0.0), 50.0));
    }

    #[test]
    fn bracket_after_last_target_wraps_to_tomorrow() {
        let targets = [Target::new(3600, 20), Target::new(82_800, 80)];
        let bracket = Bracket::find(&targets, 84_600.0).unwrap();
        assert_eq!(bracket.last, Anchor::new(82_800.0, 80.0));
        assert_eq!(bracket.current, Anchor::new(90_000.0, 20.0));
        // A quarter of the way through the 7200 s overnight ramp
        assert!(close(bracket.value_at(84_600.0), 65.0));
    }

    #[test]
    fn value_at_never_overshoots() {
        let bracket = Bracket {
            last: Anchor::new(0.0, 10.0),
            current: Anchor::new(100.0, 60.0),
        };
        assert_eq!(bracket.value_at(250.0), 60.0);

        let falling = Bracket {
            last: Anchor::new(0.0, 60.0),
            current: Anchor::new(100.0, 10.0),
        };
        assert_eq!(falling.value_at(250.0), 10.0);
    }

    #[test]
    fn coincident_anchors_take_current_value() {
        let bracket = Bracket {
            last: Anchor::new(500.0, 30.0),
            current: Anchor::new(500.0, 70.0),
        };
        assert_eq!(bracket.slope(), 0.0);
        assert_eq!(bracket.value_at(500.0), 70.0);
    }

    #[test]
    fn percent_to_output_truncates() {
        assert_eq!(percent_to_output(50.0, 4095), 2047);
        assert_eq!(percent_to_output(100.0, 4095), 4095);
        assert_eq!(percent_to_output(150.0, 4095), 4095);
        assert_eq!(percent_to_output(-5.0, 4095), 0);
    }
}
