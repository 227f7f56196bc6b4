//! Rate limiting of committed output values.
//!
//! Schedules change slowly, so the interpolated value would normally move by
//! a fraction of a unit per tick. Jumps still happen: a schedule edit, test
//! mode, the start or end of a macro. The [`FadeLimiter`] turns those jumps
//! into a ramp of at most `step` units per tick.
//!
//! When a jump is larger than `boost_threshold` the limiter switches to a
//! double stride and keeps it until the target is reached. Large transitions
//! then converge in roughly half the ticks without a slow tail at the end.

/// Fade limiter parameters, in output units (e.g. 0..=4095 for 12-bit PWM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeConfig {
    /// Maximum change per tick. Zero disables fading.
    pub step: u16,

    /// Distance above which the limiter moves at twice `step`.
    pub boost_threshold: u16,

    /// Smallest non-zero value written to the output stage.
    pub floor: u16,
}

impl FadeConfig {
    pub const DEFAULT: Self = Self {
        step: 1,
        boost_threshold: 100,
        floor: 1,
    };

    pub const fn new(step: u16) -> Self {
        Self {
            step,
            ..Self::DEFAULT
        }
    }

    pub const fn with_boost_threshold(mut self, threshold: u16) -> Self {
        self.boost_threshold = threshold;
        self
    }

    pub const fn with_floor(mut self, floor: u16) -> Self {
        self.floor = floor;
        self
    }
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Moves a committed value towards a desired value at a bounded rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FadeLimiter {
    value: u16,
    boosting: bool,
}

impl FadeLimiter {
    pub const fn new(initial: u16) -> Self {
        Self {
            value: initial,
            boosting: false,
        }
    }

    /// Current committed value before the floor is applied.
    #[inline]
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Value to write to hardware, with positive values lifted to `config.floor`.
    pub fn output(&self, config: &FadeConfig) -> u16 {
        if self.value > 0 && self.value < config.floor {
            config.floor
        } else {
            self.value
        }
    }

    /// Advances one tick towards `desired`.
    ///
    /// Returns `true` if the committed value changed.
    pub fn advance(&mut self, desired: u16, config: &FadeConfig) -> bool {
        if desired == self.value {
            self.boosting = false;
            return false;
        }

        let distance = desired.abs_diff(self.value);
        if distance > config.boost_threshold {
            self.boosting = true;
        }

        let stride = if self.boosting {
            config.step.saturating_mul(2)
        } else {
            config.step
        };

        if stride == 0 || distance <= stride {
            self.value = desired;
            self.boosting = false;
        } else if desired > self.value {
            self.value += stride;
        } else {
            self.value -= stride;
        }
        true
    }

    /// Jumps straight to `value`, dropping any ramp in progress.
    pub fn reset(&mut self, value: u16) {
        self.value = value;
        self.boosting = false;
    }
}
