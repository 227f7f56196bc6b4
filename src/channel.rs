//! Per-channel runtime state.
//!
//! A [`Channel`] owns its target schedule, the fade limiter that smooths its
//! output and the test mode override. [`Channel::proceed`] is the per-tick
//! step: interpolate, apply test mode, fade.

use crate::config::OutputConfig;
use crate::fade::FadeLimiter;
use crate::interpolate::{desired_percent, percent_to_output};
use crate::store::{DEFAULT_MAX_TARGETS, TargetStore};
use crate::types::MAX_PERCENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TestOverride {
    active: bool,
    value: u8,
    set_at_ms: u64,
}

/// A single output channel.
#[derive(Debug, Clone, Default)]
pub struct Channel<const N: usize = DEFAULT_MAX_TARGETS> {
    targets: TargetStore<N>,
    fade: FadeLimiter,
    desired: u16,
    test: TestOverride,
    has_to_write: bool,
}

impl<const N: usize> Channel<N> {
    /// Creates a dark channel with an empty schedule.
    pub const fn new() -> Self {
        Self {
            targets: TargetStore::new(),
            fade: FadeLimiter::new(0),
            desired: 0,
            test: TestOverride {
                active: false,
                value: 0,
                set_at_ms: 0,
            },
            has_to_write: false,
        }
    }

    /// The schedule currently driving this channel.
    pub fn targets(&self) -> &TargetStore<N> {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut TargetStore<N> {
        &mut self.targets
    }

    /// Exchanges the driving schedule with `other`.
    pub(crate) fn swap_targets(&mut self, other: &mut TargetStore<N>) {
        core::mem::swap(&mut self.targets, other);
    }

    /// Committed output value, floor applied.
    pub fn output(&self, config: &OutputConfig) -> u16 {
        self.fade.output(&config.fade)
    }

    /// Output value the channel is fading towards.
    pub fn desired(&self) -> u16 {
        self.desired
    }

    /// Whether the last [`proceed`](Self::proceed) changed the committed output.
    pub fn has_to_write(&self) -> bool {
        self.has_to_write
    }

    pub fn is_test_mode(&self) -> bool {
        self.test.active
    }

    pub fn test_value(&self) -> u8 {
        self.test.value
    }

    /// Switches the test override on and restarts its timeout.
    pub fn enter_test_mode(&mut self, now_ms: u64) {
        self.test.active = true;
        self.test.set_at_ms = now_ms;
    }

    /// Sets the brightness shown while in test mode and restarts the timeout.
    pub fn set_test_value(&mut self, percent: u8, now_ms: u64) {
        self.test.value = percent.min(MAX_PERCENT);
        self.test.set_at_ms = now_ms;
    }

    pub fn exit_test_mode(&mut self) {
        self.test.active = false;
    }

    /// Runs one tick.
    ///
    /// `position` is the schedule time in seconds: time of day normally,
    /// elapsed seconds while a macro plays. `now_ms` is monotonic uptime.
    pub fn proceed(&mut self, position: f32, now_ms: u64, config: &OutputConfig) {
        if self.test.active
            && now_ms.saturating_sub(self.test.set_at_ms) > config.test_timeout_ms()
        {
            self.test.active = false;
        }

        if self.test.active {
            self.desired = percent_to_output(self.test.value as f32, config.pwm_max);
        } else if self.targets.is_empty() {
            // Nothing scheduled: off, without a fade-out
            self.desired = 0;
            self.has_to_write = self.fade.value() != 0;
            self.fade.reset(0);
            return;
        } else {
            let percent = desired_percent(self.targets.as_slice(), position);
            self.desired = percent_to_output(percent, config.pwm_max);
        }

        self.has_to_write = self.fade.advance(self.desired, &config.fade);
    }
}
