//! Runtime configuration for the cycle driver.

use crate::colors::CHANNEL_DEFAULTS;
use crate::fade::FadeConfig;
use palette::Srgb;

/// Full-scale value of a 12-bit PWM driver such as the PCA9685.
pub const DEFAULT_PWM_MAX: u16 = 4095;

/// Seconds of silence after which test mode switches itself off.
pub const DEFAULT_TEST_TIMEOUT_SECS: u32 = 60;

/// Settings shared by every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputConfig {
    /// Output value for 100 percent.
    pub pwm_max: u16,

    pub fade: FadeConfig,

    /// Test mode expires when it hasn't been refreshed for longer than this.
    pub test_timeout_secs: u32,
}

impl OutputConfig {
    pub const DEFAULT: Self = Self {
        pwm_max: DEFAULT_PWM_MAX,
        fade: FadeConfig::DEFAULT,
        test_timeout_secs: DEFAULT_TEST_TIMEOUT_SECS,
    };

    #[inline]
    pub(crate) const fn test_timeout_ms(&self) -> u64 {
        self.test_timeout_secs as u64 * 1000
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration of a controller with `CH` channels.
///
/// ```
/// use aqua_schedule::{DriverConfig, FadeConfig};
///
/// let config = DriverConfig::<6>::new()
///     .with_pwm_max(1023)
///     .with_fade(FadeConfig::new(2))
///     .with_address(5, 15);
/// assert_eq!(config.addresses[5], 15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig<const CH: usize> {
    pub output: OutputConfig,

    /// Physical output address for each logical channel.
    pub addresses: [u8; CH],

    /// Display colour of each channel, used for status previews.
    pub colors: [Srgb; CH],
}

impl<const CH: usize> DriverConfig<CH> {
    /// Default settings with channel `i` wired to output address `i`.
    pub fn new() -> Self {
        Self {
            output: OutputConfig::DEFAULT,
            addresses: core::array::from_fn(|i| i as u8),
            colors: core::array::from_fn(|i| CHANNEL_DEFAULTS[i % CHANNEL_DEFAULTS.len()]),
        }
    }

    pub fn with_pwm_max(mut self, pwm_max: u16) -> Self {
        self.output.pwm_max = pwm_max;
        self
    }

    pub fn with_fade(mut self, fade: FadeConfig) -> Self {
        self.output.fade = fade;
        self
    }

    pub fn with_test_timeout(mut self, secs: u32) -> Self {
        self.output.test_timeout_secs = secs;
        self
    }

    /// Routes a logical channel to a physical output. Out-of-range channels are ignored.
    pub fn with_address(mut self, channel: usize, address: u8) -> Self {
        if let Some(slot) = self.addresses.get_mut(channel) {
            *slot = address;
        }
        self
    }

    /// Sets a channel's display colour. Out-of-range channels are ignored.
    pub fn with_color(mut self, channel: usize, color: Srgb) -> Self {
        if let Some(slot) = self.colors.get_mut(channel) {
            *slot = color;
        }
        self
    }
}

impl<const CH: usize> Default for DriverConfig<CH> {
    fn default() -> Self {
        Self::new()
    }
}
