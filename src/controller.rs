//! The cycle driver.
//!
//! [`Controller`] owns every channel, the macro overlay and the output stage.
//! Call [`Controller::tick`] from the main loop as often as possible; between
//! ticks, service the network and storage and forward requests to the
//! schedule, test mode and macro methods.

use crate::channel::Channel;
use crate::colors;
use crate::config::DriverConfig;
use crate::overlay::{MacroOverlay, OverlayState};
use crate::storage::{MacroId, MacroStorage, ScheduleStorage, StorageError};
use crate::store::{DEFAULT_MAX_TARGETS, TargetStore};
use crate::time::{DayTime, TickTime, TimeSource};
use crate::types::{StoreError, Target};
use palette::Srgb;

/// Default number of channels.
pub const DEFAULT_CHANNELS: usize = 6;

/// Trait for abstracting the output hardware.
///
/// Implement this for your PWM expander, MCU timer or DAC. Writes are
/// fire-and-forget: handle hardware errors internally.
pub trait OutputStage {
    /// Sets the physical output `address` to `value` (0 to the configured `pwm_max`).
    fn write(&mut self, address: u8, value: u16);
}

/// Errors that can occur during controller operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerError {
    /// The channel index does not exist.
    InvalidChannel { channel: usize, count: usize },

    /// A target store operation failed.
    Store(StoreError),

    /// A storage collaborator failed.
    Storage(StorageError),

    /// No macro is stored under the requested id.
    MacroNotFound,

    /// A channel of the macro could not be parsed.
    MacroLoadError { channel: usize },

    /// A macro is already playing.
    MacroAlreadyActive,

    /// No macro is playing.
    NoMacroActive,
}

impl core::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControllerError::InvalidChannel { channel, count } => {
                write!(f, "channel {} does not exist ({} channels)", channel, count)
            }
            ControllerError::Store(err) => write!(f, "target store error: {}", err),
            ControllerError::Storage(err) => write!(f, "storage error: {}", err),
            ControllerError::MacroNotFound => write!(f, "macro not found"),
            ControllerError::MacroLoadError { channel } => {
                write!(f, "macro data for channel {} is malformed", channel)
            }
            ControllerError::MacroAlreadyActive => write!(f, "a macro is already active"),
            ControllerError::NoMacroActive => write!(f, "no macro active"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}

impl From<StoreError> for ControllerError {
    fn from(err: StoreError) -> Self {
        ControllerError::Store(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::Storage(err)
    }
}

/// Point-in-time view of the controller for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Status<const CH: usize> {
    pub time_of_day: DayTime,
    pub test_mode: bool,
    pub active_macro: Option<MacroId>,
    pub macro_remaining_secs: u32,
    /// Committed output per channel.
    pub outputs: [u16; CH],
    pub pwm_max: u16,
}

impl<const CH: usize> Status<CH> {
    /// Approximate colour of the combined light, given each channel's colour.
    pub fn preview_color(&self, channel_colors: &[Srgb; CH]) -> Srgb {
        let full_scale = f32::from(self.pwm_max.max(1));
        colors::blend(
            channel_colors
                .iter()
                .zip(self.outputs.iter())
                .map(|(color, &output)| (*color, f32::from(output) / full_scale)),
        )
    }
}

/// Drives `CH` output channels from their schedules.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `O` - Output stage implementation
/// * `T` - Time source implementation
/// * `CH` - Number of channels
/// * `N` - Maximum number of targets per channel
pub struct Controller<
    't,
    O: OutputStage,
    T: TimeSource,
    const CH: usize = DEFAULT_CHANNELS,
    const N: usize = DEFAULT_MAX_TARGETS,
> {
    output: O,
    time_source: &'t T,
    config: DriverConfig<CH>,
    channels: [Channel<N>; CH],
    overlay: MacroOverlay<CH, N>,
    now: TickTime,
    force_write: bool,
}

impl<'t, O, T, const CH: usize, const N: usize> Controller<'t, O, T, CH, N>
where
    O: OutputStage,
    T: TimeSource,
{
    /// Creates a controller with empty schedules.
    ///
    /// Every channel is written on the first tick.
    pub fn new(output: O, time_source: &'t T, config: DriverConfig<CH>) -> Self {
        Self {
            output,
            time_source,
            config,
            channels: core::array::from_fn(|_| Channel::new()),
            overlay: MacroOverlay::new(),
            now: time_source.now(),
            force_write: true,
        }
    }

    /// Runs one control cycle.
    ///
    /// Reads the clock, expires the macro if due, advances every channel and
    /// writes the channels whose output changed. Returns the number of writes.
    pub fn tick(&mut self) -> usize {
        self.now = self.time_source.now();
        let now_ms = self.now.uptime_ms;

        if self.overlay.poll(now_ms, &mut self.channels) {
            info!("macro expired, daily schedules restored");
            self.force_write = true;
        }

        let time_of_day = self.now.time_of_day.as_secs_f32();
        let position = self.overlay.position(now_ms).unwrap_or(time_of_day);

        let mut written = 0;
        let routed = self.channels.iter_mut().zip(self.config.addresses.iter());
        for (index, (channel, &address)) in routed.enumerate() {
            let was_testing = channel.is_test_mode();
            channel.proceed(position, now_ms, &self.config.output);
            if was_testing && !channel.is_test_mode() {
                info!("channel {}: test mode timed out", index);
            }

            if channel.has_to_write() || self.force_write {
                let value = channel.output(&self.config.output);
                trace!("channel {} -> output {} = {}", index, address, value);
                self.output.write(address, value);
                written += 1;
            }
        }

        self.force_write = false;
        written
    }

    /// Writes every channel on the next tick, changed or not.
    pub fn force_refresh(&mut self) {
        self.force_write = true;
    }

    fn check_channel(&self, channel: usize) -> Result<(), ControllerError> {
        if channel < CH {
            Ok(())
        } else {
            Err(ControllerError::InvalidChannel { channel, count: CH })
        }
    }

    pub fn channel(&self, channel: usize) -> Result<&Channel<N>, ControllerError> {
        self.check_channel(channel)?;
        Ok(&self.channels[channel])
    }

    /// The daily schedule of a channel.
    ///
    /// While a macro plays this is the schedule that will be restored, not
    /// the macro's targets.
    pub fn targets(&self, channel: usize) -> Result<&[Target], ControllerError> {
        self.check_channel(channel)?;
        let store = self
            .overlay
            .saved(channel)
            .unwrap_or(self.channels[channel].targets());
        Ok(store.as_slice())
    }

    fn schedule_mut(&mut self, channel: usize) -> Result<&mut TargetStore<N>, ControllerError> {
        self.check_channel(channel)?;
        self.force_write = true;
        match self.overlay.saved_mut(channel) {
            Some(saved) => Ok(saved),
            None => Ok(self.channels[channel].targets_mut()),
        }
    }

    /// Replaces a channel's daily schedule.
    ///
    /// # Errors
    /// * `InvalidChannel` - No such channel
    /// * `Store(CapacityExceeded)` - Too many distinct times; the schedule is left unchanged
    pub fn set_targets(&mut self, channel: usize, targets: &[Target]) -> Result<(), ControllerError> {
        let store = TargetStore::from_targets(targets)?;
        let count = store.len();
        *self.schedule_mut(channel)? = store;
        info!("channel {}: schedule replaced ({} targets)", channel, count);
        Ok(())
    }

    /// Adds a target, replacing any target at the same time.
    ///
    /// Returns the target's position in the schedule.
    pub fn add_target(&mut self, channel: usize, target: Target) -> Result<usize, ControllerError> {
        Ok(self.schedule_mut(channel)?.add_target(target)?)
    }

    /// Removes the target at `time`. Returns whether one was found.
    pub fn delete_target(&mut self, channel: usize, time: u32) -> Result<bool, ControllerError> {
        Ok(self.schedule_mut(channel)?.remove_time(time).is_some())
    }

    pub fn clear_targets(&mut self, channel: usize) -> Result<(), ControllerError> {
        self.schedule_mut(channel)?.clear();
        Ok(())
    }

    /// Loads every channel's daily schedule from storage.
    ///
    /// Channels without a stored schedule keep their current one. Every
    /// channel is attempted; the first failure is returned afterwards.
    /// Returns the number of channels loaded.
    pub fn load_schedules<S>(&mut self, storage: &mut S) -> Result<usize, ControllerError>
    where
        S: ScheduleStorage<N>,
    {
        let mut loaded = 0;
        let mut first_error = None;

        for channel in 0..CH {
            match storage.load(channel) {
                Ok(store) => {
                    *self.schedule_mut(channel)? = store;
                    loaded += 1;
                }
                Err(StorageError::NotFound) => {
                    debug!("channel {}: no stored schedule", channel);
                }
                Err(err) => {
                    warn!("channel {}: schedule load failed: {}", channel, err);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(loaded),
        }
    }

    /// Persists a channel's daily schedule.
    pub fn save_schedule<S>(&self, channel: usize, storage: &mut S) -> Result<(), ControllerError>
    where
        S: ScheduleStorage<N>,
    {
        let targets = self.targets(channel)?;
        storage.save(channel, targets)?;
        Ok(())
    }

    /// Puts every channel into test mode.
    pub fn enter_test_mode(&mut self) {
        let now_ms = self.time_source.now().uptime_ms;
        for channel in &mut self.channels {
            channel.enter_test_mode(now_ms);
        }
        info!("test mode entered");
    }

    pub fn exit_test_mode(&mut self) {
        for channel in &mut self.channels {
            channel.exit_test_mode();
        }
        info!("test mode exited");
    }

    /// Sets one channel's test brightness and restarts the test mode timeout.
    pub fn set_test_value(&mut self, channel: usize, percent: u8) -> Result<(), ControllerError> {
        self.check_channel(channel)?;
        let now_ms = self.time_source.now().uptime_ms;
        self.channels[channel].set_test_value(percent, now_ms);
        Ok(())
    }

    /// Sets test brightness for channels `0..values.len()`; extra values are ignored.
    pub fn set_test_values(&mut self, values: &[u8]) {
        let now_ms = self.time_source.now().uptime_ms;
        for (channel, &percent) in self.channels.iter_mut().zip(values) {
            channel.set_test_value(percent, now_ms);
        }
    }

    /// Whether any channel is in test mode.
    pub fn is_test_mode(&self) -> bool {
        self.channels.iter().any(|channel| channel.is_test_mode())
    }

    /// Starts playing a stored macro for `duration_secs`.
    ///
    /// All channels are loaded before anything changes, so a failure leaves
    /// the daily schedules running.
    ///
    /// # Errors
    /// * `MacroAlreadyActive` - Stop the running macro first
    /// * `MacroNotFound` - A channel of the macro is missing
    /// * `MacroLoadError` - A channel of the macro is malformed
    /// * `Storage(Io)` - The medium failed
    pub fn activate_macro<S>(
        &mut self,
        id: &MacroId,
        duration_secs: u32,
        storage: &mut S,
    ) -> Result<(), ControllerError>
    where
        S: MacroStorage<N>,
    {
        if self.overlay.is_active() {
            return Err(ControllerError::MacroAlreadyActive);
        }

        let mut stores: [TargetStore<N>; CH] = core::array::from_fn(|_| TargetStore::new());
        for (channel, store) in stores.iter_mut().enumerate() {
            *store = storage.load(id, channel).map_err(|err| {
                warn!("macro {}: channel {} failed to load: {}", id, channel, err);
                match err {
                    StorageError::NotFound => ControllerError::MacroNotFound,
                    StorageError::Malformed(_) => ControllerError::MacroLoadError { channel },
                    StorageError::Io => ControllerError::Storage(err),
                }
            })?;
        }

        let now_ms = self.time_source.now().uptime_ms;
        self.overlay
            .activate(id.clone(), duration_secs, now_ms, &mut self.channels, stores)?;
        self.force_write = true;
        info!("macro {} activated for {} s", id, duration_secs);
        Ok(())
    }

    /// Stops the running macro and restores the daily schedules.
    pub fn stop_macro(&mut self) -> Result<(), ControllerError> {
        let id = self.overlay.stop(&mut self.channels)?;
        self.force_write = true;
        info!("macro {} stopped", id);
        Ok(())
    }

    pub fn is_macro_active(&self) -> bool {
        self.overlay.is_active()
    }

    pub fn macro_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn active_macro(&self) -> Option<&MacroId> {
        self.overlay.activation().map(|activation| activation.id())
    }

    /// Whole seconds until the running macro ends, zero when none is running.
    pub fn macro_time_remaining(&self) -> u32 {
        self.overlay.remaining_secs(self.time_source.now().uptime_ms)
    }

    pub fn status(&self) -> Status<CH> {
        let now = self.time_source.now();
        Status {
            time_of_day: now.time_of_day,
            test_mode: self.is_test_mode(),
            active_macro: self.active_macro().cloned(),
            macro_remaining_secs: self.overlay.remaining_secs(now.uptime_ms),
            outputs: core::array::from_fn(|i| self.channels[i].output(&self.config.output)),
            pwm_max: self.config.output.pwm_max,
        }
    }

    /// Approximate colour of the light currently emitted.
    pub fn preview_color(&self) -> Srgb {
        self.status().preview_color(&self.config.colors)
    }

    pub fn config(&self) -> &DriverConfig<CH> {
        &self.config
    }

    /// Time snapshot of the last tick.
    pub fn last_tick(&self) -> TickTime {
        self.now
    }

    pub fn output_stage(&self) -> &O {
        &self.output
    }

    pub fn output_stage_mut(&mut self) -> &mut O {
        &mut self.output
    }
}
