//! Macro playback.
//!
//! A macro temporarily replaces every channel's schedule with its own
//! duration-indexed targets. On activation the live schedules are swapped out
//! into the [`MacroActivation`]; on expiry or [`MacroOverlay::stop`] they are
//! swapped back, so the restored schedules are exactly the ones that were
//! running before.

use crate::channel::Channel;
use crate::controller::ControllerError;
use crate::storage::MacroId;
use crate::store::TargetStore;
use crate::time::SECONDS_PER_DAY;

/// Whether a macro is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverlayState {
    /// Channels follow their daily schedules.
    Idle,
    /// Channels follow a macro until it expires or is stopped.
    Active,
}

/// A running macro and the schedules it displaced.
#[derive(Debug, Clone)]
pub struct MacroActivation<const CH: usize, const N: usize> {
    id: MacroId,
    started_ms: u64,
    duration_secs: u32,
    saved: [TargetStore<N>; CH],
}

impl<const CH: usize, const N: usize> MacroActivation<CH, N> {
    pub fn id(&self) -> &MacroId {
        &self.id
    }

    /// Uptime at activation.
    pub fn started_ms(&self) -> u64 {
        self.started_ms
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// The daily schedules that will be restored.
    pub fn saved_schedules(&self) -> &[TargetStore<N>; CH] {
        &self.saved
    }

    fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms)
    }

    fn is_expired(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= u64::from(self.duration_secs) * 1000
    }
}

/// Idle/Active state machine around an optional [`MacroActivation`].
#[derive(Debug, Clone, Default)]
pub struct MacroOverlay<const CH: usize, const N: usize> {
    active: Option<MacroActivation<CH, N>>,
}

impl<const CH: usize, const N: usize> MacroOverlay<CH, N> {
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn state(&self) -> OverlayState {
        if self.active.is_some() {
            OverlayState::Active
        } else {
            OverlayState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn activation(&self) -> Option<&MacroActivation<CH, N>> {
        self.active.as_ref()
    }

    /// Makes `macro_stores` the live schedules and remembers the displaced ones.
    ///
    /// # Errors
    /// * `MacroAlreadyActive` - A macro is playing; stop it first
    pub fn activate(
        &mut self,
        id: MacroId,
        duration_secs: u32,
        now_ms: u64,
        channels: &mut [Channel<N>; CH],
        mut macro_stores: [TargetStore<N>; CH],
    ) -> Result<(), ControllerError> {
        if self.active.is_some() {
            return Err(ControllerError::MacroAlreadyActive);
        }

        for (channel, store) in channels.iter_mut().zip(macro_stores.iter_mut()) {
            channel.swap_targets(store);
        }

        self.active = Some(MacroActivation {
            id,
            started_ms: now_ms,
            duration_secs,
            saved: macro_stores,
        });
        Ok(())
    }

    /// Restores the saved schedules if the macro has run its course.
    ///
    /// Returns `true` when the macro expired on this call.
    pub fn poll(&mut self, now_ms: u64, channels: &mut [Channel<N>; CH]) -> bool {
        match &self.active {
            Some(activation) if activation.is_expired(now_ms) => {
                self.restore(channels);
                true
            }
            _ => false,
        }
    }

    /// Ends the macro early and restores the saved schedules.
    ///
    /// # Errors
    /// * `NoMacroActive` - Nothing to stop
    pub fn stop(&mut self, channels: &mut [Channel<N>; CH]) -> Result<MacroId, ControllerError> {
        self.restore(channels).ok_or(ControllerError::NoMacroActive)
    }

    fn restore(&mut self, channels: &mut [Channel<N>; CH]) -> Option<MacroId> {
        let mut activation = self.active.take()?;
        for (channel, saved) in channels.iter_mut().zip(activation.saved.iter_mut()) {
            channel.swap_targets(saved);
        }
        Some(activation.id)
    }

    /// Whole seconds until the macro expires, zero when idle.
    pub fn remaining_secs(&self, now_ms: u64) -> u32 {
        self.active.as_ref().map_or(0, |activation| {
            let elapsed = u32::try_from(activation.elapsed_ms(now_ms) / 1000).unwrap_or(u32::MAX);
            activation.duration_secs.saturating_sub(elapsed)
        })
    }

    /// Schedule position for macro targets: seconds since activation.
    pub fn position(&self, now_ms: u64) -> Option<f32> {
        self.active.as_ref().map(|activation| {
            let elapsed_ms = activation.elapsed_ms(now_ms) % (u64::from(SECONDS_PER_DAY) * 1000);
            elapsed_ms as f32 / 1000.0
        })
    }

    /// The daily schedule a channel returns to, while a macro is playing.
    pub fn saved(&self, channel: usize) -> Option<&TargetStore<N>> {
        self.active.as_ref()?.saved.get(channel)
    }

    pub fn saved_mut(&mut self, channel: usize) -> Option<&mut TargetStore<N>> {
        self.active.as_mut()?.saved.get_mut(channel)
    }
}
