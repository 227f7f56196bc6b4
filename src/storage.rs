//! Persistence collaborators.
//!
//! The engine never touches a file system. Boards implement these traits on
//! top of whatever they have (SD card, flash, littlefs) and the controller
//! calls them between ticks.

use crate::codec::ParseError;
use crate::store::TargetStore;
use crate::types::Target;
use core::fmt::Write;
use heapless::{String, Vec};

/// Maximum length of a macro identifier.
pub const MACRO_ID_CAPACITY: usize = 32;

/// Highest number handed out by [`MacroId::numbered`].
pub const MAX_MACRO_NUMBER: u16 = 999;

/// Errors reported by storage implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Nothing stored under this key.
    NotFound,

    /// Stored data could not be parsed.
    Malformed(ParseError),

    /// The medium failed to read or write.
    Io,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageError::NotFound => write!(f, "not found"),
            StorageError::Malformed(err) => write!(f, "malformed data: {}", err),
            StorageError::Io => write!(f, "storage I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

impl From<ParseError> for StorageError {
    fn from(err: ParseError) -> Self {
        StorageError::Malformed(err)
    }
}

/// Identifier of a stored macro, e.g. `macro_007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroId(String<MACRO_ID_CAPACITY>);

impl MacroId {
    /// Wraps an identifier. Returns `None` if it is empty or too long.
    pub fn new(id: &str) -> Option<Self> {
        if id.is_empty() {
            return None;
        }
        let mut s = String::new();
        s.push_str(id).ok()?;
        Some(Self(s))
    }

    /// The canonical `macro_NNN` identifier for `number`.
    pub fn numbered(number: u16) -> Self {
        let mut s = String::new();
        // "macro_" plus at most five digits always fits
        let _ = write!(s, "macro_{:03}", number);
        Self(s)
    }

    /// The `NNN` part of a canonical identifier.
    pub fn number(&self) -> Option<u16> {
        self.0.strip_prefix("macro_")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for MacroId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacroId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

/// The lowest `macro_NNN` not yet present in `existing`.
pub fn next_free_macro_id(existing: &[MacroId]) -> Option<MacroId> {
    (1..=MAX_MACRO_NUMBER)
        .find(|n| !existing.iter().any(|id| id.number() == Some(*n)))
        .map(MacroId::numbered)
}

/// Per-channel daily schedules.
pub trait ScheduleStorage<const N: usize> {
    /// Loads a channel's schedule. `NotFound` means the channel was never configured.
    fn load(&mut self, channel: usize) -> Result<TargetStore<N>, StorageError>;

    /// Replaces a channel's stored schedule.
    fn save(&mut self, channel: usize, targets: &[Target]) -> Result<(), StorageError>;
}

/// Stored macros; target times are seconds since activation.
pub trait MacroStorage<const N: usize> {
    /// Identifiers of all stored macros, at most `M` of them.
    fn list<const M: usize>(&mut self) -> Result<Vec<MacroId, M>, StorageError>;

    fn load(&mut self, id: &MacroId, channel: usize) -> Result<TargetStore<N>, StorageError>;

    fn save(&mut self, id: &MacroId, channel: usize, targets: &[Target]) -> Result<(), StorageError>;

    /// Removes every channel of a macro.
    fn delete(&mut self, id: &MacroId) -> Result<(), StorageError>;

    /// Saves one target list per channel, starting at channel 0.
    fn save_macro(&mut self, id: &MacroId, channels: &[&[Target]]) -> Result<(), StorageError> {
        for (channel, targets) in channels.iter().enumerate() {
            self.save(id, channel, targets)?;
        }
        Ok(())
    }
}
