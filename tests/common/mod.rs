//! Shared test infrastructure for aqua-schedule integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use aqua_schedule::codec::{self, TimeFormat};
use aqua_schedule::{
    DayTime, MacroId, MacroStorage, OutputStage, ScheduleStorage, StorageError, Target,
    TargetStore, TickTime, TimeSource,
};
use std::cell::Cell;
use std::collections::BTreeMap;

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock clock with controllable time of day and uptime
pub struct MockTimeSource {
    current: Cell<TickTime>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current: Cell::new(TickTime::new(DayTime::MIDNIGHT, 0)),
        }
    }

    pub fn at(hour: u32, minute: u32, second: u32) -> Self {
        let clock = Self::new();
        clock.set_time_of_day(DayTime::from_hms(hour, minute, second));
        clock
    }

    /// Jump the wall clock without advancing uptime
    pub fn set_time_of_day(&self, time: DayTime) {
        let current = self.current.get();
        self.current.set(TickTime::new(time, current.uptime_ms));
    }

    /// Advance both the wall clock and uptime
    pub fn advance_ms(&self, ms: u64) {
        let current = self.current.get();
        let day_ms = u64::from(aqua_schedule::SECONDS_PER_DAY) * 1000;
        let tod_ms = u64::from(current.time_of_day.seconds()) * 1000
            + u64::from(current.time_of_day.millis());
        let tod_ms = (tod_ms + ms) % day_ms;
        self.current.set(TickTime::new(
            DayTime::new((tod_ms / 1000) as u32, (tod_ms % 1000) as u16),
            current.uptime_ms + ms,
        ));
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs * 1000);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> TickTime {
        self.current.get()
    }
}

// ============================================================================
// Mock Output Stage
// ============================================================================

/// Mock PWM driver that records every write
pub struct MockOutput {
    last: [Option<u16>; 16],
    history: heapless::Vec<(u8, u16), 256>,
    writes: usize,
}

impl MockOutput {
    pub fn new() -> Self {
        Self {
            last: [None; 16],
            history: heapless::Vec::new(),
            writes: 0,
        }
    }

    /// Last value written to an address
    pub fn value(&self, address: u8) -> Option<u16> {
        self.last[address as usize]
    }

    pub fn history(&self) -> &[(u8, u16)] {
        &self.history
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl OutputStage for MockOutput {
    fn write(&mut self, address: u8, value: u16) {
        self.last[address as usize] = Some(value);
        let _ = self.history.push((address, value));
        self.writes += 1;
    }
}

// ============================================================================
// In-Memory Storage
// ============================================================================

/// Storage keeping files as text, encoded the same way as on the SD card
#[derive(Default)]
pub struct MemoryStorage {
    pub schedules: BTreeMap<usize, String>,
    pub macros: BTreeMap<(String, usize), String>,
    pub fail_io: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, channel: usize, text: &str) -> Self {
        self.schedules.insert(channel, text.to_string());
        self
    }

    /// Stores the same macro text for channels `0..channels`
    pub fn with_macro(mut self, id: &str, channels: usize, text: &str) -> Self {
        for channel in 0..channels {
            self.macros
                .insert((id.to_string(), channel), text.to_string());
        }
        self
    }

    pub fn with_macro_channel(mut self, id: &str, channel: usize, text: &str) -> Self {
        self.macros.insert((id.to_string(), channel), text.to_string());
        self
    }

    fn encode(targets: &[Target], format: TimeFormat) -> String {
        let mut text = String::new();
        codec::write_targets(&mut text, targets, format).unwrap();
        text
    }
}

impl<const N: usize> ScheduleStorage<N> for MemoryStorage {
    fn load(&mut self, channel: usize) -> Result<TargetStore<N>, StorageError> {
        if self.fail_io {
            return Err(StorageError::Io);
        }
        let text = self.schedules.get(&channel).ok_or(StorageError::NotFound)?;
        Ok(codec::parse_targets(text, TimeFormat::Clock)?)
    }

    fn save(&mut self, channel: usize, targets: &[Target]) -> Result<(), StorageError> {
        if self.fail_io {
            return Err(StorageError::Io);
        }
        self.schedules
            .insert(channel, Self::encode(targets, TimeFormat::Clock));
        Ok(())
    }
}

impl<const N: usize> MacroStorage<N> for MemoryStorage {
    fn list<const M: usize>(&mut self) -> Result<heapless::Vec<MacroId, M>, StorageError> {
        let mut ids = heapless::Vec::new();
        for (id, _) in self.macros.keys() {
            let Some(id) = MacroId::new(id) else { continue };
            if !ids.contains(&id) {
                let _ = ids.push(id);
            }
        }
        Ok(ids)
    }

    fn load(&mut self, id: &MacroId, channel: usize) -> Result<TargetStore<N>, StorageError> {
        if self.fail_io {
            return Err(StorageError::Io);
        }
        let text = self
            .macros
            .get(&(id.as_str().to_string(), channel))
            .ok_or(StorageError::NotFound)?;
        Ok(codec::parse_targets(text, TimeFormat::Elapsed)?)
    }

    fn save(&mut self, id: &MacroId, channel: usize, targets: &[Target]) -> Result<(), StorageError> {
        if self.fail_io {
            return Err(StorageError::Io);
        }
        self.macros.insert(
            (id.as_str().to_string(), channel),
            Self::encode(targets, TimeFormat::Elapsed),
        );
        Ok(())
    }

    fn delete(&mut self, id: &MacroId) -> Result<(), StorageError> {
        let before = self.macros.len();
        self.macros.retain(|(stored, _), _| stored != id.as_str());
        if self.macros.len() == before {
            Err(StorageError::NotFound)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two floats with tolerance
pub fn approx_eq(a: f32, b: f32) -> bool {
    const EPSILON: f32 = 0.01;
    (a - b).abs() < EPSILON
}

/// The lighting day used across tests: ramp up 08:00-10:00, hold, ramp down 20:00-22:00
pub fn daylight_schedule() -> [Target; 4] {
    [
        Target::new(28_800, 0),
        Target::new(36_000, 100),
        Target::new(72_000, 100),
        Target::new(79_200, 0),
    ]
}
