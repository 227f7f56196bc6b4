//! Bounded, time-ordered target storage for a single channel.

use crate::types::{StoreError, Target};
use heapless::Vec;

/// Default number of targets a channel can hold.
pub const DEFAULT_MAX_TARGETS: usize = 24;

/// An ordered set of [`Target`]s with fixed capacity.
///
/// Targets are kept strictly ascending by time with no duplicate times.
/// Insertion shifts later entries right instead of re-sorting, which is cheap
/// at the small capacities used on microcontrollers.
///
/// # Type Parameters
/// * `N` - Maximum number of targets
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetStore<const N: usize = DEFAULT_MAX_TARGETS> {
    targets: Vec<Target, N>,
}

impl<const N: usize> TargetStore<N> {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Builds a store from targets in any order.
    ///
    /// Later entries win when two targets share a time.
    ///
    /// # Errors
    /// * `CapacityExceeded` - More distinct times than the store can hold
    pub fn from_targets(targets: &[Target]) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for target in targets {
            store.add_target(*target)?;
        }
        Ok(store)
    }

    /// Inserts a target at its ordered position and returns that position.
    ///
    /// A target whose time is already present replaces the stored value in
    /// place, so the store never holds duplicate times.
    ///
    /// # Errors
    /// * `CapacityExceeded` - The store is full and `target.time` is new
    pub fn add_target(&mut self, target: Target) -> Result<usize, StoreError> {
        if let Some(pos) = self.position_of(target.time) {
            self.targets[pos] = target;
            return Ok(pos);
        }

        if self.targets.is_full() {
            return Err(StoreError::CapacityExceeded);
        }

        let pos = self
            .targets
            .iter()
            .position(|t| t.time > target.time)
            .unwrap_or(self.targets.len());

        self.targets
            .insert(pos, target)
            .map_err(|_| StoreError::CapacityExceeded)?;
        Ok(pos)
    }

    /// Removes the target at `pos`, shifting later targets left.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - `pos` is not below [`len`](Self::len)
    pub fn remove_target_at(&mut self, pos: usize) -> Result<Target, StoreError> {
        if pos >= self.targets.len() {
            return Err(StoreError::IndexOutOfRange);
        }
        Ok(self.targets.remove(pos))
    }

    /// Removes the target at exactly `time`, if present.
    pub fn remove_time(&mut self, time: u32) -> Option<Target> {
        let pos = self.position_of(time)?;
        Some(self.targets.remove(pos))
    }

    /// Removes all targets.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Returns the index of the target at exactly `time`.
    pub fn position_of(&self, time: u32) -> Option<usize> {
        self.targets.iter().position(|t| t.time == time)
    }

    pub fn get(&self, pos: usize) -> Option<&Target> {
        self.targets.get(pos)
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.targets.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<'a, const N: usize> IntoIterator for &'a TargetStore<N> {
    type Item = &'a Target;
    type IntoIter = core::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
