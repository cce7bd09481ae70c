//! Animation scheduler
//!
//! View-global registry of checkpoint animations. Entries are keyed by the
//! identity of the thing they move, not by whoever asked for the motion, so
//! a target can be retargeted by any widget and an entry outlives the widget
//! that created it. Widgets append to the registry during their update; the
//! owning view then advances every entry once per frame and sweeps the
//! finished ones.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use tessera_core::Point;

use crate::checkpoint::{Animatable, AnimationEntry, Checkpoint, PassiveAnimation};
use crate::error::{AnimationError, Result};

new_key_type! {
    /// Handle to a registered checkpoint animation
    pub struct AnimationId;
}

impl AnimationId {
    /// Convert to raw u64 for storage outside the scheduler
    pub fn to_raw(self) -> u64 {
        self.0.as_ffi()
    }

    /// Reconstruct from a value produced by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        AnimationId::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Lookup from target keys to the live objects they name
///
/// Returning `None` means the target is gone; the scheduler skips it.
pub trait AnimationTargets<K> {
    fn target_mut(&mut self, key: K) -> Option<&mut dyn Animatable>;
}

impl<K, T, S> AnimationTargets<K> for HashMap<K, T, S>
where
    K: Eq + Hash,
    T: Animatable,
    S: BuildHasher,
{
    fn target_mut(&mut self, key: K) -> Option<&mut dyn Animatable> {
        self.get_mut(&key).map(|t| t as &mut dyn Animatable)
    }
}

/// Registry of checkpoint animations, one entry per target
#[derive(Debug)]
pub struct AnimationScheduler<K: Copy + Eq + Hash> {
    entries: SlotMap<AnimationId, AnimationEntry<K>>,
    by_target: FxHashMap<K, AnimationId>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Default for AnimationScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> AnimationScheduler<K> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            by_target: FxHashMap::default(),
        }
    }

    /// Entry for `target`, created at `origin` if it has none yet
    fn entry_id(&mut self, target: K, origin: Point) -> AnimationId {
        if let Some(&id) = self.by_target.get(&target) {
            if self.entries.contains_key(id) {
                return id;
            }
        }
        let id = self.entries.insert(AnimationEntry::new(target, origin));
        self.by_target.insert(target, id);
        tracing::trace!("AnimationScheduler: new entry {:?} for {:?}", id, target);
        id
    }

    /// Append `path` to `target`'s animation, creating the entry on first use
    ///
    /// `origin` is the target's current position.
    pub fn animate(
        &mut self,
        target: K,
        origin: Point,
        path: impl IntoIterator<Item = Checkpoint>,
        cumulative: bool,
    ) -> AnimationId {
        let id = self.entry_id(target, origin);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.add_checkpoints(origin, path, cumulative);
        }
        id
    }

    /// Replace `target`'s path with a single checkpoint to `destination`
    pub fn move_to(&mut self, target: K, origin: Point, destination: Checkpoint) -> AnimationId {
        let id = self.entry_id(target, origin);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.change_path(origin, [destination]);
        }
        id
    }

    pub fn add_checkpoints(
        &mut self,
        id: AnimationId,
        origin: Point,
        path: impl IntoIterator<Item = Checkpoint>,
        cumulative: bool,
    ) -> Result<()> {
        self.entries
            .get_mut(id)
            .ok_or(AnimationError::UnknownAnimation(id))?
            .add_checkpoints(origin, path, cumulative);
        Ok(())
    }

    /// Discard pending checkpoints and restart from `from`
    pub fn change_path(
        &mut self,
        id: AnimationId,
        from: Point,
        path: impl IntoIterator<Item = Checkpoint>,
    ) -> Result<()> {
        self.entries
            .get_mut(id)
            .ok_or(AnimationError::UnknownAnimation(id))?
            .change_path(from, path);
        Ok(())
    }

    /// Layer a passive animation on `target`, creating the entry if needed
    pub fn set_passive(&mut self, target: K, origin: Point, passive: PassiveAnimation) -> AnimationId {
        let id = self.entry_id(target, origin);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.set_passive(Some(passive));
        }
        id
    }

    pub fn clear_passive(&mut self, id: AnimationId) -> Result<()> {
        self.entries
            .get_mut(id)
            .ok_or(AnimationError::UnknownAnimation(id))?
            .set_passive(None);
        Ok(())
    }

    pub fn entry(&self, id: AnimationId) -> Option<&AnimationEntry<K>> {
        self.entries.get(id)
    }

    pub fn entry_mut(&mut self, id: AnimationId) -> Option<&mut AnimationEntry<K>> {
        self.entries.get_mut(id)
    }

    pub fn entry_for(&self, target: K) -> Option<AnimationId> {
        self.by_target
            .get(&target)
            .copied()
            .filter(|id| self.entries.contains_key(*id))
    }

    pub fn remove(&mut self, id: AnimationId) -> Option<AnimationEntry<K>> {
        let entry = self.entries.remove(id)?;
        if self.by_target.get(&entry.target()) == Some(&id) {
            self.by_target.remove(&entry.target());
        }
        Some(entry)
    }

    /// Drop whatever animation `target` has; call when the target is destroyed
    pub fn remove_target(&mut self, target: K) -> Option<AnimationEntry<K>> {
        let id = self.by_target.remove(&target)?;
        self.entries.remove(id)
    }

    /// Advance every entry by `dt` seconds
    ///
    /// Returns whether any entry still has work left.
    pub fn tick(&mut self, dt: f32, targets: &mut impl AnimationTargets<K>) -> bool {
        for (id, entry) in self.entries.iter_mut() {
            match targets.target_mut(entry.target()) {
                Some(target) => entry.frame(dt, target),
                None => tracing::debug!(
                    "AnimationScheduler: target {:?} of {:?} is gone, skipping",
                    entry.target(),
                    id
                ),
            }
        }
        self.has_active_animations()
    }

    /// Remove every finished entry, returning what was removed
    pub fn sweep_finished(&mut self) -> Vec<(AnimationId, K)> {
        let finished: Vec<(AnimationId, K)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.finished())
            .map(|(id, entry)| (id, entry.target()))
            .collect();

        for &(id, target) in &finished {
            self.entries.remove(id);
            if self.by_target.get(&target) == Some(&id) {
                self.by_target.remove(&target);
            }
        }
        finished
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_active_animations(&self) -> bool {
        self.entries.values().any(|entry| !entry.finished())
    }
}
