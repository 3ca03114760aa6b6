//! Synthetic key state, indexed by slot and key code.

use crate::model::{KEY_CODE_LIMIT, MAX_KEY_CODE_LIMIT, MAX_PADS};

/// Pressed/released flags for every (slot, key code) pair.
///
/// Slots `0..MAX_PADS` mirror real device slots; slot [`MAX_PADS`] is the
/// virtual keyboard the replay engine writes to. Out-of-range slots or key
/// codes are rejected by [`KeyStateTable::set`] and read as released.
///
/// [`MAX_PADS`]: crate::model::MAX_PADS
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStateTable {
    pressed: Vec<bool>,
    key_limit: u32,
}

impl KeyStateTable {
    /// Number of slots in every table: the real pads plus the virtual keyboard.
    pub const SLOTS: usize = MAX_PADS + 1;

    /// Create a table tracking key codes `0..key_limit`, all released.
    ///
    /// `key_limit` is capped at [`MAX_KEY_CODE_LIMIT`].
    ///
    /// [`MAX_KEY_CODE_LIMIT`]: crate::model::MAX_KEY_CODE_LIMIT
    #[must_use]
    pub fn new(key_limit: u32) -> Self {
        let key_limit = key_limit.min(MAX_KEY_CODE_LIMIT);
        let per_slot = usize::try_from(key_limit).unwrap_or(usize::MAX);
        Self {
            pressed: vec![false; per_slot.saturating_mul(Self::SLOTS)],
            key_limit,
        }
    }

    /// One past the highest tracked key code.
    #[must_use]
    pub fn key_limit(&self) -> u32 {
        self.key_limit
    }

    /// Whether `key_code` fits in the table.
    #[must_use]
    pub fn contains_key(&self, key_code: u32) -> bool {
        key_code < self.key_limit
    }

    /// Set a key's state. Returns `false` without changing anything when the
    /// slot or key code is outside the table.
    pub fn set(&mut self, slot: usize, key_code: u32, pressed: bool) -> bool {
        let Some(offset) = self.offset(slot, key_code) else {
            return false;
        };
        match self.pressed.get_mut(offset) {
            Some(entry) => {
                *entry = pressed;
                true
            }
            None => false,
        }
    }

    /// Whether `key_code` is held in `slot`. Out-of-range reads as released.
    #[must_use]
    pub fn is_pressed(&self, slot: usize, key_code: u32) -> bool {
        self.offset(slot, key_code)
            .and_then(|offset| self.pressed.get(offset))
            .copied()
            .unwrap_or(false)
    }

    /// Key codes currently pressed in `slot`, ascending.
    #[must_use]
    pub fn pressed_keys(&self, slot: usize) -> Vec<u32> {
        (0..self.key_limit)
            .filter(|key| self.is_pressed(slot, *key))
            .collect()
    }

    /// Release every key in every slot.
    pub fn reset(&mut self) {
        self.pressed.iter_mut().for_each(|entry| *entry = false);
    }

    fn offset(&self, slot: usize, key_code: u32) -> Option<usize> {
        if slot >= Self::SLOTS || !self.contains_key(key_code) {
            return None;
        }
        let per_slot = usize::try_from(self.key_limit).ok()?;
        let key = usize::try_from(key_code).ok()?;
        slot.checked_mul(per_slot)?.checked_add(key)
    }
}

impl Default for KeyStateTable {
    fn default() -> Self {
        Self::new(KEY_CODE_LIMIT)
    }
}
