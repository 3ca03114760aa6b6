//! Host-facing input queries over the synthetic key state.
//!
//! The host asks for input by (port, device, index, id). Keyboard queries read
//! a key code directly; joypad queries go through a [`Bindings`] table that
//! maps each logical control to a key, and a [`Keymap`] that translates bound
//! keys into the codes the state table is indexed by.

use crate::error::QueryError;
use crate::keys::KeyStateTable;
use crate::model::{
    keycodes, Device, JoypadButton, FIRST_CUSTOM_BIND, JOYPAD_MASK, PRIMARY_PORT,
    VIRTUAL_KEYBOARD_SLOT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Translates a bound key into the key code the state table uses.
pub trait Keymap {
    /// State-table key code for bound key `key`.
    fn translate(&self, key: u32) -> u32;
}

/// Keymap for hosts whose bindings already use state-table key codes.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityKeymap;

impl Keymap for IdentityKeymap {
    fn translate(&self, key: u32) -> u32 {
        key
    }
}

impl<F> Keymap for F
where
    F: Fn(u32) -> u32,
{
    fn translate(&self, key: u32) -> u32 {
        self(key)
    }
}

/// Key bound to each logical joypad control. Unbound controls never report
/// as pressed.
///
/// Serialized as a map from control name to key code, e.g.
/// `{"a": 120, "start": 13}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<JoypadButton, u32>",
    into = "BTreeMap<JoypadButton, u32>"
)]
pub struct Bindings {
    keys: [Option<u32>; FIRST_CUSTOM_BIND],
}

impl Bindings {
    /// No control bound.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            keys: [None; FIRST_CUSTOM_BIND],
        }
    }

    /// Bind `button` to `key`, replacing any previous binding.
    #[must_use]
    pub fn with(mut self, button: JoypadButton, key: u32) -> Self {
        self.set(button, Some(key));
        self
    }

    /// Bind `button` to `key`, or unbind it with `None`.
    pub fn set(&mut self, button: JoypadButton, key: Option<u32>) {
        if let Some(slot) = self.keys.get_mut(button.index()) {
            *slot = key;
        }
    }

    /// Key bound to `button`, if any.
    #[must_use]
    pub fn key_for(&self, button: JoypadButton) -> Option<u32> {
        self.key_at(button.index())
    }

    fn key_at(&self, index: usize) -> Option<u32> {
        self.keys.get(index).copied().flatten()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::unbound()
            .with(JoypadButton::B, keycodes::Z)
            .with(JoypadButton::Y, keycodes::A)
            .with(JoypadButton::Select, keycodes::RSHIFT)
            .with(JoypadButton::Start, keycodes::RETURN)
            .with(JoypadButton::Up, keycodes::UP)
            .with(JoypadButton::Down, keycodes::DOWN)
            .with(JoypadButton::Left, keycodes::LEFT)
            .with(JoypadButton::Right, keycodes::RIGHT)
            .with(JoypadButton::A, keycodes::X)
            .with(JoypadButton::X, keycodes::S)
            .with(JoypadButton::L, keycodes::Q)
            .with(JoypadButton::R, keycodes::W)
    }
}

impl From<BTreeMap<JoypadButton, u32>> for Bindings {
    fn from(map: BTreeMap<JoypadButton, u32>) -> Self {
        map.into_iter()
            .fold(Self::unbound(), |bindings, (button, key)| {
                bindings.with(button, key)
            })
    }
}

impl From<Bindings> for BTreeMap<JoypadButton, u32> {
    fn from(bindings: Bindings) -> Self {
        JoypadButton::ALL
            .iter()
            .filter_map(|button| bindings.key_for(*button).map(|key| (*button, key)))
            .collect()
    }
}

/// Device classes the replay driver answers, as a bitmask of device ids.
#[must_use]
pub fn capabilities() -> u64 {
    (1_u64 << Device::Joypad.id()) | (1_u64 << Device::Keyboard.id())
}

/// A read-only view answering host queries against one key state table.
pub struct InputQuery<'a> {
    keys: &'a KeyStateTable,
    bindings: &'a Bindings,
    keymap: &'a dyn Keymap,
}

impl<'a> InputQuery<'a> {
    /// Answer queries from `keys`, resolving joypad controls through
    /// `bindings` and `keymap`.
    #[must_use]
    pub fn new(keys: &'a KeyStateTable, bindings: &'a Bindings, keymap: &'a dyn Keymap) -> Self {
        Self {
            keys,
            bindings,
            keymap,
        }
    }

    /// Answer a host query, reporting queries this driver does not serve.
    ///
    /// `_index` is accepted for signature compatibility; keyboard and joypad
    /// queries have no sub-index.
    pub fn state(&self, port: u32, device: u32, _index: u32, id: u32) -> Result<i16, QueryError> {
        if port != PRIMARY_PORT {
            return Err(QueryError::UnsupportedPort(port));
        }
        match Device::from_id(device) {
            Some(Device::Joypad) if id == JOYPAD_MASK => Ok(self.joypad_mask()),
            Some(Device::Joypad) => Ok(i16::from(self.control_pressed(id))),
            Some(Device::Keyboard) => Ok(i16::from(self.key_pressed(id))),
            _ => Err(QueryError::UnsupportedDevice(device)),
        }
    }

    /// Bit `i` is set when joypad control `i` is bound and its key is pressed.
    #[must_use]
    pub fn joypad_mask(&self) -> i16 {
        let mask = (0..FIRST_CUSTOM_BIND)
            .filter(|index| self.bound_key_pressed(*index))
            .fold(0_u16, |mask, index| mask | (1 << index));
        // The host ABI packs all sixteen controls into a signed 16-bit value.
        i16::from_ne_bytes(mask.to_ne_bytes())
    }

    fn control_pressed(&self, id: u32) -> bool {
        usize::try_from(id).is_ok_and(|index| self.bound_key_pressed(index))
    }

    fn bound_key_pressed(&self, index: usize) -> bool {
        self.bindings
            .key_at(index)
            .is_some_and(|key| self.key_pressed(self.keymap.translate(key)))
    }

    fn key_pressed(&self, key_code: u32) -> bool {
        self.keys.is_pressed(VIRTUAL_KEYBOARD_SLOT, key_code)
    }
}
