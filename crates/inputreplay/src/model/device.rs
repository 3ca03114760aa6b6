//! Host device ids, joypad controls and key-table constants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One past the highest key code the state table tracks.
pub const KEY_CODE_LIMIT: u32 = 324;

/// Largest key code limit a state table accepts; covers every 16-bit key code.
pub const MAX_KEY_CODE_LIMIT: u32 = 1 << 16;

/// Number of real device slots. The virtual keyboard slot sits after them.
pub const MAX_PADS: usize = 16;

/// Slot the replay engine writes scripted key state into.
pub const VIRTUAL_KEYBOARD_SLOT: usize = MAX_PADS;

/// The only port queries are answered for.
pub const PRIMARY_PORT: u32 = 0;

/// Joypad query id asking for every control at once as a bitmask.
pub const JOYPAD_MASK: u32 = 256;

/// Number of logical joypad controls that can be bound to keys.
pub const FIRST_CUSTOM_BIND: usize = 16;

/// Input device classes a host may query.
///
/// Discriminants match the host's numeric device ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// No device attached.
    None,
    /// Digital joypad; answered through the binding table.
    Joypad,
    /// Relative pointing device. Not served.
    Mouse,
    /// Keyboard; the query id is a key code.
    Keyboard,
    /// Light gun. Not served.
    Lightgun,
    /// Analog sticks. Not served.
    Analog,
    /// Absolute pointer or touch. Not served.
    Pointer,
}

impl Device {
    /// Decode a host device id.
    #[must_use]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Joypad),
            2 => Some(Self::Mouse),
            3 => Some(Self::Keyboard),
            4 => Some(Self::Lightgun),
            5 => Some(Self::Analog),
            6 => Some(Self::Pointer),
            _ => None,
        }
    }

    /// Numeric id the host uses for this device class.
    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Joypad => 1,
            Self::Mouse => 2,
            Self::Keyboard => 3,
            Self::Lightgun => 4,
            Self::Analog => 5,
            Self::Pointer => 6,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Joypad => "joypad",
            Self::Mouse => "mouse",
            Self::Keyboard => "keyboard",
            Self::Lightgun => "lightgun",
            Self::Analog => "analog",
            Self::Pointer => "pointer",
        };
        f.write_str(name)
    }
}

/// Logical joypad controls, in the order their bits appear in a
/// [`JOYPAD_MASK`] query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoypadButton {
    /// Bottom face button.
    B,
    /// Left face button.
    Y,
    /// Select.
    Select,
    /// Start.
    Start,
    /// D-pad up.
    Up,
    /// D-pad down.
    Down,
    /// D-pad left.
    Left,
    /// D-pad right.
    Right,
    /// Right face button.
    A,
    /// Top face button.
    X,
    /// Left shoulder.
    L,
    /// Right shoulder.
    R,
    /// Left trigger.
    L2,
    /// Right trigger.
    R2,
    /// Left stick click.
    L3,
    /// Right stick click.
    R3,
}

impl JoypadButton {
    /// Every control, in bit order.
    pub const ALL: [Self; FIRST_CUSTOM_BIND] = [
        Self::B,
        Self::Y,
        Self::Select,
        Self::Start,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::A,
        Self::X,
        Self::L,
        Self::R,
        Self::L2,
        Self::R2,
        Self::L3,
        Self::R3,
    ];

    /// Query id / bit position of this control.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The control at query id / bit position `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Key codes used by the default joypad bindings.
pub mod keycodes {
    /// Return / Enter.
    pub const RETURN: u32 = 13;
    /// Letter `a`.
    pub const A: u32 = 97;
    /// Letter `q`.
    pub const Q: u32 = 113;
    /// Letter `s`.
    pub const S: u32 = 115;
    /// Letter `w`.
    pub const W: u32 = 119;
    /// Letter `x`.
    pub const X: u32 = 120;
    /// Letter `z`.
    pub const Z: u32 = 122;
    /// Arrow up.
    pub const UP: u32 = 273;
    /// Arrow down.
    pub const DOWN: u32 = 274;
    /// Arrow right.
    pub const RIGHT: u32 = 275;
    /// Arrow left.
    pub const LEFT: u32 = 276;
    /// Right shift.
    pub const RSHIFT: u32 = 303;
}
