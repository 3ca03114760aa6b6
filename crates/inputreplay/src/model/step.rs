//! Scripted steps and their action codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Script action code for pressing a key.
pub const ACTION_PRESS_KEY: u32 = 1;
/// Script action code for releasing a key.
pub const ACTION_RELEASE_KEY: u32 = 2;

/// Longest `param_str` kept on a step, in bytes.
pub const MAX_PARAM_STR_LEN: usize = 254;

/// Frame value the legacy script format used to mean "no frame given".
pub const UNSET_FRAME_SENTINEL: u64 = 0xffff;

/// What a step does when its trigger frame has passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// Mark the step's key as pressed.
    Press,
    /// Mark the step's key as released.
    Release,
    /// Any other action code. Accepted by the parser, ignored at replay time.
    Unknown(u32),
}

impl StepAction {
    /// Decode a script action code.
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            ACTION_PRESS_KEY => Self::Press,
            ACTION_RELEASE_KEY => Self::Release,
            other => Self::Unknown(other),
        }
    }

    /// The script action code for this action.
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Press => ACTION_PRESS_KEY,
            Self::Release => ACTION_RELEASE_KEY,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Press => write!(f, "press"),
            Self::Release => write!(f, "release"),
            Self::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}

/// One scripted input event.
///
/// `key_code` is stored exactly as scripted; range checks happen when the step
/// is applied, not when it is parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Frame after which the step fires.
    pub frame: u64,
    /// Action to apply.
    pub action: StepAction,
    /// Target key code (`param_num` in the script).
    pub key_code: u32,
    /// Free-form parameter carried through from the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_str: Option<String>,
    /// Set once the step has been applied.
    #[serde(default)]
    pub consumed: bool,
}

impl Step {
    /// Build an unconsumed step.
    #[must_use]
    pub fn new(frame: u64, action: StepAction, key_code: u32) -> Self {
        Self {
            frame,
            action,
            key_code,
            param_str: None,
            consumed: false,
        }
    }

    /// Whether the step should fire at `current_frame`.
    ///
    /// The trigger is strict: a step for frame F first fires when the host
    /// reports frame F+1.
    #[must_use]
    pub fn is_due(&self, current_frame: u64) -> bool {
        !self.consumed && current_frame > self.frame
    }
}

/// Truncate a scripted parameter to [`MAX_PARAM_STR_LEN`] bytes without
/// splitting a UTF-8 sequence. Empty strings become `None`.
#[must_use]
pub fn clamp_param_str(mut value: String) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    if value.len() <= MAX_PARAM_STR_LEN {
        return Some(value);
    }
    let mut end = MAX_PARAM_STR_LEN;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
    Some(value)
}
