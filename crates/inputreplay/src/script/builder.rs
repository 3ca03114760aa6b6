//! Incremental assembly of one step from a stream of tokens.
//!
//! The builder is a small state machine:
//!
//! ```text
//! AwaitingField --Field--> AwaitingValue --value--> AwaitingField
//! AwaitingField --ObjectEnd--> RecordComplete
//! ```
//!
//! [`next_state`] is the pure transition function; [`StepBuilder::feed`] runs
//! it and records the value when the field is one we know.
//!
//! Objects are not independent: a builder is seeded with the previous
//! object's `action`, `param_num` and `param_str`, so a step that omits them
//! repeats the last values given. Only `frame` starts unset on every object.

use crate::config::FirstFrameDefault;
use crate::model::{clamp_param_str, Step, StepAction, UNSET_FRAME_SENTINEL};
use thiserror::Error;

/// A single lexical event within one script object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// An object member name.
    Field(String),
    /// A non-negative integer value.
    Unsigned(u64),
    /// A string value.
    Text(String),
    /// Any other value (negative or fractional number, bool, null, nested
    /// array or object). Always ignored.
    Other,
    /// The closing brace of the object.
    ObjectEnd,
}

impl Token {
    fn is_value(&self) -> bool {
        matches!(self, Self::Unsigned(_) | Self::Text(_) | Self::Other)
    }
}

/// Members the script format understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldName {
    /// `frame`
    Frame,
    /// `action`
    Action,
    /// `param_num`
    ParamNum,
    /// `param_str`
    ParamStr,
    /// Any other member name; its value is skipped.
    Unknown,
}

impl FieldName {
    /// Classify a member name.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "frame" => Self::Frame,
            "action" => Self::Action,
            "param_num" => Self::ParamNum,
            "param_str" => Self::ParamStr,
            _ => Self::Unknown,
        }
    }
}

/// Where the builder is within one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderState {
    /// Expecting a member name or the end of the object.
    AwaitingField,
    /// A member name was read; its value comes next.
    AwaitingValue(FieldName),
    /// The object has closed.
    RecordComplete,
}

/// A token arrived that the current state cannot accept.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// A value with no member name before it.
    #[error("value without a member name")]
    ValueWithoutField,
    /// A member name followed by something other than a value.
    #[error("member {0:?} has no value")]
    MissingValue(FieldName),
    /// Anything fed after [`Token::ObjectEnd`].
    #[error("token after the end of the object")]
    RecordClosed,
}

/// Transition from `state` on `token`.
pub fn next_state(state: BuilderState, token: &Token) -> Result<BuilderState, BuilderError> {
    match (state, token) {
        (BuilderState::AwaitingField, Token::Field(name)) => {
            Ok(BuilderState::AwaitingValue(FieldName::parse(name)))
        }
        (BuilderState::AwaitingField, Token::ObjectEnd) => Ok(BuilderState::RecordComplete),
        (BuilderState::AwaitingField, _) => Err(BuilderError::ValueWithoutField),
        (BuilderState::AwaitingValue(_), value) if value.is_value() => {
            Ok(BuilderState::AwaitingField)
        }
        (BuilderState::AwaitingValue(field), _) => Err(BuilderError::MissingValue(field)),
        (BuilderState::RecordComplete, _) => Err(BuilderError::RecordClosed),
    }
}

/// Fields collected for one step, before the default-frame rule is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepDraft {
    /// Scripted frame, if the object gave one.
    pub frame: Option<u64>,
    /// Raw action code.
    pub action: u32,
    /// Raw `param_num`.
    pub key_code: u32,
    /// Clamped `param_str`.
    pub param_str: Option<String>,
}

impl StepDraft {
    /// Seed for the next object: everything but `frame` carries over.
    #[must_use]
    pub fn carried(&self) -> Self {
        Self {
            frame: None,
            action: self.action,
            key_code: self.key_code,
            param_str: self.param_str.clone(),
        }
    }

    /// Finalize into a step scheduled at `frame`.
    #[must_use]
    pub fn into_step(self, frame: u64) -> Step {
        Step {
            frame,
            action: StepAction::from_code(self.action),
            key_code: self.key_code,
            param_str: self.param_str,
            consumed: false,
        }
    }
}

/// Assembles one [`StepDraft`] from the tokens of one object.
#[derive(Clone, Debug)]
pub struct StepBuilder {
    state: BuilderState,
    draft: StepDraft,
}

impl StepBuilder {
    /// A builder for the first object of a script.
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(StepDraft::default())
    }

    /// A builder whose unset fields fall back to `draft`.
    #[must_use]
    pub fn seeded(draft: StepDraft) -> Self {
        Self {
            state: BuilderState::AwaitingField,
            draft,
        }
    }

    /// Current state of the object being built.
    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Advance the state machine by one token.
    pub fn feed(&mut self, token: Token) -> Result<(), BuilderError> {
        let next = next_state(self.state, &token)?;
        if let BuilderState::AwaitingValue(field) = self.state {
            self.assign(field, token);
        }
        self.state = next;
        Ok(())
    }

    /// The assembled draft, once the object has been closed.
    #[must_use]
    pub fn finish(self) -> Option<StepDraft> {
        match self.state {
            BuilderState::RecordComplete => Some(self.draft),
            _ => None,
        }
    }

    fn assign(&mut self, field: FieldName, token: Token) {
        match (field, token) {
            (FieldName::Frame, Token::Unsigned(value)) => self.draft.frame = Some(value),
            (FieldName::Action, Token::Unsigned(value)) => {
                if let Ok(value) = u32::try_from(value) {
                    self.draft.action = value;
                }
            }
            (FieldName::ParamNum, Token::Unsigned(value)) => {
                if let Ok(value) = u32::try_from(value) {
                    self.draft.key_code = value;
                }
            }
            (FieldName::ParamStr, Token::Text(value)) => {
                self.draft.param_str = clamp_param_str(value);
            }
            _ => {}
        }
    }
}

impl Default for StepBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the frame a step fires after.
///
/// A scripted frame always wins. Otherwise the step lands `interval` frames
/// after the previous one; the first step falls back to `first`.
#[must_use]
pub fn effective_frame(
    previous: Option<u64>,
    given: Option<u64>,
    interval: u64,
    first: FirstFrameDefault,
) -> u64 {
    match (given, previous) {
        (Some(frame), _) => frame,
        (None, Some(previous)) => previous.saturating_add(interval),
        (None, None) => match first {
            FirstFrameDefault::Zero => 0,
            FirstFrameDefault::Sentinel => UNSET_FRAME_SENTINEL.saturating_add(interval),
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn build(tokens: Vec<Token>) -> Result<Option<StepDraft>, BuilderError> {
        let mut builder = StepBuilder::new();
        for token in tokens {
            builder.feed(token)?;
        }
        Ok(builder.finish())
    }

    #[test]
    fn assembles_all_known_fields() {
        let draft = build(vec![
            Token::Field("frame".into()),
            Token::Unsigned(30),
            Token::Field("action".into()),
            Token::Unsigned(1),
            Token::Field("param_num".into()),
            Token::Unsigned(13),
            Token::Field("param_str".into()),
            Token::Text("enter".into()),
            Token::ObjectEnd,
        ])
        .unwrap()
        .unwrap();

        assert_eq!(draft.frame, Some(30));
        assert_eq!(draft.action, 1);
        assert_eq!(draft.key_code, 13);
        assert_eq!(draft.param_str.as_deref(), Some("enter"));
    }

    #[test]
    fn unknown_fields_and_mistyped_values_are_ignored() {
        let draft = build(vec![
            Token::Field("comment".into()),
            Token::Text("hello".into()),
            Token::Field("frame".into()),
            Token::Text("not a number".into()),
            Token::Field("param_num".into()),
            Token::Other,
            Token::ObjectEnd,
        ])
        .unwrap()
        .unwrap();

        assert_eq!(draft, StepDraft::default());
    }

    #[test]
    fn oversized_codes_leave_defaults() {
        let draft = build(vec![
            Token::Field("action".into()),
            Token::Unsigned(u64::from(u32::MAX) + 1),
            Token::ObjectEnd,
        ])
        .unwrap()
        .unwrap();
        assert_eq!(draft.action, 0);
    }

    #[test]
    fn seeded_builder_keeps_unset_fields() {
        let previous = StepDraft {
            frame: Some(10),
            action: 1,
            key_code: 5,
            param_str: Some("hold".into()),
        };
        let mut builder = StepBuilder::seeded(previous.carried());
        builder.feed(Token::Field("action".into())).unwrap();
        builder.feed(Token::Unsigned(2)).unwrap();
        builder.feed(Token::ObjectEnd).unwrap();
        let draft = builder.finish().unwrap();

        assert_eq!(draft.frame, None);
        assert_eq!(draft.action, 2);
        assert_eq!(draft.key_code, 5);
        assert_eq!(draft.param_str.as_deref(), Some("hold"));
    }

    #[test]
    fn empty_param_str_clears_a_carried_value() {
        let seed = StepDraft {
            param_str: Some("hold".into()),
            ..StepDraft::default()
        };
        let mut builder = StepBuilder::seeded(seed);
        builder.feed(Token::Field("param_str".into())).unwrap();
        builder.feed(Token::Text(String::new())).unwrap();
        builder.feed(Token::ObjectEnd).unwrap();
        assert_eq!(builder.finish().unwrap().param_str, None);
    }

    #[test]
    fn value_without_field_is_rejected() {
        let err = build(vec![Token::Unsigned(1)]).unwrap_err();
        assert_eq!(err, BuilderError::ValueWithoutField);
    }

    #[test]
    fn field_without_value_is_rejected() {
        let err = build(vec![Token::Field("frame".into()), Token::ObjectEnd]).unwrap_err();
        assert_eq!(err, BuilderError::MissingValue(FieldName::Frame));
    }

    #[test]
    fn unfinished_object_yields_nothing() {
        let draft = build(vec![Token::Field("frame".into()), Token::Unsigned(5)]).unwrap();
        assert!(draft.is_none());
    }

    #[test]
    fn transitions_are_pure() {
        let state = BuilderState::AwaitingField;
        let next = next_state(state, &Token::Field("action".into())).unwrap();
        assert_eq!(next, BuilderState::AwaitingValue(FieldName::Action));
        assert_eq!(
            next_state(next, &Token::Unsigned(2)).unwrap(),
            BuilderState::AwaitingField
        );
        assert_eq!(
            next_state(BuilderState::RecordComplete, &Token::ObjectEnd),
            Err(BuilderError::RecordClosed)
        );
    }

    #[test]
    fn effective_frame_rules() {
        assert_eq!(effective_frame(None, Some(7), 60, FirstFrameDefault::Zero), 7);
        assert_eq!(effective_frame(Some(100), None, 60, FirstFrameDefault::Zero), 160);
        assert_eq!(effective_frame(None, None, 60, FirstFrameDefault::Zero), 0);
        assert_eq!(
            effective_frame(None, None, 60, FirstFrameDefault::Sentinel),
            0xffff + 60
        );
        assert_eq!(
            effective_frame(Some(u64::MAX), None, 60, FirstFrameDefault::Zero),
            u64::MAX
        );
    }
}
