//! Replay script parsing.
//!
//! A script is a JSON array of objects, each describing one step:
//!
//! ```json
//! [
//!   { "frame": 120, "action": 1, "param_num": 13 },
//!   { "action": 2, "param_num": 13 }
//! ]
//! ```
//!
//! Parsing is streaming: serde drives a visitor over the token stream and each
//! object is assembled by a [`builder::StepBuilder`] and stored as soon as it
//! closes, so no document tree is ever built. A syntax error stops parsing but
//! keeps every step completed before it; the caller sees that as
//! [`ParseStatus::Partial`].

pub mod builder;
mod source;

use crate::config::{EngineConfig, FirstFrameDefault};
use crate::error::ScriptError;
use crate::model::{MAX_STEPS, NOMINAL_FPS};
use crate::store::StepStore;
use builder::{effective_frame, StepBuilder, StepDraft, Token};
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use source::SourceReader;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, error, warn};

/// Parsing knobs, normally derived from [`EngineConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Most steps kept; later steps are counted as dropped.
    pub capacity: usize,
    /// Spacing for steps that omit `frame`.
    pub frame_interval: u64,
    /// Frame for a first step that omits `frame`.
    pub first_frame_default: FirstFrameDefault,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            capacity: MAX_STEPS,
            frame_interval: NOMINAL_FPS,
            first_frame_default: FirstFrameDefault::default(),
        }
    }
}

impl From<&EngineConfig> for ScriptOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            capacity: config.capacity,
            frame_interval: config.frame_interval,
            first_frame_default: config.first_frame_default,
        }
    }
}

/// Whether the whole script was read.
#[derive(Debug)]
pub enum ParseStatus {
    /// The script was read to the end.
    Complete,
    /// Parsing stopped at `error`; steps before it were kept.
    Partial { error: ScriptError },
}

impl ParseStatus {
    /// Whether the script was read to the end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Result of parsing one script.
#[derive(Debug)]
pub struct ParsedScript {
    /// Steps kept, in script order.
    pub store: StepStore,
    /// Whether parsing reached the end.
    pub status: ParseStatus,
}

/// Open and parse a script file.
///
/// Only failure to open the file is an error. Malformed content yields a
/// [`ParsedScript`] whose status is [`ParseStatus::Partial`].
pub fn load_script_file(path: &Path, options: &ScriptOptions) -> Result<ParsedScript, ScriptError> {
    let file = File::open(path).map_err(|source| {
        error!(path = %path.display(), error = %source, "failed to open replay script");
        ScriptError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let parsed = parse_script(BufReader::new(file), options);
    if !parsed.status.is_complete() {
        warn!(path = %path.display(), "error parsing replay script");
    }
    Ok(parsed)
}

/// Parse a script from any buffered byte stream.
pub fn parse_script<R: BufRead>(reader: R, options: &ScriptOptions) -> ParsedScript {
    let mut source = SourceReader::new(reader);
    let mut collector = StepCollector::new(options);

    let result = {
        let mut deserializer = serde_json::Deserializer::from_reader(&mut source);
        ScriptSeed {
            collector: &mut collector,
        }
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end())
    };

    let status = match result {
        Ok(()) => ParseStatus::Complete,
        Err(err) => {
            let error = ScriptError::syntax(&err, source.context());
            if let ScriptError::Syntax {
                line,
                column,
                message,
                snippet,
            } = &error
            {
                error!("error parsing chunk of replay script:\n---snip---\n{snippet}\n---snip---");
                error!(line, column, "invalid JSON in replay script: {message}");
            }
            ParseStatus::Partial { error }
        }
    };

    let store = collector.finish();
    if store.dropped() > 0 {
        warn!(
            maximum = store.capacity(),
            dropped = store.dropped(),
            "replay script too long, maximum size: {}",
            store.capacity()
        );
    }
    for (index, step) in store.iter().enumerate() {
        debug!(
            "step {index:02} read from script: frame {}, action {}, num {:#x}, str {}",
            step.frame,
            step.action,
            step.key_code,
            step.param_str.as_deref().unwrap_or("")
        );
    }

    ParsedScript { store, status }
}

/// Applies the default-frame and capacity rules to finished drafts.
struct StepCollector {
    store: StepStore,
    frame_interval: u64,
    first_frame_default: FirstFrameDefault,
    carry: StepDraft,
}

impl StepCollector {
    fn new(options: &ScriptOptions) -> Self {
        Self {
            store: StepStore::with_capacity(options.capacity),
            frame_interval: options.frame_interval,
            first_frame_default: options.first_frame_default,
            carry: StepDraft::default(),
        }
    }

    fn builder(&self) -> StepBuilder {
        StepBuilder::seeded(self.carry.carried())
    }

    fn accept(&mut self, draft: StepDraft) {
        self.carry = draft.carried();
        let frame = effective_frame(
            self.store.last_frame(),
            draft.frame,
            self.frame_interval,
            self.first_frame_default,
        );
        self.store.push(draft.into_step(frame));
    }

    fn finish(self) -> StepStore {
        self.store
    }
}

/// Top level: an array of step objects, or a single object.
struct ScriptSeed<'a> {
    collector: &'a mut StepCollector,
}

impl<'de> DeserializeSeed<'de> for ScriptSeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ScriptSeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of step objects")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let ScriptSeed { collector } = self;
        while seq
            .next_element_seed(EntrySeed {
                collector: &mut *collector,
            })?
            .is_some()
        {}
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<(), A::Error> {
        EntrySeed {
            collector: self.collector,
        }
        .visit_map(map)
    }
}

/// One array element. Objects become steps; anything else is skipped.
struct EntrySeed<'a> {
    collector: &'a mut StepCollector,
}

impl<'de> DeserializeSeed<'de> for EntrySeed<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for EntrySeed<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a step object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let mut builder = self.collector.builder();
        while let Some(name) = map.next_key::<String>()? {
            builder.feed(Token::Field(name)).map_err(de::Error::custom)?;
            let ValueToken(value) = map.next_value()?;
            builder.feed(value).map_err(de::Error::custom)?;
        }
        builder.feed(Token::ObjectEnd).map_err(de::Error::custom)?;
        if let Some(draft) = builder.finish() {
            self.collector.accept(draft);
        }
        Ok(())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        debug!("skipping non-object entry in replay script");
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<(), E> {
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<(), E> {
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<(), E> {
        Ok(())
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<(), E> {
        Ok(())
    }

    fn visit_str<E: de::Error>(self, _value: &str) -> Result<(), E> {
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Ok(())
    }
}

/// A member value reduced to the tokens the builder understands.
struct ValueToken(Token);

impl<'de> de::Deserialize<'de> for ValueToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = ValueToken;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a step member value")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Unsigned(value)))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<ValueToken, E> {
        Ok(ValueToken(
            u64::try_from(value).map_or(Token::Other, Token::Unsigned),
        ))
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Other))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Other))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Text(value.to_string())))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Text(value)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ValueToken, E> {
        Ok(ValueToken(Token::Other))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ValueToken, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(ValueToken(Token::Other))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ValueToken, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(ValueToken(Token::Other))
    }
}
