//! Input-Replay: deterministic, frame-accurate replay of scripted key input.
//!
//! This crate reads a JSON script of timed key commands, turns it into a bounded
//! sequence of steps, and drives a synthetic key-state table from the host's
//! frame loop so that an application under test sees key presses and releases
//! at exactly the frames the script asks for.
//!
//! # Example
//!
//! ```no_run
//! use inputreplay::{Device, EngineConfig, ReplayEngine};
//! use std::path::Path;
//!
//! let mut engine = ReplayEngine::initialize(Path::new("script.json"), EngineConfig::default());
//! for frame in 0..600 {
//!     engine.advance(frame);
//!     let pressed = engine.query(0, Device::Keyboard.id(), 0, 13);
//!     # let _ = pressed;
//! }
//! engine.shutdown();
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod model;
pub mod query;
pub mod script;
pub mod store;

pub use crate::config::{load_config_file, EngineConfig, FirstFrameDefault};
pub use crate::engine::{AdvanceReport, AppliedEvent, EventOutcome, ReplayEngine, ScriptStatus};
pub use crate::error::{ConfigError, QueryError, ScriptError};
pub use crate::keys::KeyStateTable;
pub use crate::model::*;
pub use crate::query::{Bindings, IdentityKeymap, Keymap};
pub use crate::script::{load_script_file, parse_script, ParseStatus, ParsedScript, ScriptOptions};
pub use crate::store::StepStore;
