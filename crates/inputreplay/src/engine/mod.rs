//! The per-frame replay engine.
//!
//! A [`ReplayEngine`] owns everything one replay session needs: the parsed
//! steps, the synthetic key state, and the bindings used to answer joypad
//! queries. The host calls [`ReplayEngine::advance`] once per rendered frame
//! and [`ReplayEngine::query`] whenever it samples input.

use crate::config::EngineConfig;
use crate::error::{QueryError, ScriptError};
use crate::keys::KeyStateTable;
use crate::model::{EngineId, StepAction, VIRTUAL_KEYBOARD_SLOT};
use crate::query::{self, IdentityKeymap, InputQuery, Keymap};
use crate::script::{load_script_file, ParseStatus, ParsedScript, ScriptOptions};
use crate::store::StepStore;
use serde::Serialize;
use std::cell::Cell;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Span};

/// How the engine's script was obtained.
#[derive(Debug)]
pub enum ScriptStatus {
    /// No script path was configured.
    NotProvided,
    /// The script could not be opened; the engine runs with no steps.
    Unreadable(ScriptError),
    /// The script was read to the end.
    Complete,
    /// The script was malformed; steps before the error were kept.
    Partial(ScriptError),
}

impl ScriptStatus {
    /// The load or parse failure, if there was one.
    #[must_use]
    pub fn error(&self) -> Option<&ScriptError> {
        match self {
            Self::Unreadable(err) | Self::Partial(err) => Some(err),
            Self::NotProvided | Self::Complete => None,
        }
    }
}

/// What happened to a step when it fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    /// The key is now held.
    Pressed,
    /// The key is now released.
    Released,
    /// The key code is outside the state table; nothing changed.
    KeyOutOfRange,
    /// The action code is not press or release; nothing changed.
    UnknownAction,
}

/// One step applied during an [`ReplayEngine::advance`] call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedEvent {
    /// Position of the step in the script.
    pub step_index: usize,
    /// Frame the step was scheduled after.
    pub step_frame: u64,
    /// Action the step carried.
    pub action: StepAction,
    /// Key code the step targeted.
    pub key_code: u32,
    /// What the engine did with it.
    pub outcome: EventOutcome,
}

/// Steps applied by one [`ReplayEngine::advance`] call, in script order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AdvanceReport {
    /// Frame passed to `advance`.
    pub frame: u64,
    /// Steps that fired on this frame.
    pub events: Vec<AppliedEvent>,
}

impl AdvanceReport {
    /// Whether any key state changed on this frame.
    #[must_use]
    pub fn changed_state(&self) -> bool {
        self.events.iter().any(|event| {
            matches!(
                event.outcome,
                EventOutcome::Pressed | EventOutcome::Released
            )
        })
    }
}

/// Replays one script against a synthetic key state table.
pub struct ReplayEngine {
    id: EngineId,
    config: EngineConfig,
    store: StepStore,
    keys: KeyStateTable,
    keymap: Box<dyn Keymap>,
    status: ScriptStatus,
    span: Span,
    unsupported_port_logged: Cell<bool>,
}

impl ReplayEngine {
    /// Create an engine from a script file.
    ///
    /// An empty path means "no script". A path that cannot be opened is
    /// logged and the engine starts with no steps; neither is an error.
    pub fn initialize(script_path: &Path, config: EngineConfig) -> Self {
        let id = EngineId::new();
        let span = info_span!("replay_engine", engine = %id);
        let (store, status) = span.in_scope(|| {
            if script_path.as_os_str().is_empty() {
                debug!("no replay script supplied");
                return (StepStore::empty(), ScriptStatus::NotProvided);
            }
            match load_script_file(script_path, &ScriptOptions::from(&config)) {
                Ok(parsed) => split_parsed(parsed),
                Err(err) => (StepStore::empty(), ScriptStatus::Unreadable(err)),
            }
        });
        Self::assemble(id, span, config, store, status)
    }

    /// Create an engine from an already parsed script.
    #[must_use]
    pub fn from_parsed(parsed: ParsedScript, config: EngineConfig) -> Self {
        let id = EngineId::new();
        let span = info_span!("replay_engine", engine = %id);
        let (store, status) = split_parsed(parsed);
        Self::assemble(id, span, config, store, status)
    }

    fn assemble(
        id: EngineId,
        span: Span,
        config: EngineConfig,
        store: StepStore,
        status: ScriptStatus,
    ) -> Self {
        span.in_scope(|| info!(steps = store.len(), "replay engine started"));
        Self {
            id,
            keys: KeyStateTable::new(config.key_code_limit),
            config,
            store,
            keymap: Box::new(IdentityKeymap),
            status,
            span,
            unsupported_port_logged: Cell::new(false),
        }
    }

    /// Use `keymap` to translate bound joypad keys.
    #[must_use]
    pub fn with_keymap(mut self, keymap: impl Keymap + 'static) -> Self {
        self.keymap = Box::new(keymap);
        self
    }

    /// Apply every step whose trigger frame is strictly before `current_frame`.
    ///
    /// Each step is applied at most once for the lifetime of the engine, so
    /// calling this repeatedly with the same frame is a no-op after the first.
    pub fn advance(&mut self, current_frame: u64) -> AdvanceReport {
        let _entered = self.span.enter();
        let mut report = AdvanceReport {
            frame: current_frame,
            events: Vec::new(),
        };
        for (index, step) in self.store.steps_mut().iter_mut().enumerate() {
            if !step.is_due(current_frame) {
                continue;
            }
            let outcome = match step.action {
                StepAction::Press => {
                    set_key(&mut self.keys, index, step.key_code, true, current_frame)
                }
                StepAction::Release => {
                    set_key(&mut self.keys, index, step.key_code, false, current_frame)
                }
                StepAction::Unknown(code) => {
                    warn!(action = code, step = index, "unrecognized action in step, skipping");
                    EventOutcome::UnknownAction
                }
            };
            step.consumed = true;
            report.events.push(AppliedEvent {
                step_index: index,
                step_frame: step.frame,
                action: step.action,
                key_code: step.key_code,
                outcome,
            });
        }
        report
    }

    /// Answer a host input query. Unsupported ports and devices read as 0.
    pub fn query(&self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        match self.try_query(port, device, index, id) {
            Ok(value) => value,
            Err(err @ QueryError::UnsupportedPort(_)) => {
                if !self.unsupported_port_logged.replace(true) {
                    self.span
                        .in_scope(|| debug!(error = %err, "answering query with no input"));
                }
                0
            }
            Err(QueryError::UnsupportedDevice(_)) => 0,
        }
    }

    /// Answer a host input query, reporting queries this driver does not serve.
    pub fn try_query(&self, port: u32, device: u32, index: u32, id: u32) -> Result<i16, QueryError> {
        InputQuery::new(&self.keys, &self.config.bindings, self.keymap.as_ref())
            .state(port, device, index, id)
    }

    /// Device classes this driver answers, as a bitmask of device ids.
    #[must_use]
    pub fn capabilities(&self) -> u64 {
        query::capabilities()
    }

    /// Release every key. Steps keep their consumed flags.
    pub fn reset(&mut self) {
        self.keys.reset();
    }

    /// Tear the engine down, releasing all keys and dropping the steps.
    pub fn shutdown(mut self) {
        self.keys.reset();
        self.store.clear();
        self.span.in_scope(|| debug!("replay engine shut down"));
    }

    /// Id recorded on this engine's log span.
    #[must_use]
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// Settings the engine was created with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The loaded steps.
    #[must_use]
    pub fn store(&self) -> &StepStore {
        &self.store
    }

    /// The synthetic key state.
    #[must_use]
    pub fn keys(&self) -> &KeyStateTable {
        &self.keys
    }

    /// How the script was obtained.
    #[must_use]
    pub fn script_status(&self) -> &ScriptStatus {
        &self.status
    }

    /// Whether scripted key `key_code` is currently held.
    #[must_use]
    pub fn is_pressed(&self, key_code: u32) -> bool {
        self.keys.is_pressed(VIRTUAL_KEYBOARD_SLOT, key_code)
    }

    /// Steps that have not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.store.pending()
    }

    /// Whether every step has fired.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pending() == 0
    }
}

impl std::fmt::Debug for ReplayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("id", &self.id)
            .field("steps", &self.store.len())
            .field("pending", &self.pending())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

fn split_parsed(parsed: ParsedScript) -> (StepStore, ScriptStatus) {
    let status = match parsed.status {
        ParseStatus::Complete => ScriptStatus::Complete,
        ParseStatus::Partial { error } => ScriptStatus::Partial(error),
    };
    (parsed.store, status)
}

fn set_key(
    keys: &mut KeyStateTable,
    index: usize,
    key_code: u32,
    pressed: bool,
    frame: u64,
) -> EventOutcome {
    if !keys.set(VIRTUAL_KEYBOARD_SLOT, key_code, pressed) {
        warn!(
            key_code,
            step = index,
            limit = keys.key_limit(),
            "key code out of range, skipping step"
        );
        return EventOutcome::KeyOutOfRange;
    }
    if pressed {
        debug!("pressing keyboard button {key_code} at frame {frame}");
        EventOutcome::Pressed
    } else {
        debug!("releasing keyboard button {key_code} at frame {frame}");
        EventOutcome::Released
    }
}
