//! Serializable command output, with plain-text renderings.

use inputreplay::{AppliedEvent, EventOutcome, ReplayEngine, ScriptStatus, Step};
use inputreplay::VIRTUAL_KEYBOARD_SLOT;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct StatusReport {
    /// One of `complete`, `partial`, `unreadable`, `not_provided`.
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    pub fn from_status(status: &ScriptStatus) -> Self {
        let kind = match status {
            ScriptStatus::NotProvided => "not_provided",
            ScriptStatus::Unreadable(_) => "unreadable",
            ScriptStatus::Complete => "complete",
            ScriptStatus::Partial(_) => "partial",
        };
        Self {
            kind,
            error: status.error().map(ToString::to_string),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.kind == "complete"
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub status: StatusReport,
    pub capacity: usize,
    pub dropped: usize,
    pub steps: Vec<Step>,
}

impl InspectReport {
    pub fn from_engine(engine: &ReplayEngine) -> Self {
        let store = engine.store();
        Self {
            status: StatusReport::from_status(engine.script_status()),
            capacity: store.capacity(),
            dropped: store.dropped(),
            steps: store.steps().to_vec(),
        }
    }

    pub fn print(&self) {
        println!("script: {}", self.status.kind);
        if let Some(error) = self.status.error.as_ref() {
            println!("error: {error}");
        }
        println!("steps: {} (capacity {})", self.steps.len(), self.capacity);
        if self.dropped > 0 {
            println!("dropped: {}", self.dropped);
        }
        for (index, step) in self.steps.iter().enumerate() {
            let param = step
                .param_str
                .as_deref()
                .map(|value| format!(" \"{value}\""))
                .unwrap_or_default();
            println!(
                "{index:>4}  frame {:>8}  {:<12} key {:>4}{param}",
                step.frame,
                step.action.to_string(),
                step.key_code
            );
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayedEvent {
    /// Frame the host reported when the step fired.
    pub frame: u64,
    #[serde(flatten)]
    pub event: AppliedEvent,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayReport {
    pub status: StatusReport,
    pub frames: u64,
    pub events: Vec<PlayedEvent>,
    pub pending: usize,
    pub pressed: Vec<u32>,
}

impl PlayReport {
    pub fn new(
        engine: &ReplayEngine,
        status: StatusReport,
        frames: u64,
        events: Vec<(u64, AppliedEvent)>,
    ) -> Self {
        Self {
            status,
            frames,
            events: events
                .into_iter()
                .map(|(frame, event)| PlayedEvent { frame, event })
                .collect(),
            pending: engine.pending(),
            pressed: engine.keys().pressed_keys(VIRTUAL_KEYBOARD_SLOT),
        }
    }

    pub fn print(&self) {
        println!("script: {}", self.status.kind);
        if let Some(error) = self.status.error.as_ref() {
            println!("error: {error}");
        }
        for played in &self.events {
            let event = &played.event;
            let outcome = match event.outcome {
                EventOutcome::Pressed => "pressed",
                EventOutcome::Released => "released",
                EventOutcome::KeyOutOfRange => "skipped (key out of range)",
                EventOutcome::UnknownAction => "skipped (unknown action)",
            };
            println!(
                "frame {:>8}  step {:>4}  key {:>4}  {outcome}",
                played.frame, event.step_index, event.key_code
            );
        }
        println!(
            "simulated frames 0..={}; {} step(s) still pending",
            self.frames, self.pending
        );
        let pressed: Vec<String> = self.pressed.iter().map(ToString::to_string).collect();
        if pressed.is_empty() {
            println!("keys held: none");
        } else {
            println!("keys held: {}", pressed.join(", "));
        }
    }
}
