//! Bounded, ordered storage for parsed steps.

use crate::model::{Step, MAX_STEPS};

/// Steps in script order, capped at a fixed capacity.
///
/// The capacity is fixed when the store is created. Steps pushed past it are
/// counted in [`StepStore::dropped`] and otherwise discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepStore {
    steps: Vec<Step>,
    capacity: usize,
    dropped: usize,
}

impl StepStore {
    /// A store accepting at most `capacity` steps.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::with_capacity(capacity.min(MAX_STEPS)),
            capacity,
            dropped: 0,
        }
    }

    /// An empty store that accepts nothing; used when no script is loaded.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_capacity(0)
    }

    /// Append a step. Returns `false` (and counts the step as dropped) when the
    /// store is already full.
    pub fn push(&mut self, step: Step) -> bool {
        if self.is_full() {
            self.dropped += 1;
            return false;
        }
        self.steps.push(step);
        true
    }

    /// Number of populated steps; the replay engine's scan bound.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether further pushes will be dropped.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.steps.len() >= self.capacity
    }

    /// Most steps the store keeps.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Steps that arrived after the store was full.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The step at `index`, in script order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// All stored steps, in script order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [Step] {
        &mut self.steps
    }

    /// Iterate stored steps in script order.
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// Frame of the most recently stored step.
    #[must_use]
    pub fn last_frame(&self) -> Option<u64> {
        self.steps.last().map(|step| step.frame)
    }

    /// Steps not yet applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.steps.iter().filter(|step| !step.consumed).count()
    }

    /// Drop every step and the overflow count.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.dropped = 0;
    }
}

impl Default for StepStore {
    fn default() -> Self {
        Self::with_capacity(MAX_STEPS)
    }
}

impl<'a> IntoIterator for &'a StepStore {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
