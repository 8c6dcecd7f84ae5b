//! Linear multi-step form controller.
//!
//! The wizard only tracks position. Step data lives in the host's draft, so
//! moving back and forth never loses anything the user typed.

use serde::Serialize;

/// Gate evaluated against the host draft before leaving a step.
pub type StepGate<D> = fn(&D) -> bool;

pub struct WizardStep<D> {
    pub title: &'static str,
    pub description: &'static str,
    gate: StepGate<D>,
}

impl<D> Clone for WizardStep<D> {
    fn clone(&self) -> Self {
        Self {
            title: self.title,
            description: self.description,
            gate: self.gate,
        }
    }
}

impl<D> std::fmt::Debug for WizardStep<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardStep")
            .field("title", &self.title)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<D> WizardStep<D> {
    pub fn new(title: &'static str, description: &'static str, gate: StepGate<D>) -> Self {
        Self {
            title,
            description,
            gate,
        }
    }

    /// A step whose gate always passes.
    pub fn open(title: &'static str, description: &'static str) -> Self {
        Self::new(title, description, always)
    }
}

fn always<D>(_: &D) -> bool {
    true
}

/// Read-only rendering of a step for progress indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub number: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub current: bool,
    pub completed: bool,
}

#[derive(Debug)]
pub struct StepWizard<D> {
    steps: Vec<WizardStep<D>>,
    current: usize,
}

impl<D> StepWizard<D> {
    /// Panics on an empty step list; every wizard in this crate is built from
    /// a fixed, non-empty definition.
    pub fn new(steps: Vec<WizardStep<D>>) -> Self {
        assert!(!steps.is_empty(), "a wizard needs at least one step");
        Self { steps, current: 1 }
    }

    /// 1-based position.
    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_final_step(&self) -> bool {
        self.current == self.steps.len()
    }

    pub fn can_advance(&self, draft: &D) -> bool {
        self.current < self.steps.len() && (self.steps[self.current - 1].gate)(draft)
    }

    /// Moves forward one step when the current gate holds. Returns whether
    /// the position changed.
    pub fn advance(&mut self, draft: &D) -> bool {
        if self.can_advance(draft) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Moves back one step; never gated.
    pub fn retreat(&mut self) -> bool {
        if self.current > 1 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    pub fn steps(&self) -> Vec<StepView> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepView {
                number: index + 1,
                title: step.title,
                description: step.description,
                current: index + 1 == self.current,
                completed: index + 1 < self.current,
            })
            .collect()
    }
}
