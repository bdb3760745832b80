//! Rule-firing trace reconstruction.
//!
//! Wraps the solver's execution log into an ordered sequence of step views.
//! Each step can be expanded independently; the working-memory snapshots are
//! exposed through accessors so a renderer only touches them on demand.

use jointscope_protocol::{SolverSnapshot, TraceStep, WmState};

/// Which arm of the selected rule's condition was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Then,
    Else,
}

/// One expandable step of the inference trace.
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    /// 1-based position in the trace, as shown to the operator.
    pub number: usize,
    step: &'a TraceStep,
}

impl<'a> StepView<'a> {
    pub fn selected_rule(&self) -> &'a str {
        &self.step.selected_rule
    }

    pub fn branch(&self) -> Branch {
        if self.step.rule_condition_value {
            Branch::Then
        } else {
            Branch::Else
        }
    }

    pub fn conflict_rules(&self) -> &'a [String] {
        &self.step.conflict_rules
    }

    /// Rules fired before this step. The selected rule is part of
    /// `fired_rules` on the wire and is filtered out of this view.
    pub fn previously_fired(&self) -> Vec<&'a str> {
        self.step
            .fired_rules
            .iter()
            .filter(|rule| *rule != &self.step.selected_rule)
            .map(String::as_str)
            .collect()
    }

    pub fn initial_wm(&self) -> &'a WmState {
        &self.step.initial_wm_state
    }

    pub fn final_wm(&self) -> &'a WmState {
        &self.step.final_wm_state
    }
}

/// What the solver panel should show. `Waiting` and `Loading` are
/// distinguished by the inference activity flag, not by the trace input.
#[derive(Debug)]
pub enum TracePanel<'a> {
    /// No solver snapshot yet and no inference running.
    Waiting,
    /// Inference is running but the solver has not pushed yet.
    Loading,
    Ready {
        steps: Vec<StepView<'a>>,
        /// Final working-memory snapshot shown alongside the trace.
        final_wm: Option<&'a WmState>,
    },
}

pub fn build_trace(snapshot: Option<&SolverSnapshot>, inference_active: bool) -> TracePanel<'_> {
    let snapshot = match snapshot {
        Some(snapshot) => snapshot,
        None if inference_active => return TracePanel::Loading,
        None => return TracePanel::Waiting,
    };

    let steps = snapshot
        .trace
        .as_ref()
        .map(|trace| trace.steps.as_slice())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, step)| StepView {
            number: index + 1,
            step,
        })
        .collect();

    TracePanel::Ready {
        steps,
        final_wm: snapshot.wm.as_ref(),
    }
}
