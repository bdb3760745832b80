//! The push-message reducer.
//!
//! A tiny event-sourced store: the latest snapshot per subsystem plus two
//! derived flags, folded from the channel's classified messages by a pure
//! `(state, message) -> state` function. Snapshots are replaced whole, never
//! merged, and a message for one subsystem never touches another's snapshot.

use jointscope_protocol::{PushMessage, SimulationSnapshot, SolverSnapshot, TemporalSnapshot};

use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsoleState {
    pub simulation: Option<SimulationSnapshot>,
    pub temporal_solver: Option<TemporalSnapshot>,
    pub solver: Option<SolverSnapshot>,
    /// True from the first subsystem snapshot (or an accepted advance)
    /// until the joint component signals stop.
    pub inference_active: bool,
    /// Operator-side flag: a stop request was accepted and its confirming
    /// push has not arrived yet.
    pub stopping: bool,
}

/// Folds one classified push message into the state.
///
/// Idempotent under redelivery: applying the same message twice yields the
/// same observable state as applying it once.
pub fn reduce(state: &ConsoleState, message: &PushMessage) -> ConsoleState {
    let mut next = state.clone();
    match message {
        PushMessage::Simulation(snapshot) => {
            next.simulation = Some(snapshot.clone());
            next.inference_active = true;
        }
        PushMessage::TemporalSolver(snapshot) => {
            next.temporal_solver = Some(snapshot.clone());
            next.inference_active = true;
        }
        PushMessage::Solver(snapshot) => {
            next.solver = Some(snapshot.clone());
            next.inference_active = true;
        }
        PushMessage::Joint(signal) => {
            // Lifecycle signal, not a snapshot. Anything other than stop
            // passes through without effect.
            if signal.stop {
                next.inference_active = false;
                next.stopping = false;
            }
        }
    }
    next
}

impl ConsoleState {
    /// Optimistic flag set after the server accepted an advance request;
    /// confirmed (or corrected) by subsequent pushes.
    pub fn mark_advance_accepted(&mut self) {
        self.inference_active = true;
    }

    pub fn mark_stop_requested(&mut self) {
        self.stopping = true;
    }

    /// Rolls the stop flag back after a rejected or failed stop request.
    /// The activity flag is untouched: only the joint stop push clears it.
    pub fn mark_stop_failed(&mut self) {
        self.stopping = false;
    }

    /// Clears all three subsystem snapshots after a successful reset.
    ///
    /// Reset is meaningful only between runs; a request arriving while
    /// inference is active violates the precondition and is rejected.
    pub fn apply_reset(&mut self) -> Result<()> {
        if self.inference_active {
            return Err(ConsoleError::InferenceActive);
        }
        self.simulation = None;
        self.temporal_solver = None;
        self.solver = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointscope_protocol::{JointSignal, ResourceState};

    fn simulation_message(resource: &str) -> PushMessage {
        PushMessage::Simulation(vec![ResourceState {
            name: resource.to_string(),
            parameters: Default::default(),
        }])
    }

    fn stop_message() -> PushMessage {
        PushMessage::Joint(JointSignal { stop: true })
    }

    #[test]
    fn first_snapshot_raises_activity_flag() {
        let state = ConsoleState::default();
        assert!(!state.inference_active);

        let next = reduce(&state, &simulation_message("tank"));
        assert!(next.inference_active);
        assert_eq!(next.simulation.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn replacement_is_per_subsystem() {
        let state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        let state = reduce(
            &state,
            &PushMessage::Solver(SolverSnapshot::default()),
        );

        // The solver push must not disturb the stored simulation snapshot.
        assert_eq!(state.simulation.as_ref().unwrap()[0].name, "tank");
        assert!(state.solver.is_some());
        assert!(state.temporal_solver.is_none());

        let replaced = reduce(&state, &simulation_message("pump"));
        assert_eq!(replaced.simulation.as_ref().unwrap()[0].name, "pump");
        assert_eq!(replaced.solver, state.solver);
    }

    #[test]
    fn redelivery_is_idempotent() {
        let message = simulation_message("tank");
        let once = reduce(&ConsoleState::default(), &message);
        let twice = reduce(&once, &message);
        assert_eq!(once, twice);
    }

    #[test]
    fn joint_stop_clears_activity_and_stopping() {
        let mut state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        state.mark_stop_requested();

        let next = reduce(&state, &stop_message());
        assert!(!next.inference_active);
        assert!(!next.stopping);
        // The snapshot itself survives a stop; only reset clears it.
        assert!(next.simulation.is_some());
    }

    #[test]
    fn joint_without_stop_changes_nothing() {
        let state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        let next = reduce(&state, &PushMessage::Joint(JointSignal { stop: false }));
        assert_eq!(next, state);
    }

    #[test]
    fn stop_rejection_rolls_back_only_the_stopping_flag() {
        let mut state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        state.mark_stop_requested();
        state.mark_stop_failed();
        assert!(!state.stopping);
        assert!(state.inference_active);
    }

    #[test]
    fn reset_is_rejected_while_inference_is_active() {
        let mut state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        let err = state.apply_reset().expect_err("must be rejected");
        assert!(matches!(err, ConsoleError::InferenceActive));
        assert!(state.simulation.is_some());
    }

    #[test]
    fn reset_clears_all_snapshots_when_idle() {
        let state = reduce(&ConsoleState::default(), &simulation_message("tank"));
        let state = reduce(&state, &PushMessage::Solver(SolverSnapshot::default()));
        let state = reduce(
            &state,
            &PushMessage::TemporalSolver(TemporalSnapshot::default()),
        );
        let mut state = reduce(&state, &stop_message());

        state.apply_reset().expect("reset while idle");
        assert!(state.simulation.is_none());
        assert!(state.temporal_solver.is_none());
        assert!(state.solver.is_none());
    }

    #[test]
    fn advance_acceptance_is_optimistic() {
        let mut state = ConsoleState::default();
        state.mark_advance_accepted();
        assert!(state.inference_active);
        assert!(state.simulation.is_none());
    }
}
