//! Wire types for the joint-functioning console.
//!
//! This crate is shared by the live channel, the action client and the state
//! core to prevent schema drift. The remote components remain the authority
//! on what they emit; the console parses defensively and drops what it cannot
//! classify.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subsystems that push data over the live channel, plus the joint component
/// itself which only emits lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    AtJoint,
    AtSolver,
    AtTemporalSolver,
    AtSimulation,
    AtBlackboard,
}

/// Every component that must be registered and configured before the console
/// may enter the live view.
pub const EXPECTED_COMPONENTS: [ComponentId; 5] = [
    ComponentId::AtJoint,
    ComponentId::AtSolver,
    ComponentId::AtTemporalSolver,
    ComponentId::AtSimulation,
    ComponentId::AtBlackboard,
];

impl ComponentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentId::AtJoint => "at_joint",
            ComponentId::AtSolver => "at_solver",
            ComponentId::AtTemporalSolver => "at_temporal_solver",
            ComponentId::AtSimulation => "at_simulation",
            ComponentId::AtBlackboard => "at_blackboard",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentId::AtJoint => "Joint functioning support component",
            ComponentId::AtSolver => "Production-rule solver",
            ComponentId::AtTemporalSolver => "Temporal solver",
            ComponentId::AtSimulation => "Simulation subsystem",
            ComponentId::AtBlackboard => "Dynamic blackboard",
        }
    }
}

/// Registration/configuration status of one remote component. Both flags are
/// tri-state: `None` means the component has not reported yet, which is
/// distinct from an explicit `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatus {
    #[serde(default)]
    pub registered: Option<bool>,
    #[serde(default)]
    pub configured: Option<bool>,
}

impl ComponentStatus {
    pub fn is_ready(&self) -> bool {
        self.registered == Some(true) && self.configured == Some(true)
    }
}

/// The `GET /api/state` response: component key to status. Keyed by raw
/// strings because the server may report components this console does not
/// know about; readiness evaluation only inspects [`EXPECTED_COMPONENTS`].
pub type ReadinessReport = BTreeMap<String, ComponentStatus>;

// ─────────────────────────────────────────────────────────────────────
// Push messages
// ─────────────────────────────────────────────────────────────────────

/// One resource of the simulation subsystem with its current parameter
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

/// Latest payload of the simulation subsystem: one entry per resource.
pub type SimulationSnapshot = Vec<ResourceState>;

/// An interval opened at some tact, optionally closed at a later one. A
/// missing `close_tact` means the interval is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub interval: String,
    pub open_tact: i64,
    #[serde(default)]
    pub close_tact: Option<i64>,
}

/// A point event observed at some tact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: String,
    pub occurance_tact: i64,
}

/// What the temporal solver reports for one inference tact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TactRecord {
    pub tact: i64,
    #[serde(default)]
    pub opened_intervals: Vec<IntervalRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineLog {
    #[serde(default)]
    pub tacts: Vec<TactRecord>,
}

/// Signification state of one Allen relation appearing in a rule condition.
/// `value` is tri-state: not yet signified, or signified true/false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignifiedRelation {
    pub rule: String,
    pub allen_operation: String,
    #[serde(default)]
    pub value: Option<bool>,
}

/// Latest payload of the temporal solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalSnapshot {
    #[serde(default)]
    pub timeline: Option<TimelineLog>,
    #[serde(default)]
    pub signified_meta: Option<BTreeMap<String, SignifiedRelation>>,
}

/// Belief/probability/accuracy triple attached to a working-memory value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonFactor {
    pub belief: f64,
    pub probability: f64,
    pub accuracy: f64,
}

/// One working-memory slot: the stored content and its uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmEntry {
    pub content: Value,
    #[serde(default)]
    pub non_factor: Option<NonFactor>,
}

/// The rule engine's fact base, keyed by reference name.
pub type WmState = BTreeMap<String, WmEntry>;

/// One firing of the rule engine: the rule picked from the conflict set and
/// the working memory around the firing. `fired_rules` includes
/// `selected_rule`; display layers filter the duplicate out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub selected_rule: String,
    pub rule_condition_value: bool,
    #[serde(default)]
    pub conflict_rules: Vec<String>,
    #[serde(default)]
    pub fired_rules: Vec<String>,
    #[serde(default)]
    pub initial_wm_state: WmState,
    #[serde(default)]
    pub final_wm_state: WmState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceLog {
    #[serde(default)]
    pub steps: Vec<TraceStep>,
}

/// Latest payload of the production-rule solver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSnapshot {
    #[serde(default)]
    pub trace: Option<TraceLog>,
    #[serde(default)]
    pub wm: Option<WmState>,
}

/// Lifecycle signal from the joint component. Only `stop: true` is
/// meaningful today; other signals pass through unrecognized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointSignal {
    #[serde(default)]
    pub stop: bool,
}

/// A classified inbound push message. The three data variants carry full
/// snapshot replacements for their subsystem; `Joint` is a lifecycle signal,
/// never a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PushMessage {
    Simulation(SimulationSnapshot),
    TemporalSolver(TemporalSnapshot),
    Solver(SolverSnapshot),
    Joint(JointSignal),
}

#[derive(Debug, Deserialize)]
struct RawPush {
    initiator: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Parses and classifies one channel frame.
///
/// Returns `Ok(Some(_))` for a recognized message, `Ok(None)` for a
/// well-formed message with an initiator this console does not track
/// (ignored by contract), and `Err` for anything that failed to parse.
pub fn parse_push(text: &str) -> Result<Option<PushMessage>, ErrorInfo> {
    let raw: RawPush = serde_json::from_str(text)
        .map_err(|err| ErrorInfo::new("invalid_json", format!("push frame was not valid JSON: {}", err)))?;

    let initiator = match raw.initiator {
        Some(value) => value,
        None => return Err(ErrorInfo::new("missing_initiator", "push frame has no initiator")),
    };
    let data = raw.data.unwrap_or(Value::Null);

    let message = match initiator.as_str() {
        "at_simulation" => PushMessage::Simulation(decode_payload(&initiator, data)?),
        "at_temporal_solver" => PushMessage::TemporalSolver(decode_payload(&initiator, data)?),
        "at_solver" => PushMessage::Solver(decode_payload(&initiator, data)?),
        "at_joint" => PushMessage::Joint(decode_payload(&initiator, data)?),
        _ => return Ok(None),
    };
    Ok(Some(message))
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    initiator: &str,
    data: Value,
) -> Result<T, ErrorInfo> {
    serde_json::from_value(data).map_err(|err| {
        ErrorInfo::new(
            "invalid_payload",
            format!("{} payload is malformed: {}", initiator, err),
        )
    })
}

// ─────────────────────────────────────────────────────────────────────
// Operator actions
// ─────────────────────────────────────────────────────────────────────

/// Body of `POST /api/process_tact`: how many tacts to run and how long the
/// orchestrator waits between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub iterate: u32,
    pub wait: u64,
}

impl Default for AdvanceRequest {
    fn default() -> Self {
        Self {
            iterate: 1,
            wait: 500,
        }
    }
}

impl AdvanceRequest {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        if self.iterate == 0 {
            return Err(ErrorInfo::new(
                "invalid_iterate",
                "iterate must be at least 1",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
