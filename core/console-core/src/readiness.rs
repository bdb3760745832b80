//! Readiness evaluation.
//!
//! One fetch of the component status map gates entry into the live view.
//! Evaluation is pure; the transport layer fetches the report and swaps the
//! whole outcome in at once, so a re-check never shows stale rows mixed with
//! fresh ones.

use jointscope_protocol::{ComponentId, ComponentStatus, ReadinessReport, EXPECTED_COMPONENTS};

/// One row of the not-ready table: a component and its tri-state flags.
/// `None` means the component has not reported the flag at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessRow {
    pub component: ComponentId,
    pub display_name: &'static str,
    pub registered: Option<bool>,
    pub configured: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// Every expected component is present, registered and configured.
    Ready,
    /// At least one component is missing a flag; the rows cover every
    /// expected component so the operator sees the full picture.
    NotReady { rows: Vec<ReadinessRow> },
}

/// Decides whether the console may enter the live view.
pub fn evaluate_readiness(report: &ReadinessReport) -> ReadinessOutcome {
    let all_ready = EXPECTED_COMPONENTS
        .iter()
        .all(|component| match report.get(component.as_str()) {
            Some(status) => status.is_ready(),
            None => false,
        });

    if all_ready {
        return ReadinessOutcome::Ready;
    }

    let rows = EXPECTED_COMPONENTS
        .iter()
        .map(|component| {
            let status = report.get(component.as_str()).cloned().unwrap_or_default();
            readiness_row(*component, &status)
        })
        .collect();
    ReadinessOutcome::NotReady { rows }
}

fn readiness_row(component: ComponentId, status: &ComponentStatus) -> ReadinessRow {
    ReadinessRow {
        component,
        display_name: component.display_name(),
        registered: status.registered,
        configured: status.configured,
    }
}
