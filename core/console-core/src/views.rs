//! Declarative projections of subsystem snapshots.
//!
//! Flat row structures for the renderer: resource parameters from the
//! simulation subsystem and signified Allen relations from the temporal
//! solver. Panels that have not received data yet share the same
//! waiting/loading distinction the trace panel uses.

use jointscope_protocol::{SignifiedRelation, SimulationSnapshot, TemporalSnapshot};
use serde_json::Value;

/// Panel state for a subsystem without data yet: "waiting" before the run
/// starts, "loading" while inference is active but the subsystem has not
/// pushed.
#[derive(Debug, PartialEq)]
pub enum PanelState<'a, T> {
    Waiting,
    Loading,
    Ready(&'a T),
}

pub fn panel_state<T>(snapshot: Option<&T>, inference_active: bool) -> PanelState<'_, T> {
    match snapshot {
        Some(value) => PanelState::Ready(value),
        None if inference_active => PanelState::Loading,
        None => PanelState::Waiting,
    }
}

/// One row of the resource-parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    pub resource: String,
    pub parameter: String,
    pub value: Value,
}

/// Flattens the simulation snapshot into `(resource, parameter, value)`
/// rows, resources in arrival order, parameters in key order.
pub fn parameter_rows(snapshot: &SimulationSnapshot) -> Vec<ParameterRow> {
    snapshot
        .iter()
        .flat_map(|resource| {
            resource.parameters.iter().map(|(parameter, value)| ParameterRow {
                resource: resource.name.clone(),
                parameter: parameter.clone(),
                value: value.clone(),
            })
        })
        .collect()
}

/// One row of the signified-relations table. `value` keeps the wire
/// tri-state: signified true/false or not yet signified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllenRow {
    pub rule: String,
    pub relation: String,
    pub value: Option<bool>,
}

pub fn allen_rows(snapshot: &TemporalSnapshot) -> Vec<AllenRow> {
    snapshot
        .signified_meta
        .as_ref()
        .map(|meta| meta.values().map(allen_row).collect())
        .unwrap_or_default()
}

fn allen_row(relation: &SignifiedRelation) -> AllenRow {
    AllenRow {
        rule: relation.rule.clone(),
        relation: relation.allen_operation.clone(),
        value: relation.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointscope_protocol::ResourceState;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn flattens_resources_into_rows() {
        let mut parameters = BTreeMap::new();
        parameters.insert("pressure".to_string(), json!(2.5));
        parameters.insert("volume".to_string(), json!(10));
        let snapshot = vec![
            ResourceState {
                name: "pump".to_string(),
                parameters,
            },
            ResourceState {
                name: "tank".to_string(),
                parameters: BTreeMap::new(),
            },
        ];

        let rows = parameter_rows(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].resource, "pump");
        assert_eq!(rows[0].parameter, "pressure");
        assert_eq!(rows[1].value, json!(10));
    }

    #[test]
    fn allen_rows_keep_the_tri_state_value() {
        let mut meta = BTreeMap::new();
        meta.insert(
            "r1".to_string(),
            SignifiedRelation {
                rule: "rule-1".to_string(),
                allen_operation: "before".to_string(),
                value: Some(true),
            },
        );
        meta.insert(
            "r2".to_string(),
            SignifiedRelation {
                rule: "rule-2".to_string(),
                allen_operation: "during".to_string(),
                value: None,
            },
        );
        let snapshot = TemporalSnapshot {
            timeline: None,
            signified_meta: Some(meta),
        };

        let rows = allen_rows(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, Some(true));
        assert_eq!(rows[1].value, None);
    }

    #[test]
    fn panel_state_tracks_the_activity_flag() {
        let snapshot: Option<&SimulationSnapshot> = None;
        assert_eq!(panel_state(snapshot, false), PanelState::Waiting);
        assert_eq!(panel_state(snapshot, true), PanelState::Loading);

        let data: Vec<()> = vec![];
        assert_eq!(panel_state(Some(&data), false), PanelState::Ready(&data));
    }
}
