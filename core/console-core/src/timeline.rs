//! Timeline reconstruction.
//!
//! Turns the temporal solver's per-tact interval/event log into a lane set
//! and a flat event set for rendering. One lane per distinct interval or
//! event identity, discovered in first-seen order; intervals without a close
//! tact are drawn out to the latest tact known across the whole input rather
//! than to infinity.

use jointscope_protocol::TactRecord;
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub lane_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub lane_id: String,
    /// Presentation-only correlation key, fresh per build.
    pub event_id: String,
    pub tooltip: String,
    pub start_tact: i64,
    /// `None` for point events.
    pub end_tact: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineView {
    pub lanes: Vec<Lane>,
    pub events: Vec<TimelineEvent>,
}

/// Builds the lane/event representation from tact records in arrival order.
///
/// Deterministic for identical input except for the generated event ids.
pub fn build_timeline(tacts: &[TactRecord]) -> TimelineView {
    let last_tact = tacts.iter().map(|tact| tact.tact).max();

    let mut view = TimelineView::default();
    for tact in tacts {
        for interval in &tact.opened_intervals {
            discover_lane(
                &mut view.lanes,
                &interval.interval,
                format!("Interval {}", interval.interval),
            );
            view.events.push(TimelineEvent {
                lane_id: interval.interval.clone(),
                event_id: Ulid::new().to_string(),
                tooltip: interval.interval.clone(),
                start_tact: interval.open_tact,
                end_tact: interval.close_tact.or(last_tact),
            });
        }
        for event in &tact.events {
            discover_lane(
                &mut view.lanes,
                &event.event,
                format!("Event {}", event.event),
            );
            view.events.push(TimelineEvent {
                lane_id: event.event.clone(),
                event_id: Ulid::new().to_string(),
                tooltip: event.event.clone(),
                start_tact: event.occurance_tact,
                end_tact: None,
            });
        }
    }
    view
}

fn discover_lane(lanes: &mut Vec<Lane>, lane_id: &str, label: String) {
    if !lanes.iter().any(|lane| lane.lane_id == lane_id) {
        lanes.push(Lane {
            lane_id: lane_id.to_string(),
            label,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jointscope_protocol::{EventRecord, IntervalRecord};

    fn tact(number: i64, intervals: Vec<IntervalRecord>, events: Vec<EventRecord>) -> TactRecord {
        TactRecord {
            tact: number,
            opened_intervals: intervals,
            events,
        }
    }

    fn interval(id: &str, open: i64, close: Option<i64>) -> IntervalRecord {
        IntervalRecord {
            interval: id.to_string(),
            open_tact: open,
            close_tact: close,
        }
    }

    fn point(id: &str, at: i64) -> EventRecord {
        EventRecord {
            event: id.to_string(),
            occurance_tact: at,
        }
    }

    #[test]
    fn open_interval_extends_to_latest_known_tact() {
        let tacts = vec![
            tact(1, vec![interval("A", 1, None)], vec![]),
            tact(5, vec![], vec![point("E", 3)]),
        ];
        let view = build_timeline(&tacts);

        let lane_ids: Vec<&str> = view.lanes.iter().map(|l| l.lane_id.as_str()).collect();
        assert_eq!(lane_ids, vec!["A", "E"]);

        let a = &view.events[0];
        assert_eq!(a.lane_id, "A");
        assert_eq!(a.start_tact, 1);
        assert_eq!(a.end_tact, Some(5));

        let e = &view.events[1];
        assert_eq!(e.lane_id, "E");
        assert_eq!(e.start_tact, 3);
        assert_eq!(e.end_tact, None);
    }

    #[test]
    fn closed_interval_keeps_its_own_close_tact() {
        let tacts = vec![tact(9, vec![interval("B", 2, Some(4))], vec![])];
        let view = build_timeline(&tacts);
        assert_eq!(view.events[0].end_tact, Some(4));
    }

    #[test]
    fn lanes_are_first_seen_and_never_duplicated() {
        let tacts = vec![
            tact(1, vec![interval("A", 1, None)], vec![point("E", 1)]),
            tact(2, vec![interval("A", 1, Some(2)), interval("B", 2, None)], vec![]),
        ];
        let view = build_timeline(&tacts);

        let lane_ids: Vec<&str> = view.lanes.iter().map(|l| l.lane_id.as_str()).collect();
        assert_eq!(lane_ids, vec!["A", "E", "B"]);
        assert_eq!(view.lanes[0].label, "Interval A");
        assert_eq!(view.lanes[1].label, "Event E");
        // Every occurrence emits its own timeline event even on a known lane.
        assert_eq!(view.events.len(), 4);
    }

    #[test]
    fn rebuild_is_structurally_identical_modulo_event_ids() {
        let tacts = vec![
            tact(1, vec![interval("A", 1, None)], vec![]),
            tact(3, vec![interval("B", 2, None)], vec![point("E", 2)]),
        ];
        let first = build_timeline(&tacts);
        let second = build_timeline(&tacts);

        assert_eq!(first.lanes, second.lanes);
        assert_eq!(first.events.len(), second.events.len());
        for (a, b) in first.events.iter().zip(second.events.iter()) {
            assert_eq!(a.lane_id, b.lane_id);
            assert_eq!(a.start_tact, b.start_tact);
            assert_eq!(a.end_tact, b.end_tact);
            assert_ne!(a.event_id, b.event_id);
        }
    }

    #[test]
    fn empty_input_builds_an_empty_view() {
        assert_eq!(build_timeline(&[]), TimelineView::default());
    }
}
