//! Live counter state fed by `update_frontend` events.
//!
//! Every accepted payload replaces the whole snapshot. Payloads are checked
//! against the counter schema first; anything that does not fit is logged
//! and dropped so the displayed numbers are never corrupted.

use crate::errors::PayloadError;
use crate::models::LiveCounterState;
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CounterPayload {
    people_in: u64,
    people_out: u64,
    people_inside: i64,
    #[serde(default)]
    seq: Option<u64>,
}

/// Validates an event argument against the counter schema.
pub fn parse_payload(payload: Option<&Value>) -> Result<(LiveCounterState, Option<u64>), PayloadError> {
    let value = payload.ok_or(PayloadError::Missing)?;
    // Derived struct impls also accept positional arrays.
    if !value.is_object() {
        return Err(PayloadError::NotAnObject);
    }
    let parsed = CounterPayload::deserialize(value)?;
    let counters = LiveCounterState {
        people_in: parsed.people_in,
        people_out: parsed.people_out,
        people_inside: parsed.people_inside,
    };
    Ok((counters, parsed.seq))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSnapshot {
    pub counters: LiveCounterState,
    pub seq: Option<u64>,
    pub updated_at: Option<DateTime<Local>>,
    high_water: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale { last: u64, received: u64 },
}

#[derive(Debug)]
pub struct LiveCounter {
    tx: watch::Sender<LiveSnapshot>,
    enforce_order: bool,
}

impl LiveCounter {
    pub fn new(enforce_order: bool) -> Self {
        let (tx, _rx) = watch::channel(LiveSnapshot::default());
        Self { tx, enforce_order }
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> LiveSnapshot {
        self.tx.borrow().clone()
    }

    pub fn apply(&self, counters: LiveCounterState, seq: Option<u64>) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::Applied;
        self.tx.send_if_modified(|snapshot| {
            if self.enforce_order {
                if let (Some(last), Some(received)) = (snapshot.high_water, seq) {
                    if received < last {
                        outcome = ApplyOutcome::Stale { last, received };
                        return false;
                    }
                }
            }

            let high_water = match (snapshot.high_water, seq) {
                (Some(last), Some(received)) => Some(last.max(received)),
                (last, received) => received.or(last),
            };
            *snapshot = LiveSnapshot {
                counters,
                seq,
                updated_at: Some(Local::now()),
                high_water,
            };
            true
        });
        outcome
    }

    /// Entry point for raw event arguments coming off the stream.
    pub fn handle_event(&self, payload: Option<&Value>) {
        let (counters, seq) = match parse_payload(payload) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("ignoring counter update: {err}");
                return;
            }
        };

        match self.apply(counters, seq) {
            ApplyOutcome::Applied => debug!(?counters, ?seq, "counter state replaced"),
            ApplyOutcome::Stale { last, received } => {
                warn!(last, received, "discarding out-of-order counter update")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counters(people_in: u64, people_out: u64, people_inside: i64) -> LiveCounterState {
        LiveCounterState {
            people_in,
            people_out,
            people_inside,
        }
    }

    #[test]
    fn starts_at_zero() {
        let live = LiveCounter::new(true);
        let snapshot = live.current();
        assert_eq!(snapshot.counters, LiveCounterState::default());
        assert!(snapshot.updated_at.is_none());
    }

    #[test]
    fn event_replaces_state_verbatim() {
        let live = LiveCounter::new(true);
        live.apply(counters(40, 10, 30), None);
        live.handle_event(Some(&json!({"peopleIn": 5, "peopleOut": 2, "peopleInside": 3})));
        assert_eq!(live.current().counters, counters(5, 2, 3));
    }

    #[test]
    fn later_event_wins_without_accumulating() {
        let live = LiveCounter::new(true);
        live.handle_event(Some(&json!({"peopleIn": 1, "peopleOut": 0, "peopleInside": 1})));
        live.handle_event(Some(&json!({"peopleIn": 2, "peopleOut": 1, "peopleInside": 1})));
        assert_eq!(live.current().counters, counters(2, 1, 1));
    }

    #[test]
    fn negative_occupancy_is_passed_through() {
        let live = LiveCounter::new(true);
        live.handle_event(Some(&json!({"peopleIn": 1, "peopleOut": 3, "peopleInside": -2})));
        assert_eq!(live.current().counters.people_inside, -2);
    }

    #[test]
    fn malformed_payloads_leave_state_alone() {
        let live = LiveCounter::new(true);
        live.apply(counters(7, 3, 4), None);

        live.handle_event(None);
        live.handle_event(Some(&json!({"peopleIn": 9, "peopleOut": 1})));
        live.handle_event(Some(&json!({"peopleIn": "9", "peopleOut": 1, "peopleInside": 8})));
        live.handle_event(Some(&json!({"peopleIn": 1.5, "peopleOut": 1, "peopleInside": 0})));
        live.handle_event(Some(&json!({"peopleIn": -1, "peopleOut": 1, "peopleInside": 0})));
        live.handle_event(Some(&json!([1, 2, 3])));

        assert_eq!(live.current().counters, counters(7, 3, 4));
    }

    #[test]
    fn parse_reports_missing_payload() {
        assert!(matches!(parse_payload(None), Err(PayloadError::Missing)));
        assert!(matches!(
            parse_payload(Some(&json!({}))),
            Err(PayloadError::Schema(_))
        ));
    }

    #[test]
    fn positional_arrays_are_not_counters() {
        assert!(matches!(
            parse_payload(Some(&json!([9, 8, -7]))),
            Err(PayloadError::NotAnObject)
        ));
        assert!(matches!(
            parse_payload(Some(&json!(5))),
            Err(PayloadError::NotAnObject)
        ));

        let live = LiveCounter::new(true);
        live.handle_event(Some(&json!([9, 8, -7])));
        assert_eq!(live.current().counters, LiveCounterState::default());
    }

    #[test]
    fn stale_sequence_numbers_are_discarded() {
        let live = LiveCounter::new(true);
        assert_eq!(live.apply(counters(5, 0, 5), Some(10)), ApplyOutcome::Applied);
        assert_eq!(
            live.apply(counters(3, 0, 3), Some(9)),
            ApplyOutcome::Stale { last: 10, received: 9 }
        );
        assert_eq!(live.apply(counters(6, 1, 5), Some(10)), ApplyOutcome::Applied);
        assert_eq!(live.current().counters, counters(6, 1, 5));
    }

    #[test]
    fn unsequenced_events_keep_the_watermark() {
        let live = LiveCounter::new(true);
        live.apply(counters(5, 0, 5), Some(10));
        assert_eq!(live.apply(counters(6, 0, 6), None), ApplyOutcome::Applied);
        assert_eq!(
            live.apply(counters(1, 0, 1), Some(4)),
            ApplyOutcome::Stale { last: 10, received: 4 }
        );
        assert_eq!(live.current().counters, counters(6, 0, 6));
    }

    #[test]
    fn ordering_can_be_disabled() {
        let live = LiveCounter::new(false);
        live.apply(counters(5, 0, 5), Some(10));
        assert_eq!(live.apply(counters(3, 0, 3), Some(2)), ApplyOutcome::Applied);
        assert_eq!(live.current().seq, Some(2));
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let live = LiveCounter::new(true);
        let mut rx = live.subscribe();
        live.apply(counters(2, 1, 1), None);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().counters, counters(2, 1, 1));
    }
}
