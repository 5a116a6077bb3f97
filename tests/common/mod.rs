// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use patternflux::{Nfa, PatternMatch};

/// Stream element used across the scenario tests. `volume` marks the
/// refined shape targeted by `subtype` stages.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TestEvent {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub volume: Option<i64>,
}

impl TestEvent {
    pub fn new(id: i32, name: &str, price: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            volume: None,
        }
    }

    pub fn sub(id: i32, name: &str, price: i64, volume: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            volume: Some(volume),
        }
    }

    pub fn is_sub(&self) -> bool {
        self.volume.is_some()
    }
}

/// Stage predicate on the event name.
pub fn name_is(name: &'static str) -> impl Fn(&TestEvent) -> bool {
    move |event| event.name == name
}

/// Feed `events` in order, flattening every match into a sorted event list.
pub fn feed(nfa: &mut Nfa<TestEvent>, events: &[(TestEvent, i64)]) -> Vec<Vec<TestEvent>> {
    let mut collected = Vec::new();
    for (event, timestamp) in events {
        let result = nfa
            .process(event, *timestamp)
            .expect("well-formed event stream");
        collected.extend(result.matches.into_iter().map(flatten));
    }
    collected
}

/// Feed `events`, keeping matches and timeouts apart. Timeout partials are
/// flattened the same way as matches.
pub fn feed_with_timeouts(
    nfa: &mut Nfa<TestEvent>,
    events: &[(TestEvent, i64)],
) -> (Vec<Vec<TestEvent>>, Vec<(Vec<TestEvent>, i64)>) {
    let mut matches = Vec::new();
    let mut timeouts = Vec::new();
    for (event, timestamp) in events {
        let result = nfa
            .process(event, *timestamp)
            .expect("well-formed event stream");
        matches.extend(result.matches.into_iter().map(flatten));
        timeouts.extend(
            result
                .timeouts
                .into_iter()
                .map(|(partial, at)| (flatten(partial), at)),
        );
    }
    (matches, timeouts)
}

/// Collapse a stage map into a single sorted event list, the way the
/// scenario expectations are written (match comparison is order-blind).
pub fn flatten(sequence: PatternMatch<TestEvent>) -> Vec<TestEvent> {
    let mut events: Vec<TestEvent> = sequence.into_values().flatten().collect();
    events.sort();
    events
}

/// Order-insensitive comparison of match sets, duplicates significant.
pub fn assert_patterns(actual: Vec<Vec<TestEvent>>, expected: Vec<&[TestEvent]>) {
    let mut actual = actual;
    let mut expected: Vec<Vec<TestEvent>> = expected
        .into_iter()
        .map(|pattern| {
            let mut pattern = pattern.to_vec();
            pattern.sort();
            pattern
        })
        .collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
