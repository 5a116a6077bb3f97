// SPDX-License-Identifier: MIT OR Apache-2.0

//! NFA runtime: per-event advancement of all surviving match branches.
//!
//! The runtime owns the compiled states, a FIFO queue of live computation
//! states, and the shared buffer. A `process` call runs in two phases:
//! first every branch is *planned* against the event — all user conditions
//! are evaluated, timeouts decided, the branch ceiling checked — with no
//! mutation; then the plans are applied. A failing user condition therefore
//! aborts the event with the runtime state untouched.
//!
//! Single-threaded by design: a given instance owns its computations and
//! buffer exclusively, and callers serialize `process` invocations.

use std::collections::{BTreeMap, VecDeque};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::core::config::NfaConfig;
use crate::core::error::{PatternFluxError, PatternFluxResult};
use crate::core::event::EventRecord;
use crate::query_api::condition::Condition;

use super::dewey::DeweyNumber;
use super::shared_buffer::{EntryId, SharedBuffer};
use super::state::{State, StateId, TransitionAction};

/// A completed (or partial, for timeouts) match: stage name → events taken
/// at that stage, in consumption order.
pub type PatternMatch<T> = BTreeMap<String, Vec<T>>;

/// Output of a single `process`/`advance_time` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult<T> {
    /// Completed matches, one per version-distinct path into a final state.
    pub matches: Vec<PatternMatch<T>>,
    /// Partial matches dropped by window expiry, stamped with the
    /// processing time at which the expiry was observed. Only populated
    /// when the NFA was compiled with timeout handling.
    pub timeouts: Vec<(PatternMatch<T>, i64)>,
}

impl<T> ProcessResult<T> {
    fn new() -> Self {
        Self {
            matches: Vec::new(),
            timeouts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.timeouts.is_empty()
    }
}

impl<T> Default for ProcessResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One live branch of the automaton interpretation.
///
/// Plain data: a pointer into the compiled state arena, a pointer into the
/// shared buffer (the entry of the last consumed event), the branch's
/// Dewey version, and the timestamp of its first consumed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationState {
    state: StateId,
    previous_entry: Option<EntryId>,
    version: DeweyNumber,
    start_timestamp: i64,
}

impl ComputationState {
    fn start(state: StateId, version: DeweyNumber) -> Self {
        Self {
            state,
            previous_entry: None,
            version,
            // never read while previous_entry is None
            start_timestamp: -1,
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn version(&self) -> &DeweyNumber {
        &self.version
    }
}

/// Serializable image of an NFA's mutable state.
///
/// Valid only against the NFA compiled from the same pattern; state ids are
/// indices into that automaton's state arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: serde::de::DeserializeOwned + Clone + Eq + std::hash::Hash"
))]
pub struct NfaSnapshot<T> {
    computation_states: Vec<ComputationState>,
    shared_buffer: SharedBuffer<T>,
    last_timestamp: Option<i64>,
}

/// An edge selected for a branch during planning.
struct PlannedEdge {
    action: TransitionAction,
    source: StateId,
    target: StateId,
    /// For TAKE edges: a final state reachable from the target through
    /// enabled PROCEED edges, which emits the match immediately.
    final_after_proceed: Option<StateId>,
}

/// All TAKE/IGNORE edges a branch can follow for one event, with the branch
/// counts needed for version assignment.
struct OutgoingEdges {
    edges: Vec<PlannedEdge>,
    total_take: usize,
    total_ignore: usize,
}

enum StatePlan {
    TimedOut,
    Advance(OutgoingEdges),
    Keep,
}

/// A compiled pattern plus its runtime state.
#[derive(Debug)]
pub struct Nfa<T> {
    states: Vec<State<T>>,
    window_time: i64,
    handle_timeouts: bool,
    config: NfaConfig,
    computation_states: VecDeque<ComputationState>,
    shared_buffer: SharedBuffer<T>,
    last_timestamp: Option<i64>,
}

impl<T> Nfa<T>
where
    T: Clone + Eq + Hash,
{
    pub(crate) fn new(
        states: Vec<State<T>>,
        window_time: i64,
        handle_timeouts: bool,
        config: NfaConfig,
    ) -> Self {
        let computation_states = states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.is_start())
            .map(|(id, _)| ComputationState::start(id, DeweyNumber::new(1)))
            .collect();
        Self {
            states,
            window_time,
            handle_timeouts,
            config,
            computation_states,
            shared_buffer: SharedBuffer::new(),
            last_timestamp: None,
        }
    }

    /// Feed one event at `timestamp`.
    ///
    /// Timestamps must be non-decreasing across calls; a regression is
    /// rejected without touching state. On a condition failure the event is
    /// rejected the same way: no partial effects become visible.
    pub fn process(&mut self, event: &T, timestamp: i64) -> PatternFluxResult<ProcessResult<T>> {
        self.advance(Some(event), timestamp)
    }

    /// Feed a wrapped event.
    pub fn process_record(&mut self, record: &EventRecord<T>) -> PatternFluxResult<ProcessResult<T>> {
        self.advance(Some(record.value()), record.timestamp())
    }

    /// Pure maintenance tick: advance time without an event. Expires
    /// window-bounded branches (reporting them when timeout handling is on)
    /// and prunes the shared buffer.
    pub fn advance_time(&mut self, timestamp: i64) -> PatternFluxResult<ProcessResult<T>> {
        self.advance(None, timestamp)
    }

    /// Whether the runtime holds no partial matches.
    ///
    /// Start computations are permanent and hold no buffer entries, so an
    /// empty shared buffer is equivalent to "no in-flight branch".
    pub fn is_empty(&self) -> bool {
        self.shared_buffer.is_empty()
    }

    /// Number of live computation states, including the permanent start
    /// states.
    pub fn computation_state_count(&self) -> usize {
        self.computation_states.len()
    }

    /// The compiled state arena.
    pub fn states(&self) -> &[State<T>] {
        &self.states
    }

    /// Clone the mutable runtime state into a serializable snapshot.
    pub fn snapshot(&self) -> NfaSnapshot<T> {
        NfaSnapshot {
            computation_states: self.computation_states.iter().cloned().collect(),
            shared_buffer: self.shared_buffer.clone(),
            last_timestamp: self.last_timestamp,
        }
    }

    /// Replace the mutable runtime state with a snapshot taken from an NFA
    /// compiled from the same pattern.
    pub fn restore(&mut self, snapshot: NfaSnapshot<T>) -> PatternFluxResult<()> {
        for computation in &snapshot.computation_states {
            if computation.state >= self.states.len() {
                return Err(PatternFluxError::other(format!(
                    "snapshot references state #{} but the automaton has {} states",
                    computation.state,
                    self.states.len()
                )));
            }
        }
        self.computation_states = snapshot.computation_states.into();
        self.shared_buffer = snapshot.shared_buffer;
        self.last_timestamp = snapshot.last_timestamp;
        Ok(())
    }

    fn advance(&mut self, event: Option<&T>, timestamp: i64) -> PatternFluxResult<ProcessResult<T>> {
        if let Some(last) = self.last_timestamp {
            if timestamp < last {
                return Err(PatternFluxError::time_regression(timestamp, last));
            }
        }

        // Phase 1: plan every branch. All user conditions run here, before
        // any mutation, so a failure leaves no trace.
        let mut plans = Vec::with_capacity(self.computation_states.len());
        let mut projected = 0usize;
        for computation in &self.computation_states {
            let plan = if self.is_timed_out(computation, timestamp) {
                StatePlan::TimedOut
            } else if let Some(event) = event {
                StatePlan::Advance(self.create_decision_graph(computation, event)?)
            } else {
                StatePlan::Keep
            };
            projected += self.projected_survivors(computation, &plan);
            plans.push(plan);
        }
        if projected > self.config.max_computation_states {
            log::warn!(
                "rejecting event at {timestamp}: {projected} live branches would exceed the ceiling of {}",
                self.config.max_computation_states
            );
            return Err(PatternFluxError::capacity_exceeded(
                projected,
                self.config.max_computation_states,
            ));
        }

        // Phase 2: apply the plans in queue order.
        let mut result = ProcessResult::new();
        for plan in plans {
            let computation = self
                .computation_states
                .pop_front()
                .expect("one queued computation state per plan");
            match plan {
                StatePlan::TimedOut => {
                    if let Some(entry) = computation.previous_entry {
                        if self.handle_timeouts {
                            for partial in
                                self.shared_buffer.extract_patterns(entry, &computation.version)
                            {
                                result.timeouts.push((partial, timestamp));
                            }
                        }
                        self.shared_buffer.release(entry);
                    }
                }
                StatePlan::Keep => {
                    self.computation_states.push_back(computation);
                }
                StatePlan::Advance(outgoing) => {
                    let event = event.expect("advance plans only exist for real events");
                    let successors =
                        self.compute_next_states(&computation, outgoing, event, timestamp);
                    for successor in successors {
                        let state = &self.states[successor.state];
                        if state.is_final() {
                            let entry = successor
                                .previous_entry
                                .expect("reached a final state without consuming any event");
                            result.matches.extend(
                                self.shared_buffer.extract_patterns(entry, &successor.version),
                            );
                            self.shared_buffer.release(entry);
                        } else if state.is_stop() {
                            if let Some(entry) = successor.previous_entry {
                                self.shared_buffer.release(entry);
                            }
                        } else {
                            self.computation_states.push_back(successor);
                        }
                    }
                }
            }
        }

        if self.window_time > 0 {
            if let Some(cutoff) = timestamp.checked_sub(self.window_time) {
                self.shared_buffer.prune(cutoff);
            }
        }

        self.last_timestamp = Some(timestamp);
        Ok(result)
    }

    /// Spawn the successors of one branch for one event.
    ///
    /// Version assignment: the take edges of a branch split the last digit
    /// upward (first discovered take gets the highest bump), a same-state
    /// ignore bumps by the total branch fan-out, and an ignore reached
    /// through PROCEED opens a new stage digit. Start computations skip
    /// ignore edges and always re-add themselves with a bumped version.
    fn compute_next_states(
        &mut self,
        computation: &ComputationState,
        outgoing: OutgoingEdges,
        event: &T,
        timestamp: i64,
    ) -> Vec<ComputationState> {
        let OutgoingEdges {
            edges,
            total_take,
            total_ignore,
        } = outgoing;
        let is_start = self.is_start_computation(computation);
        let total_take_to_skip = total_take.saturating_sub(1);
        let mut take_budget = total_take_to_skip;
        let mut ignore_budget = total_ignore;
        let mut successors = Vec::new();

        for edge in &edges {
            match edge.action {
                TransitionAction::Ignore => {
                    if is_start {
                        continue;
                    }
                    let version = if self.is_equivalent(edge.target, computation.state) {
                        computation
                            .version
                            .increase(Self::self_branch_increment(total_ignore, total_take))
                    } else {
                        let version = computation
                            .version
                            .increase((total_take_to_skip + ignore_budget) as u32)
                            .add_stage();
                        ignore_budget -= 1;
                        version
                    };
                    self.add_successor(
                        &mut successors,
                        edge.target,
                        computation.previous_entry,
                        version,
                        computation.start_timestamp,
                    );
                }
                TransitionAction::Take => {
                    let edge_version = computation.version.increase(take_budget as u32);
                    let successor_version = edge_version.add_stage();
                    take_budget = take_budget.saturating_sub(1);

                    let stage_name = self.states[edge.source].name().to_string();
                    let entry = self.shared_buffer.put(
                        &stage_name,
                        event,
                        timestamp,
                        computation.previous_entry,
                        &edge_version,
                    );

                    let start_timestamp = if is_start {
                        timestamp
                    } else {
                        computation.start_timestamp
                    };
                    self.add_successor(
                        &mut successors,
                        edge.target,
                        Some(entry),
                        successor_version.clone(),
                        start_timestamp,
                    );
                    if let Some(final_state) = edge.final_after_proceed {
                        self.add_successor(
                            &mut successors,
                            final_state,
                            Some(entry),
                            successor_version,
                            start_timestamp,
                        );
                    }
                }
                TransitionAction::Proceed => {
                    unreachable!("epsilon edges are folded during planning")
                }
            }
        }

        if is_start {
            let increment = Self::self_branch_increment(total_ignore, total_take);
            successors.push(ComputationState::start(
                computation.state,
                computation.version.increase(increment),
            ));
        }

        if let Some(entry) = computation.previous_entry {
            self.shared_buffer.release(entry);
        }

        successors
    }

    fn add_successor(
        &mut self,
        successors: &mut Vec<ComputationState>,
        state: StateId,
        previous_entry: Option<EntryId>,
        version: DeweyNumber,
        start_timestamp: i64,
    ) {
        if let Some(entry) = previous_entry {
            self.shared_buffer.lock(entry);
        }
        successors.push(ComputationState {
            state,
            previous_entry,
            version,
            start_timestamp,
        });
    }

    /// Collect the TAKE/IGNORE edges enabled for `computation` on `event`,
    /// expanding PROCEED edges as epsilon transitions along the way.
    fn create_decision_graph(
        &self,
        computation: &ComputationState,
        event: &T,
    ) -> PatternFluxResult<OutgoingEdges> {
        let mut edges = Vec::new();
        let mut total_take = 0;
        let mut total_ignore = 0;
        let mut states_to_visit = vec![computation.state];

        while let Some(state_id) = states_to_visit.pop() {
            let state = &self.states[state_id];
            for transition in state.transitions() {
                if !self.check_condition(transition.condition.as_deref(), event, state.name())? {
                    continue;
                }
                match transition.action {
                    TransitionAction::Proceed => states_to_visit.push(transition.target),
                    TransitionAction::Take => {
                        total_take += 1;
                        edges.push(PlannedEdge {
                            action: TransitionAction::Take,
                            source: transition.source,
                            target: transition.target,
                            final_after_proceed: self
                                .find_final_state_after_proceed(transition.target, event)?,
                        });
                    }
                    TransitionAction::Ignore => {
                        total_ignore += 1;
                        edges.push(PlannedEdge {
                            action: TransitionAction::Ignore,
                            source: transition.source,
                            target: transition.target,
                            final_after_proceed: None,
                        });
                    }
                }
            }
        }

        Ok(OutgoingEdges {
            edges,
            total_take,
            total_ignore,
        })
    }

    /// A final state reachable from `from` through enabled PROCEED edges,
    /// if any. Lets optional tails and loop exits emit immediately on TAKE.
    fn find_final_state_after_proceed(
        &self,
        from: StateId,
        event: &T,
    ) -> PatternFluxResult<Option<StateId>> {
        let mut states_to_visit = vec![from];
        while let Some(state_id) = states_to_visit.pop() {
            let state = &self.states[state_id];
            for transition in state.transitions() {
                if transition.action != TransitionAction::Proceed {
                    continue;
                }
                if !self.check_condition(transition.condition.as_deref(), event, state.name())? {
                    continue;
                }
                if self.states[transition.target].is_final() {
                    return Ok(Some(transition.target));
                }
                states_to_visit.push(transition.target);
            }
        }
        Ok(None)
    }

    fn check_condition(
        &self,
        condition: Option<&dyn Condition<T>>,
        event: &T,
        stage: &str,
    ) -> PatternFluxResult<bool> {
        match condition {
            None => Ok(true),
            Some(condition) => condition
                .filter(event)
                .map_err(|source| PatternFluxError::condition_error(stage, source)),
        }
    }

    fn is_timed_out(&self, computation: &ComputationState, timestamp: i64) -> bool {
        self.window_time > 0
            && !self.is_start_computation(computation)
            && timestamp.saturating_sub(computation.start_timestamp) >= self.window_time
    }

    fn is_start_computation(&self, computation: &ComputationState) -> bool {
        self.states[computation.state].is_start() && computation.previous_entry.is_none()
    }

    /// States with the same stage name and role are interchangeable for
    /// version purposes (a stage's auxiliary ignore state counts as the
    /// stage itself).
    fn is_equivalent(&self, a: StateId, b: StateId) -> bool {
        self.states[a].name() == self.states[b].name()
            && self.states[a].state_type() == self.states[b].state_type()
    }

    fn self_branch_increment(total_ignore: usize, total_take: usize) -> u32 {
        if total_ignore == 0 && total_take == 0 {
            0
        } else {
            (total_ignore + total_take.max(1)) as u32
        }
    }

    /// How many branches a plan retains, used for the pre-mutation ceiling
    /// check. Final and stop successors are consumed immediately and do not
    /// count.
    fn projected_survivors(&self, computation: &ComputationState, plan: &StatePlan) -> usize {
        match plan {
            StatePlan::TimedOut => 0,
            StatePlan::Keep => 1,
            StatePlan::Advance(outgoing) => {
                let is_start = self.is_start_computation(computation);
                let mut survivors = usize::from(is_start);
                for edge in &outgoing.edges {
                    match edge.action {
                        TransitionAction::Ignore => {
                            if !is_start && !self.states[edge.target].is_stop() {
                                survivors += 1;
                            }
                        }
                        TransitionAction::Take => {
                            if !self.states[edge.target].is_final() {
                                survivors += 1;
                            }
                        }
                        TransitionAction::Proceed => {}
                    }
                }
                survivors
            }
        }
    }
}
