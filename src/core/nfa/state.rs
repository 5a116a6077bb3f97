// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automaton states and their transitions.
//!
//! States live in an arena owned by the compiled [`Nfa`](super::Nfa) and
//! reference each other by index, so the compiled automaton is plain data
//! apart from the user conditions attached to its edges.

use std::fmt;
use std::sync::Arc;

use crate::query_api::condition::Condition;

/// Index of a state in the compiled automaton's arena.
pub type StateId = usize;

/// Role of a state in the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateType {
    /// Entry of the chain; one computation state per Start state is kept
    /// alive permanently to admit new match attempts.
    Start,
    Normal,
    /// Reaching this state completes a match.
    Final,
    /// Reaching this state kills the branch.
    Stop,
}

/// What taking a transition does with the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Consume the event and record it under the source state's stage name.
    Take,
    /// Skip the event without consuming it.
    Ignore,
    /// Advance without an event (epsilon).
    Proceed,
}

/// A guarded edge between two states.
///
/// `condition == None` means the edge is always enabled. The source is kept
/// because TAKE edges discovered through PROCEED chains record the event
/// under the *edge source's* stage name, not under the state the branch was
/// sitting in.
pub struct StateTransition<T> {
    pub action: TransitionAction,
    pub source: StateId,
    pub target: StateId,
    pub condition: Option<Arc<dyn Condition<T>>>,
}

impl<T> Clone for StateTransition<T> {
    fn clone(&self) -> Self {
        Self {
            action: self.action,
            source: self.source,
            target: self.target,
            condition: self.condition.clone(),
        }
    }
}

impl<T> fmt::Debug for StateTransition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTransition")
            .field("action", &self.action)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("guarded", &self.condition.is_some())
            .finish()
    }
}

/// An automaton state: the stage it belongs to (or a synthetic name), its
/// role, and its ordered outgoing transitions.
pub struct State<T> {
    name: String,
    state_type: StateType,
    transitions: Vec<StateTransition<T>>,
}

impl<T> State<T> {
    pub fn new(name: impl Into<String>, state_type: StateType) -> Self {
        Self {
            name: name.into(),
            state_type,
            transitions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_type(&self) -> StateType {
        self.state_type
    }

    pub fn transitions(&self) -> &[StateTransition<T>] {
        &self.transitions
    }

    pub fn is_start(&self) -> bool {
        self.state_type == StateType::Start
    }

    pub fn is_final(&self) -> bool {
        self.state_type == StateType::Final
    }

    pub fn is_stop(&self) -> bool {
        self.state_type == StateType::Stop
    }

    /// Promote a Normal state to the chain entry.
    pub fn make_start(&mut self) {
        self.state_type = StateType::Start;
    }

    pub(crate) fn add_transition(
        &mut self,
        action: TransitionAction,
        source: StateId,
        target: StateId,
        condition: Option<Arc<dyn Condition<T>>>,
    ) {
        self.transitions.push(StateTransition {
            action,
            source,
            target,
            condition,
        });
    }
}

impl<T> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("state_type", &self.state_type)
            .field("transitions", &self.transitions)
            .finish()
    }
}
