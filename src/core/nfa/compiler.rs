// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern chain → NFA compilation.
//!
//! The chain is folded right to left: the synthetic final state is created
//! first, then every stage is converted against the entry state of the
//! stage after it ("the sink"), and the head stage's entry is marked Start.
//!
//! Per stage, continuity decides the IGNORE shape next to the TAKE edge:
//! strict continuity routes non-matching events to a per-stage Stop state,
//! skip-till-next ignores them in place under the negated condition, and
//! skip-till-any ignores unconditionally (matching events branch at
//! runtime). Quantifiers unroll into chained singletons (`times`) or a
//! self-looping state with an init singleton (`one_or_more`), with the
//! inner continuity applied inside the group.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::core::config::NfaConfig;
use crate::core::error::PatternFluxResult;
use crate::core::nfa::state::{State, StateId, StateType, TransitionAction};
use crate::core::nfa::Nfa;
use crate::query_api::condition::{conjoin, Condition, NotCondition};
use crate::query_api::pattern::{Pattern, Stage};
use crate::query_api::quantifier::{ConsumingStrategy, QuantifierMode};

/// Name of the synthetic final state.
pub const ENDING_STATE_NAME: &str = "$end$";

/// Compiles [`Pattern`] chains into runnable [`Nfa`]s.
pub struct NfaCompiler;

impl NfaCompiler {
    /// Compile `pattern` with the default runtime configuration.
    ///
    /// With `handle_timeouts`, window-expired partial matches are reported
    /// through [`ProcessResult::timeouts`](crate::core::nfa::ProcessResult);
    /// without it they are silently discarded.
    pub fn compile<T>(pattern: &Pattern<T>, handle_timeouts: bool) -> PatternFluxResult<Nfa<T>>
    where
        T: Clone + Eq + Hash + 'static,
    {
        Self::compile_with_config(pattern, handle_timeouts, NfaConfig::default())
    }

    /// Compile `pattern` with an explicit runtime configuration.
    pub fn compile_with_config<T>(
        pattern: &Pattern<T>,
        handle_timeouts: bool,
        config: NfaConfig,
    ) -> PatternFluxResult<Nfa<T>>
    where
        T: Clone + Eq + Hash + 'static,
    {
        pattern.validate()?;

        let mut builder = NfaFactoryBuilder::new();
        let final_state = builder.create_state(ENDING_STATE_NAME, StateType::Final);

        let mut sink = final_state;
        for (index, stage) in pattern.stages().iter().enumerate().rev() {
            sink = builder.convert_stage(stage, sink, index == 0);
        }
        builder.states[sink].make_start();

        log::debug!(
            "compiled pattern with {} stages into {} states (window: {:?}ms)",
            pattern.stages().len(),
            builder.states.len(),
            pattern.window_time()
        );

        Ok(Nfa::new(
            builder.states,
            pattern.window_time().unwrap_or(0),
            handle_timeouts,
            config,
        ))
    }
}

struct NfaFactoryBuilder<T> {
    states: Vec<State<T>>,
    stop_states: HashMap<String, StateId>,
}

/// IGNORE edge shape dictated by a consuming strategy.
enum IgnoreShape<T> {
    /// Stay in place while the guard holds.
    SelfLoop(Arc<dyn Condition<T>>),
    /// Unconditional self-loop (skip-till-any).
    SelfLoopAlways,
    /// Route to the stage's Stop state while the guard holds (strict).
    ToStop(Arc<dyn Condition<T>>),
}

impl<T: 'static> NfaFactoryBuilder<T> {
    fn new() -> Self {
        Self {
            states: Vec::new(),
            stop_states: HashMap::new(),
        }
    }

    fn create_state(&mut self, name: &str, state_type: StateType) -> StateId {
        self.states.push(State::new(name, state_type));
        self.states.len() - 1
    }

    fn stop_state(&mut self, name: &str) -> StateId {
        if let Some(&id) = self.stop_states.get(name) {
            return id;
        }
        let id = self.create_state(name, StateType::Stop);
        self.stop_states.insert(name.to_string(), id);
        id
    }

    fn add_take(&mut self, from: StateId, to: StateId, condition: Arc<dyn Condition<T>>) {
        self.states[from].add_transition(TransitionAction::Take, from, to, Some(condition));
    }

    fn add_proceed(&mut self, from: StateId, to: StateId) {
        self.states[from].add_transition(TransitionAction::Proceed, from, to, None);
    }

    fn add_ignore(&mut self, from: StateId, to: StateId, condition: Option<Arc<dyn Condition<T>>>) {
        self.states[from].add_transition(TransitionAction::Ignore, from, to, condition);
    }

    /// Convert one stage against its sink. The head stage never carries an
    /// outer ignore edge: nothing precedes a Start, so there is no junction
    /// whose continuity could apply, and start computations re-admit
    /// themselves on every event anyway.
    fn convert_stage(&mut self, stage: &Stage<T>, sink: StateId, is_head: bool) -> StateId {
        let outer_ignore = if is_head {
            None
        } else {
            Self::ignore_shape(stage.strategy(), stage)
        };
        match stage.quantifier().mode {
            QuantifierMode::Looping => self.create_looping_group(stage, sink, outer_ignore),
            QuantifierMode::Times(count) => {
                self.create_times_group(stage, sink, count, outer_ignore)
            }
            QuantifierMode::Single => self.create_singleton_state(
                stage,
                sink,
                sink,
                outer_ignore,
                stage.quantifier().optional,
            ),
        }
    }

    /// One state taking a single event, with the optional/ignore scaffolding.
    ///
    /// `take_sink` is where a consumed event leads; `proceed_sink` is where
    /// skipping the whole stage leads when it is optional. When the stage
    /// is optional and its ignore shape is a self-loop, skipping an event
    /// moves to an auxiliary same-named state without the PROCEED edge:
    /// once an event has been ignored the stage can no longer be skipped
    /// outright.
    fn create_singleton_state(
        &mut self,
        stage: &Stage<T>,
        take_sink: StateId,
        proceed_sink: StateId,
        ignore_shape: Option<IgnoreShape<T>>,
        optional: bool,
    ) -> StateId {
        let take_condition = conjoin(stage.conditions());
        let state = self.create_state(stage.name(), StateType::Normal);
        self.add_take(state, take_sink, take_condition.clone());

        if optional {
            self.add_proceed(state, proceed_sink);
        }

        match ignore_shape {
            Some(IgnoreShape::ToStop(guard)) => {
                let stop = self.stop_state(stage.name());
                self.add_ignore(state, stop, Some(guard));
            }
            Some(IgnoreShape::SelfLoop(guard)) => {
                let loop_target = if optional {
                    let aux = self.create_state(stage.name(), StateType::Normal);
                    self.add_take(aux, take_sink, take_condition);
                    self.add_ignore(aux, aux, Some(guard.clone()));
                    aux
                } else {
                    state
                };
                self.add_ignore(state, loop_target, Some(guard));
            }
            Some(IgnoreShape::SelfLoopAlways) => {
                let loop_target = if optional {
                    let aux = self.create_state(stage.name(), StateType::Normal);
                    self.add_take(aux, take_sink, take_condition);
                    self.add_ignore(aux, aux, None);
                    aux
                } else {
                    state
                };
                self.add_ignore(state, loop_target, None);
            }
            None => {}
        }

        state
    }

    /// `times(n)`: n chained singletons. The inner n-1 junctions follow the
    /// group's inner continuity; the head follows the stage's own
    /// continuity, and an optional head skips the whole group.
    fn create_times_group(
        &mut self,
        stage: &Stage<T>,
        sink: StateId,
        count: u32,
        outer_ignore: Option<IgnoreShape<T>>,
    ) -> StateId {
        let mut last_sink = sink;
        for _ in 0..count.saturating_sub(1) {
            last_sink = self.create_singleton_state(
                stage,
                last_sink,
                last_sink,
                Self::ignore_shape(stage.quantifier().inner_strategy, stage),
                false,
            );
        }
        self.create_singleton_state(
            stage,
            last_sink,
            sink,
            outer_ignore,
            stage.quantifier().optional,
        )
    }

    /// `one_or_more`: a self-taking looping state exited through a
    /// condition-free PROCEED, fronted by an init singleton for the first
    /// event. `.optional()` additionally lets the init state skip the loop.
    fn create_looping_group(
        &mut self,
        stage: &Stage<T>,
        sink: StateId,
        outer_ignore: Option<IgnoreShape<T>>,
    ) -> StateId {
        let take_condition = conjoin(stage.conditions());

        let looping = self.create_state(stage.name(), StateType::Normal);
        self.add_proceed(looping, sink);
        self.add_take(looping, looping, take_condition.clone());

        match Self::ignore_shape(stage.quantifier().inner_strategy, stage) {
            Some(IgnoreShape::ToStop(guard)) => {
                let stop = self.stop_state(stage.name());
                self.add_ignore(looping, stop, Some(guard));
            }
            Some(IgnoreShape::SelfLoop(guard)) => {
                let aux = self.create_state(stage.name(), StateType::Normal);
                self.add_take(aux, looping, take_condition.clone());
                self.add_ignore(aux, aux, Some(guard.clone()));
                self.add_ignore(looping, aux, Some(guard));
            }
            Some(IgnoreShape::SelfLoopAlways) => {
                let aux = self.create_state(stage.name(), StateType::Normal);
                self.add_take(aux, looping, take_condition.clone());
                self.add_ignore(aux, aux, None);
                self.add_ignore(looping, aux, None);
            }
            None => {}
        }

        if stage.quantifier().optional {
            self.create_singleton_state(stage, looping, sink, outer_ignore, true)
        } else {
            let init = self.create_state(stage.name(), StateType::Normal);
            self.add_take(init, looping, take_condition);
            match outer_ignore {
                Some(IgnoreShape::ToStop(guard)) => {
                    let stop = self.stop_state(stage.name());
                    self.add_ignore(init, stop, Some(guard));
                }
                Some(IgnoreShape::SelfLoop(guard)) => {
                    self.add_ignore(init, init, Some(guard));
                }
                Some(IgnoreShape::SelfLoopAlways) => {
                    self.add_ignore(init, init, None);
                }
                None => {}
            }
            init
        }
    }

    fn ignore_shape(strategy: ConsumingStrategy, stage: &Stage<T>) -> Option<IgnoreShape<T>> {
        match strategy {
            ConsumingStrategy::Strict => Some(IgnoreShape::ToStop(Arc::new(NotCondition::new(
                conjoin(stage.conditions()),
            )))),
            ConsumingStrategy::SkipTillNext => Some(IgnoreShape::SelfLoop(Arc::new(
                NotCondition::new(conjoin(stage.conditions())),
            ))),
            ConsumingStrategy::SkipTillAny => Some(IgnoreShape::SelfLoopAlways),
        }
    }
}
