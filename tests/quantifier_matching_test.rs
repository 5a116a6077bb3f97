// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-or-more / zero-or-more quantifier scenarios under every continuity.

mod common;

use common::{assert_patterns, feed, name_is, TestEvent};
use patternflux::{ConsumingStrategy, Nfa, NfaCompiler, Pattern};

struct LoopData {
    start: TestEvent,
    middle1: TestEvent,
    middle2: TestEvent,
    middle3: TestEvent,
    middle4: TestEvent,
    end: TestEvent,
}

fn loop_data() -> LoopData {
    LoopData {
        start: TestEvent::new(40, "c", 1),
        middle1: TestEvent::new(41, "a", 2),
        middle2: TestEvent::new(42, "a", 3),
        middle3: TestEvent::new(43, "a", 4),
        middle4: TestEvent::new(43, "a", 5),
        end: TestEvent::new(44, "b", 5),
    }
}

/// The shared input stream of the continuity matrix: two distractors, a
/// cluster of three loop events (two at the same timestamp), a distractor,
/// one late loop event, then the closing event.
fn loop_stream(data: &LoopData) -> Vec<(TestEvent, i64)> {
    vec![
        (data.start.clone(), 1),
        (TestEvent::new(50, "d", 6), 2),
        (data.middle1.clone(), 3),
        (data.middle2.clone(), 4),
        (data.middle3.clone(), 4),
        (TestEvent::new(50, "d", 6), 5),
        (data.middle4.clone(), 6),
        (data.end.clone(), 7),
    ]
}

fn one_or_more_nfa(inner: ConsumingStrategy, optional: bool) -> Nfa<TestEvent> {
    let mut pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by("middle")
        .when(name_is("a"))
        .one_or_more();
    if optional {
        pattern = pattern.optional();
    }
    pattern = match inner {
        ConsumingStrategy::Strict => pattern.consecutive(),
        ConsumingStrategy::SkipTillNext => pattern,
        ConsumingStrategy::SkipTillAny => pattern.allow_combinations(),
    };
    let pattern = pattern.followed_by("end").when(name_is("b"));
    NfaCompiler::compile(&pattern, false).unwrap()
}

#[test]
fn test_one_or_more_consecutive() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::Strict, false);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle2, d.end.clone()],
            &[d.start, d.middle1, d.end],
        ],
    );
}

#[test]
fn test_one_or_more_skip_till_next() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::SkipTillNext, false);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3,
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle2, d.end.clone()],
            &[d.start, d.middle1, d.end],
        ],
    );
}

#[test]
fn test_one_or_more_skip_till_any() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::SkipTillAny, false);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2,
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle3, d.end.clone()],
            &[d.start.clone(), d.middle1.clone(), d.middle4, d.end.clone()],
            &[d.start, d.middle1, d.end],
        ],
    );
}

#[test]
fn test_zero_or_more_consecutive() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::Strict, true);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle2, d.end.clone()],
            &[d.start.clone(), d.middle1, d.end.clone()],
            &[d.start, d.end],
        ],
    );
}

#[test]
fn test_zero_or_more_skip_till_next() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::SkipTillNext, true);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3,
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle2, d.end.clone()],
            &[d.start.clone(), d.middle1, d.end.clone()],
            &[d.start, d.end],
        ],
    );
}

#[test]
fn test_zero_or_more_skip_till_any() {
    let d = loop_data();
    let mut nfa = one_or_more_nfa(ConsumingStrategy::SkipTillAny, true);
    let matches = feed(&mut nfa, &loop_stream(&d));
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle3.clone(),
                d.middle4.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle4,
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.end.clone(),
            ],
            &[
                d.start.clone(),
                d.middle1.clone(),
                d.middle2,
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1.clone(), d.middle3, d.end.clone()],
            &[d.start.clone(), d.middle1, d.end.clone()],
            &[d.start, d.end],
        ],
    );
}

#[test]
fn test_zero_or_more_with_branching_start() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("middle")
        .when(name_is("a"))
        .one_or_more()
        .allow_combinations()
        .optional()
        .followed_by("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1.clone(), middle2.clone(), end.clone()],
            &[start.clone(), middle1, end.clone()],
            &[start.clone(), middle2, end.clone()],
            &[start, end],
        ],
    );
}

#[test]
fn test_eager_zero_or_more_skips_no_loop_event() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let middle3 = TestEvent::new(43, "a", 4);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (TestEvent::new(50, "d", 6), 5),
        (middle3.clone(), 6),
        (end.clone(), 7),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by("middle")
        .when(name_is("a"))
        .one_or_more()
        .optional()
        .followed_by("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[
                start.clone(),
                middle1.clone(),
                middle2.clone(),
                middle3,
                end.clone(),
            ],
            &[start.clone(), middle1.clone(), middle2, end.clone()],
            &[start.clone(), middle1, end.clone()],
            &[start, end],
        ],
    );
}

#[test]
fn test_begin_with_zero_or_more() {
    let middle1 = TestEvent::new(40, "a", 2);
    let middle2 = TestEvent::new(41, "a", 3);
    let middle3 = TestEvent::new(41, "a", 3);
    let end = TestEvent::new(42, "b", 4);
    let events = [
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("middle")
        .when(name_is("a"))
        .one_or_more()
        .optional()
        .followed_by("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[middle1.clone(), middle2.clone(), middle3.clone(), end.clone()],
            &[middle1.clone(), middle2.clone(), end.clone()],
            &[middle2.clone(), middle3.clone(), end.clone()],
            &[middle1, end.clone()],
            &[middle2, end.clone()],
            &[middle3, end.clone()],
            &[end],
        ],
    );
}

#[test]
fn test_begin_with_at_least_one() {
    let start1 = TestEvent::new(41, "a", 2);
    let start2 = TestEvent::new(42, "a", 3);
    let start3 = TestEvent::new(42, "a", 4);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start1.clone(), 3),
        (start2.clone(), 4),
        (start3.clone(), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("a"))
        .one_or_more()
        .allow_combinations()
        .followed_by("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start1.clone(), start2.clone(), start3.clone(), end.clone()],
            &[start1.clone(), start2.clone(), end.clone()],
            &[start1.clone(), start3.clone(), end.clone()],
            &[start2.clone(), start3.clone(), end.clone()],
            &[start1, end.clone()],
            &[start2, end.clone()],
            &[start3, end],
        ],
    );
}

#[test]
fn test_at_least_one_with_combinations() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("middle")
        .when(name_is("a"))
        .one_or_more()
        .allow_combinations()
        .followed_by_any("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1.clone(), middle2.clone(), end.clone()],
            &[start.clone(), middle1, end.clone()],
            &[start, middle2, end],
        ],
    );
}

#[test]
fn test_at_least_one_eager() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let middle3 = TestEvent::new(43, "a", 4);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("middle")
        .when(name_is("a"))
        .one_or_more()
        .followed_by_any("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[
                start.clone(),
                middle1.clone(),
                middle2.clone(),
                middle3.clone(),
                end.clone(),
            ],
            &[start.clone(), middle1.clone(), middle2.clone(), end.clone()],
            &[start.clone(), middle2.clone(), middle3.clone(), end.clone()],
            &[start.clone(), middle3, end.clone()],
            &[start.clone(), middle2, end.clone()],
            &[start, middle1, end],
        ],
    );
}

#[test]
fn test_skip_till_any_one_or_more_all_subsets() {
    let start = TestEvent::new(40, "c", 1);
    let a1 = TestEvent::new(41, "a", 2);
    let a2 = TestEvent::new(42, "a", 3);
    let a3 = TestEvent::new(43, "a", 4);
    let end = TestEvent::new(44, "b", 5);
    let events = [
        (start.clone(), 1),
        (a1.clone(), 3),
        (a2.clone(), 4),
        (a3.clone(), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("s")
        .when(name_is("c"))
        .followed_by_any("m")
        .when(name_is("a"))
        .one_or_more()
        .allow_combinations()
        .followed_by("e")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    // every non-empty order-preserving subset of the three loop events
    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), a1.clone(), a2.clone(), a3.clone(), end.clone()],
            &[start.clone(), a1.clone(), a2.clone(), end.clone()],
            &[start.clone(), a1.clone(), a3.clone(), end.clone()],
            &[start.clone(), a2.clone(), a3.clone(), end.clone()],
            &[start.clone(), a1, end.clone()],
            &[start.clone(), a2, end.clone()],
            &[start, a3, end],
        ],
    );
}

#[test]
fn test_next_zero_or_more_consecutive_dies_on_gap() {
    let start = TestEvent::new(40, "start", 1);
    let end = TestEvent::new(46, "end", 1);
    let events = [
        (start.clone(), 1),
        (TestEvent::new(1, "event", 1), 2),
        (TestEvent::new(40, "middle", 2), 3),
        (TestEvent::new(40, "middle", 3), 4),
        (TestEvent::new(40, "middle", 4), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("start"))
        .next("middle")
        .when(name_is("middle"))
        .one_or_more()
        .optional()
        .consecutive()
        .followed_by("end")
        .when(name_is("end"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(matches, vec![&[start, end]]);
}

#[test]
fn test_zero_or_more_after_zero_or_more() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "d", 3);
    let middle3 = TestEvent::new(43, "d", 4);
    let end = TestEvent::new(44, "e", 4);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
        (end.clone(), 6),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("middle-first")
        .when(name_is("a"))
        .one_or_more()
        .allow_combinations()
        .optional()
        .followed_by("middle-second")
        .when(name_is("d"))
        .one_or_more()
        .allow_combinations()
        .optional()
        .followed_by("end")
        .when(name_is("e"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[
                start.clone(),
                middle1.clone(),
                middle2.clone(),
                middle3.clone(),
                end.clone(),
            ],
            &[start.clone(), middle1.clone(), middle2.clone(), end.clone()],
            &[start.clone(), middle2.clone(), middle3, end.clone()],
            &[start.clone(), middle2, end.clone()],
            &[start.clone(), middle1, end.clone()],
            &[start, end],
        ],
    );
}

#[test]
fn test_zero_or_more_after_branching() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let merging = TestEvent::new(42, "f", 3);
    let kleene1 = TestEvent::new(43, "d", 4);
    let kleene2 = TestEvent::new(44, "d", 4);
    let end = TestEvent::new(45, "e", 4);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (merging.clone(), 5),
        (kleene1.clone(), 6),
        (kleene2.clone(), 7),
        (end.clone(), 8),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("branching")
        .when(name_is("a"))
        .followed_by_any("merging")
        .when(name_is("f"))
        .followed_by_any("kleene")
        .when(name_is("d"))
        .one_or_more()
        .allow_combinations()
        .optional()
        .followed_by("end")
        .when(name_is("e"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1.clone(), merging.clone(), end.clone()],
            &[
                start.clone(),
                middle1.clone(),
                merging.clone(),
                kleene1.clone(),
                end.clone(),
            ],
            &[
                start.clone(),
                middle1.clone(),
                merging.clone(),
                kleene2.clone(),
                end.clone(),
            ],
            &[
                start.clone(),
                middle1,
                merging.clone(),
                kleene1.clone(),
                kleene2.clone(),
                end.clone(),
            ],
            &[start.clone(), middle2.clone(), merging.clone(), end.clone()],
            &[
                start.clone(),
                middle2.clone(),
                merging.clone(),
                kleene1.clone(),
                end.clone(),
            ],
            &[
                start.clone(),
                middle2.clone(),
                merging.clone(),
                kleene2.clone(),
                end.clone(),
            ],
            &[start, middle2, merging, kleene1, kleene2, end],
        ],
    );
}

#[test]
fn test_strict_continuity_after_zero_or_more_no_results() {
    let events = [
        (TestEvent::new(40, "d", 2), 1),
        (TestEvent::new(41, "a", 2), 2),
        (TestEvent::new(42, "a", 2), 3),
        (TestEvent::new(43, "c", 3), 4),
        (TestEvent::new(44, "b", 4), 5),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("d"))
        .followed_by("middle")
        .when(name_is("a"))
        .one_or_more()
        .optional()
        .next("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(matches, vec![]);
}

#[test]
fn test_strict_continuity_after_zero_or_more_results() {
    let start = TestEvent::new(40, "d", 2);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 2);
    let end = TestEvent::new(43, "b", 4);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 2),
        (middle2.clone(), 3),
        (end.clone(), 5),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("d"))
        .followed_by_any("middle")
        .when(name_is("a"))
        .one_or_more()
        .optional()
        .allow_combinations()
        .next("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1, middle2.clone(), end.clone()],
            &[start, middle2, end],
        ],
    );
}

#[test]
fn test_start_with_zero_or_more_consecutive() {
    let pattern = Pattern::begin("start")
        .when(name_is("a"))
        .one_or_more()
        .optional()
        .consecutive();
    run_start_with_consecutive_loop(pattern);
}

#[test]
fn test_start_with_one_or_more_consecutive() {
    let pattern = Pattern::begin("start").when(name_is("a")).one_or_more().consecutive();
    run_start_with_consecutive_loop(pattern);
}

fn run_start_with_consecutive_loop(pattern: Pattern<TestEvent>) {
    let data = loop_data();
    let events = [
        (data.start.clone(), 1),
        (data.middle1.clone(), 3),
        (data.start.clone(), 4),
        (data.middle2.clone(), 5),
        (data.middle3.clone(), 6),
    ];

    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();
    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[data.middle1],
            &[data.middle2.clone(), data.middle3.clone()],
            &[data.middle2],
            &[data.middle3],
        ],
    );
}

#[test]
fn test_end_with_zero_or_more() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let middle3 = TestEvent::new(43, "a", 4);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by("middle")
        .when(name_is("a"))
        .one_or_more()
        .optional();
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1.clone(), middle2.clone(), middle3],
            &[start.clone(), middle1.clone(), middle2],
            &[start.clone(), middle1],
            &[start],
        ],
    );
}

#[test]
fn test_start_and_end_with_zero_or_more() {
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let middle3 = TestEvent::new(43, "a", 4);
    let events = [
        (TestEvent::new(40, "c", 1), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
        (TestEvent::new(44, "d", 5), 6),
        (TestEvent::new(45, "d", 5), 6),
        (TestEvent::new(46, "d", 5), 6),
    ];

    let pattern = Pattern::begin("start").when(name_is("a")).one_or_more().optional();
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[middle1.clone(), middle2.clone(), middle3.clone()],
            &[middle1.clone(), middle2.clone()],
            &[middle1],
            &[middle2.clone(), middle3.clone()],
            &[middle2],
            &[middle3],
        ],
    );
}

#[test]
fn test_end_with_one_or_more() {
    let start = TestEvent::new(40, "c", 1);
    let middle1 = TestEvent::new(41, "a", 2);
    let middle2 = TestEvent::new(42, "a", 3);
    let middle3 = TestEvent::new(43, "a", 4);
    let events = [
        (start.clone(), 1),
        (middle1.clone(), 3),
        (middle2.clone(), 4),
        (middle3.clone(), 5),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by("middle")
        .when(name_is("a"))
        .one_or_more();
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[start.clone(), middle1.clone(), middle2.clone(), middle3],
            &[start.clone(), middle1.clone(), middle2],
            &[start, middle1],
        ],
    );
}

#[test]
fn test_one_or_more_consecutive_optional() {
    let d = loop_data();
    let events = [
        (d.start.clone(), 1),
        (TestEvent::new(23, "f", 1), 2),
        (d.middle1.clone(), 3),
        (TestEvent::new(23, "f", 1), 4),
        (d.middle2.clone(), 5),
        (d.middle3.clone(), 6),
        (d.end.clone(), 7),
    ];

    let pattern = Pattern::begin("start")
        .when(name_is("c"))
        .followed_by_any("middle")
        .when(name_is("a"))
        .one_or_more()
        .consecutive()
        .optional()
        .followed_by("end")
        .when(name_is("b"));
    let mut nfa = NfaCompiler::compile(&pattern, false).unwrap();

    let matches = feed(&mut nfa, &events);
    assert_patterns(
        matches,
        vec![
            &[
                d.start.clone(),
                d.middle2.clone(),
                d.middle3.clone(),
                d.end.clone(),
            ],
            &[d.start.clone(), d.middle1, d.end.clone()],
            &[d.start.clone(), d.middle2, d.end.clone()],
            &[d.start.clone(), d.middle3, d.end.clone()],
            &[d.start, d.end],
        ],
    );
}
