use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use fsmcheck::config::OracleConfig;
use fsmcheck::error::{ModelError, OracleError};
use fsmcheck::events::{Action, Event};
use fsmcheck::graph::Model;
use fsmcheck::model::{Composition, ModelLike, StateMachineLike, TransitionLike};
use fsmcheck::sat::BddOracle;
use fsmcheck::verifier::*;
use proptest::prelude::*;
use test_log::test;

fn verify<U>(unit: U, model: &Model) -> Run
where
    U: VerificationUnit<Model> + 'static,
{
    Verifier::new(BddOracle::default()).with_unit(unit).check_all(model)
}

fn external(name: &str) -> Event {
    Event::external(name)
}

// Scenario graphs.

fn no_variable() -> Model {
    let mut model = Model::new("no_variable");
    let m = model.add_machine("a").unwrap();
    m.add_transition("0", "1", [], None, []);
    m.add_transition("1", "2", [external("e")], None, []);
    m.add_transition("2", "1", [external("f")], None, []);
    model
}

fn without_concurrent_writing() -> Model {
    let mut model = Model::new("without_concurrent_writing");
    let a = model.variables().boolean("A").unwrap();
    let b = model.variables().boolean("B").unwrap();
    let reads_a = model.parse_guard("A").unwrap();
    let reads_b = model.parse_guard("B").unwrap();

    let m = model.add_machine("first").unwrap();
    m.add_transition("0", "1", [], None, [Action::assign(a.clone(), false)]);
    m.add_transition("1", "1", [external("e")], reads_b, [Action::assign(a, true)]);

    let m = model.add_machine("second").unwrap();
    m.add_transition("0", "1", [], None, [Action::assign(b.clone(), false)]);
    m.add_transition("1", "1", [external("f")], reads_a, [Action::assign(b, true)]);
    model
}

fn concurrent_writing() -> Model {
    let mut model = without_concurrent_writing();
    let a = model.variables().get("A").unwrap();
    let m = model.add_machine("third").unwrap();
    m.add_transition("0", "1", [], None, []);
    m.add_transition("1", "1", [external("g")], None, [Action::assign(a, true)]);
    model
}

fn not_written_variables() -> Model {
    let mut model = without_concurrent_writing();
    let guard = model.parse_guard("A & C").unwrap();
    let m = model.add_machine("third").unwrap();
    m.add_transition("0", "1", [], None, []);
    m.add_transition("1", "1", [external("g")], guard, []);
    model
}

fn determinism(g1: &str, g2: &str, e1: &[&str], e2: &[&str], same_effect: bool) -> Model {
    let mut model = Model::new("determinism");
    let out = model.variables().boolean("OUT").unwrap();
    let g1 = model.parse_guard(g1).unwrap();
    let g2 = model.parse_guard(g2).unwrap();
    let m = model.add_machine("a").unwrap();
    m.add_transition("0", "1", e1.iter().map(|e| external(e)), g1, [Action::assign(out.clone(), true)]);
    if same_effect {
        m.add_transition("0", "1", e2.iter().map(|e| external(e)), g2, [Action::assign(out, true)]);
    } else {
        m.add_transition("0", "2", e2.iter().map(|e| external(e)), g2, [Action::assign(out, false)]);
    }
    model
}

#[test]
fn test_single_writing_checker() {
    assert!(verify(SingleWritingChecker, &no_variable()).is_success());
    assert!(verify(SingleWritingChecker, &without_concurrent_writing()).is_success());

    let run = verify(SingleWritingChecker, &concurrent_writing());
    assert_eq!(run.status(), &RunStatus::Failed);
    let report = run.report("single-writing").unwrap();
    assert_eq!(
        report.error_message(),
        "[FAILURE] Concurrent writing found: 1 errors have been found.\n\
         The variable A is written by several state machines: first, third\n"
    );
}

/// Writes of each machine, as (variable index, value) pairs.
fn writers_strategy() -> impl Strategy<Value = Vec<Vec<(usize, bool)>>> {
    prop::collection::vec(prop::collection::vec((0..3usize, any::<bool>()), 0..4), 1..5)
}

/// Machines `m0..` each writing their assigned variables, split between a primary and a proof model.
fn writers_models(writers: &[Vec<(usize, bool)>], split: usize) -> (Model, Model) {
    let mut primary = Model::new("writers");
    let variables: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|name| primary.variables().boolean(name).unwrap())
        .collect();
    let mut proof = Model::with_variables("proof", primary.variables().clone());

    for (i, writes) in writers.iter().enumerate() {
        let model = if i < split { &mut primary } else { &mut proof };
        let m = model.add_machine(&format!("m{}", i)).unwrap();
        m.add_transition("0", "1", [], None, []);
        for (k, &(v, value)) in writes.iter().enumerate() {
            m.add_transition(
                "1",
                "1",
                [external(&format!("e{}", k))],
                None,
                [Action::assign(variables[v].clone(), value)],
            );
        }
    }
    (primary, proof)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn single_writer_invariant(writers in writers_strategy(), split in 0..5usize) {
        let (primary, proof) = writers_models(&writers, split);
        let composed = Composition::new(&primary, &proof).unwrap();
        let passed = Verifier::new(BddOracle::default())
            .with_unit(SingleWritingChecker)
            .check_all(&composed)
            .is_success();

        let mut owners: HashMap<_, BTreeSet<_>> = HashMap::new();
        for machine in composed.machines() {
            for t in machine.transitions() {
                for (v, _) in t.actions().writes() {
                    owners.entry(v.clone()).or_default().insert(machine.name());
                }
            }
        }
        let single = owners.values().all(|machines| machines.len() == 1);
        prop_assert_eq!(passed, single, "writers {:?}", owners);
    }
}

#[test]
fn test_composition_keeps_machines_apart() {
    let mut primary = Model::new("primary");
    let x = primary.variables().boolean("X").unwrap();
    primary
        .add_machine("ctrl")
        .unwrap()
        .add_transition("0", "1", [external("e")], None, [Action::assign(x.clone(), true)]);

    let mut proof = Model::with_variables("proof", primary.variables().clone());
    proof
        .add_machine("ctrl")
        .unwrap()
        .add_transition("0", "1", [external("e")], None, [Action::assign(x.clone(), false)]);
    assert_eq!(
        Composition::new(&primary, &proof).unwrap_err(),
        ModelError::DuplicateMachine("ctrl".to_string())
    );

    let mut proof = Model::with_variables("proof", primary.variables().clone());
    proof
        .add_machine("observer")
        .unwrap()
        .add_transition("0", "1", [external("e")], None, [Action::assign(x, false)]);
    let composed = Composition::new(&primary, &proof).unwrap();
    let run = Verifier::new(BddOracle::default())
        .with_unit(SingleWritingChecker)
        .check_all(&composed);
    let violations: Vec<String> = run.violations().map(|v| v.to_string()).collect();
    assert_eq!(
        violations,
        vec!["The variable X is written by several state machines: ctrl, observer"]
    );
}

#[test]
fn test_written_at_least_once_checker() {
    assert!(verify(WrittenAtLeastOnceChecker, &no_variable()).is_success());
    assert!(verify(WrittenAtLeastOnceChecker, &without_concurrent_writing()).is_success());

    let run = verify(WrittenAtLeastOnceChecker, &not_written_variables());
    let violations: Vec<String> = run.violations().map(|v| v.to_string()).collect();
    assert_eq!(violations, vec!["The variable C is read by third but never written"]);
}

#[test]
fn test_determinism_checker() {
    let cases = [
        // Different events, no condition.
        (determinism("", "", &["e"], &["f"], false), true),
        // Same event, exclusive conditions.
        (determinism("X", "NOT X", &["e"], &["e"], false), true),
        // Same event, no condition.
        (determinism("", "", &["e"], &["e"], false), false),
        // One common event among several.
        (determinism("", "", &["e", "f", "g"], &["f"], false), false),
        // Same event, compatible conditions.
        (determinism("X & Y", "Y | Z", &["e"], &["e"], false), false),
        // Identical transitions.
        (determinism("X", "X", &["e"], &["e"], true), true),
        // Same effect under different conditions.
        (determinism("X", "Y", &["e", "f"], &["e"], true), true),
    ];

    for (i, (model, expected)) in cases.iter().enumerate() {
        let run = verify(DeterminismChecker, model);
        assert_eq!(run.is_success(), *expected, "case {}: {:?}", i, run.reports());
    }
}

#[test]
fn test_determinism_witness_enables_both_guards() {
    let model = determinism("(A | B) & !C", "B & (C | D)", &["e"], &["e"], false);
    let run = verify(DeterminismChecker, &model);
    let Some(Violation::NonDeterminism { witness, first, second, .. }) = run.violations().next() else {
        panic!("expected a determinism violation, got {:?}", run.reports());
    };

    let valuation = witness.valuation();
    let g1 = model.parse_guard("(A | B) & !C").unwrap().unwrap();
    let g2 = model.parse_guard("B & (C | D)").unwrap().unwrap();
    assert!(g1.eval(&valuation), "{}", witness);
    assert!(g2.eval(&valuation), "{}", witness);
    assert!(first.starts_with("0 -> 1"));
    assert!(second.starts_with("0 -> 2"));
}

#[test]
fn test_check_all_is_idempotent() {
    let mut m = concurrent_writing();
    let g = m.parse_guard("P | Q").unwrap();
    let h = m.parse_guard("Q").unwrap();
    let machine = m.add_machine("fourth").unwrap();
    machine.add_transition("0", "1", [external("e")], g, []);
    machine.add_transition("0", "2", [external("e")], h, []);

    let verifier = Verifier::standard(BddOracle::default());
    let first = verifier.check_all(&m);
    let second = verifier.check_all(&m);
    assert_eq!(first.status(), &RunStatus::Failed);
    assert_eq!(first.reports(), second.reports());
    assert_eq!(first.reports().len(), 7);
}

#[test]
fn test_check_stops_at_first_failure() {
    let verifier = Verifier::standard(BddOracle::default());
    let model = concurrent_writing();

    let run = verifier.check(&model);
    assert_eq!(run.status(), &RunStatus::Failed);
    let last = run.reports().last().unwrap();
    assert_eq!(last.unit(), "single-writing");
    assert_eq!(last.violations().len(), 1);
    assert!(run.report("determinism").is_none());
}

#[test]
fn test_coherent_variables_writing() {
    let clean = [no_variable(), without_concurrent_writing(), determinism("X", "NOT X", &["e"], &["e"], false)];
    for model in &clean {
        assert!(verify(CoherentVariablesWriting, model).is_success(), "{}", model.name());
    }

    // Two machines writing A differently on the same event.
    let mut same_step = Model::new("incoherent_1");
    let a = same_step.variables().boolean("A").unwrap();
    same_step
        .add_machine("first")
        .unwrap()
        .add_transition("0", "1", [external("e")], None, [Action::assign(a.clone(), true)]);
    same_step
        .add_machine("second")
        .unwrap()
        .add_transition("0", "1", [external("e")], None, [Action::assign(a.clone(), false)]);
    assert!(!verify(CoherentVariablesWriting, &same_step).is_success());

    // A synchronization event makes a second machine overwrite A.
    let mut propagation = Model::new("incoherent_2");
    let a = propagation.variables().boolean("A").unwrap();
    propagation.add_machine("first").unwrap().add_transition(
        "0",
        "1",
        [external("e")],
        None,
        [Action::assign(a.clone(), true), Action::emit("sync")],
    );
    propagation.add_machine("second").unwrap().add_transition(
        "0",
        "1",
        [Event::synchronization("sync")],
        None,
        [Action::assign(a.clone(), false)],
    );
    assert!(!verify(CoherentVariablesWriting, &propagation).is_success());

    // A single transition writing A and NOT A.
    let mut single = Model::new("incoherent_4");
    let a = single.variables().boolean("A").unwrap();
    single.add_machine("first").unwrap().add_transition(
        "0",
        "1",
        [external("e")],
        None,
        [Action::assign(a.clone(), true), Action::assign(a, false)],
    );
    assert!(!verify(CoherentVariablesWriting, &single).is_success());
}

#[test]
fn test_no_useless_variables() {
    assert!(verify(NoUselessVariables, &no_variable()).is_success());
    assert!(verify(NoUselessVariables, &without_concurrent_writing()).is_success());

    // Written, never read.
    let mut model = without_concurrent_writing();
    let c = model.variables().boolean("C").unwrap();
    model
        .machine_mut("first")
        .unwrap()
        .add_transition("1", "2", [external("g")], None, [Action::assign(c.clone(), true)]);
    assert!(!verify(NoUselessVariables, &model).is_success());

    // Read through a change event.
    model
        .machine_mut("second")
        .unwrap()
        .add_transition("1", "2", [Event::change(c, true)], None, []);
    assert!(verify(NoUselessVariables, &model).is_success());
}

#[test]
fn test_initialization_properties() {
    assert!(verify(InitializationProperties, &without_concurrent_writing()).is_success());

    let mut no_initial = Model::new("no_initial");
    no_initial.add_machine("a").unwrap().add_transition("1", "2", [], None, []);
    assert!(!verify(InitializationProperties, &no_initial).is_success());

    let mut guarded = Model::new("guarded");
    let g = guarded.parse_guard("A").unwrap();
    guarded.add_machine("a").unwrap().add_transition("0", "1", [], g, []);
    assert!(!verify(InitializationProperties, &guarded).is_success());

    let mut triggered = Model::new("triggered");
    triggered
        .add_machine("a")
        .unwrap()
        .add_transition("0", "1", [external("start")], None, []);
    assert!(!verify(InitializationProperties, &triggered).is_success());
}

#[test]
fn test_tautology_from_state_zero() {
    fn model(guard: &str, reachable: bool) -> Model {
        let mut model = Model::new("tautology");
        let g = model.parse_guard(guard).unwrap();
        let m = model.add_machine("a").unwrap();
        m.add_transition("0", "1", [], None, []);
        let from = if reachable { "1" } else { "3" };
        m.add_transition(from, "2", [external("e")], g, []);
        model
    }

    assert!(verify(TautologyFromStateZero, &model("A & B", true)).is_success());
    assert!(verify(TautologyFromStateZero, &model("A | NOT A", false)).is_success());
    assert!(!verify(TautologyFromStateZero, &model("A | NOT A", true)).is_success());
    assert!(!verify(TautologyFromStateZero, &model("(A & B) | NOT A | NOT B", true)).is_success());
    assert!(!verify(TautologyFromStateZero, &model("NOT (A & NOT A)", true)).is_success());
}

#[test]
fn test_proof_model_reads_primary_variables() {
    let primary = without_concurrent_writing();
    let mut proof = Model::with_variables("proof", primary.variables().clone());
    let guard = proof.parse_guard("A & B").unwrap();
    proof
        .add_machine("observer")
        .unwrap()
        .add_transition("0", "1", [external("check")], guard, []);

    // Alone, the proof model reads variables it never writes.
    assert!(!verify(WrittenAtLeastOnceChecker, &proof).is_success());

    let composed = Composition::new(&primary, &proof).unwrap();
    let run = Verifier::new(BddOracle::default())
        .with_unit(WrittenAtLeastOnceChecker)
        .with_unit(SingleWritingChecker)
        .check_all(&composed);
    assert!(run.is_success(), "{:?}", run.reports());
}

#[test]
fn test_oracle_timeout_aborts_the_run() {
    let model = determinism("X", "NOT X", &["e"], &["e"], false);
    let oracle = BddOracle::new(OracleConfig::default().with_timeout(Duration::ZERO));
    let run = Verifier::new(oracle)
        .with_unit(SingleWritingChecker)
        .with_unit(DeterminismChecker)
        .with_unit(NoUselessVariables)
        .check_all(&model);

    assert_eq!(
        run.status(),
        &RunStatus::Aborted(OracleError::Timeout {
            limit: Duration::ZERO
        })
    );
    // The report completed before the abort is kept.
    assert_eq!(run.reports().len(), 1);
    assert_eq!(run.reports()[0].unit(), "single-writing");
}
