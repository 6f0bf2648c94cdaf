use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::cnf::Cnf;
use crate::error::OracleError;
use crate::formula::Formula;
use crate::model::{ModelLike, StateLike, StateMachineLike, TransitionLike};
use crate::sat::SatOracle;

use super::{CheckMode, Report, Site, VerificationUnit, Violation, INITIAL_STATE};

/// No guard reachable from the initial state is always true.
///
/// A guard `g` is a tautology when `NOT g` is unsatisfiable. Missing guards
/// are not reported.
#[derive(Debug, Copy, Clone, Default)]
pub struct TautologyFromStateZero;

impl<M: ModelLike> VerificationUnit<M> for TautologyFromStateZero {
    fn name(&self) -> &'static str {
        "tautology"
    }

    fn description(&self) -> &'static str {
        "no condition reachable from the initial state is always true"
    }

    fn failure(&self) -> &'static str {
        "Tautological conditions found"
    }

    fn verify(&self, model: &M, oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);

        for machine in model.machines() {
            let mut visited: HashSet<&str> = HashSet::new();
            let mut queue: VecDeque<&str> = VecDeque::new();
            if machine.state(INITIAL_STATE).is_some() {
                visited.insert(INITIAL_STATE);
                queue.push_back(INITIAL_STATE);
            }

            while let Some(name) = queue.pop_front() {
                let Some(state) = machine.state(name) else {
                    continue;
                };
                for t in state.transitions() {
                    if visited.insert(t.destination()) {
                        queue.push_back(t.destination());
                    }
                    let Some(guard) = t.guard() else {
                        continue;
                    };
                    let negated = Cnf::from_formula(&Formula::not(guard.clone()));
                    if oracle.is_satisfiable(&negated)? {
                        continue;
                    }
                    debug!("tautology: {}", guard);
                    report.push(Violation::TautologicalGuard {
                        site: Site::new(machine.name(), t),
                    });
                    if mode.is_done(&report) {
                        return Ok(report);
                    }
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::events::Event;
    use crate::graph::Model;
    use crate::sat::BddOracle;

    fn verify(model: &Model) -> Report {
        TautologyFromStateZero
            .verify(model, &BddOracle::default(), CheckMode::AllViolations)
            .unwrap()
    }

    #[test]
    fn test_reachable_tautology() {
        let mut model = Model::new("m");
        let always = model.parse_guard("A | NOT A").unwrap();
        let sometimes = model.parse_guard("A | B").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition("0", "1", [], None, []);
        machine.add_transition("1", "2", [Event::external("e")], sometimes, []);
        machine.add_transition("1", "0", [Event::external("f")], always, []);

        let report = verify(&model);
        assert_eq!(report.violations().len(), 1);
        assert_eq!(
            report.violations()[0].to_string(),
            "The condition of\n  [a] 1 -> 0 on {f} if A OU (NON A)\nis always true"
        );
    }

    #[test]
    fn test_unreachable_tautology() {
        let mut model = Model::new("m");
        let always = model.parse_guard("(A | B) | (NOT A & NOT B)").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition("0", "1", [], None, []);
        machine.add_transition("5", "0", [Event::external("e")], always, []);

        assert!(verify(&model).passed());
    }
}
