use crate::analysis::VariableUsage;
use crate::error::OracleError;
use crate::model::ModelLike;
use crate::sat::SatOracle;

use super::{CheckMode, Report, VerificationUnit, Violation};

/// Every variable written by an action is read by a guard or a change trigger.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoUselessVariables;

impl<M: ModelLike> VerificationUnit<M> for NoUselessVariables {
    fn name(&self) -> &'static str {
        "no-useless-variables"
    }

    fn description(&self) -> &'static str {
        "every variable written is used"
    }

    fn failure(&self) -> &'static str {
        "Useless variables found"
    }

    fn verify(&self, model: &M, _oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);
        let usage = VariableUsage::collect(model);

        for (variable, writers) in usage.writers() {
            if usage.is_read(variable) {
                continue;
            }
            report.push(Violation::UselessVariable {
                variable: variable.clone(),
                writers: writers.iter().cloned().collect(),
            });
            if mode.is_done(&report) {
                break;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::events::{Action, Event};
    use crate::graph::Model;
    use crate::sat::BddOracle;

    fn model() -> Model {
        let mut model = Model::new("m");
        let a = model.variables().boolean("A").unwrap();
        let b = model.variables().boolean("B").unwrap();
        let c = model.variables().boolean("C").unwrap();
        let guard = model.parse_guard("A").unwrap();
        let machine = model.add_machine("a").unwrap();
        machine.add_transition(
            "0",
            "1",
            [Event::external("e")],
            None,
            [Action::assign(a, true), Action::assign(b.clone(), true), Action::assign(c, true)],
        );
        machine.add_transition("1", "0", [Event::change(b, true)], guard, []);
        model
    }

    #[test]
    fn test_write_only_variable() {
        let model = model();
        let oracle = BddOracle::default();
        let report = NoUselessVariables.verify(&model, &oracle, CheckMode::AllViolations).unwrap();

        // A is read in a guard, B in a change trigger.
        assert_eq!(report.violations().len(), 1);
        assert_eq!(
            report.violations()[0].to_string(),
            "The variable C is written by a but never read"
        );
    }

    #[test]
    fn test_check_stops_early() {
        let mut model = model();
        let d = model.variables().boolean("D").unwrap();
        model
            .machine_mut("a")
            .unwrap()
            .add_transition("1", "2", [], None, [Action::assign(d, true)]);

        let oracle = BddOracle::default();
        let all = NoUselessVariables.verify(&model, &oracle, CheckMode::AllViolations).unwrap();
        let first = NoUselessVariables.verify(&model, &oracle, CheckMode::FirstViolation).unwrap();
        assert_eq!(all.violations().len(), 2);
        assert_eq!(first.violations().len(), 1);
        assert!(!NoUselessVariables.check(&model, &oracle).unwrap());
    }
}
