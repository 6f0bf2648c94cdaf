use log::debug;

use crate::cnf::Cnf;
use crate::error::OracleError;
use crate::formula::Formula;
use crate::model::{ModelLike, StateLike, StateMachineLike, TransitionLike};
use crate::sat::{SatOracle, SatResult};

use super::{CheckMode, Report, VerificationUnit, Violation};

/// Transitions leaving a state on a common event must have exclusive guards,
/// unless they lead to the same state with the same actions.
#[derive(Debug, Copy, Clone, Default)]
pub struct DeterminismChecker;

impl<M: ModelLike> VerificationUnit<M> for DeterminismChecker {
    fn name(&self) -> &'static str {
        "determinism"
    }

    fn description(&self) -> &'static str {
        "transitions are exclusive, ensuring determinism"
    }

    fn failure(&self) -> &'static str {
        "Transitions exclusion not verified"
    }

    fn verify(&self, model: &M, oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);

        for machine in model.machines() {
            for state in machine.states() {
                let transitions = state.transitions();
                for (i, t1) in transitions.iter().enumerate() {
                    for t2 in &transitions[i + 1..] {
                        if !t1.events().intersects(t2.events()) {
                            continue;
                        }
                        debug!("{}: {} against {}", machine.name(), t1, t2);

                        let joint = Formula::conjunction(t1.guard(), t2.guard());
                        let cnf = Cnf::convert(joint.as_ref());
                        let SatResult::Satisfiable(witness) = oracle.solve(&cnf)? else {
                            continue;
                        };
                        if t1.same_effect(t2) {
                            debug!("identical effects, not an error");
                            continue;
                        }

                        let models = oracle.count_models(&cnf)?;
                        report.push(Violation::NonDeterminism {
                            machine: machine.name().to_string(),
                            state: state.name().to_string(),
                            first: t1.to_string(),
                            second: t2.to_string(),
                            variables: witness.lits().len(),
                            witness,
                            models,
                        });
                        if mode.is_done(&report) {
                            return Ok(report);
                        }
                    }
                }
            }
        }

        Ok(report)
    }
}
