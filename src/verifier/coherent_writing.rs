use std::collections::BTreeSet;

use log::debug;

use crate::analysis::ActivationGraph;
use crate::cnf::Cnf;
use crate::error::OracleError;
use crate::events::Actions;
use crate::formula::{Formula, Simplified};
use crate::model::{ModelLike, StateLike, StateMachineLike, TransitionLike, TransitionOf};
use crate::sat::{SatOracle, SatResult};
use crate::types::Value;
use crate::valuation::Valuation;
use crate::variables::Variable;

use super::{CheckMode, Report, Site, VerificationUnit, Violation};

/// No variable can receive two different values at once.
///
/// Three situations are checked:
/// - a single transition assigning two values to a variable;
/// - two transitions of different machines, fired by a common event with
///   jointly satisfiable guards, assigning different values;
/// - a transition and one of its direct successors (a transition triggered by
///   an event it produces) assigning different values, where the successor's
///   guard is evaluated after the first transition's writes.
#[derive(Debug, Copy, Clone, Default)]
pub struct CoherentVariablesWriting;

/// Variables written with different values by `a` and `b`.
fn conflicts<'a>(a: &'a Actions, b: &Actions) -> BTreeSet<&'a Variable> {
    a.writes()
        .filter(|&(v, x)| b.writes().any(|(w, y)| v == w && x != y))
        .map(|(v, _)| v)
        .collect()
}

/// The Boolean writes of `actions` as a partial valuation.
fn written_valuation(actions: &Actions) -> Valuation {
    let mut valuation = Valuation::new();
    for (v, x) in actions.writes() {
        if v.is_boolean() {
            valuation.set(v.clone(), x == Value::TRUE);
        }
    }
    valuation
}

impl<M: ModelLike> VerificationUnit<M> for CoherentVariablesWriting {
    fn name(&self) -> &'static str {
        "coherent-writing"
    }

    fn description(&self) -> &'static str {
        "variables are written coherently"
    }

    fn failure(&self) -> &'static str {
        "Incoherent writing found"
    }

    fn verify(&self, model: &M, oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);
        let activation = ActivationGraph::build(model);
        let machines: Vec<&M::Machine> = model.machines().collect();

        for (i, m1) in machines.iter().enumerate() {
            for t1 in m1.transitions() {
                // The same transition.
                for variable in conflicts(t1.actions(), t1.actions()) {
                    report.push(Violation::ConflictingWrites {
                        variable: variable.clone(),
                        site: Site::new(m1.name(), t1),
                    });
                    if mode.is_done(&report) {
                        return Ok(report);
                    }
                }

                // The same step, in another machine.
                for m2 in &machines[i + 1..] {
                    for t2 in m2.transitions() {
                        if !t1.events().intersects(t2.events()) {
                            continue;
                        }
                        let variables = conflicts(t1.actions(), t2.actions());
                        if variables.is_empty() {
                            continue;
                        }
                        debug!("same step: {} against {}", t1, t2);
                        let joint = Formula::conjunction(t1.guard(), t2.guard());
                        let SatResult::Satisfiable(witness) = oracle.solve(&Cnf::convert(joint.as_ref()))? else {
                            continue;
                        };
                        for variable in variables {
                            report.push(Violation::SimultaneousWrites {
                                variable: variable.clone(),
                                first: Site::new(m1.name(), t1),
                                second: Site::new(m2.name(), t2),
                                witness: witness.clone(),
                            });
                            if mode.is_done(&report) {
                                return Ok(report);
                            }
                        }
                    }
                }

                // One step later.
                let produced = t1.actions().produced_events();
                if produced.is_empty() {
                    continue;
                }
                let mut successors: Vec<(&str, &TransitionOf<M>)> = Vec::new();
                if let Some(state) = m1.state(t1.destination()) {
                    successors.extend(state.transitions().iter().map(|t| (m1.name(), t)));
                }
                for name in activation.successors(m1.name()) {
                    if name == m1.name() {
                        continue;
                    }
                    if let Some(&m2) = machines.iter().find(|m| m.name() == name) {
                        successors.extend(m2.transitions().map(|t| (m2.name(), t)));
                    }
                }

                let after = written_valuation(t1.actions());
                for (m2, t2) in successors {
                    if !t2.events().intersects(&produced) {
                        continue;
                    }
                    let variables = conflicts(t1.actions(), t2.actions());
                    if variables.is_empty() {
                        continue;
                    }
                    let g2 = match t2.guard().map(|g| g.assign(&after)) {
                        Some(Simplified::False) => continue,
                        Some(Simplified::Formula(g)) => Some(g),
                        Some(Simplified::True) | None => None,
                    };
                    debug!("propagation: {} then {}", t1, t2);
                    let joint = Formula::conjunction(t1.guard(), g2.as_ref());
                    let SatResult::Satisfiable(witness) = oracle.solve(&Cnf::convert(joint.as_ref()))? else {
                        continue;
                    };
                    for variable in variables {
                        report.push(Violation::PropagatedWrites {
                            variable: variable.clone(),
                            first: Site::new(m1.name(), t1),
                            second: Site::new(m2, t2),
                            witness: witness.clone(),
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
