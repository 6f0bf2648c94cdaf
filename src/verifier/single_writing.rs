use crate::analysis::VariableUsage;
use crate::error::OracleError;
use crate::model::ModelLike;
use crate::sat::SatOracle;

use super::{CheckMode, Report, VerificationUnit, Violation};

/// Every variable is written by at most one state machine.
#[derive(Debug, Copy, Clone, Default)]
pub struct SingleWritingChecker;

impl<M: ModelLike> VerificationUnit<M> for SingleWritingChecker {
    fn name(&self) -> &'static str {
        "single-writing"
    }

    fn description(&self) -> &'static str {
        "each variable is written by a single state machine"
    }

    fn failure(&self) -> &'static str {
        "Concurrent writing found"
    }

    fn verify(&self, model: &M, _oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);
        let usage = VariableUsage::collect(model);

        for (variable, writers) in usage.writers() {
            if writers.len() > 1 {
                report.push(Violation::ConcurrentWriting {
                    variable: variable.clone(),
                    machines: writers.iter().cloned().collect(),
                });
                if mode.is_done(&report) {
                    break;
                }
            }
        }

        Ok(report)
    }
}
