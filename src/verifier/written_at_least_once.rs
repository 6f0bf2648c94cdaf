use crate::analysis::VariableUsage;
use crate::error::OracleError;
use crate::model::ModelLike;
use crate::sat::SatOracle;

use super::{CheckMode, Report, VerificationUnit, Violation};

/// Every variable read by a guard or a change trigger is written somewhere.
#[derive(Debug, Copy, Clone, Default)]
pub struct WrittenAtLeastOnceChecker;

impl<M: ModelLike> VerificationUnit<M> for WrittenAtLeastOnceChecker {
    fn name(&self) -> &'static str {
        "written-at-least-once"
    }

    fn description(&self) -> &'static str {
        "every variable read is written at least once"
    }

    fn failure(&self) -> &'static str {
        "Variables never written found"
    }

    fn verify(&self, model: &M, _oracle: &dyn SatOracle, mode: CheckMode) -> Result<Report, OracleError> {
        let mut report = VerificationUnit::<M>::report(self);
        let usage = VariableUsage::collect(model);

        for (variable, readers) in usage.readers() {
            if usage.is_written(variable) {
                continue;
            }
            report.push(Violation::NeverWritten {
                variable: variable.clone(),
                readers: readers.iter().cloned().collect(),
            });
            if mode.is_done(&report) {
                break;
            }
        }

        Ok(report)
    }
}
