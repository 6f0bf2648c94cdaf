//! Satisfiability oracle.
//!
//! A [`SatOracle`] decides a [`Cnf`] and, when it is satisfiable, hands back a
//! [`Witness`] in the same call. Oracles keep no state between queries, so one
//! instance can serve a whole verification run.
//!
//! The provided [`BddOracle`] compiles the clauses into a fresh decision
//! diagram per query, bounded by an [`OracleConfig`]. Hitting a bound is an
//! [`OracleError`]: an unanswered query must abort the run, never be read as
//! "unsatisfiable".
//!
//! ```
//! use fsmcheck::cnf::Cnf;
//! use fsmcheck::parser::{BooleanExpressionFactory, FormulaFactory};
//! use fsmcheck::sat::{BddOracle, SatOracle};
//! use fsmcheck::variables::VariableTable;
//!
//! let factory = BooleanExpressionFactory::new(VariableTable::new());
//! let f = factory.parse("A & !B").unwrap();
//! let cnf = Cnf::convert(f.as_ref());
//!
//! let result = BddOracle::default().solve(&cnf).unwrap();
//! let witness = result.witness().unwrap();
//! assert_eq!(witness.to_string(), "A = true, B = false");
//! assert!(f.unwrap().eval(&witness.valuation()));
//! ```

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use num_bigint::BigUint;

use crate::bdd::Bdd;
use crate::cnf::Cnf;
use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::reference::Ref;
use crate::types::Lit;
use crate::valuation::Valuation;
use crate::variables::Variable;

/// A satisfying assignment covering every variable of the query, ordered by variable.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Witness {
    lits: Vec<Lit>,
}

impl Witness {
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn valuation(&self) -> Valuation {
        self.lits.iter().cloned().collect()
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lits.is_empty() {
            return write!(f, "(any valuation)");
        }
        write!(f, "{}", self.valuation())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SatResult {
    Satisfiable(Witness),
    Unsatisfiable,
}

impl SatResult {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SatResult::Satisfiable(_))
    }

    pub fn witness(&self) -> Option<&Witness> {
        match self {
            SatResult::Satisfiable(w) => Some(w),
            SatResult::Unsatisfiable => None,
        }
    }
}

pub trait SatOracle {
    /// Decides `cnf`, returning a witness when it is satisfiable.
    fn solve(&self, cnf: &Cnf) -> Result<SatResult, OracleError>;

    /// Number of valuations of the variables of `cnf` that satisfy it.
    fn count_models(&self, cnf: &Cnf) -> Result<BigUint, OracleError>;

    fn is_satisfiable(&self, cnf: &Cnf) -> Result<bool, OracleError> {
        Ok(self.solve(cnf)?.is_satisfiable())
    }
}

/// Decision-diagram based oracle.
#[derive(Debug, Clone, Default)]
pub struct BddOracle {
    config: OracleConfig,
}

impl BddOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Compiles `cnf`, numbering its variables 1.. in identifier order.
    fn compile(&self, cnf: &Cnf) -> Result<(Bdd, Ref, Vec<Variable>), OracleError> {
        let variables: Vec<Variable> = cnf.variables().into_iter().collect();
        let index = |v: &Variable| -> i32 {
            variables.binary_search(v).map(|i| i as i32 + 1).unwrap_or_else(|_| {
                unreachable!("clause variable {:?} missing from the variable set", v)
            })
        };

        let bdd = Bdd::new(self.config);
        let mut f = bdd.one;
        for clause in cnf.clauses() {
            let c = bdd.clause(clause.lits().iter().map(|lit| {
                let i = index(lit.variable());
                if lit.is_positive() {
                    i
                } else {
                    -i
                }
            }))?;
            f = bdd.apply_and(f, c)?;
            if bdd.is_zero(f) {
                break;
            }
        }

        debug!(
            "compiled {} clauses over {} variables into {:?}",
            cnf.len(),
            variables.len(),
            bdd
        );
        Ok((bdd, f, variables))
    }
}

impl SatOracle for BddOracle {
    fn solve(&self, cnf: &Cnf) -> Result<SatResult, OracleError> {
        let (bdd, f, variables) = self.compile(cnf)?;

        let Some(path) = bdd.one_sat(f) else {
            debug!("UNSAT: {}", cnf);
            return Ok(SatResult::Unsatisfiable);
        };

        // Variables off the path are unconstrained and default to false.
        let assigned: BTreeSet<i32> = path.into_iter().filter(|&l| l > 0).collect();
        let lits = variables
            .into_iter()
            .enumerate()
            .map(|(i, v)| Lit::new(v, assigned.contains(&(i as i32 + 1))))
            .collect();
        let witness = Witness { lits };

        debug!("SAT: {} with {}", cnf, witness);
        debug_assert!(cnf.eval(&witness.valuation()));
        Ok(SatResult::Satisfiable(witness))
    }

    fn count_models(&self, cnf: &Cnf) -> Result<BigUint, OracleError> {
        let (bdd, f, variables) = self.compile(cnf)?;
        Ok(bdd.sat_count(f, variables.len()))
    }
}
