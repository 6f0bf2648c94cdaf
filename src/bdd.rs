//! A small reduced ordered BDD manager backing the satisfiability oracle.
//!
//! Nodes are hash-consed in a unique table and referenced through [`Ref`]
//! handles whose sign encodes complement edges, so negation is free and
//! every Boolean function has exactly one representation. All operations go
//! through [`Bdd::apply_ite`], memoized in a computed table.
//!
//! A manager lives for one query only: it is created with a deadline and a
//! node budget, and every operation reports [`OracleError`] once either is
//! exhausted instead of running unbounded.
//!
//! Variables are 1-indexed; index 0 marks the terminal.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

use log::debug;
use num_bigint::BigUint;

use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::reference::Ref;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

pub struct Bdd {
    nodes: RefCell<Vec<Node>>,
    unique: RefCell<HashMap<Node, u32>>,
    cache: RefCell<HashMap<(Ref, Ref, Ref), Ref>>,
    config: OracleConfig,
    deadline: Option<Instant>,
    pub zero: Ref,
    pub one: Ref,
}

impl Bdd {
    pub fn new(config: OracleConfig) -> Self {
        let one = Ref::positive(1);
        let terminal = Node {
            variable: 0,
            low: one,
            high: one,
        };
        // Index 0 is never referenced, index 1 is the terminal.
        let nodes = vec![terminal, terminal];

        Self {
            nodes: RefCell::new(nodes),
            unique: RefCell::new(HashMap::new()),
            cache: RefCell::new(HashMap::new()),
            config,
            deadline: config.timeout.map(|t| Instant::now() + t),
            zero: -one,
            one,
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.borrow().len() - 1
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == self.zero
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == self.one
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.index() == 1
    }

    /// Variable of the node, 0 for the terminal.
    pub fn variable(&self, node: Ref) -> u32 {
        self.nodes.borrow()[node.index()].variable
    }

    pub fn low_node(&self, node: Ref) -> Ref {
        let low = self.nodes.borrow()[node.index()].low;
        if node.is_negated() {
            -low
        } else {
            low
        }
    }
    pub fn high_node(&self, node: Ref) -> Ref {
        let high = self.nodes.borrow()[node.index()].high;
        if node.is_negated() {
            -high
        } else {
            high
        }
    }

    fn check_budget(&self) -> Result<(), OracleError> {
        if let (Some(deadline), Some(limit)) = (self.deadline, self.config.timeout) {
            if Instant::now() >= deadline {
                return Err(OracleError::Timeout { limit });
            }
        }
        Ok(())
    }

    pub fn mk_node(&self, v: u32, low: Ref, high: Ref) -> Result<Ref, OracleError> {
        assert_ne!(v, 0, "Variable index should not be zero");

        // Canonicity: the high edge is never complemented.
        if high.is_negated() {
            return Ok(-self.mk_node(v, -low, -high)?);
        }
        if low == high {
            return Ok(low);
        }

        let node = Node {
            variable: v,
            low,
            high,
        };
        if let Some(&i) = self.unique.borrow().get(&node) {
            return Ok(Ref::positive(i));
        }

        let mut nodes = self.nodes.borrow_mut();
        if nodes.len() >= self.config.node_limit {
            return Err(OracleError::NodeLimit {
                limit: self.config.node_limit,
            });
        }
        let i = nodes.len() as u32;
        nodes.push(node);
        self.unique.borrow_mut().insert(node, i);
        Ok(Ref::positive(i))
    }

    pub fn mk_var(&self, v: u32) -> Result<Ref, OracleError> {
        self.mk_node(v, self.zero, self.one)
    }

    /// Literal in DIMACS convention: `v` or `-v`.
    pub fn mk_lit(&self, lit: i32) -> Result<Ref, OracleError> {
        assert_ne!(lit, 0, "Variable index should not be zero");
        let var = self.mk_var(lit.unsigned_abs())?;
        Ok(if lit < 0 { -var } else { var })
    }

    /// Disjunction of DIMACS literals. Repeated and complementary literals are allowed.
    pub fn clause(&self, literals: impl IntoIterator<Item = i32>) -> Result<Ref, OracleError> {
        let mut current = self.zero;
        for lit in literals {
            let l = self.mk_lit(lit)?;
            current = self.apply_or(current, l)?;
        }
        Ok(current)
    }

    fn top_cofactors(&self, node: Ref, v: u32) -> (Ref, Ref) {
        if self.is_terminal(node) || self.variable(node) != v {
            return (node, node);
        }
        (self.low_node(node), self.high_node(node))
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(x, y, z) = (x ∧ y) ∨ (¬x ∧ z)
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Result<Ref, OracleError> {
        self.check_budget()?;

        // Base cases:
        //   ite(1,G,H) => G
        //   ite(0,G,H) => H
        //   ite(F,G,G) => G
        //   ite(F,1,0) => F
        //   ite(F,0,1) => ~F
        if self.is_one(f) {
            return Ok(g);
        }
        if self.is_zero(f) {
            return Ok(h);
        }
        if g == h {
            return Ok(g);
        }
        if self.is_one(g) && self.is_zero(h) {
            return Ok(f);
        }
        if self.is_zero(g) && self.is_one(h) {
            return Ok(-f);
        }

        // Standard triples:
        //   ite(F,F,H) => ite(F,1,H)
        //   ite(F,G,F) => ite(F,G,0)
        //   ite(F,~F,H) => ite(F,0,H)
        //   ite(F,G,~F) => ite(F,G,1)
        let g = if g == f {
            self.one
        } else if g == -f {
            self.zero
        } else {
            g
        };
        let h = if h == f {
            self.zero
        } else if h == -f {
            self.one
        } else {
            h
        };
        if g == h {
            return Ok(g);
        }
        if self.is_one(g) && self.is_zero(h) {
            return Ok(f);
        }
        if self.is_zero(g) && self.is_one(h) {
            return Ok(-f);
        }

        // ite(~F,G,H) => ite(F,H,G)
        let (f, g, h) = if f.is_negated() { (-f, h, g) } else { (f, g, h) };
        // ite(F,~G,H) => ~ite(F,G,~H)
        let (g, h, n) = if g.is_negated() {
            (-g, -h, true)
        } else {
            (g, h, false)
        };

        let key = (f, g, h);
        if let Some(&res) = self.cache.borrow().get(&key) {
            return Ok(if n { -res } else { res });
        }

        // Determine the top variable:
        let m = [f, g, h]
            .into_iter()
            .filter(|&r| !self.is_terminal(r))
            .map(|r| self.variable(r))
            .min()
            .expect("f is not terminal");

        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let e = self.apply_ite(f0, g0, h0)?;
        let t = self.apply_ite(f1, g1, h1)?;
        let res = self.mk_node(m, e, t)?;
        self.cache.borrow_mut().insert(key, res);

        Ok(if n { -res } else { res })
    }

    pub fn apply_and(&self, u: Ref, v: Ref) -> Result<Ref, OracleError> {
        self.apply_ite(u, v, self.zero)
    }

    pub fn apply_or(&self, u: Ref, v: Ref) -> Result<Ref, OracleError> {
        self.apply_ite(u, self.one, v)
    }

    /// Returns one satisfying assignment as DIMACS literals, if any exists.
    ///
    /// Variables absent from the returned path are unconstrained.
    pub fn one_sat(&self, node: Ref) -> Option<Vec<i32>> {
        if self.is_zero(node) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = node;

        // Walk down the BDD, always picking a satisfying branch
        while !self.is_one(current) {
            let var = self.variable(current) as i32;
            let high = self.high_node(current);
            let low = self.low_node(current);

            // Prefer high branch if satisfiable, otherwise take low
            if !self.is_zero(high) {
                path.push(var);
                current = high;
            } else {
                path.push(-var);
                current = low;
            }
        }

        debug!("one_sat({}) = {:?}", node, path);
        Some(path)
    }

    /// Number of satisfying assignments over `num_vars` variables.
    pub fn sat_count(&self, node: Ref, num_vars: usize) -> BigUint {
        let max = BigUint::from(1u32) << num_vars;
        let mut cache = HashMap::new();
        self.sat_count_(node, &max, &mut cache)
    }

    fn sat_count_(&self, node: Ref, max: &BigUint, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return max.clone();
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let regular = node.regular();
        let low = self.low_node(regular);
        let high = self.high_node(regular);

        let count: BigUint =
            (self.sat_count_(low, max, cache) + self.sat_count_(high, max, cache)) >> 1;
        let count = if node.is_negated() { max - count } else { count };

        cache.insert(node, count.clone());
        count
    }
}

impl std::fmt::Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("size", &self.size())
            .field("cache", &self.cache.borrow().len())
            .field("config", &self.config)
            .finish()
    }
}
