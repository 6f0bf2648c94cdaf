//! Structural analyses shared by several verification units.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::events::{Action, Event};
use crate::model::{ModelLike, StateMachineLike, TransitionLike};
use crate::variables::Variable;

/// Which state machines read and write each variable.
///
/// A variable is read by a machine when it occurs in one of the machine's
/// guards or in one of its variable-change triggers.
#[derive(Debug, Clone, Default)]
pub struct VariableUsage {
    readers: IndexMap<Variable, IndexSet<String>>,
    writers: IndexMap<Variable, IndexSet<String>>,
}

impl VariableUsage {
    pub fn collect<M: ModelLike>(model: &M) -> Self {
        let mut usage = Self::default();
        for machine in model.machines() {
            let name = machine.name();
            for t in machine.transitions() {
                if let Some(guard) = t.guard() {
                    for v in guard.variables() {
                        usage.add_reader(v, name);
                    }
                }
                for event in t.events().iter() {
                    if let Event::Change { variable, .. } = event {
                        usage.add_reader(variable.clone(), name);
                    }
                }
                for (v, _) in t.actions().writes() {
                    usage
                        .writers
                        .entry(v.clone())
                        .or_default()
                        .insert(name.to_string());
                }
            }
        }
        debug!(
            "{}: {} variables read, {} written",
            model.name(),
            usage.readers.len(),
            usage.writers.len()
        );
        usage
    }

    fn add_reader(&mut self, variable: Variable, machine: &str) {
        self.readers
            .entry(variable)
            .or_default()
            .insert(machine.to_string());
    }

    pub fn readers(&self) -> &IndexMap<Variable, IndexSet<String>> {
        &self.readers
    }

    pub fn writers(&self) -> &IndexMap<Variable, IndexSet<String>> {
        &self.writers
    }

    pub fn is_read(&self, variable: &Variable) -> bool {
        self.readers.contains_key(variable)
    }

    pub fn is_written(&self, variable: &Variable) -> bool {
        self.writers.contains_key(variable)
    }
}

/// Why one machine can activate another.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Link {
    /// The source writes a variable the target reads.
    Variable(Variable),
    /// The source emits a synchronization event the target is triggered by.
    Synchronization(String),
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Variable(v) => write!(f, "{}", v),
            Link::Synchronization(name) => write!(f, "syn:{}", name),
        }
    }
}

/// Directed graph between state machines: `a -> b` when firing a transition
/// of `a` can enable or trigger a transition of `b`.
#[derive(Debug, Clone)]
pub struct ActivationGraph {
    graph: DiGraph<String, Link>,
    nodes: IndexMap<String, NodeIndex>,
}

impl ActivationGraph {
    pub fn build<M: ModelLike>(model: &M) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = IndexMap::new();
        for machine in model.machines() {
            let name = machine.name().to_string();
            let index = graph.add_node(name.clone());
            nodes.insert(name, index);
        }

        let usage = VariableUsage::collect(model);
        for (variable, writers) in usage.writers() {
            let Some(readers) = usage.readers().get(variable) else {
                continue;
            };
            for w in writers {
                for r in readers {
                    graph.add_edge(nodes[w], nodes[r], Link::Variable(variable.clone()));
                }
            }
        }

        let mut emitters: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        let mut listeners: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for machine in model.machines() {
            for t in machine.transitions() {
                for action in t.actions().iter() {
                    if let Action::Emit(name) = action {
                        emitters.entry(name.as_str()).or_default().insert(machine.name());
                    }
                }
                for event in t.events().iter() {
                    if let Event::Synchronization(name) = event {
                        listeners.entry(name.as_str()).or_default().insert(machine.name());
                    }
                }
            }
        }
        for (event, sources) in &emitters {
            let Some(targets) = listeners.get(event) else {
                continue;
            };
            for s in sources {
                for t in targets {
                    graph.add_edge(nodes[*s], nodes[*t], Link::Synchronization(event.to_string()));
                }
            }
        }

        debug!(
            "activation graph of {}: {} machines, {} links",
            model.name(),
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph, nodes }
    }

    pub fn graph(&self) -> &DiGraph<String, Link> {
        &self.graph
    }

    /// Machines `machine` can activate, without duplicates, in model order.
    pub fn successors(&self, machine: &str) -> Vec<&str> {
        let Some(&index) = self.nodes.get(machine) else {
            return Vec::new();
        };
        let targets: IndexSet<NodeIndex> = self.graph.edges(index).map(|e| e.target()).collect();
        self.nodes
            .iter()
            .filter(|(_, i)| targets.contains(*i))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Every reason `from` activates `to`.
    pub fn links(&self, from: &str, to: &str) -> Vec<&Link> {
        let (Some(&a), Some(&b)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(a, b)
            .map(|e| e.weight())
            .collect()
    }
}
