//! Spawn graph over a project's tasks.
//!
//! Built on demand from a [`TaskRegistry`]; never stored. Each spawn step is
//! an edge from the spawning task to the spawned task, weighted with the
//! step's index so traversal follows step order.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::domain::{entities::task_registry::TaskRegistry, error::DomainError};

/// A dependency graph for tasks
#[derive(Debug, Default)]
pub struct TaskGraph {
    /// The underlying directed graph
    graph: DiGraph<String, usize>,

    /// Map from task name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Unregistered spawn targets, by spawning task, in step order
    dangling: HashMap<NodeIndex, Vec<String>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

impl TaskGraph {
    /// Builds the graph from every task in `registry`.
    ///
    /// Spawn steps naming an unregistered task are kept aside and only
    /// reported when a walk reaches the spawning task.
    pub fn build(registry: &TaskRegistry) -> Self {
        let mut graph = Self::default();

        // First pass: add all nodes
        for task in registry.all() {
            let idx = graph.graph.add_node(task.name().to_string());
            graph.node_map.insert(task.name().to_string(), idx);
        }

        // Second pass: add all edges
        for task in registry.all() {
            let from = graph.node_map[task.name()];
            for (index, step) in task.steps().iter().enumerate() {
                let Some(target) = step.spawned_task() else {
                    continue;
                };
                match graph.node_map.get(target) {
                    Some(to) => {
                        graph.graph.add_edge(from, *to, index);
                    }
                    None => graph
                        .dangling
                        .entry(from)
                        .or_default()
                        .push(target.to_string()),
                }
            }
        }

        graph
    }

    /// Tasks reachable from `root` through spawn edges, dependencies first.
    ///
    /// The walk is depth-first with a visiting/done colouring; meeting a task
    /// that is still being visited is a cycle, reported with its members in
    /// spawn order.
    pub fn resolve(&self, root: &str) -> Result<Vec<String>, DomainError> {
        let start = self.index(root)?;
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut order = Vec::new();
        self.visit(start, &mut marks, &mut stack, &mut order)?;
        Ok(order)
    }

    /// Check the whole graph for cycles and unknown spawn targets.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut marks = HashMap::new();
        let mut order = Vec::new();
        for node in self.graph.node_indices() {
            let mut stack = Vec::new();
            self.visit(node, &mut marks, &mut stack, &mut order)?;
        }
        Ok(())
    }

    /// Tasks spawned directly by `name`, in step order.
    pub fn spawns(&self, name: &str) -> Result<Vec<&str>, DomainError> {
        let idx = self.index(name)?;
        Ok(self
            .targets(idx)
            .into_iter()
            .map(|n| self.graph[n].as_str())
            .collect())
    }

    /// Tasks that spawn `name` directly, sorted by name.
    pub fn dependents(&self, name: &str) -> Result<Vec<&str>, DomainError> {
        let idx = self.index(name)?;
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn index(&self, name: &str) -> Result<NodeIndex, DomainError> {
        self.node_map
            .get(name)
            .copied()
            .ok_or_else(|| DomainError::TaskNotFound {
                name: name.into(),
                referenced_by: None,
            })
    }

    /// Outgoing targets ordered by the spawning step's index.
    fn targets(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges(node)
            .map(|e| (*e.weight(), e.target()))
            .collect();
        edges.sort_unstable_by_key(|(step, _)| *step);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    fn visit(
        &self,
        node: NodeIndex,
        marks: &mut HashMap<NodeIndex, Mark>,
        stack: &mut Vec<NodeIndex>,
        order: &mut Vec<String>,
    ) -> Result<(), DomainError> {
        match marks.get(&node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|n| self.graph[*n].clone()).collect();
                cycle.push(self.graph[node].clone());
                return Err(DomainError::CyclicTaskGraph { cycle });
            }
            None => {}
        }

        if let Some(target) = self.dangling.get(&node).and_then(|t| t.first()) {
            return Err(DomainError::TaskNotFound {
                name: target.clone(),
                referenced_by: Some(self.graph[node].clone()),
            });
        }

        marks.insert(node, Mark::Visiting);
        stack.push(node);
        for target in self.targets(node) {
            self.visit(target, marks, stack, order)?;
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        order.push(self.graph[node].clone());
        Ok(())
    }
}
