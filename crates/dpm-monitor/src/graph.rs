use std::collections::{BTreeMap, BTreeSet, VecDeque};

use dpm_core::errors::{DpmError, ErrorInfo};
use dpm_core::SubsystemId;
use serde::{Deserialize, Serialize};

/// Directed edge `from -> to`: `to` consumes the effective guarantee of `from`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Upstream subsystem.
    pub from: SubsystemId,
    /// Downstream subsystem.
    pub to: SubsystemId,
}

/// Serialized form of a [`SubsystemGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GraphSpec {
    /// Nodes in declaration order.
    pub nodes: Vec<SubsystemId>,
    /// Dependency edges.
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// Validated dependency DAG among subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemGraph {
    nodes: Vec<SubsystemId>,
    edges: Vec<EdgeSpec>,
    predecessors: BTreeMap<SubsystemId, Vec<SubsystemId>>,
    successors: BTreeMap<SubsystemId, Vec<SubsystemId>>,
    levels: Vec<Vec<SubsystemId>>,
}

impl SubsystemGraph {
    /// Builds and validates a graph from nodes and `(from, to)` edges.
    pub fn new<N, E, S>(nodes: N, edges: E) -> Result<Self, DpmError>
    where
        N: IntoIterator<Item = S>,
        E: IntoIterator<Item = (S, S)>,
        S: Into<SubsystemId>,
    {
        let nodes: Vec<SubsystemId> = nodes.into_iter().map(Into::into).collect();
        let edges: Vec<(SubsystemId, SubsystemId)> = edges
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .collect();
        Self::validate(nodes, edges)
    }

    /// Starts an incremental builder.
    pub fn builder() -> SubsystemGraphBuilder {
        SubsystemGraphBuilder::default()
    }

    /// Builds a graph from its serialized form.
    pub fn from_spec(spec: GraphSpec) -> Result<Self, DpmError> {
        let edges = spec.edges.into_iter().map(|edge| (edge.from, edge.to)).collect();
        Self::validate(spec.nodes, edges)
    }

    /// Serialized form of the graph.
    pub fn to_spec(&self) -> GraphSpec {
        GraphSpec {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    fn validate(
        nodes: Vec<SubsystemId>,
        edges: Vec<(SubsystemId, SubsystemId)>,
    ) -> Result<Self, DpmError> {
        let mut predecessors: BTreeMap<SubsystemId, Vec<SubsystemId>> = BTreeMap::new();
        let mut successors: BTreeMap<SubsystemId, Vec<SubsystemId>> = BTreeMap::new();
        for node in &nodes {
            if node.as_str().trim().is_empty() {
                return Err(DpmError::graph(
                    "empty-node",
                    "subsystem identifier must not be empty",
                ));
            }
            if predecessors.insert(node.clone(), Vec::new()).is_some() {
                return Err(DpmError::Graph(
                    ErrorInfo::new("duplicate-node", "subsystem declared twice")
                        .with_context("node", node.as_str()),
                ));
            }
            successors.insert(node.clone(), Vec::new());
        }

        let mut seen = BTreeSet::new();
        let mut kept = Vec::new();
        for (from, to) in edges {
            for endpoint in [&from, &to] {
                if !predecessors.contains_key(endpoint) {
                    return Err(DpmError::Graph(
                        ErrorInfo::new("unknown-node", "edge endpoint is not a declared subsystem")
                            .with_context("from", from.as_str())
                            .with_context("to", to.as_str())
                            .with_context("node", endpoint.as_str()),
                    ));
                }
            }
            if from == to {
                return Err(DpmError::Graph(
                    ErrorInfo::new("self-loop", "subsystem cannot depend on itself")
                        .with_context("node", from.as_str()),
                ));
            }
            if !seen.insert((from.clone(), to.clone())) {
                continue;
            }
            if let Some(preds) = predecessors.get_mut(&to) {
                preds.push(from.clone());
            }
            if let Some(succs) = successors.get_mut(&from) {
                succs.push(to.clone());
            }
            kept.push(EdgeSpec { from, to });
        }

        let levels = layer(&nodes, &predecessors, &successors)?;
        Ok(Self {
            nodes,
            edges: kept,
            predecessors,
            successors,
            levels,
        })
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[SubsystemId] {
        &self.nodes
    }

    /// Distinct edges in declaration order.
    pub fn edges(&self) -> &[EdgeSpec] {
        &self.edges
    }

    /// Returns true when `id` is a node of the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.predecessors.contains_key(id)
    }

    /// Direct upstream subsystems of `id`, in edge declaration order.
    pub fn predecessors(&self, id: &str) -> &[SubsystemId] {
        self.predecessors.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Direct downstream subsystems of `id`.
    pub fn successors(&self, id: &str) -> &[SubsystemId] {
        self.successors.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Nodes grouped by topological depth.
    ///
    /// Every node sits one level after the deepest of its predecessors, so the
    /// nodes of one level share no edge and may be evaluated concurrently.
    pub fn topological_levels(&self) -> &[Vec<SubsystemId>] {
        &self.levels
    }

    /// Nodes in a topological order (levels flattened).
    pub fn topological_order(&self) -> impl Iterator<Item = &SubsystemId> {
        self.levels.iter().flatten()
    }

    /// Returns true when a directed path leads from `from` to `to`.
    ///
    /// A node reaches itself.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        if from == to {
            return true;
        }
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if next.as_str() == to {
                    return true;
                }
                if visited.insert(next.as_str()) {
                    queue.push_back(next.as_str());
                }
            }
        }
        false
    }

    /// Every node other than `root` with a path to `root`, in topological order.
    pub fn contributors(&self, root: &str) -> Vec<SubsystemId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let mut ancestors: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for prev in self.predecessors(current) {
                if ancestors.insert(prev.as_str()) {
                    queue.push_back(prev.as_str());
                }
            }
        }
        self.topological_order()
            .filter(|node| ancestors.contains(node.as_str()))
            .cloned()
            .collect()
    }
}

fn layer(
    nodes: &[SubsystemId],
    predecessors: &BTreeMap<SubsystemId, Vec<SubsystemId>>,
    successors: &BTreeMap<SubsystemId, Vec<SubsystemId>>,
) -> Result<Vec<Vec<SubsystemId>>, DpmError> {
    let mut remaining: BTreeMap<&SubsystemId, usize> = predecessors
        .iter()
        .map(|(node, preds)| (node, preds.len()))
        .collect();
    let mut levels = Vec::new();
    let mut frontier: Vec<SubsystemId> = nodes
        .iter()
        .filter(|node| remaining.get(node) == Some(&0))
        .cloned()
        .collect();
    let mut placed = 0usize;
    while !frontier.is_empty() {
        placed += frontier.len();
        let mut next = BTreeSet::new();
        for node in &frontier {
            for succ in successors.get(node).map_or(&[][..], Vec::as_slice) {
                if let Some(count) = remaining.get_mut(succ) {
                    *count -= 1;
                    if *count == 0 {
                        next.insert(succ.clone());
                    }
                }
            }
        }
        levels.push(frontier);
        frontier = nodes.iter().filter(|node| next.contains(*node)).cloned().collect();
    }
    if placed < nodes.len() {
        let cyclic: Vec<&str> = remaining
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(node, _)| node.as_str())
            .collect();
        return Err(DpmError::Graph(
            ErrorInfo::new("cycle", "subsystem graph contains a cycle")
                .with_context("nodes", cyclic.join(","))
                .with_hint("composite evaluation needs an acyclic dependency graph"),
        ));
    }
    Ok(levels)
}

/// Incremental construction of a [`SubsystemGraph`].
#[derive(Debug, Clone, Default)]
pub struct SubsystemGraphBuilder {
    nodes: Vec<SubsystemId>,
    edges: Vec<(SubsystemId, SubsystemId)>,
}

impl SubsystemGraphBuilder {
    /// Declares a node.
    pub fn node(mut self, id: impl Into<SubsystemId>) -> Self {
        self.nodes.push(id.into());
        self
    }

    /// Declares an edge; both endpoints must be declared nodes.
    pub fn edge(mut self, from: impl Into<SubsystemId>, to: impl Into<SubsystemId>) -> Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Validates the declared nodes and edges.
    pub fn build(self) -> Result<SubsystemGraph, DpmError> {
        SubsystemGraph::validate(self.nodes, self.edges)
    }
}
