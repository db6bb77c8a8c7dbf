//! Projects, project entries, and the project reference graph.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use crate::domain::{ConsumerScope, DomainError};

/// Identity of a project within the solution (its name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A file known to the host's project model, together with its owning project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectEntry {
    pub path: PathBuf,
    pub project: ProjectId,
}

impl ProjectEntry {
    pub fn new(path: impl Into<PathBuf>, project: ProjectId) -> Self {
        Self {
            path: path.into(),
            project,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A consumer file produced by dependency resolution.
pub type FileRef = ProjectEntry;

/// Directed graph of project references.
///
/// An edge `a -> b` means project `a` references project `b`. The graph is a
/// snapshot: build it from the project model, resolve, and drop it.
#[derive(Debug, Default)]
pub struct ProjectGraph {
    graph: DiGraph<ProjectId, ()>,
    nodes: HashMap<ProjectId, NodeIndex>,
}

impl ProjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project node. Adding the same project twice is a no-op.
    pub fn add_project(&mut self, id: ProjectId) -> NodeIndex {
        if let Some(&index) = self.nodes.get(&id) {
            return index;
        }
        let index = self.graph.add_node(id.clone());
        self.nodes.insert(id, index);
        index
    }

    /// Record that `from` references `to`.
    ///
    /// Both projects must already be present.
    pub fn add_reference(&mut self, from: &ProjectId, to: &ProjectId) -> Result<(), DomainError> {
        let from_idx = *self
            .nodes
            .get(from)
            .ok_or_else(|| DomainError::UnknownProject(from.to_string()))?;
        let to_idx = *self
            .nodes
            .get(to)
            .ok_or_else(|| DomainError::UnknownReference {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
        Ok(())
    }

    pub fn contains(&self, id: &ProjectId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn project_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Projects directly referenced by `id`.
    pub fn references(&self, id: &ProjectId) -> Vec<ProjectId> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Projects that directly reference `id`.
    pub fn dependents(&self, id: &ProjectId) -> Vec<ProjectId> {
        self.neighbours(id, Direction::Incoming)
    }

    /// The owning project followed by its direct neighbours in `scope`.
    ///
    /// Returns an empty list when `id` is not in the graph. Self-references
    /// are not repeated.
    pub fn consumer_projects(&self, id: &ProjectId, scope: ConsumerScope) -> Vec<ProjectId> {
        if !self.contains(id) {
            return Vec::new();
        }

        let neighbours = match scope {
            ConsumerScope::Dependents => self.dependents(id),
            ConsumerScope::References => self.references(id),
        };

        let mut projects = vec![id.clone()];
        projects.extend(neighbours.into_iter().filter(|p| p != id));
        projects
    }

    fn neighbours(&self, id: &ProjectId, direction: Direction) -> Vec<ProjectId> {
        let Some(&index) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut out: Vec<ProjectId> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)], nodes: &[&str]) -> ProjectGraph {
        let mut g = ProjectGraph::new();
        for n in nodes {
            g.add_project(ProjectId::from(*n));
        }
        for (from, to) in edges {
            g.add_reference(&ProjectId::from(*from), &ProjectId::from(*to))
                .unwrap();
        }
        g
    }

    #[test]
    fn add_project_is_idempotent() {
        let mut g = ProjectGraph::new();
        let a = g.add_project("A".into());
        let b = g.add_project("A".into());
        assert_eq!(a, b);
        assert_eq!(g.project_count(), 1);
    }

    #[test]
    fn references_and_dependents_are_inverse() {
        let g = graph(&[("App", "Core"), ("Tests", "Core")], &["App", "Core", "Tests"]);

        assert_eq!(g.references(&"App".into()), vec![ProjectId::from("Core")]);
        assert_eq!(
            g.dependents(&"Core".into()),
            vec![ProjectId::from("App"), ProjectId::from("Tests")]
        );
        assert!(g.dependents(&"App".into()).is_empty());
    }

    #[test]
    fn consumer_projects_are_one_level_deep() {
        // Top -> Mid -> Base: Top is two hops from Base and must not appear.
        let g = graph(&[("Top", "Mid"), ("Mid", "Base")], &["Top", "Mid", "Base"]);

        let consumers = g.consumer_projects(&"Base".into(), ConsumerScope::Dependents);
        assert_eq!(consumers, vec![ProjectId::from("Base"), ProjectId::from("Mid")]);

        let referenced = g.consumer_projects(&"Top".into(), ConsumerScope::References);
        assert_eq!(referenced, vec![ProjectId::from("Top"), ProjectId::from("Mid")]);
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let mut g = graph(&[], &["A"]);
        let err = g.add_reference(&"A".into(), &"Ghost".into()).unwrap_err();
        assert!(matches!(err, DomainError::UnknownReference { .. }));
    }

    #[test]
    fn self_reference_is_not_duplicated() {
        let g = graph(&[("A", "A")], &["A"]);
        assert_eq!(
            g.consumer_projects(&"A".into(), ConsumerScope::Dependents),
            vec![ProjectId::from("A")]
        );
    }

    #[test]
    fn missing_project_has_no_consumers() {
        let g = graph(&[], &["A"]);
        assert!(
            g.consumer_projects(&"B".into(), ConsumerScope::Dependents)
                .is_empty()
        );
    }
}
