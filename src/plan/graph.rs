use indexmap::IndexMap;

use crate::error::{JenkinsBtError, Result};

/// One alias in the dependency graph.
#[derive(Debug, Clone)]
pub(super) struct Node {
    pub(super) name: String,
    /// Number of incoming dependency edges (prerequisites)
    pub(super) prerequisites: usize,
    /// Indices of the nodes unblocked once this one has been scheduled
    pub(super) successors: Vec<usize>,
}

/// Immutable dependency graph over job aliases.
///
/// The graph only stores the in-degree of each node; scheduling works on a
/// copy of those counts, so the same graph can be scheduled from any number
/// of start points.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub(super) nodes: Vec<Node>,
    pub(super) index: IndexMap<String, usize>,
}

impl DependencyGraph {
    /// Builds the graph from declared aliases and `(dependent, prerequisite)` edges.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsBtError::UnknownAlias`] if an edge references an
    /// alias that is not declared.
    pub fn build<'a, A, E>(aliases: A, dependencies: E) -> Result<Self>
    where
        A: IntoIterator<Item = &'a str>,
        E: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut nodes = Vec::new();
        let mut index = IndexMap::new();

        for alias in aliases {
            index.entry(alias.to_string()).or_insert_with(|| {
                nodes.push(Node {
                    name: alias.to_string(),
                    prerequisites: 0,
                    successors: Vec::new(),
                });
                nodes.len() - 1
            });
        }

        let mut graph = Self { nodes, index };

        for (dependent, prerequisite) in dependencies {
            let edge = format!("dependency '{dependent}: {prerequisite}'");
            let dependent_idx = graph.require(dependent, &edge)?;
            let prerequisite_idx = graph.require(prerequisite, &edge)?;

            graph.nodes[prerequisite_idx].successors.push(dependent_idx);
            graph.nodes[dependent_idx].prerequisites += 1;
        }

        Ok(graph)
    }

    pub(super) fn require(&self, alias: &str, context: &str) -> Result<usize> {
        self.index
            .get(alias)
            .copied()
            .ok_or_else(|| JenkinsBtError::UnknownAlias {
                alias: alias.to_string(),
                context: context.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.index.contains_key(alias)
    }

    /// Aliases in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Aliases that become eligible once `alias` has been scheduled, in edge order.
    pub fn successors_of(&self, alias: &str) -> Vec<&str> {
        self.index
            .get(alias)
            .map(|&idx| {
                self.nodes[idx]
                    .successors
                    .iter()
                    .map(|&s| self.nodes[s].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn prerequisite_count(&self, alias: &str) -> Option<usize> {
        self.index.get(alias).map(|&idx| self.nodes[idx].prerequisites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_successors_and_counts() {
        let graph =
            DependencyGraph::build(["A", "B", "C"], [("B", "A"), ("C", "A"), ("C", "B")]).unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.successors_of("A"), vec!["B", "C"]);
        assert_eq!(graph.successors_of("B"), vec!["C"]);
        assert!(graph.successors_of("C").is_empty());
        assert_eq!(graph.prerequisite_count("A"), Some(0));
        assert_eq!(graph.prerequisite_count("B"), Some(1));
        assert_eq!(graph.prerequisite_count("C"), Some(2));
    }

    #[test]
    fn keeps_declaration_order_and_ignores_duplicate_aliases() {
        let graph = DependencyGraph::build(["B", "A", "B"], Vec::<(&str, &str)>::new()).unwrap();

        assert_eq!(graph.aliases().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(graph.contains("A"));
        assert!(!graph.contains("C"));
    }

    #[test]
    fn rejects_undeclared_dependent() {
        let err = DependencyGraph::build(["A"], [("X", "A")]).unwrap_err();

        assert!(matches!(err, JenkinsBtError::UnknownAlias { ref alias, .. } if alias == "X"));
    }

    #[test]
    fn rejects_undeclared_prerequisite() {
        let err = DependencyGraph::build(["A"], [("A", "Y")]).unwrap_err();

        assert!(matches!(err, JenkinsBtError::UnknownAlias { ref alias, .. } if alias == "Y"));
        assert!(err.to_string().contains("dependency 'A: Y'"));
    }

    #[test]
    fn duplicate_edges_are_counted_twice() {
        let graph = DependencyGraph::build(["A", "B"], [("B", "A"), ("B", "A")]).unwrap();

        assert_eq!(graph.prerequisite_count("B"), Some(2));
        assert_eq!(graph.successors_of("A"), vec!["B", "B"]);
    }

    #[test]
    fn unknown_alias_has_no_successors() {
        let graph = DependencyGraph::build(["A"], Vec::<(&str, &str)>::new()).unwrap();

        assert!(graph.successors_of("nope").is_empty());
        assert_eq!(graph.prerequisite_count("nope"), None);
    }
}
