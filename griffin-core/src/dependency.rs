//! Dependency graph analysis for the container.
//!
//! The graph keeps services in registration order so that every traversal,
//! and therefore the construction order, is deterministic across runs.

use std::collections::{BTreeSet, HashMap};

use crate::error::{ContainerError, ContainerResult};

/// An indexed view over registered services and their declared dependencies.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    names: Vec<&'a str>,
    /// `edges[i]` holds the indices of the services `i` depends on.
    edges: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    /// Builds the graph, failing on the first dependency that was never registered.
    ///
    /// Nodes are visited in the given order, so the reported missing
    /// dependency is the first one in registration order.
    pub fn new<I>(nodes: I) -> ContainerResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let nodes: Vec<(&'a str, &'a [String])> = nodes.into_iter().collect();
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (*name, i))
            .collect();

        let mut edges = Vec::with_capacity(nodes.len());
        for (name, deps) in &nodes {
            let mut resolved = Vec::with_capacity(deps.len());
            for dep in deps.iter() {
                let idx = index.get(dep.as_str()).copied().ok_or_else(|| {
                    ContainerError::UnresolvedDependency {
                        service: name.to_string(),
                        missing: dep.clone(),
                    }
                })?;
                resolved.push(idx);
            }
            edges.push(resolved);
        }

        Ok(Self {
            names: nodes.iter().map(|(name, _)| *name).collect(),
            edges,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// DFS-based cycle detection.
    ///
    /// Returns the cycle as a name path whose first and last entries are equal,
    /// e.g. `[a, b, c, a]`.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = vec![false; self.len()];
        let mut stack = Vec::new();

        for node in 0..self.len() {
            if !visited[node] {
                if let Some(cycle) = self.detect_cycle_dfs(node, &mut visited, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn detect_cycle_dfs(
        &self,
        node: usize,
        visited: &mut [bool],
        stack: &mut Vec<usize>,
    ) -> Option<Vec<String>> {
        visited[node] = true;
        stack.push(node);

        for &dep in &self.edges[node] {
            if let Some(start) = stack.iter().position(|&n| n == dep) {
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|&n| self.names[n].to_string()).collect();
                cycle.push(self.names[dep].to_string());
                return Some(cycle);
            }
            if !visited[dep] {
                if let Some(cycle) = self.detect_cycle_dfs(dep, visited, stack) {
                    return Some(cycle);
                }
            }
        }

        stack.pop();
        None
    }

    /// Kahn's algorithm with registration order as tie-break.
    ///
    /// Returns node indices with every dependency placed before its dependents.
    pub fn topological_order(&self) -> ContainerResult<Vec<usize>> {
        let mut in_degree: Vec<usize> = self.edges.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for (node, deps) in self.edges.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree == 0)
            .map(|(node, _)| node)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(node) = ready.pop_first() {
            order.push(node);
            for &dependent in &dependents[node] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != self.len() {
            let cycle = self.find_cycle().unwrap_or_else(|| {
                self.names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !order.contains(i))
                    .map(|(_, name)| name.to_string())
                    .collect()
            });
            return Err(ContainerError::CyclicDependency { cycle });
        }

        Ok(order)
    }

    pub fn name(&self, index: usize) -> &'a str {
        self.names[index]
    }
}
