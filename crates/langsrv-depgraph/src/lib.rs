//! File-level dependency graph.
//!
//! Tracks, for every file, which other files it depends on (forward
//! edges) and which depend on it (reverse edges), kept consistent under
//! a single mutex so a reader never observes one direction updated
//! without the other.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Default)]
struct Inner {
    forward: HashMap<String, HashSet<String>>,
    reverse: HashMap<String, HashSet<String>>,
}

/// A process-wide (per scope) dependency graph over file URIs.
#[derive(Debug, Default)]
pub struct DepGraph {
    inner: Mutex<Inner>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `file`'s dependency set, updating the reverse index for
    /// both the deps that were added and the ones that were dropped.
    pub fn update(&self, file: &str, new_deps: HashSet<String>) {
        let mut inner = self.inner.lock();
        let old_deps = inner.forward.remove(file).unwrap_or_default();

        for removed in old_deps.difference(&new_deps) {
            remove_edge(&mut inner.reverse, removed, file);
        }
        for added in new_deps.difference(&old_deps) {
            inner.reverse.entry(added.clone()).or_default().insert(file.to_string());
        }

        if !new_deps.is_empty() {
            inner.forward.insert(file.to_string(), new_deps);
        }
    }

    /// Drops every edge touching `file`, in both directions.
    pub fn remove(&self, file: &str) {
        let mut inner = self.inner.lock();
        if let Some(deps) = inner.forward.remove(file) {
            for dep in &deps {
                remove_edge(&mut inner.reverse, dep, file);
            }
        }
        if let Some(dependents) = inner.reverse.remove(file) {
            for dependent in &dependents {
                remove_edge(&mut inner.forward, dependent, file);
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.forward.clear();
        inner.reverse.clear();
    }

    pub fn direct_dependencies(&self, file: &str) -> Vec<String> {
        let inner = self.inner.lock();
        sorted(inner.forward.get(file))
    }

    pub fn direct_dependents(&self, file: &str) -> Vec<String> {
        let inner = self.inner.lock();
        sorted(inner.reverse.get(file))
    }

    /// BFS over reverse edges from `seeds`, bounded by `max_depth` hops.
    /// Seeds themselves are never included in the result.
    pub fn transitive_dependents(&self, seeds: &HashSet<String>, max_depth: usize) -> HashSet<String> {
        let inner = self.inner.lock();
        bfs(&inner.reverse, seeds, max_depth)
    }

    /// BFS over forward edges from `seeds`, bounded by `max_depth` hops.
    pub fn transitive_dependencies(&self, seeds: &HashSet<String>, max_depth: usize) -> HashSet<String> {
        let inner = self.inner.lock();
        bfs(&inner.forward, seeds, max_depth)
    }
}

fn remove_edge(index: &mut HashMap<String, HashSet<String>>, key: &str, member: &str) {
    if let Some(set) = index.get_mut(key) {
        set.remove(member);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

fn sorted(set: Option<&HashSet<String>>) -> Vec<String> {
    let mut v: Vec<String> = set.map(|s| s.iter().cloned().collect()).unwrap_or_default();
    v.sort();
    v
}

fn bfs(edges: &HashMap<String, HashSet<String>>, seeds: &HashSet<String>, max_depth: usize) -> HashSet<String> {
    let mut visited: HashSet<String> = seeds.clone();
    let mut result = HashSet::new();
    let mut frontier: VecDeque<(String, usize)> = seeds.iter().map(|s| (s.clone(), 0)).collect();

    while let Some((node, depth)) = frontier.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(neighbors) = edges.get(&node) else { continue };
        for next in neighbors {
            if visited.insert(next.clone()) {
                result.insert(next.clone());
                frontier.push_back((next.clone(), depth + 1));
            }
        }
    }

    result
}
