//! Insertion-ordered relation tables.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

/// Path -> ordered set of paths (manifest children, child links).
#[derive(Debug, Default, Clone)]
pub struct PathSetMap {
    entries: IndexMap<String, IndexSet<String>>,
}

impl PathSetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `child` under `path`. Returns `false` if it was already there.
    pub fn insert(&mut self, path: &str, child: &str) -> bool {
        if let Some(children) = self.entries.get_mut(path) {
            return children.insert(child.to_string());
        }
        self.entries
            .insert(path.to_string(), IndexSet::from([child.to_string()]));
        true
    }

    pub fn get(&self, path: &str) -> Option<&IndexSet<String>> {
        self.entries.get(path)
    }

    /// Children of `path` in insertion order (empty if none).
    pub fn children<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.entries
            .get(path)
            .into_iter()
            .flat_map(|children| children.iter().map(String::as_str))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexSet<String>)> {
        self.entries.iter().map(|(path, children)| (path.as_str(), children))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Give every manifest the child links of everything it merges.
///
/// Nested manifests are flattened first, so links reach the top through
/// any depth. Cycles are cut at the first revisit. Running it twice adds
/// nothing.
pub fn propagate_child_links(dependencies: &PathSetMap, links: &mut PathSetMap) {
    let mut visited = FxHashSet::default();
    let manifests: Vec<String> = dependencies.keys().map(str::to_string).collect();
    for manifest in &manifests {
        propagate_into(manifest, dependencies, links, &mut visited);
    }
}

fn propagate_into(
    path: &str,
    dependencies: &PathSetMap,
    links: &mut PathSetMap,
    visited: &mut FxHashSet<String>,
) {
    if !visited.insert(path.to_string()) {
        return;
    }
    let children: Vec<String> = dependencies.children(path).map(str::to_string).collect();
    for child in &children {
        propagate_into(child, dependencies, links, visited);
        let inherited: Vec<String> = links.children(child).map(str::to_string).collect();
        for link in &inherited {
            links.insert(path, link);
        }
    }
}
