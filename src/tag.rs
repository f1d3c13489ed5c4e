//! Defines the [`TagIndex`], the set of distinct tags across the site.

use std::collections::BTreeSet;

/// The distinct tags of every published page. Populated while content is
/// parsed and read once traversal has finished. Iteration is lexicographic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagIndex(BTreeSet<String>);

impl TagIndex {
    pub fn new() -> TagIndex {
        TagIndex::default()
    }

    /// Adds `tag`. Returns `false` if it was already present.
    pub fn register(&mut self, tag: &str) -> bool {
        if self.0.contains(tag) {
            return false;
        }
        self.0.insert(tag.to_owned())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tags in lexicographic order.
    pub fn sorted(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

/// Reports whether `tag` can name a file in the tags directory.
pub fn is_valid(tag: &str) -> bool {
    !tag.is_empty() && tag != "." && tag != ".." && !tag.contains(|c| c == '/' || c == '\\')
}
