//! Whitelists of what a search request may reference.
//!
//! Each resource declares the filters, scopes and sorts it exposes. A descriptor
//! carries the external name clients use and the internal name the query builder
//! compiles against; the two differ when a field is aliased with `mapped_to`.

mod filter;
pub mod rules;
mod scope;
mod sort;

use std::collections::HashMap;

pub use filter::AllowedFilter;
pub use rules::ValueRule;
pub use scope::AllowedScope;
pub use sort::AllowedSort;

use crate::errors::SearchError;

/// Which whitelist a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Filter,
    Scope,
    Sort,
}

impl DescriptorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Scope => "scope",
            Self::Sort => "sort",
        }
    }
}

/// A descriptor with an external name and the internal name it resolves to.
pub trait Aliasable {
    const KIND: DescriptorKind;

    /// Name exposed to clients.
    fn name(&self) -> &str;

    /// Name the query builder works with.
    fn internal_name(&self) -> &str;
}

/// Immutable lookup of descriptors by external name, in declaration order.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Aliasable> Registry<T> {
    /// Build a registry. When two descriptors share a name the first one wins;
    /// [`check`](Self::check) reports the collision.
    #[must_use]
    pub fn new(entries: Vec<T>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            index.entry(entry.name().to_string()).or_insert(position);
        }
        Self { entries, index }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Aliasable::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject registries that declare the same external name twice.
    pub fn check(&self) -> Result<(), SearchError> {
        if self.index.len() == self.entries.len() {
            return Ok(());
        }
        let duplicate = self
            .entries
            .iter()
            .enumerate()
            .find(|(position, entry)| self.index.get(entry.name()) != Some(position))
            .map_or("", |(_, entry)| entry.name());
        Err(SearchError::misconfigured(
            T::KIND,
            duplicate,
            format!("{} '{duplicate}' is declared more than once", T::KIND.as_str()),
        ))
    }
}

impl<T: Aliasable> From<Vec<T>> for Registry<T> {
    fn from(entries: Vec<T>) -> Self {
        Self::new(entries)
    }
}
