use serde_json::Value;

use super::{Aliasable, DescriptorKind};

/// A named query transformation a resource exposes.
///
/// Arguments given here are passed first; parameters supplied by the request are
/// appended after them.
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedScope {
    name: String,
    internal_name: String,
    args: Vec<Value>,
}

impl AllowedScope {
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "allowed scope name must not be empty");
        Self {
            internal_name: name.clone(),
            name,
            args: Vec::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if `internal` is empty.
    #[must_use]
    pub fn mapped_to(mut self, internal: impl Into<String>) -> Self {
        let internal = internal.into();
        assert!(!internal.is_empty(), "allowed scope internal name must not be empty");
        self.internal_name = internal;
        self
    }

    /// Append positional arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(args);
        self
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl Aliasable for AllowedScope {
    const KIND: DescriptorKind = DescriptorKind::Scope;

    fn name(&self) -> &str {
        &self.name
    }

    fn internal_name(&self) -> &str {
        &self.internal_name
    }
}
