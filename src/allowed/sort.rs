use super::{Aliasable, DescriptorKind};

/// A field a resource may be sorted by. Dotted internal names (`user.name`) sort
/// through a relation; `pivot.column` sorts by a pivot table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSort {
    name: String,
    internal_name: String,
}

impl AllowedSort {
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "allowed sort name must not be empty");
        Self {
            internal_name: name.clone(),
            name,
        }
    }

    /// # Panics
    ///
    /// Panics if `internal` is empty.
    #[must_use]
    pub fn mapped_to(mut self, internal: impl Into<String>) -> Self {
        let internal = internal.into();
        assert!(!internal.is_empty(), "allowed sort internal name must not be empty");
        self.internal_name = internal;
        self
    }
}

impl Aliasable for AllowedSort {
    const KIND: DescriptorKind = DescriptorKind::Sort;

    fn name(&self) -> &str {
        &self.name
    }

    fn internal_name(&self) -> &str {
        &self.internal_name
    }
}
