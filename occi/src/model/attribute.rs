//! Attribute declarations carried by categories.

use std::hash::{Hash, Hasher};

use crate::collection::Identified;

/// A named scalar slot declared by a category.
///
/// Identity is the dotted `name`; two attributes with the same name are equal
/// regardless of their flags.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    name: String,
    required: bool,
    immutable: bool,
}

impl Attribute {
    /// Creates an optional, mutable attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_flags(name, false, false)
    }

    /// Creates an attribute with explicit `required` / `immutable` flags.
    pub fn with_flags(name: impl Into<String>, required: bool, immutable: bool) -> Self {
        Self {
            name: name.into(),
            required,
            immutable,
        }
    }

    /// Dotted attribute name, e.g. `occi.core.id`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a value must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the value may not change once set.
    #[must_use]
    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub(crate) fn set_immutable(&mut self, immutable: bool) {
        self.immutable = immutable;
    }

    /// Renders the definition as it appears in a category's `attributes` list.
    #[must_use]
    pub fn to_definition(&self) -> String {
        match (self.required, self.immutable) {
            (true, true) => format!("{}{{required immutable}}", self.name),
            (true, false) => format!("{}{{required}}", self.name),
            (false, true) => format!("{}{{immutable}}", self.name),
            (false, false) => self.name.clone(),
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Attribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Identified for Attribute {
    fn identifier(&self) -> &str {
        &self.name
    }
}
