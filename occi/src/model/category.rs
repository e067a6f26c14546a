//! Category declarations: [`Kind`], [`Mixin`] and [`Action`].
//!
//! The three classes share a [`Category`] payload (scheme, term, title,
//! attribute definitions) and add their own class-specific data. Relations
//! between categories are stored as identifiers and resolved through the
//! owning [`Model`](crate::Model), so the category graph never holds
//! references into itself.

use std::ops::{Deref, DerefMut};

use indexmap::IndexSet;

use crate::collection::{Identified, IdentifiedSet};
use crate::headers::Headers;
use crate::model::Attribute;
use crate::serializer;

/// The `class` of a category line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CategoryClass {
    /// Primary type of an entity.
    Kind,
    /// Optional capability attachable to an entity.
    Mixin,
    /// Invocable operation.
    Action,
}

impl CategoryClass {
    /// Returns the value used in the `class="..."` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryClass::Kind => "kind",
            CategoryClass::Mixin => "mixin",
            CategoryClass::Action => "action",
        }
    }

    /// Parses a `class` field value. Matching is case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "kind" => Some(CategoryClass::Kind),
            "mixin" => Some(CategoryClass::Mixin),
            "action" => Some(CategoryClass::Action),
            _ => None,
        }
    }
}

/// Payload shared by every category class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category {
    scheme: String,
    term: String,
    identifier: String,
    title: Option<String>,
    attributes: IdentifiedSet<Attribute>,
}

impl Category {
    /// Creates a category identified by `scheme` + `term`.
    ///
    /// The scheme is expected to end in `#`.
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        let scheme = scheme.into();
        let term = term.into();
        let identifier = format!("{scheme}{term}");
        Self {
            scheme,
            term,
            identifier,
            title: None,
            attributes: IdentifiedSet::new(),
        }
    }

    /// Namespace URI, ending in `#`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Short type name.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Globally unique `scheme#term` key.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Human-readable title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Sets or clears the title. An empty title clears it.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title.filter(|t| !t.is_empty());
    }

    /// Declared attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &IdentifiedSet<Attribute> {
        &self.attributes
    }

    /// Looks up a declared attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Declares an attribute, replacing an earlier declaration of the same name.
    ///
    /// Returns `true` if the name was not declared before.
    pub fn add_attribute(&mut self, attribute: Attribute) -> bool {
        self.attributes.replace(attribute).is_none()
    }

    /// Declares every attribute of `attributes`.
    pub fn add_attributes(&mut self, attributes: impl IntoIterator<Item = Attribute>) {
        for attribute in attributes {
            self.add_attribute(attribute);
        }
    }
}

/// A category describing an entity's primary type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kind {
    category: Category,
    location: Option<String>,
    parent: Option<String>,
    relations: IndexSet<String>,
    actions: IndexSet<String>,
}

impl Kind {
    /// Class of every kind.
    pub const CLASS: CategoryClass = CategoryClass::Kind;

    /// Creates a bare kind with no location, parent or attributes.
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            category: Category::new(scheme, term),
            location: None,
            parent: None,
            relations: IndexSet::new(),
            actions: IndexSet::new(),
        }
    }

    /// Creates a kind with title, location and attribute definitions.
    pub fn with_details(
        scheme: impl Into<String>,
        term: impl Into<String>,
        title: Option<String>,
        location: Option<String>,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        let mut kind = Self::new(scheme, term);
        kind.category.set_title(title);
        kind.category.add_attributes(attributes);
        kind.location = location;
        kind
    }

    /// The shared category payload.
    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Path under which instances of this kind live, e.g. `/compute/`.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Sets or clears the location.
    pub fn set_location(&mut self, location: Option<String>) {
        self.location = location;
    }

    /// Identifier of the parent kind, once resolved.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Identifiers of related kinds, parent first.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(String::as_str)
    }

    /// Records `identifier` as a relation. The first relation linked becomes the parent.
    pub fn link_parent(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if self.parent.is_none() {
            self.parent = Some(identifier.clone());
        }
        self.relations.insert(identifier);
    }

    /// Records `identifier` as a relation in declaration order without resolving it.
    pub(crate) fn declare_relation(&mut self, identifier: impl Into<String>) {
        self.relations.insert(identifier.into());
    }

    /// Marks the declared relation `identifier` as resolved.
    ///
    /// Only the first declared relation can become the parent.
    pub(crate) fn resolve_relation(&mut self, identifier: &str) {
        if self.parent.is_none() && self.relations.first().is_some_and(|first| first == identifier) {
            self.parent = Some(identifier.to_owned());
        }
    }

    /// Identifiers of the actions bound to this kind.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    /// Binds an action by identifier. Returns `false` if it was already bound.
    pub fn add_action(&mut self, identifier: impl Into<String>) -> bool {
        self.actions.insert(identifier.into())
    }

    /// Renders the declaration as a `Category:` body line.
    #[must_use]
    pub fn to_text(&self) -> String {
        serializer::text::kind_to_text(self)
    }

    /// Renders the declaration as a `Category` header.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        serializer::headers::kind_to_headers(self)
    }
}

impl Deref for Kind {
    type Target = Category;

    fn deref(&self) -> &Category {
        &self.category
    }
}

impl DerefMut for Kind {
    fn deref_mut(&mut self) -> &mut Category {
        &mut self.category
    }
}

impl Identified for Kind {
    fn identifier(&self) -> &str {
        self.category.identifier()
    }
}

/// A category describing an optional capability of an entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mixin {
    category: Category,
    location: String,
    relations: IndexSet<String>,
    actions: IndexSet<String>,
}

impl Mixin {
    /// Class of every mixin.
    pub const CLASS: CategoryClass = CategoryClass::Mixin;

    /// Creates a bare mixin located at `/mixin/{term}`.
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        let category = Category::new(scheme, term);
        let location = default_mixin_location(category.term());
        Self {
            category,
            location,
            relations: IndexSet::new(),
            actions: IndexSet::new(),
        }
    }

    /// Creates a mixin with title, location and attribute definitions.
    ///
    /// A missing location defaults to `/mixin/{term}`.
    pub fn with_details(
        scheme: impl Into<String>,
        term: impl Into<String>,
        title: Option<String>,
        location: Option<String>,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        let mut mixin = Self::new(scheme, term);
        mixin.category.set_title(title);
        mixin.category.add_attributes(attributes);
        if let Some(location) = location {
            mixin.location = location;
        }
        mixin
    }

    /// The shared category payload.
    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Path of the mixin's collection.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Replaces the location.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Identifiers of related mixins.
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(String::as_str)
    }

    /// Records a related mixin. Returns `false` if it was already related.
    pub fn add_relation(&mut self, identifier: impl Into<String>) -> bool {
        self.relations.insert(identifier.into())
    }

    /// Identifiers of the actions bound to this mixin.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }

    /// Binds an action by identifier. Returns `false` if it was already bound.
    pub fn add_action(&mut self, identifier: impl Into<String>) -> bool {
        self.actions.insert(identifier.into())
    }

    /// Renders the declaration as a `Category:` body line.
    #[must_use]
    pub fn to_text(&self) -> String {
        serializer::text::mixin_to_text(self)
    }

    /// Renders the declaration as a `Category` header.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        serializer::headers::mixin_to_headers(self)
    }
}

fn default_mixin_location(term: &str) -> String {
    format!("/mixin/{term}")
}

impl Deref for Mixin {
    type Target = Category;

    fn deref(&self) -> &Category {
        &self.category
    }
}

impl DerefMut for Mixin {
    fn deref_mut(&mut self) -> &mut Category {
        &mut self.category
    }
}

impl Identified for Mixin {
    fn identifier(&self) -> &str {
        self.category.identifier()
    }
}

/// A category describing an invocable operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    category: Category,
}

impl Action {
    /// Class of every action.
    pub const CLASS: CategoryClass = CategoryClass::Action;

    /// Creates an action with neither title nor attributes.
    pub fn new(scheme: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            category: Category::new(scheme, term),
        }
    }

    /// Creates an action with a title and attribute definitions.
    pub fn with_details(
        scheme: impl Into<String>,
        term: impl Into<String>,
        title: Option<String>,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        let mut action = Self::new(scheme, term);
        action.category.set_title(title);
        action.category.add_attributes(attributes);
        action
    }

    /// The shared category payload.
    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Folds a later declaration of the same action into this one.
    ///
    /// A title in `other` replaces the current one, its attributes are added
    /// or replace declarations of the same name. Nothing is ever removed.
    pub fn merge(&mut self, other: Action) {
        let Action { category } = other;
        if category.title.is_some() {
            self.category.title = category.title;
        }
        self.category.add_attributes(category.attributes.into_values());
    }

    /// Renders the declaration as a `Category:` body line.
    #[must_use]
    pub fn to_text(&self) -> String {
        serializer::text::action_to_text(self)
    }

    /// Renders the declaration as a `Category` header.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        serializer::headers::action_to_headers(self)
    }
}

impl Deref for Action {
    type Target = Category;

    fn deref(&self) -> &Category {
        &self.category
    }
}

impl DerefMut for Action {
    fn deref_mut(&mut self) -> &mut Category {
        &mut self.category
    }
}

impl Identified for Action {
    fn identifier(&self) -> &str {
        self.category.identifier()
    }
}
