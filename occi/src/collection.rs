//! Identifier-keyed containers and the parsed [`Collection`].
//!
//! [`IdentifiedSet`] is the ordered-unique container used for category
//! registries, entity mixins, resource links and collections: iteration
//! follows insertion order, equality does not.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::entity::{ActionInstance, Link, Resource};
use crate::model::Model;

/// A value with a stable string identity.
pub trait Identified {
    /// The key under which the value is stored.
    fn identifier(&self) -> &str;
}

/// Insertion-ordered set of values keyed by their identifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IdentifiedSet<T> {
    items: IndexMap<String, T>,
}

impl<T> IdentifiedSet<T> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }

    /// Returns `true` if a value with `identifier` is present.
    #[must_use]
    pub fn contains_id(&self, identifier: &str) -> bool {
        self.items.contains_key(identifier)
    }

    /// Looks up a value by identifier.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&T> {
        self.items.get(identifier)
    }

    /// Looks up a value by identifier for modification.
    pub fn get_mut(&mut self, identifier: &str) -> Option<&mut T> {
        self.items.get_mut(identifier)
    }

    /// Removes the value with `identifier`, keeping the order of the rest.
    pub fn remove_id(&mut self, identifier: &str) -> Option<T> {
        self.items.shift_remove(identifier)
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the set holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    /// Mutable values in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    /// Identifiers in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Consumes the set, yielding its values in insertion order.
    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.items.into_values()
    }
}

impl<T: Identified> IdentifiedSet<T> {
    /// Returns `true` if a value with the same identifier as `value` is present.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.contains_id(value.identifier())
    }

    /// Adds `value` unless its identifier is already taken.
    ///
    /// Returns `false` and leaves the set untouched on a duplicate.
    pub fn add(&mut self, value: T) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.items.insert(value.identifier().to_owned(), value);
        true
    }

    /// Inserts `value`, replacing a stored value with the same identifier in place.
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.items.insert(value.identifier().to_owned(), value)
    }

    /// Removes the value with the same identifier as `value`.
    pub fn remove(&mut self, value: &T) -> bool {
        self.remove_id(value.identifier()).is_some()
    }
}

impl<T: Clone> IdentifiedSet<T> {
    /// Returns a defensive copy of the values in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }
}

impl<T> Default for IdentifiedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identified> FromIterator<T> for IdentifiedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<T: Identified> Extend<T> for IdentifiedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a IdentifiedSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}

/// The resources, links and action invocations decoded from one body or header set.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    resources: IdentifiedSet<Resource>,
    links: IdentifiedSet<Link>,
    actions: IdentifiedSet<ActionInstance>,
    #[cfg_attr(feature = "serde", serde(skip))]
    model: Option<Arc<Model>>,
}

impl Collection {
    /// Creates an empty collection without a model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a resource with the same id is present.
    #[must_use]
    pub fn contains_resource(&self, resource: &Resource) -> bool {
        self.resources.contains(resource)
    }

    /// Returns `true` if a resource with `id` is present.
    #[must_use]
    pub fn contains_resource_id(&self, id: &str) -> bool {
        self.resources.contains_id(id)
    }

    /// Adds a resource, rejecting a duplicate id.
    ///
    /// When the collection has a model the resource is attached to it.
    pub fn add_resource(&mut self, mut resource: Resource) -> bool {
        if self.resources.contains(&resource) {
            return false;
        }
        if let Some(model) = &self.model {
            resource.set_model(Arc::clone(model));
        }
        self.resources.add(resource)
    }

    /// Looks up a resource by id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Removes the resource with the same id as `resource`.
    pub fn remove_resource(&mut self, resource: &Resource) -> bool {
        self.resources.remove(resource)
    }

    /// Removes every resource.
    pub fn clear_resources(&mut self) {
        self.resources.clear();
    }

    /// Resources in insertion order.
    #[must_use]
    pub fn resources(&self) -> &IdentifiedSet<Resource> {
        &self.resources
    }

    /// Returns `true` if a link with the same id is present.
    #[must_use]
    pub fn contains_link(&self, link: &Link) -> bool {
        self.links.contains(link)
    }

    /// Returns `true` if a link with `id` is present.
    #[must_use]
    pub fn contains_link_id(&self, id: &str) -> bool {
        self.links.contains_id(id)
    }

    /// Adds a link, rejecting a duplicate id.
    ///
    /// When the collection has a model the link is attached to it.
    pub fn add_link(&mut self, mut link: Link) -> bool {
        if self.links.contains(&link) {
            return false;
        }
        if let Some(model) = &self.model {
            link.set_model(Arc::clone(model));
        }
        self.links.add(link)
    }

    /// Looks up a link by id.
    #[must_use]
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    /// Removes the link with the same id as `link`.
    pub fn remove_link(&mut self, link: &Link) -> bool {
        self.links.remove(link)
    }

    /// Removes every link.
    pub fn clear_links(&mut self) {
        self.links.clear();
    }

    /// Links in insertion order.
    #[must_use]
    pub fn links(&self) -> &IdentifiedSet<Link> {
        &self.links
    }

    /// Adds an action invocation, rejecting a second one for the same action.
    pub fn add_action(&mut self, action: ActionInstance) -> bool {
        self.actions.add(action)
    }

    /// Looks up an action invocation by action identifier.
    #[must_use]
    pub fn action(&self, identifier: &str) -> Option<&ActionInstance> {
        self.actions.get(identifier)
    }

    /// Removes every action invocation.
    pub fn clear_actions(&mut self) {
        self.actions.clear();
    }

    /// Action invocations in insertion order.
    #[must_use]
    pub fn actions(&self) -> &IdentifiedSet<ActionInstance> {
        &self.actions
    }

    /// The model the members are resolved against, if any.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_deref()
    }

    /// Attaches `model` to the collection and to every resource and link in it.
    pub fn set_model(&mut self, model: Arc<Model>) {
        for link in self.links.iter_mut() {
            link.set_model(Arc::clone(&model));
        }
        for resource in self.resources.iter_mut() {
            resource.set_model(Arc::clone(&model));
        }
        self.model = Some(model);
    }

    /// Returns `true` if the collection holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.links.is_empty() && self.actions.is_empty()
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.resources == other.resources
            && self.links == other.links
            && self.actions == other.actions
    }
}
