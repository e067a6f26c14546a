//! Entity instances: [`Resource`], [`Link`] and [`ActionInstance`].
//!
//! An [`Entity`] is the shared payload of resources and links. It carries
//! its own copy of its [`Kind`] and [`Mixin`]s so it can be built and rendered
//! without a [`Model`]; attaching a model with [`Entity::set_model`]
//! re-resolves those categories against the registry and enables validation
//! of inherited attribute declarations.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::collection::{Identified, IdentifiedSet};
use crate::error::{InvalidAttributeValueError, RenderError};
use crate::grammar;
use crate::headers::Headers;
use crate::model::identifiers::{
    ATTRIBUTE_SOURCE, ATTRIBUTE_SUMMARY, ATTRIBUTE_TARGET, ATTRIBUTE_TITLE,
};
use crate::model::{Action, Attribute, Kind, Mixin, Model};
use crate::serializer;

/// State common to resources and links.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    id: String,
    kind: Kind,
    mixins: IdentifiedSet<Mixin>,
    attributes: IndexMap<String, String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    model: Option<Arc<Model>>,
}

impl Entity {
    /// Creates an entity of `kind` with no mixins or attributes.
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        Self {
            id: id.into(),
            kind,
            mixins: IdentifiedSet::new(),
            attributes: IndexMap::new(),
            model: None,
        }
    }

    /// Value of `occi.core.id`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The entity's primary type.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The entity's primary type, for modification.
    pub fn kind_mut(&mut self) -> &mut Kind {
        &mut self.kind
    }

    /// Bound mixins in binding order.
    #[must_use]
    pub fn mixins(&self) -> &IdentifiedSet<Mixin> {
        &self.mixins
    }

    /// Binds a mixin. Returns `false` if it was already bound.
    pub fn add_mixin(&mut self, mixin: Mixin) -> bool {
        let mixin = self.resolve_mixin(mixin);
        self.mixins.add(mixin)
    }

    /// Binds every mixin of `mixins`.
    pub fn add_mixins(&mut self, mixins: impl IntoIterator<Item = Mixin>) {
        for mixin in mixins {
            self.add_mixin(mixin);
        }
    }

    /// Unbinds the mixin with `identifier`.
    pub fn remove_mixin(&mut self, identifier: &str) -> bool {
        self.mixins.remove_id(identifier).is_some()
    }

    /// Attribute values in assignment order. `occi.core.id` is not among them.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Value of the attribute `name`, if set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an attribute value, replacing an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeValueError::InvalidName`] if `name` is not a
    /// dotted lowercase attribute name, and
    /// [`InvalidAttributeValueError::RequiredValue`] if the attribute is
    /// declared required by the entity's categories and `value` is empty.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), InvalidAttributeValueError> {
        let name = name.into();
        let value = value.into();
        if !grammar::is_attribute_name(&name) {
            return Err(InvalidAttributeValueError::InvalidName(name));
        }
        if value.is_empty() && self.declared_attribute(&name).is_some_and(Attribute::is_required) {
            return Err(InvalidAttributeValueError::RequiredValue(name));
        }
        tracing::trace!(entity = %self.id, attribute = %name, "setting attribute");
        self.attributes.insert(name, value);
        Ok(())
    }

    /// Sets every `(name, value)` pair of `attributes`, stopping at the first invalid one.
    ///
    /// # Errors
    ///
    /// See [`Entity::add_attribute`].
    pub fn add_attributes<K, V>(
        &mut self,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), InvalidAttributeValueError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in attributes {
            self.add_attribute(name, value)?;
        }
        Ok(())
    }

    /// Removes the attribute `name`, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Value of `occi.core.title`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.attribute(ATTRIBUTE_TITLE)
    }

    /// Sets `occi.core.title`.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.attributes.insert(ATTRIBUTE_TITLE.to_owned(), title.into());
    }

    /// The model the entity is resolved against, if any.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_deref()
    }

    /// Attaches `model` and re-resolves the kind and mixins against it.
    ///
    /// Categories known to the model are replaced by the model's definition;
    /// a kind location set locally survives the replacement. Categories the
    /// model does not know keep their local definition.
    pub fn set_model(&mut self, model: Arc<Model>) {
        if let Some(kind) = model.kind(self.kind.identifier()) {
            let location = self.kind.location().map(str::to_owned);
            let mut kind = kind.clone();
            if location.is_some() {
                kind.set_location(location);
            }
            self.kind = kind;
        }
        let mixins = std::mem::take(&mut self.mixins);
        self.mixins = mixins
            .into_values()
            .map(|mixin| match model.mixin(mixin.identifier()) {
                Some(known) => known.clone(),
                None => mixin,
            })
            .collect();
        self.model = Some(model);
    }

    fn resolve_mixin(&self, mixin: Mixin) -> Mixin {
        self.model
            .as_deref()
            .and_then(|model| model.mixin(mixin.identifier()))
            .cloned()
            .unwrap_or(mixin)
    }

    fn declared_attribute(&self, name: &str) -> Option<&Attribute> {
        if let Some(attribute) = self.kind.attribute(name) {
            return Some(attribute);
        }
        if let Some(attribute) = self.mixins.iter().find_map(|mixin| mixin.attribute(name)) {
            return Some(attribute);
        }
        let model = self.model.as_deref()?;
        model
            .declared_attribute(self.kind.identifier(), name)
            .or_else(|| {
                self.kind
                    .parent()
                    .and_then(|parent| model.declared_attribute(parent, name))
            })
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind.identifier() == other.kind.identifier()
            && self.mixins.len() == other.mixins.len()
            && self.mixins.identifiers().all(|id| other.mixins.contains_id(id))
            && self.attributes == other.attributes
    }
}

impl Identified for Entity {
    fn identifier(&self) -> &str {
        &self.id
    }
}

/// A manageable object, such as a compute instance or a storage volume.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    entity: Entity,
    links: IdentifiedSet<Link>,
    actions: IdentifiedSet<Action>,
}

impl Resource {
    /// Creates a resource of `kind` identified by `id`.
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        Self {
            entity: Entity::new(id, kind),
            links: IdentifiedSet::new(),
            actions: IdentifiedSet::new(),
        }
    }

    /// The shared entity payload.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Value of `occi.core.summary`.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.entity.attribute(ATTRIBUTE_SUMMARY)
    }

    /// Sets `occi.core.summary`.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.entity
            .attributes
            .insert(ATTRIBUTE_SUMMARY.to_owned(), summary.into());
    }

    /// Links originating at this resource.
    #[must_use]
    pub fn links(&self) -> &IdentifiedSet<Link> {
        &self.links
    }

    /// Attaches a link. Returns `false` if a link with the same id is attached.
    pub fn add_link(&mut self, mut link: Link) -> bool {
        if self.links.contains(&link) {
            return false;
        }
        if let Some(model) = &self.entity.model {
            link.set_model(Arc::clone(model));
        }
        self.links.add(link)
    }

    /// Attaches every link of `links`.
    pub fn add_links(&mut self, links: impl IntoIterator<Item = Link>) {
        for link in links {
            self.add_link(link);
        }
    }

    /// Detaches the link with `id`.
    pub fn remove_link(&mut self, id: &str) -> Option<Link> {
        self.links.remove_id(id)
    }

    /// Actions invocable on this resource.
    #[must_use]
    pub fn actions(&self) -> &IdentifiedSet<Action> {
        &self.actions
    }

    /// Binds an invocable action. Returns `false` if it was already bound.
    pub fn add_action(&mut self, action: Action) -> bool {
        self.actions.add(action)
    }

    /// Binds every action of `actions`.
    pub fn add_actions(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            self.add_action(action);
        }
    }

    /// Attaches `model` to the resource and to its links.
    pub fn set_model(&mut self, model: Arc<Model>) {
        for link in self.links.iter_mut() {
            link.set_model(Arc::clone(&model));
        }
        self.entity.set_model(model);
    }

    /// Renders the resource as `text/plain` body lines.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingField`] if one of the resource's links
    /// lacks the target or relation needed for its inline form.
    pub fn to_text(&self) -> Result<String, RenderError> {
        serializer::text::resource_to_text(self)
    }

    /// Renders the resource as `text/occi` headers.
    ///
    /// # Errors
    ///
    /// Same as [`Resource::to_text`].
    pub fn to_headers(&self) -> Result<Headers, RenderError> {
        serializer::headers::resource_to_headers(self)
    }
}

impl Deref for Resource {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.entity
    }
}

impl DerefMut for Resource {
    fn deref_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.links == other.links && self.actions == other.actions
    }
}

impl Identified for Resource {
    fn identifier(&self) -> &str {
        &self.entity.id
    }
}

/// A directed, typed association between two resources.
///
/// Source and target are stored as the `occi.core.source` and
/// `occi.core.target` attributes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    entity: Entity,
    relation: Option<String>,
}

impl Link {
    /// Creates a link of `kind` identified by `id`, with no endpoints.
    pub fn new(id: impl Into<String>, kind: Kind) -> Self {
        Self {
            entity: Entity::new(id, kind),
            relation: None,
        }
    }

    /// The shared entity payload.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Kind identifier of the target's expected type.
    #[must_use]
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }

    /// Sets the relation.
    pub fn set_relation(&mut self, relation: impl Into<String>) {
        self.relation = Some(relation.into());
    }

    /// URI of the resource the link originates at.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.entity.attribute(ATTRIBUTE_SOURCE)
    }

    /// Sets `occi.core.source`.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.entity
            .attributes
            .insert(ATTRIBUTE_SOURCE.to_owned(), source.into());
    }

    /// URI of the resource the link points to.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.entity.attribute(ATTRIBUTE_TARGET)
    }

    /// Sets `occi.core.target`.
    pub fn set_target(&mut self, target: impl Into<String>) {
        self.entity
            .attributes
            .insert(ATTRIBUTE_TARGET.to_owned(), target.into());
    }

    /// Renders the link as `text/plain` body lines.
    #[must_use]
    pub fn to_text(&self) -> String {
        serializer::text::link_to_text(self)
    }

    /// Renders the link as `text/occi` headers.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        serializer::headers::link_to_headers(self)
    }

    /// Renders the single `Link:` body line used inside a resource.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingField`] if the target or relation is unset.
    pub fn to_inline_text(&self) -> Result<String, RenderError> {
        serializer::text::inline_link_to_text(self)
    }

    /// Renders the single `Link` header used inside a resource.
    ///
    /// # Errors
    ///
    /// Same as [`Link::to_inline_text`].
    pub fn to_inline_headers(&self) -> Result<Headers, RenderError> {
        serializer::headers::inline_link_to_headers(self)
    }
}

impl Deref for Link {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.entity
    }
}

impl DerefMut for Link {
    fn deref_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.relation == other.relation
    }
}

impl Identified for Link {
    fn identifier(&self) -> &str {
        &self.entity.id
    }
}

/// A request to invoke an [`Action`] with concrete argument values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionInstance {
    action: Action,
    attributes: IndexMap<String, String>,
}

impl ActionInstance {
    /// Creates an invocation of `action` without arguments.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            attributes: IndexMap::new(),
        }
    }

    /// The invoked action.
    #[must_use]
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Argument values in assignment order.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Value of the argument `name`, if set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets an argument value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAttributeValueError::InvalidName`] for a malformed
    /// name and [`InvalidAttributeValueError::RequiredValue`] for an empty
    /// value of an argument the action declares required.
    pub fn add_attribute(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), InvalidAttributeValueError> {
        let name = name.into();
        let value = value.into();
        if !grammar::is_attribute_name(&name) {
            return Err(InvalidAttributeValueError::InvalidName(name));
        }
        if value.is_empty() && self.action.attribute(&name).is_some_and(Attribute::is_required) {
            return Err(InvalidAttributeValueError::RequiredValue(name));
        }
        self.attributes.insert(name, value);
        Ok(())
    }

    /// Sets every `(name, value)` pair of `attributes`.
    ///
    /// # Errors
    ///
    /// See [`ActionInstance::add_attribute`].
    pub fn add_attributes<K, V>(
        &mut self,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), InvalidAttributeValueError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in attributes {
            self.add_attribute(name, value)?;
        }
        Ok(())
    }

    /// Renders the invocation as `text/plain` body lines.
    #[must_use]
    pub fn to_text(&self) -> String {
        serializer::text::action_instance_to_text(self)
    }

    /// Renders the invocation as `text/occi` headers.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        serializer::headers::action_instance_to_headers(self)
    }
}

impl Identified for ActionInstance {
    fn identifier(&self) -> &str {
        self.action.identifier()
    }
}
