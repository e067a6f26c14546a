//! Category model types and the [`Model`] registry.
//!
//! A [`Model`] owns three registries keyed by `scheme#term`: kinds, mixins
//! and actions. Kinds and mixins refer to each other and to actions by
//! identifier only; [`Model::ancestors`] and [`Model::declared_attribute`]
//! resolve those references through the registry.

mod attribute;
mod category;

pub use attribute::Attribute;
pub use category::{Action, Category, CategoryClass, Kind, Mixin};

use indexmap::IndexSet;

use crate::collection::IdentifiedSet;
use crate::headers::Headers;

/// Well-known identifiers of the OCCI core vocabulary.
pub mod identifiers {
    /// Scheme of the three builtin kinds.
    pub const SCHEME_CORE: &str = "http://schemas.ogf.org/occi/core#";
    /// Term of the root kind.
    pub const TERM_ENTITY: &str = "entity";
    /// Term of the resource kind.
    pub const TERM_RESOURCE: &str = "resource";
    /// Term of the link kind.
    pub const TERM_LINK: &str = "link";
    /// Identifier of the root kind.
    pub const ENTITY: &str = "http://schemas.ogf.org/occi/core#entity";
    /// Identifier of the resource kind.
    pub const RESOURCE: &str = "http://schemas.ogf.org/occi/core#resource";
    /// Identifier of the link kind.
    pub const LINK: &str = "http://schemas.ogf.org/occi/core#link";

    /// Entity identifier attribute.
    pub const ATTRIBUTE_ID: &str = "occi.core.id";
    /// Entity title attribute.
    pub const ATTRIBUTE_TITLE: &str = "occi.core.title";
    /// Resource summary attribute.
    pub const ATTRIBUTE_SUMMARY: &str = "occi.core.summary";
    /// Link source attribute.
    pub const ATTRIBUTE_SOURCE: &str = "occi.core.source";
    /// Link target attribute.
    pub const ATTRIBUTE_TARGET: &str = "occi.core.target";
}

/// The builtin `entity`, `resource` and `link` kinds, root first.
///
/// `resource` and `link` both have `entity` as their parent.
#[must_use]
pub fn core_kinds() -> [Kind; 3] {
    use identifiers::{
        ATTRIBUTE_ID, ATTRIBUTE_SOURCE, ATTRIBUTE_SUMMARY, ATTRIBUTE_TARGET, ATTRIBUTE_TITLE,
        ENTITY, SCHEME_CORE, TERM_ENTITY, TERM_LINK, TERM_RESOURCE,
    };

    let entity = Kind::with_details(
        SCHEME_CORE,
        TERM_ENTITY,
        Some("Entity".to_owned()),
        Some("/entity/".to_owned()),
        [
            Attribute::with_flags(ATTRIBUTE_ID, true, true),
            Attribute::new(ATTRIBUTE_TITLE),
        ],
    );

    let mut resource = Kind::with_details(
        SCHEME_CORE,
        TERM_RESOURCE,
        Some("Resource".to_owned()),
        Some("/resource/".to_owned()),
        [Attribute::new(ATTRIBUTE_SUMMARY)],
    );
    resource.link_parent(ENTITY);

    let mut link = Kind::with_details(
        SCHEME_CORE,
        TERM_LINK,
        Some("Link".to_owned()),
        Some("/link/".to_owned()),
        [
            Attribute::with_flags(ATTRIBUTE_SOURCE, true, false),
            Attribute::with_flags(ATTRIBUTE_TARGET, true, false),
        ],
    );
    link.link_parent(ENTITY);

    [entity, resource, link]
}

/// Registry of the kinds, mixins and actions known to one session.
///
/// Identifiers are unique within each registry. A model is populated once
/// (usually by [`TextParser::parse_model`](crate::TextParser::parse_model))
/// and then shared read-only, typically behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Model {
    kinds: IdentifiedSet<Kind>,
    mixins: IdentifiedSet<Mixin>,
    actions: IdentifiedSet<Action>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model holding only the builtin core kinds.
    #[must_use]
    pub fn core() -> Self {
        let mut model = Self::new();
        for kind in core_kinds() {
            model.add_kind(kind);
        }
        model
    }

    /// Registers a kind. Returns `false` if the identifier is already taken.
    pub fn add_kind(&mut self, kind: Kind) -> bool {
        self.kinds.add(kind)
    }

    /// Registers a mixin. Returns `false` if the identifier is already taken.
    pub fn add_mixin(&mut self, mixin: Mixin) -> bool {
        self.mixins.add(mixin)
    }

    /// Registers an action. Returns `false` if the identifier is already taken.
    pub fn add_action(&mut self, action: Action) -> bool {
        self.actions.add(action)
    }

    /// Looks up a kind by identifier.
    #[must_use]
    pub fn kind(&self, identifier: &str) -> Option<&Kind> {
        self.kinds.get(identifier)
    }

    /// Looks up a mixin by identifier.
    #[must_use]
    pub fn mixin(&self, identifier: &str) -> Option<&Mixin> {
        self.mixins.get(identifier)
    }

    /// Looks up an action by identifier.
    #[must_use]
    pub fn action(&self, identifier: &str) -> Option<&Action> {
        self.actions.get(identifier)
    }

    pub(crate) fn kind_mut(&mut self, identifier: &str) -> Option<&mut Kind> {
        self.kinds.get_mut(identifier)
    }

    pub(crate) fn action_mut(&mut self, identifier: &str) -> Option<&mut Action> {
        self.actions.get_mut(identifier)
    }

    /// Returns `true` if a kind with `identifier` is registered.
    #[must_use]
    pub fn contains_kind(&self, identifier: &str) -> bool {
        self.kinds.contains_id(identifier)
    }

    /// Returns `true` if a mixin with `identifier` is registered.
    #[must_use]
    pub fn contains_mixin(&self, identifier: &str) -> bool {
        self.mixins.contains_id(identifier)
    }

    /// Returns `true` if an action with `identifier` is registered.
    #[must_use]
    pub fn contains_action(&self, identifier: &str) -> bool {
        self.actions.contains_id(identifier)
    }

    /// Registered kinds in registration order.
    #[must_use]
    pub fn kinds(&self) -> &IdentifiedSet<Kind> {
        &self.kinds
    }

    /// Registered mixins in registration order.
    #[must_use]
    pub fn mixins(&self) -> &IdentifiedSet<Mixin> {
        &self.mixins
    }

    /// Registered actions in registration order.
    #[must_use]
    pub fn actions(&self) -> &IdentifiedSet<Action> {
        &self.actions
    }

    /// Walks the parent chain of the kind `identifier`, nearest ancestor first.
    ///
    /// The kind itself is not included. The walk stops at the first parent
    /// unknown to the model, and never visits a kind twice.
    #[must_use]
    pub fn ancestors(&self, identifier: &str) -> Vec<&Kind> {
        let mut seen = IndexSet::new();
        seen.insert(identifier);
        let mut chain = Vec::new();
        let mut current = self.kind(identifier).and_then(Kind::parent);
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                break;
            }
            let Some(parent) = self.kind(parent_id) else {
                break;
            };
            chain.push(parent);
            current = parent.parent();
        }
        chain
    }

    /// Finds the declaration of attribute `name` on the kind `identifier` or any of its ancestors.
    #[must_use]
    pub fn declared_attribute(&self, identifier: &str, name: &str) -> Option<&Attribute> {
        self.kind(identifier)
            .into_iter()
            .chain(self.ancestors(identifier))
            .find_map(|kind| kind.attribute(name))
    }

    /// Total number of registered categories.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.kinds.len() + self.mixins.len() + self.actions.len()
    }

    /// Renders every category as `Category:` body lines, kinds first.
    #[must_use]
    pub fn to_text(&self) -> String {
        crate::serializer::text::model_to_text(self)
    }

    /// Renders every category into a single `Category` header value.
    #[must_use]
    pub fn to_headers(&self) -> Headers {
        crate::serializer::headers::model_to_headers(self)
    }
}
