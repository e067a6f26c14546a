//! Renderers for the OCCI text representations.
//!
//! Two target forms are produced from the same header values:
//! - **`text/plain`** ([`text`]): one `Name: value` line per value,
//! - **`text/occi`** ([`headers`]): one header per name, values joined by `,`.
//!
//! The value renderers in this module emit fields in the order and quoting
//! the parser's grammar expects, so rendered output parses back to an equal
//! model.

pub mod headers;
pub mod text;

use crate::entity::{Entity, Link, Resource};
use crate::error::RenderError;
use crate::grammar::{encode_segment, quote};
use crate::model::identifiers::{ATTRIBUTE_ID, ATTRIBUTE_SOURCE, ATTRIBUTE_TARGET};
use crate::model::{Action, Category, CategoryClass, Kind, Mixin, Model};

/// Header carrying category declarations and entity types.
pub const CATEGORY: &str = "Category";
/// Header carrying inline links and action links.
pub const LINK: &str = "Link";
/// Header carrying attribute values.
pub const ATTRIBUTE: &str = "X-OCCI-Attribute";
/// Header carrying locations in `text/occi`.
pub const LOCATION: &str = "Location";
/// Body label carrying locations in `text/plain`.
pub const LOCATION_LABEL: &str = "X-OCCI-Location";

struct CategoryFields<'a> {
    rel: Vec<&'a str>,
    location: Option<&'a str>,
    actions: Vec<&'a str>,
}

fn category_value(category: &Category, class: CategoryClass, fields: CategoryFields<'_>) -> String {
    let mut out = format!(
        "{};scheme=\"{}\";class=\"{}\"",
        category.term(),
        category.scheme(),
        class.as_str()
    );
    if let Some(title) = category.title() {
        out.push_str(&format!(";title={}", quote(title)));
    }
    if !fields.rel.is_empty() {
        out.push_str(&format!(";rel=\"{}\"", fields.rel.join(" ")));
    }
    if let Some(location) = fields.location {
        out.push_str(&format!(";location=\"{location}\""));
    }
    if !category.attributes().is_empty() {
        let definitions: Vec<String> = category
            .attributes()
            .iter()
            .map(|attribute| attribute.to_definition())
            .collect();
        out.push_str(&format!(";attributes=\"{}\"", definitions.join(" ")));
    }
    if !fields.actions.is_empty() {
        out.push_str(&format!(";actions=\"{}\"", fields.actions.join(" ")));
    }
    out
}

/// Renders a kind declaration value.
#[must_use]
pub fn kind_value(kind: &Kind) -> String {
    category_value(
        kind.category(),
        Kind::CLASS,
        CategoryFields {
            rel: kind.relations().collect(),
            location: kind.location(),
            actions: kind.actions().collect(),
        },
    )
}

/// Renders a mixin declaration value.
#[must_use]
pub fn mixin_value(mixin: &Mixin) -> String {
    category_value(
        mixin.category(),
        Mixin::CLASS,
        CategoryFields {
            rel: mixin.relations().collect(),
            location: Some(mixin.location()),
            actions: mixin.actions().collect(),
        },
    )
}

/// Renders an action declaration value.
#[must_use]
pub fn action_value(action: &Action) -> String {
    category_value(
        action.category(),
        Action::CLASS,
        CategoryFields {
            rel: Vec::new(),
            location: None,
            actions: Vec::new(),
        },
    )
}

/// Every category of `model`: kinds, then mixins, then actions.
#[must_use]
pub fn model_values(model: &Model) -> Vec<String> {
    model
        .kinds()
        .iter()
        .map(kind_value)
        .chain(model.mixins().iter().map(mixin_value))
        .chain(model.actions().iter().map(action_value))
        .collect()
}

/// Renders `name="value"` with the value quoted and escaped.
#[must_use]
pub fn attribute_value(name: &str, value: &str) -> String {
    format!("{name}={}", quote(value))
}

/// The kind value followed by one value per mixin.
#[must_use]
pub fn entity_category_values(entity: &Entity) -> Vec<String> {
    std::iter::once(kind_value(entity.kind()))
        .chain(entity.mixins().iter().map(mixin_value))
        .collect()
}

/// `occi.core.id` first, then every other attribute in assignment order.
#[must_use]
pub fn entity_attribute_values(entity: &Entity) -> Vec<String> {
    std::iter::once(attribute_value(ATTRIBUTE_ID, entity.id()))
        .chain(
            entity
                .attributes()
                .iter()
                .filter(|(name, _)| name.as_str() != ATTRIBUTE_ID)
                .map(|(name, value)| attribute_value(name, value)),
        )
        .collect()
}

/// The path under which the entity lives: its kind location followed by its encoded id.
fn self_reference(entity: &Entity) -> String {
    format!(
        "{}{}",
        entity.kind().location().unwrap_or_default(),
        encode_segment(entity.id())
    )
}

/// Renders the compact form of a link used inside a resource.
///
/// # Errors
///
/// Returns [`RenderError::MissingField`] if the target or relation is unset.
pub fn inline_link_value(link: &Link) -> Result<String, RenderError> {
    let target = link.target().ok_or_else(|| RenderError::MissingField {
        entity: link.id().to_owned(),
        field: "target",
    })?;
    let relation = link.relation().ok_or_else(|| RenderError::MissingField {
        entity: link.id().to_owned(),
        field: "relation",
    })?;

    let categories: Vec<&str> = std::iter::once(link.kind().identifier())
        .chain(link.mixins().identifiers())
        .collect();
    let mut out = format!(
        "<{target}>;rel=\"{relation}\";self=\"{}\";category=\"{}\"",
        self_reference(link),
        categories.join(" ")
    );
    for (name, value) in link.attributes() {
        if name == ATTRIBUTE_SOURCE || name == ATTRIBUTE_TARGET {
            continue;
        }
        out.push(';');
        out.push_str(&attribute_value(name, value));
    }
    Ok(out)
}

/// Renders the link advertising `action` on `resource`.
#[must_use]
pub fn action_link_value(resource: &Resource, action: &Action) -> String {
    format!(
        "<{}?action={}>;rel=\"{}\"",
        self_reference(resource),
        action.term(),
        action.identifier()
    )
}

/// Inline links of `resource` followed by its action links.
///
/// # Errors
///
/// Returns the first [`RenderError`] raised by an inline link.
pub fn resource_link_values(resource: &Resource) -> Result<Vec<String>, RenderError> {
    let mut values = resource
        .links()
        .iter()
        .map(inline_link_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.extend(
        resource
            .actions()
            .iter()
            .map(|action| action_link_value(resource, action)),
    );
    Ok(values)
}
