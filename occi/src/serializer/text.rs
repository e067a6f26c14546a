//! `text/plain` renderer: every header value becomes a `Name: value` body line.

use crate::entity::{ActionInstance, Link, Resource};
use crate::error::RenderError;
use crate::model::{Action, Kind, Mixin, Model};
use crate::serializer::{
    action_value, attribute_value, entity_attribute_values, entity_category_values,
    inline_link_value, kind_value, mixin_value, model_values, resource_link_values, ATTRIBUTE,
    CATEGORY, LINK,
};

fn push_lines(out: &mut String, label: &str, values: &[String]) {
    for value in values {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(label);
        out.push_str(": ");
        out.push_str(value);
    }
}

/// Renders one `Category:` line for a kind.
#[must_use]
pub fn kind_to_text(kind: &Kind) -> String {
    format!("{CATEGORY}: {}", kind_value(kind))
}

/// Renders one `Category:` line for a mixin.
#[must_use]
pub fn mixin_to_text(mixin: &Mixin) -> String {
    format!("{CATEGORY}: {}", mixin_value(mixin))
}

/// Renders one `Category:` line for an action.
#[must_use]
pub fn action_to_text(action: &Action) -> String {
    format!("{CATEGORY}: {}", action_value(action))
}

/// Renders every category of `model`, one `Category:` line each.
#[must_use]
pub fn model_to_text(model: &Model) -> String {
    let mut out = String::new();
    push_lines(&mut out, CATEGORY, &model_values(model));
    out
}

/// Renders a resource: categories, attributes, then inline and action links.
///
/// # Errors
///
/// Returns [`RenderError::MissingField`] for a link that cannot be inlined.
pub fn resource_to_text(resource: &Resource) -> Result<String, RenderError> {
    let links = resource_link_values(resource)?;
    let mut out = String::new();
    push_lines(&mut out, CATEGORY, &entity_category_values(resource));
    push_lines(&mut out, ATTRIBUTE, &entity_attribute_values(resource));
    push_lines(&mut out, LINK, &links);
    Ok(out)
}

/// Renders a link: categories, then attributes.
#[must_use]
pub fn link_to_text(link: &Link) -> String {
    let mut out = String::new();
    push_lines(&mut out, CATEGORY, &entity_category_values(link));
    push_lines(&mut out, ATTRIBUTE, &entity_attribute_values(link));
    out
}

/// Renders the `Link:` line of a link inside a resource.
///
/// # Errors
///
/// Returns [`RenderError::MissingField`] if the target or relation is unset.
pub fn inline_link_to_text(link: &Link) -> Result<String, RenderError> {
    Ok(format!("{LINK}: {}", inline_link_value(link)?))
}

/// Renders an action invocation: the action category, then its arguments.
#[must_use]
pub fn action_instance_to_text(instance: &ActionInstance) -> String {
    let attributes: Vec<String> = instance
        .attributes()
        .iter()
        .map(|(name, value)| attribute_value(name, value))
        .collect();
    let mut out = String::new();
    push_lines(&mut out, CATEGORY, &[action_value(instance.action())]);
    push_lines(&mut out, ATTRIBUTE, &attributes);
    out
}
