//! Builders turning matched category lines into [`Kind`], [`Mixin`] and [`Action`].

use regex::Captures;

use crate::error::ParseError;
use crate::grammar::{
    self, ATTRIBUTE_DEFINITION, GROUP_ACTIONS, GROUP_ATTRIBUTES, GROUP_CLASS, GROUP_LOCATION,
    GROUP_REL, GROUP_SCHEME, GROUP_TERM, GROUP_TITLE,
};
use crate::model::{Action, Attribute, CategoryClass, Kind, Mixin};

fn group<'h>(caps: &Captures<'h>, name: &str) -> Option<&'h str> {
    caps.name(name).map(|m| m.as_str()).filter(|s| !s.is_empty())
}

/// The `class` of a matched category line.
pub(super) fn class_of(caps: &Captures<'_>, line: &str) -> Result<CategoryClass, ParseError> {
    group(caps, GROUP_CLASS)
        .and_then(CategoryClass::from_name)
        .ok_or_else(|| ParseError::InvalidLine(line.to_owned()))
}

/// `scheme + term` of a matched category line.
pub(super) fn identifier_of(caps: &Captures<'_>) -> String {
    format!(
        "{}{}",
        group(caps, GROUP_SCHEME).unwrap_or_default(),
        group(caps, GROUP_TERM).unwrap_or_default()
    )
}

/// Whitespace separated identifiers of the `rel` group.
pub(super) fn relations_of<'h>(caps: &Captures<'h>) -> impl Iterator<Item = &'h str> {
    group(caps, GROUP_REL).into_iter().flat_map(str::split_whitespace)
}

/// Whitespace separated identifiers of the `actions` group.
pub(super) fn actions_of<'h>(caps: &Captures<'h>) -> impl Iterator<Item = &'h str> {
    group(caps, GROUP_ACTIONS)
        .into_iter()
        .flat_map(str::split_whitespace)
}

/// Location of a matched line reduced to its path component.
pub(super) fn location_of(caps: &Captures<'_>) -> Option<String> {
    group(caps, GROUP_LOCATION).map(grammar::path_of)
}

fn title_of(caps: &Captures<'_>) -> Option<String> {
    group(caps, GROUP_TITLE).map(grammar::unescape)
}

/// Tokenises an `attributes="..."` list into definitions.
pub(super) fn attribute_definitions(list: Option<&str>) -> Vec<Attribute> {
    let Some(list) = list else {
        return Vec::new();
    };
    ATTRIBUTE_DEFINITION
        .captures_iter(list)
        .filter_map(|definition| {
            let name = definition.name("name")?.as_str();
            let properties = definition.name("properties").map_or("", |m| m.as_str());
            tracing::trace!(attribute = name, properties, "attribute definition");
            let mut attribute = Attribute::new(name);
            attribute.set_required(properties.contains("required"));
            attribute.set_immutable(properties.contains("immutable"));
            Some(attribute)
        })
        .collect()
}

/// Builds a kind from a matched line. Relations and actions are left to the caller.
pub(super) fn kind_from(caps: &Captures<'_>) -> Kind {
    Kind::with_details(
        group(caps, GROUP_SCHEME).unwrap_or_default(),
        group(caps, GROUP_TERM).unwrap_or_default(),
        title_of(caps),
        location_of(caps),
        attribute_definitions(group(caps, GROUP_ATTRIBUTES)),
    )
}

/// Builds a mixin from a matched line. Relations and actions are left to the caller.
pub(super) fn mixin_from(caps: &Captures<'_>) -> Mixin {
    Mixin::with_details(
        group(caps, GROUP_SCHEME).unwrap_or_default(),
        group(caps, GROUP_TERM).unwrap_or_default(),
        title_of(caps),
        location_of(caps),
        attribute_definitions(group(caps, GROUP_ATTRIBUTES)),
    )
}

/// Builds an action from a matched line.
pub(super) fn action_from(caps: &Captures<'_>) -> Action {
    Action::with_details(
        group(caps, GROUP_SCHEME).unwrap_or_default(),
        group(caps, GROUP_TERM).unwrap_or_default(),
        title_of(caps),
        attribute_definitions(group(caps, GROUP_ATTRIBUTES)),
    )
}

fn split(identifier: &str) -> Result<(String, String), ParseError> {
    grammar::split_identifier(identifier)
        .ok_or_else(|| ParseError::InvalidIdentifier(identifier.to_owned()))
}

/// A bare kind named by a `scheme#term` identifier.
pub(super) fn kind_named(identifier: &str) -> Result<Kind, ParseError> {
    let (scheme, term) = split(identifier)?;
    Ok(Kind::new(scheme, term))
}

/// A bare mixin named by a `scheme#term` identifier.
pub(super) fn mixin_named(identifier: &str) -> Result<Mixin, ParseError> {
    let (scheme, term) = split(identifier)?;
    Ok(Mixin::new(scheme, term))
}

/// A bare action named by a `scheme#term` identifier.
pub(super) fn action_named(identifier: &str) -> Result<Action, ParseError> {
    let (scheme, term) = split(identifier)?;
    Ok(Action::new(scheme, term))
}
