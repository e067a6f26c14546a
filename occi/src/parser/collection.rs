//! Decoding of a single resource, link or action invocation.
//!
//! The first line names the type (a kind, or an action in action mode); every
//! following line must classify as a mixin, an attribute or, for resources, an
//! inline link. Anything else aborts the parse.

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Captures;

use super::category;
use super::CollectionType;
use crate::collection::Collection;
use crate::entity::{ActionInstance, Link, Resource};
use crate::error::ParseError;
use crate::grammar::{
    self, ATTRIBUTE_PAIR, ATTRIBUTE_REPR, CATEGORY_LINE, GROUP_ATTRIBUTES, GROUP_CATEGORY,
    GROUP_CLASS, GROUP_REL, GROUP_SELF, GROUP_URI, LINK_LINE,
};
use crate::model::identifiers::{ATTRIBUTE_ID, SCHEME_CORE, TERM_LINK};
use crate::model::{Action, CategoryClass, Kind, Mixin, Model};

/// Marker of an action-invocation link target.
const ACTION_QUERY: &str = "?action=";

/// Parses instance lines into a collection, all-or-nothing.
pub(super) fn parse(
    lines: &[String],
    collection_type: CollectionType,
    model: Option<&Arc<Model>>,
) -> Result<Collection, ParseError> {
    let mut collection = Collection::new();
    if let Some(model) = model {
        collection.set_model(Arc::clone(model));
    }

    match collection_type {
        CollectionType::Resource => {
            collection.add_resource(parse_resource(lines, model)?);
        }
        CollectionType::Link => {
            collection.add_link(parse_link(lines, model)?);
        }
        CollectionType::Action => {
            collection.add_action(parse_action(lines)?);
        }
    }
    Ok(collection)
}

#[derive(Default)]
struct Body {
    mixins: Vec<Mixin>,
    attributes: Vec<String>,
    links: Vec<Link>,
    actions: Vec<Action>,
}

fn split_first(lines: &[String]) -> (&str, &[String]) {
    match lines.split_first() {
        Some((first, rest)) => (first.as_str(), rest),
        None => ("", lines),
    }
}

fn parse_resource(lines: &[String], model: Option<&Arc<Model>>) -> Result<Resource, ParseError> {
    let (first, rest) = split_first(lines);
    let kind = kind_line(first)?;
    let body = classify(rest, CollectionType::Resource, model)?;
    let mut attributes = attribute_map(&body.attributes)?;
    let id = take_id(&mut attributes, "resource")?;

    let mut resource = Resource::new(id, kind);
    if let Some(model) = model {
        resource.set_model(Arc::clone(model));
    }
    resource.add_mixins(body.mixins);
    resource.add_links(body.links);
    resource.add_actions(body.actions);
    resource.add_attributes(attributes)?;
    Ok(resource)
}

fn parse_link(lines: &[String], model: Option<&Arc<Model>>) -> Result<Link, ParseError> {
    let (first, rest) = split_first(lines);
    let kind = kind_line(first)?;
    let body = classify(rest, CollectionType::Link, model)?;
    let mut attributes = attribute_map(&body.attributes)?;
    let id = take_id(&mut attributes, "link")?;

    let mut link = Link::new(id, kind);
    if let Some(model) = model {
        link.set_model(Arc::clone(model));
    }
    link.add_mixins(body.mixins);
    link.add_attributes(attributes)?;
    Ok(link)
}

fn parse_action(lines: &[String]) -> Result<ActionInstance, ParseError> {
    let (first, rest) = split_first(lines);
    tracing::debug!(line = first, "matching line against action pattern");
    let caps = CATEGORY_LINE
        .captures(first)
        .ok_or_else(|| ParseError::MissingAction(first.to_owned()))?;
    if category::class_of(&caps, first)? != CategoryClass::Action {
        return Err(ParseError::MissingAction(first.to_owned()));
    }

    let body = classify(rest, CollectionType::Action, None)?;
    let mut instance = ActionInstance::new(category::action_from(&caps));
    instance.add_attributes(attribute_map(&body.attributes)?)?;
    Ok(instance)
}

/// Builds the entity kind from the first line. Relations stay symbolic.
fn kind_line(line: &str) -> Result<Kind, ParseError> {
    tracing::debug!(line, "matching line against kind pattern");
    let caps = CATEGORY_LINE
        .captures(line)
        .ok_or_else(|| ParseError::MissingKind(line.to_owned()))?;
    if category::class_of(&caps, line)? != CategoryClass::Kind {
        return Err(ParseError::MissingKind(line.to_owned()));
    }

    let mut kind = category::kind_from(&caps);
    for parent in category::relations_of(&caps) {
        kind.link_parent(parent);
    }
    for action in category::actions_of(&caps) {
        kind.add_action(action);
    }
    Ok(kind)
}

/// Sorts the lines following the type line into mixins, attributes and links.
fn classify(
    lines: &[String],
    collection_type: CollectionType,
    model: Option<&Arc<Model>>,
) -> Result<Body, ParseError> {
    let mut body = Body::default();
    for line in lines {
        if let Some(caps) = CATEGORY_LINE.captures(line) {
            tracing::debug!(line = %line, "matched category line");
            let class = category::class_of(&caps, line)?;
            if collection_type == CollectionType::Action || class != CategoryClass::Mixin {
                return Err(ParseError::UnexpectedClass {
                    class: caps[GROUP_CLASS].to_owned(),
                    line: line.clone(),
                });
            }
            let mut mixin = category::mixin_from(&caps);
            for related in category::relations_of(&caps) {
                mixin.add_relation(related);
            }
            for action in category::actions_of(&caps) {
                mixin.add_action(action);
            }
            body.mixins.push(mixin);
        } else if ATTRIBUTE_REPR.is_match(line) {
            tracing::debug!(line = %line, "matched attribute line");
            body.attributes.push(line.clone());
        } else if collection_type == CollectionType::Resource {
            let caps = LINK_LINE
                .captures(line)
                .ok_or_else(|| ParseError::InvalidLine(line.clone()))?;
            tracing::debug!(line = %line, "matched link line");
            if caps[GROUP_URI].contains(ACTION_QUERY) {
                body.actions.push(category::action_named(&caps[GROUP_REL])?);
            } else {
                body.links.push(link_from(&caps, model)?);
            }
        } else {
            return Err(ParseError::InvalidLine(line.clone()));
        }
    }
    Ok(body)
}

/// Builds a link from a matched inline link line.
fn link_from(caps: &Captures<'_>, model: Option<&Arc<Model>>) -> Result<Link, ParseError> {
    let mut categories = caps
        .name(GROUP_CATEGORY)
        .map_or("", |m| m.as_str())
        .split_whitespace();
    let mut kind = match categories.next() {
        Some(identifier) => category::kind_named(identifier)?,
        None => Kind::new(SCHEME_CORE, TERM_LINK),
    };
    let mixins = categories
        .map(category::mixin_named)
        .collect::<Result<Vec<_>, _>>()?;

    let id = match caps.name(GROUP_SELF) {
        Some(reference) => {
            let path = grammar::path_of(reference.as_str());
            let (segment, prefix) = grammar::divide_by_last_segment(&path);
            let id = grammar::decode_segment(segment)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| ParseError::InvalidUri(reference.as_str().to_owned()))?;
            if !prefix.is_empty() {
                kind.set_location(Some(prefix.to_owned()));
            }
            id
        }
        None => uuid::Uuid::new_v4().to_string(),
    };

    let mut link = Link::new(id, kind);
    if let Some(model) = model {
        link.set_model(Arc::clone(model));
    }
    link.add_mixins(mixins);
    link.set_target(&caps[GROUP_URI]);
    link.set_relation(&caps[GROUP_REL]);

    let pairs = caps.name(GROUP_ATTRIBUTES).map_or("", |m| m.as_str());
    for pair in ATTRIBUTE_PAIR.captures_iter(pairs) {
        let name = &pair["name"];
        let mut value = grammar::attribute_value_of(&pair["value"]);
        if name == ATTRIBUTE_ID {
            // Some servers send the id as a full path.
            value = grammar::divide_by_last_segment(&value).0.to_owned();
        }
        link.add_attribute(name, value)?;
    }
    Ok(link)
}

/// Turns raw `name=value` lines into a map. Later duplicates win.
fn attribute_map(lines: &[String]) -> Result<IndexMap<String, String>, ParseError> {
    let mut attributes = IndexMap::new();
    for line in lines {
        let line = line.trim();
        tracing::trace!(line, "attribute represented by string");
        let (name, value) = line
            .split_once('=')
            .ok_or_else(|| ParseError::InvalidAttributeRepr(line.to_owned()))?;
        attributes.insert(name.to_owned(), grammar::attribute_value_of(value));
    }
    Ok(attributes)
}

fn take_id(
    attributes: &mut IndexMap<String, String>,
    entity: &'static str,
) -> Result<String, ParseError> {
    attributes
        .shift_remove(ATTRIBUTE_ID)
        .filter(|id| !id.is_empty())
        .ok_or(ParseError::MissingId(entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identifiers::LINK;

    const COMPUTE: &str = r#"compute;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";location="/compute/""#;

    fn lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| (*l).to_owned()).collect()
    }

    #[test]
    fn resource_collects_mixins_attributes_and_links() {
        let collection = parse(
            &lines(&[
                COMPUTE,
                r#"os_tpl;scheme="http://schemas.ogf.org/occi/infrastructure#";class="mixin""#,
                r#"occi.core.id="87f3bfc3";"#,
                r#"occi.compute.cores=2"#,
                r#"</network/123>;rel="http://schemas.ogf.org/occi/infrastructure#network";self="/link/networkinterface/456";category="http://schemas.ogf.org/occi/infrastructure#networkinterface";occi.networkinterface.interface="eth0""#,
                r#"</compute/87f3bfc3?action=start>;rel="http://schemas.ogf.org/occi/infrastructure/compute/action#start""#,
            ]),
            CollectionType::Resource,
            None,
        )
        .unwrap();

        let resource = collection.resource("87f3bfc3").unwrap();
        assert_eq!(resource.kind().location(), Some("/compute/"));
        assert_eq!(resource.mixins().len(), 1);
        assert_eq!(resource.attribute("occi.compute.cores"), Some("2"));
        assert_eq!(resource.attribute(ATTRIBUTE_ID), None);

        let link = resource.links().get("456").unwrap();
        assert_eq!(link.kind().location(), Some("/link/networkinterface/"));
        assert_eq!(link.target(), Some("/network/123"));
        assert_eq!(link.attribute("occi.networkinterface.interface"), Some("eth0"));
        assert!(resource
            .actions()
            .contains_id("http://schemas.ogf.org/occi/infrastructure/compute/action#start"));
    }

    #[test]
    fn link_line_without_self_or_category_gets_defaults() {
        let body = classify(
            &lines(&[r#"<http://x/network/1>;rel="http://schemas.ogf.org/occi/infrastructure#network""#]),
            CollectionType::Resource,
            None,
        )
        .unwrap();
        let link = &body.links[0];
        assert_eq!(link.kind().identifier(), LINK);
        assert!(uuid::Uuid::parse_str(link.id()).is_ok());
    }

    #[test]
    fn link_id_attribute_keeps_last_segment() {
        let body = classify(
            &lines(&[concat!(
                r#"</network/123>;rel="http://schemas.ogf.org/occi/infrastructure#network";"#,
                r#"self="/link/networkinterface/456";occi.core.id="456?foo/bar""#,
            )]),
            CollectionType::Resource,
            None,
        )
        .unwrap();
        assert_eq!(body.links[0].attribute(ATTRIBUTE_ID), Some("bar"));
    }

    #[test]
    fn missing_id_is_fatal() {
        let err = parse(&lines(&[COMPUTE, "occi.compute.cores=2"]), CollectionType::Resource, None)
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingId("resource")));
    }

    #[test]
    fn first_line_must_name_the_type() {
        let err = parse(&lines(&["occi.core.id=\"1\""]), CollectionType::Link, None).unwrap_err();
        assert!(matches!(err, ParseError::MissingKind(_)));

        let err = parse(&lines(&[COMPUTE]), CollectionType::Action, None).unwrap_err();
        assert!(matches!(err, ParseError::MissingAction(_)));

        let err = parse(&[], CollectionType::Resource, None).unwrap_err();
        assert!(matches!(err, ParseError::MissingKind(ref l) if l.is_empty()));
    }

    #[test]
    fn unclassifiable_lines_are_rejected() {
        let err = parse(
            &lines(&[COMPUTE, r#"occi.core.id="1""#, "what is this"]),
            CollectionType::Resource,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine(ref l) if l == "what is this"));

        let err = parse(
            &lines(&[
                COMPUTE,
                r#"</network/1>;rel="http://schemas.ogf.org/occi/infrastructure#network""#,
            ]),
            CollectionType::Link,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine(_)));

        let err = parse(&lines(&[COMPUTE, COMPUTE]), CollectionType::Resource, None).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClass { ref class, .. } if class == "kind"));
    }

    #[test]
    fn action_invocation_collects_arguments() {
        let collection = parse(
            &lines(&[
                r#"stop;scheme="http://schemas.ogf.org/occi/infrastructure/compute/action#";class="action""#,
                r#"method="graceful""#,
            ]),
            CollectionType::Action,
            None,
        )
        .unwrap();
        let instance = collection
            .action("http://schemas.ogf.org/occi/infrastructure/compute/action#stop")
            .unwrap();
        assert_eq!(instance.attribute("method"), Some("graceful"));
    }

    #[test]
    fn model_is_attached_to_parsed_entities() {
        let model = Arc::new(Model::core());
        let collection = parse(
            &lines(&[
                r#"link;scheme="http://schemas.ogf.org/occi/core#";class="kind""#,
                r#"occi.core.id="l1""#,
                r#"occi.core.target="""#,
            ]),
            CollectionType::Link,
            Some(&model),
        );
        assert!(matches!(collection, Err(ParseError::InvalidAttributeValue(_))));
    }
}
