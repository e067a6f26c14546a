//! `text/occi` renderer: one header per name, values joined by `,`.

use crate::entity::{ActionInstance, Link, Resource};
use crate::error::RenderError;
use crate::headers::Headers;
use crate::model::{Action, Kind, Mixin, Model};
use crate::serializer::{
    action_value, attribute_value, entity_attribute_values, entity_category_values,
    inline_link_value, kind_value, mixin_value, model_values, resource_link_values, ATTRIBUTE,
    CATEGORY, LINK,
};

fn set_joined(headers: &mut Headers, name: &str, values: &[String]) {
    if !values.is_empty() {
        headers.set(name, values.join(","));
    }
}

fn single(name: &str, value: String) -> Headers {
    let mut headers = Headers::new();
    headers.set(name, value);
    headers
}

/// Renders a kind as a `Category` header.
#[must_use]
pub fn kind_to_headers(kind: &Kind) -> Headers {
    single(CATEGORY, kind_value(kind))
}

/// Renders a mixin as a `Category` header.
#[must_use]
pub fn mixin_to_headers(mixin: &Mixin) -> Headers {
    single(CATEGORY, mixin_value(mixin))
}

/// Renders an action as a `Category` header.
#[must_use]
pub fn action_to_headers(action: &Action) -> Headers {
    single(CATEGORY, action_value(action))
}

/// Renders every category of `model` into one `Category` header.
#[must_use]
pub fn model_to_headers(model: &Model) -> Headers {
    let mut headers = Headers::new();
    set_joined(&mut headers, CATEGORY, &model_values(model));
    headers
}

/// Renders a resource as `Category`, `X-OCCI-Attribute` and `Link` headers.
///
/// # Errors
///
/// Returns [`RenderError::MissingField`] for a link that cannot be inlined.
pub fn resource_to_headers(resource: &Resource) -> Result<Headers, RenderError> {
    let links = resource_link_values(resource)?;
    let mut headers = Headers::new();
    set_joined(&mut headers, CATEGORY, &entity_category_values(resource));
    set_joined(&mut headers, ATTRIBUTE, &entity_attribute_values(resource));
    set_joined(&mut headers, LINK, &links);
    Ok(headers)
}

/// Renders a link as `Category` and `X-OCCI-Attribute` headers.
#[must_use]
pub fn link_to_headers(link: &Link) -> Headers {
    let mut headers = Headers::new();
    set_joined(&mut headers, CATEGORY, &entity_category_values(link));
    set_joined(&mut headers, ATTRIBUTE, &entity_attribute_values(link));
    headers
}

/// Renders the `Link` header of a link inside a resource.
///
/// # Errors
///
/// Returns [`RenderError::MissingField`] if the target or relation is unset.
pub fn inline_link_to_headers(link: &Link) -> Result<Headers, RenderError> {
    Ok(single(LINK, inline_link_value(link)?))
}

/// Renders an action invocation as `Category` and `X-OCCI-Attribute` headers.
#[must_use]
pub fn action_instance_to_headers(instance: &ActionInstance) -> Headers {
    let attributes: Vec<String> = instance
        .attributes()
        .iter()
        .map(|(name, value)| attribute_value(name, value))
        .collect();
    let mut headers = single(CATEGORY, action_value(instance.action()));
    set_joined(&mut headers, ATTRIBUTE, &attributes);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderSource;
    use crate::model::identifiers::SCHEME_CORE;

    const INFRA: &str = "http://schemas.ogf.org/occi/infrastructure#";

    #[test]
    fn link_headers_join_values() {
        let mut link = Link::new("456", Kind::new(SCHEME_CORE, "link"));
        link.add_mixin(Mixin::new(INFRA, "ipnetworkinterface"));
        link.set_target("/network/123");
        link.add_attribute("occi.networkinterface.interface", "eth0").unwrap();

        let headers = link.to_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.first("category"),
            Some(concat!(
                r#"link;scheme="http://schemas.ogf.org/occi/core#";class="kind","#,
                r#"ipnetworkinterface;scheme="http://schemas.ogf.org/occi/infrastructure#";class="mixin";location="/mixin/ipnetworkinterface""#,
            ))
        );
        assert_eq!(
            headers.first("x-occi-attribute"),
            Some(r#"occi.core.id="456",occi.core.target="/network/123",occi.networkinterface.interface="eth0""#)
        );
    }

    #[test]
    fn inline_headers_match_inline_text() {
        let mut link = Link::new("456", Kind::new(SCHEME_CORE, "link"));
        link.set_relation(format!("{INFRA}network"));
        assert!(link.to_inline_headers().is_err());

        link.set_target("/network/123");
        let headers = link.to_inline_headers().unwrap();
        let text = link.to_inline_text().unwrap();
        assert_eq!(Some(text.trim_start_matches("Link: ")), headers.first("Link"));
    }

    #[test]
    fn resource_without_links_has_no_link_header() {
        let resource = Resource::new("1", Kind::new(INFRA, "compute"));
        let headers = resource.to_headers().unwrap();
        assert!(headers.contains("Category"));
        assert!(headers.contains("X-OCCI-Attribute"));
        assert!(!headers.contains("Link"));
    }
}
