//! Decoding of OCCI text representations into a [`Model`] or a [`Collection`].
//!
//! # Entry Point
//!
//! ```
//! use occi::{Headers, MediaType, TextParser};
//!
//! let body = r#"Category: storage;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";title="Storage";rel="http://schemas.ogf.org/occi/core#resource";location="/storage/""#;
//! let model = TextParser::new().parse_model(MediaType::TextPlain, body, &Headers::new())?;
//! let storage = model.kind("http://schemas.ogf.org/occi/infrastructure#storage");
//! assert_eq!(
//!     storage.and_then(|k| k.parent()),
//!     Some("http://schemas.ogf.org/occi/core#resource")
//! );
//! # Ok::<(), occi::ParseError>(())
//! ```
//!
//! Every operation is all-or-nothing: the first malformed line or missing
//! mandatory field aborts the call with a [`ParseError`].

mod category;
mod collection;
mod model;

use std::sync::Arc;

use crate::collection::Collection;
use crate::error::ParseError;
use crate::grammar;
use crate::headers::HeaderSource;
use crate::media_type::MediaType;
use crate::model::Model;
use crate::serializer::{ATTRIBUTE, CATEGORY, LINK, LOCATION, LOCATION_LABEL};

/// The instance shape a collection body is expected to describe.
///
/// The wire format carries no discriminator, so the caller declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    /// A single resource with its mixins, attributes and links.
    Resource,
    /// A single link with its mixins and attributes.
    Link,
    /// An action invocation with its arguments.
    Action,
}

impl CollectionType {
    /// Lowercase name of the shape.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Resource => "resource",
            CollectionType::Link => "link",
            CollectionType::Action => "action",
        }
    }
}

/// Parser for `text/occi`, `text/plain` and `text/uri-list` representations.
///
/// A parser built with [`TextParser::with_model`] attaches its model to every
/// parsed collection so entities resolve their categories against it.
#[derive(Debug, Clone, Default)]
pub struct TextParser {
    model: Option<Arc<Model>>,
}

impl TextParser {
    /// Creates a parser without a resolution model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser resolving parsed entities against `model`.
    #[must_use]
    pub fn with_model(model: Arc<Model>) -> Self {
        Self { model: Some(model) }
    }

    /// The resolution model, if any.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_deref()
    }

    /// Decodes category declarations into a [`Model`].
    ///
    /// `text/occi` reads the `Category` header; `text/plain` reads the body,
    /// one declaration per line. The builtin `entity`, `resource` and `link`
    /// kinds are added unless declared.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for an unsupported media type, a missing
    /// `Category` header, a line outside the category grammar, a kind without
    /// location, a duplicate declaration or a relation that never resolves.
    pub fn parse_model<H>(
        &self,
        media_type: MediaType,
        body: &str,
        headers: &H,
    ) -> Result<Model, ParseError>
    where
        H: HeaderSource + ?Sized,
    {
        tracing::debug!(%media_type, "parsing model");
        let lines = match media_type {
            MediaType::TextOcci => header_lines(headers, CATEGORY)?,
            MediaType::TextPlain => body_lines(body, &[CATEGORY]),
            MediaType::TextUriList => {
                return Err(ParseError::UnknownMediaType(media_type.to_string()))
            }
        };
        model::parse(&lines)
    }

    /// Decodes a list of locations.
    ///
    /// `text/occi` reads the `Location` header; `text/plain` and
    /// `text/uri-list` read the body, one location per line.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingHeader`] if the `Location` header is
    /// absent and [`ParseError::InvalidUri`] for a malformed location.
    pub fn parse_locations<H>(
        &self,
        media_type: MediaType,
        body: &str,
        headers: &H,
    ) -> Result<Vec<String>, ParseError>
    where
        H: HeaderSource + ?Sized,
    {
        tracing::debug!(%media_type, "parsing locations");
        let lines = match media_type {
            MediaType::TextOcci => header_lines(headers, LOCATION)?,
            MediaType::TextPlain | MediaType::TextUriList => body_lines(body, &[LOCATION_LABEL]),
        };
        lines
            .into_iter()
            .map(|location| {
                if grammar::is_uri(&location) {
                    Ok(location)
                } else {
                    Err(ParseError::InvalidUri(location))
                }
            })
            .collect()
    }

    /// Decodes a resource, link or action invocation into a [`Collection`].
    ///
    /// `text/occi` reads the `Category` header, then `X-OCCI-Attribute` and
    /// `Link` if present; `text/plain` reads the body, one value per line.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for an unsupported media type, a missing
    /// `Category` header, a first line that is not the expected kind or
    /// action, an unclassifiable line, a missing `occi.core.id` or an
    /// attribute value rejected by the entity.
    pub fn parse_collection<H>(
        &self,
        media_type: MediaType,
        body: &str,
        headers: &H,
        collection_type: CollectionType,
    ) -> Result<Collection, ParseError>
    where
        H: HeaderSource + ?Sized,
    {
        tracing::debug!(%media_type, collection_type = collection_type.as_str(), "parsing collection");
        let lines = match media_type {
            MediaType::TextOcci => {
                let mut lines = header_lines(headers, CATEGORY)?;
                for name in [ATTRIBUTE, LINK] {
                    if let Some(value) = headers.first(name) {
                        lines.extend(split_header_value(value));
                    }
                }
                lines
            }
            MediaType::TextPlain => body_lines(body, &[CATEGORY, ATTRIBUTE, LINK]),
            MediaType::TextUriList => {
                return Err(ParseError::UnknownMediaType(media_type.to_string()))
            }
        };
        collection::parse(&lines, collection_type, self.model.as_ref())
    }
}

fn header_lines<H>(headers: &H, name: &'static str) -> Result<Vec<String>, ParseError>
where
    H: HeaderSource + ?Sized,
{
    let value = headers.first(name).ok_or(ParseError::MissingHeader(name))?;
    Ok(split_header_value(value))
}

/// Splits a header value into its logical lines.
///
/// Commas inside double-quoted strings or `<...>` references do not split.
/// A reference only opens at the start of a line, and a `<` that is never
/// closed does not hold back the lines after it. Every line is trimmed and
/// empty lines are dropped.
pub(crate) fn split_header_value(value: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_reference = false;
    let mut escaped = false;

    for (index, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if in_quotes {
            match c {
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
        } else {
            match c {
                '"' => in_quotes = true,
                '<' if current.trim().is_empty() => in_reference = true,
                '>' => in_reference = false,
                ',' if !in_reference || !reference_closes(&value[index + 1..]) => {
                    in_reference = false;
                    push_trimmed(&mut lines, &current);
                    current.clear();
                    continue;
                }
                _ => {}
            }
        }
        current.push(c);
    }
    push_trimmed(&mut lines, &current);
    lines
}

/// Whether an open reference is closed in `rest` before another one opens.
fn reference_closes(rest: &str) -> bool {
    match (rest.find('>'), rest.find('<')) {
        (Some(close), Some(open)) => close < open,
        (Some(_), None) => true,
        _ => false,
    }
}

fn push_trimmed(lines: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        lines.push(line.to_owned());
    }
}

/// Splits a body into trimmed, non-empty lines, dropping one leading
/// `Label:` per line when it matches one of `labels` case-insensitively.
pub(crate) fn body_lines(body: &str, labels: &[&str]) -> Vec<String> {
    body.lines()
        .map(|line| strip_label(line.trim(), labels).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn strip_label<'a>(line: &'a str, labels: &[&str]) -> &'a str {
    for label in labels {
        let Some(head) = line.get(..label.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(label) {
            if let Some(rest) = line[label.len()..].strip_prefix(':') {
                return rest;
            }
        }
    }
    line
}
