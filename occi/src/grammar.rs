//! Regular sub-grammars of the OCCI text rendering.
//!
//! The small building blocks (`term`, `scheme`, URI references, attribute
//! names and definitions, quoted strings, numbers, booleans) are composed into
//! three top-level patterns:
//!
//! - [`CATEGORY_LINE`]: `term;scheme="...";class="..."` with the optional
//!   `title`, `rel`, `location`, `attributes` and `actions` fields,
//! - [`ATTRIBUTE_REPR`]: a single `name=value` attribute line,
//! - [`LINK_LINE`]: `<uri>;rel="...";self="...";category="...";name=value...`.
//!
//! All three tolerate one stray trailing `;` and are anchored, so a line either
//! matches completely or not at all. Matching is case-sensitive.

use std::sync::LazyLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

/// Capture group holding the category term.
pub const GROUP_TERM: &str = "term";
/// Capture group holding the category scheme (ends in `#`).
pub const GROUP_SCHEME: &str = "scheme";
/// Capture group holding the category class.
pub const GROUP_CLASS: &str = "class";
/// Capture group holding the optional title.
pub const GROUP_TITLE: &str = "title";
/// Capture group holding the space separated related identifiers.
pub const GROUP_REL: &str = "rel";
/// Capture group holding the optional location.
pub const GROUP_LOCATION: &str = "location";
/// Capture group holding an attribute definition or value list.
pub const GROUP_ATTRIBUTES: &str = "attributes";
/// Capture group holding the space separated action identifiers.
pub const GROUP_ACTIONS: &str = "actions";
/// Capture group holding the link target.
pub const GROUP_URI: &str = "uri";
/// Capture group holding the link `self` reference.
pub const GROUP_SELF: &str = "self";
/// Capture group holding the link categories.
pub const GROUP_CATEGORY: &str = "category";

const TERM: &str = r"[a-zA-Z0-9][a-z0-9\-_]*";
const URI_CHAR: &str = r"(?:[A-Za-z0-9\-._~!$&'()*+,;=:@/?\[\]]|%[0-9A-Fa-f]{2})";
const URI_SCHEME: &str = r"[a-zA-Z][a-zA-Z0-9+.\-]*";
const ATTRIBUTE_COMPONENT: &str = r"[a-z][a-z0-9\-_]*";
const ATTRIBUTE_PROPERTIES: &str =
    r"\{(?:required immutable|immutable required|required|immutable)\}";
const QUOTED_STRING: &str = r#"(?:[^"\\]|\\.)*"#;
const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?";
const BOOL: &str = r"true|false";

fn uri_ref() -> String {
    format!("{URI_CHAR}+(?:#{URI_CHAR}*)?")
}

fn scheme() -> String {
    format!("{URI_SCHEME}:{URI_CHAR}*#")
}

fn type_identifier() -> String {
    format!("{}{TERM}", scheme())
}

fn type_identifier_list() -> String {
    let id = type_identifier();
    format!(r"{id}(?:\s+{id})*")
}

fn attribute_name() -> String {
    format!(r"{ATTRIBUTE_COMPONENT}(?:\.{ATTRIBUTE_COMPONENT})*")
}

fn attribute_definition() -> String {
    format!("{}(?:{ATTRIBUTE_PROPERTIES})?", attribute_name())
}

fn attribute_value() -> String {
    format!(r#""{QUOTED_STRING}"|{NUMBER}|{BOOL}"#)
}

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("OCCI grammar pattern must compile")
}

/// A complete category line.
pub static CATEGORY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let attribute_list = format!(r"{0}(?:\s+{0})*", attribute_definition());
    compile(&format!(
        concat!(
            r#"^(?P<term>{term})"#,
            r#";\s*scheme="(?P<scheme>{scheme})(?:{term})?""#,
            r#";\s*class="?(?P<class>kind|mixin|action)"?"#,
            r#"(?:;\s*title="(?P<title>{quoted})")?"#,
            r#"(?:;\s*rel="(?P<rel>{ids})")?"#,
            r#"(?:;\s*location="(?P<location>{uri})")?"#,
            r#"(?:;\s*attributes="(?P<attributes>{attributes})")?"#,
            r#"(?:;\s*actions="(?P<actions>{ids})")?"#,
            r#";?$"#,
        ),
        term = TERM,
        scheme = scheme(),
        quoted = QUOTED_STRING,
        ids = type_identifier_list(),
        uri = uri_ref(),
        attributes = attribute_list,
    ))
});

/// A single `name=value` attribute line, optionally ending in `;`.
pub static ATTRIBUTE_REPR: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^{}=(?:{});?$",
        attribute_name(),
        attribute_value()
    ))
});

/// One `name=value` pair inside a longer attribute list.
pub static ATTRIBUTE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?P<name>{})=(?P<value>{})",
        attribute_name(),
        attribute_value()
    ))
});

/// One attribute definition inside a category's `attributes` list.
pub static ATTRIBUTE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?P<name>{})(?P<properties>{ATTRIBUTE_PROPERTIES})?",
        attribute_name()
    ))
});

/// A complete inline link line.
pub static LINK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    let pair = format!("{}=(?:{})", attribute_name(), attribute_value());
    compile(&format!(
        concat!(
            r#"^<(?P<uri>{uri})>"#,
            r#";\s*rel="(?P<rel>{ids})""#,
            r#"(?:;\s*self="(?P<self>{uri})")?"#,
            r#"(?:;\s*category="(?P<category>{ids})")?"#,
            r#"(?:;\s*(?P<attributes>{pair}(?:;\s*{pair})*))?"#,
            r#";?$"#,
        ),
        uri = uri_ref(),
        ids = type_identifier_list(),
        pair = pair,
    ))
});

static ATTRIBUTE_NAME: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("^{}$", attribute_name())));

static URI_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("^{}$", uri_ref())));

static URI_SCHEME_NAME: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("^{URI_SCHEME}$")));

static URI_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^(?:(?P<scheme>[^:/?#]+):)?(?://(?P<authority>[^/?#]*))?(?P<path>[^?#]*)(?:\?[^#]*)?(?:#.*)?$")
});

/// Returns `true` if `name` follows the dotted lowercase attribute-name grammar.
#[must_use]
pub fn is_attribute_name(name: &str) -> bool {
    ATTRIBUTE_NAME.is_match(name)
}

/// Returns `true` if `uri` is a syntactically valid absolute or relative URI reference.
#[must_use]
pub fn is_uri(uri: &str) -> bool {
    if !URI_REFERENCE.is_match(uri) {
        return false;
    }
    // A colon before the first delimiter introduces a scheme, which must be well formed.
    let head_end = uri.find(['/', '?', '#']).unwrap_or(uri.len());
    match uri[..head_end].find(':') {
        Some(colon) => URI_SCHEME_NAME.is_match(&uri[..colon]),
        None => true,
    }
}

/// Reduces a URI reference to its path component.
///
/// `http://example.com/compute/` becomes `/compute/`, relative references are
/// returned unchanged. A URI with an authority but no path yields `/`.
#[must_use]
pub fn path_of(uri: &str) -> String {
    let Some(parts) = URI_PARTS.captures(uri) else {
        return uri.to_owned();
    };
    let path = parts.name("path").map_or("", |m| m.as_str());
    if path.is_empty() && parts.name("authority").is_some() {
        "/".to_owned()
    } else {
        path.to_owned()
    }
}

/// Splits a type identifier into its scheme (including the trailing `#`) and term.
///
/// Returns `None` unless the identifier contains exactly one `#` with
/// non-empty text on both sides.
#[must_use]
pub fn split_identifier(identifier: &str) -> Option<(String, String)> {
    let (scheme, term) = identifier.split_once('#')?;
    if scheme.is_empty() || term.is_empty() || term.contains('#') {
        return None;
    }
    Some((format!("{scheme}#"), term.to_owned()))
}

/// Splits a URI at its last `/` into `(last segment, prefix up to and including the slash)`.
///
/// `/link/networkinterface/456` becomes `("456", "/link/networkinterface/")`;
/// a URI without any `/` is returned whole as the segment with an empty prefix.
#[must_use]
pub fn divide_by_last_segment(uri: &str) -> (&str, &str) {
    match uri.rfind('/') {
        Some(slash) => (&uri[slash + 1..], &uri[..=slash]),
        None => (uri, ""),
    }
}

/// Bytes escaped when an entity id is written as one path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encodes `id` so it forms a single URI path segment.
///
/// Everything but unreserved characters is escaped, including `/`, `?`, `#`
/// and `%` itself.
#[must_use]
pub fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

/// Reverses [`encode_segment`]. Returns `None` if the decoded bytes are not UTF-8.
#[must_use]
pub fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Wraps `value` in double quotes, escaping backslashes and quotes.
#[must_use]
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Reverses [`quote`] for a matched quoted string body (without the outer quotes).
#[must_use]
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Turns a raw attribute value token into its stored string form.
///
/// A single trailing `;` is dropped, surrounding quotes are removed and
/// escapes inside them resolved; numbers and booleans are kept verbatim.
#[must_use]
pub fn attribute_value_of(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw.strip_suffix(';').unwrap_or(raw);
    match raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(body) => unescape(body),
        None => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = r#"storage;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";title="Storage";rel="http://schemas.ogf.org/occi/core#resource";location="/storage/""#;

    #[test]
    fn category_line_captures_every_field() {
        let caps = CATEGORY_LINE.captures(STORAGE).expect("storage line matches");
        assert_eq!(&caps[GROUP_TERM], "storage");
        assert_eq!(&caps[GROUP_SCHEME], "http://schemas.ogf.org/occi/infrastructure#");
        assert_eq!(&caps[GROUP_CLASS], "kind");
        assert_eq!(&caps[GROUP_TITLE], "Storage");
        assert_eq!(&caps[GROUP_REL], "http://schemas.ogf.org/occi/core#resource");
        assert_eq!(&caps[GROUP_LOCATION], "/storage/");
        assert!(caps.name(GROUP_ATTRIBUTES).is_none());
    }

    #[test]
    fn category_line_accepts_attributes_actions_and_trailing_semicolon() {
        let line = concat!(
            r#"compute;scheme="http://schemas.ogf.org/occi/infrastructure#";class="kind";"#,
            r#"location="/compute/";attributes="occi.compute.cores occi.compute.state{required immutable}";"#,
            r#"actions="http://schemas.ogf.org/occi/infrastructure/compute/action#start http://schemas.ogf.org/occi/infrastructure/compute/action#stop";"#,
        );
        let caps = CATEGORY_LINE.captures(line).expect("compute line matches");
        assert_eq!(
            &caps[GROUP_ATTRIBUTES],
            "occi.compute.cores occi.compute.state{required immutable}"
        );
        assert!(caps[GROUP_ACTIONS].ends_with("#stop"));
    }

    #[test]
    fn category_line_rejects_missing_class_and_trailing_garbage() {
        assert!(!CATEGORY_LINE.is_match(r#"storage;scheme="http://x.org/occi#""#));
        assert!(!CATEGORY_LINE.is_match(&format!("{STORAGE} trailing")));
    }

    #[test]
    fn attribute_repr_matches_strings_numbers_and_bools() {
        assert!(ATTRIBUTE_REPR.is_match(r#"occi.core.title="My \"disk\"""#));
        assert!(ATTRIBUTE_REPR.is_match("occi.compute.cores=2;"));
        assert!(ATTRIBUTE_REPR.is_match("occi.compute.speed=1.5"));
        assert!(ATTRIBUTE_REPR.is_match("occi.compute.ephemeral=true"));
        assert!(!ATTRIBUTE_REPR.is_match("occi.compute.cores=two"));
        assert!(!ATTRIBUTE_REPR.is_match(r#"Occi.core.title="x""#));
    }

    #[test]
    fn link_line_captures_optional_parts() {
        let line = concat!(
            r#"</network/123>;rel="http://schemas.ogf.org/occi/infrastructure#network";"#,
            r#"self="/link/networkinterface/456";"#,
            r#"category="http://schemas.ogf.org/occi/infrastructure#networkinterface";"#,
            r#"occi.networkinterface.interface="eth0";occi.networkinterface.state="active""#,
        );
        let caps = LINK_LINE.captures(line).expect("link line matches");
        assert_eq!(&caps[GROUP_URI], "/network/123");
        assert_eq!(&caps[GROUP_SELF], "/link/networkinterface/456");
        let pairs: Vec<_> = ATTRIBUTE_PAIR
            .captures_iter(&caps[GROUP_ATTRIBUTES])
            .map(|c| c["name"].to_owned())
            .collect();
        assert_eq!(
            pairs,
            ["occi.networkinterface.interface", "occi.networkinterface.state"]
        );
    }

    #[test]
    fn uri_checks() {
        assert!(is_uri("http://example.com/compute/1"));
        assert!(is_uri("/compute/"));
        assert!(is_uri("http://schemas.ogf.org/occi/core#"));
        assert!(!is_uri(""));
        assert!(!is_uri("has space"));
        assert!(!is_uri("1http://bad"));
    }

    #[test]
    fn paths_and_segments() {
        assert_eq!(path_of("http://example.com/compute/"), "/compute/");
        assert_eq!(path_of("/storage/"), "/storage/");
        assert_eq!(path_of("http://example.com"), "/");
        assert_eq!(
            divide_by_last_segment("/link/networkinterface/456"),
            ("456", "/link/networkinterface/")
        );
        assert_eq!(divide_by_last_segment("456"), ("456", ""));
    }

    #[test]
    fn identifiers_split_on_single_hash() {
        assert_eq!(
            split_identifier("http://schemas.ogf.org/occi/core#link"),
            Some(("http://schemas.ogf.org/occi/core#".to_owned(), "link".to_owned()))
        );
        assert_eq!(split_identifier("http://x.org/occi#"), None);
        assert_eq!(split_identifier("no-hash"), None);
    }

    #[test]
    fn segments_escape_reserved_characters() {
        assert_eq!(encode_segment("87f3bfc3-a_b.c~d"), "87f3bfc3-a_b.c~d");
        let encoded = encode_segment("vm 1/x?y#z%");
        assert_eq!(encoded, "vm%201%2Fx%3Fy%23z%25");
        assert!(is_uri(&format!("/compute/{encoded}")));
        assert_eq!(decode_segment(&encoded).as_deref(), Some("vm 1/x?y#z%"));
        assert_eq!(decode_segment("%FF"), None);
    }

    #[test]
    fn attribute_values_are_unquoted() {
        assert_eq!(attribute_value_of(r#""eth0";"#), "eth0");
        assert_eq!(attribute_value_of(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(attribute_value_of("2"), "2");
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(quote(r#"a"b"#), r#""a\"b""#);
    }
}
