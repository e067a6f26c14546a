//! Media types understood by the text codec.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A declared content type of an OCCI request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// `text/occi`: everything is carried in headers.
    TextOcci,
    /// `text/plain`: header lines carried in the body.
    TextPlain,
    /// `text/uri-list`: a body of locations, one per line.
    TextUriList,
}

impl MediaType {
    /// The canonical `type/subtype` string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::TextOcci => "text/occi",
            MediaType::TextPlain => "text/plain",
            MediaType::TextUriList => "text/uri-list",
        }
    }
}

impl FromStr for MediaType {
    type Err = ParseError;

    /// Parses a content type, ignoring case and any `;` parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("text/occi") {
            Ok(MediaType::TextOcci)
        } else if essence.eq_ignore_ascii_case("text/plain") {
            Ok(MediaType::TextPlain)
        } else if essence.eq_ignore_ascii_case("text/uri-list") {
            Ok(MediaType::TextUriList)
        } else {
            Err(ParseError::UnknownMediaType(s.to_owned()))
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
