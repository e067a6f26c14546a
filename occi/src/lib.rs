//! OCCI (Open Cloud Computing Interface) data model and text codec.
//!
//! The `occi` crate decodes the `text/occi` (headers) and `text/plain` /
//! `text/uri-list` (body) renderings of OCCI into typed category declarations
//! ([`Kind`], [`Mixin`], [`Action`]) and entity instances ([`Resource`],
//! [`Link`], [`ActionInstance`]), and renders them back in canonical form.
//!
//! # Entry Point
//!
//! ```
//! use occi::{CollectionType, Headers, MediaType, TextParser};
//!
//! let body = concat!(
//!     "Category: compute;scheme=\"http://schemas.ogf.org/occi/infrastructure#\";class=\"kind\";location=\"/compute/\"\n",
//!     "X-OCCI-Attribute: occi.core.id=\"87f3bfc3\"\n",
//!     "X-OCCI-Attribute: occi.compute.cores=2\n",
//! );
//! let collection = TextParser::new().parse_collection(
//!     MediaType::TextPlain,
//!     body,
//!     &Headers::new(),
//!     CollectionType::Resource,
//! )?;
//! let resource = collection.resource("87f3bfc3").expect("parsed resource");
//! assert_eq!(resource.attribute("occi.compute.cores"), Some("2"));
//! # Ok::<(), occi::ParseError>(())
//! ```
//!
//! # Rendering
//!
//! ```
//! use occi::{Kind, Link};
//!
//! let mut link = Link::new("456", Kind::new("http://schemas.ogf.org/occi/core#", "link"));
//! link.set_relation("http://schemas.ogf.org/occi/infrastructure#network");
//! link.set_target("/network/123");
//! assert!(link.to_inline_text()?.starts_with("Link: </network/123>;"));
//! # Ok::<(), occi::RenderError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod collection;
pub mod entity;
pub mod error;
pub mod grammar;
pub mod headers;
pub mod media_type;
pub mod model;
pub mod parser;
pub mod serializer;

pub use collection::{Collection, Identified, IdentifiedSet};
pub use entity::{ActionInstance, Entity, Link, Resource};
pub use error::{InvalidAttributeValueError, ParseError, RenderError};
pub use headers::{HeaderSource, Headers};
pub use media_type::MediaType;
pub use model::{core_kinds, Action, Attribute, Category, CategoryClass, Kind, Mixin, Model};
pub use parser::{CollectionType, TextParser};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_vocabulary_is_reachable_from_the_root() {
        let model = Model::core();
        assert_eq!(model.kinds().len(), 3);
        assert_eq!(core_kinds()[0].identifier(), model::identifiers::ENTITY);
    }

    #[test]
    fn model_renders_and_parses_back() {
        let model = Model::core();
        let parsed = TextParser::new()
            .parse_model(MediaType::TextPlain, &model.to_text(), &Headers::new())
            .unwrap();
        assert_eq!(parsed, model);

        let parsed = TextParser::new()
            .parse_model(MediaType::TextOcci, "", &model.to_headers())
            .unwrap();
        assert_eq!(parsed, model);
    }
}
