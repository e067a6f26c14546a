//! Error types for parsing and rendering OCCI text representations.
//!
//! Parsing is all-or-nothing: the first structural problem aborts the call
//! with a [`ParseError`] naming the offending fragment. Rendering errors are
//! only raised when a representation is requested ([`RenderError`]), and
//! attribute assignment on an entity reports [`InvalidAttributeValueError`].

/// Failure to decode a header set or body into the typed model.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The declared media type is not handled by the requested operation.
    #[error("unknown media type '{0}'")]
    UnknownMediaType(String),

    /// A header required by `text/occi` decoding is absent.
    #[error("no header '{0}' among headers")]
    MissingHeader(&'static str),

    /// A line did not match the grammar expected at its position.
    #[error("invalid line: {0}")]
    InvalidLine(String),

    /// The first line of an entity collection is not a kind category.
    #[error("no kind specification found in '{0}'")]
    MissingKind(String),

    /// The first line of an action collection is not an action category.
    #[error("no action specification found in '{0}'")]
    MissingAction(String),

    /// A category line declared a class not allowed at its position.
    #[error("unexpected category class '{class}' in '{line}'")]
    UnexpectedClass {
        /// The class found on the line.
        class: String,
        /// The offending line.
        line: String,
    },

    /// A kind declaration came without its mandatory `location`.
    #[error("no location found for kind '{0}'")]
    MissingLocation(String),

    /// A type identifier could not be split into `scheme#term`.
    #[error("invalid category identifier '{0}'")]
    InvalidIdentifier(String),

    /// A URI failed the URI-reference syntax check.
    #[error("invalid URI '{0}'")]
    InvalidUri(String),

    /// The same kind or mixin identifier was declared twice.
    #[error("duplicate category '{0}'")]
    DuplicateCategory(String),

    /// Kinds still waiting for a parent after the builtin kinds were added.
    #[error("unknown kind relations found: {0:?}")]
    UnresolvedKindRelations(Vec<String>),

    /// Mixins still waiting for a related mixin at end of input.
    #[error("unknown mixin relations found: {0:?}")]
    UnresolvedMixinRelations(Vec<String>),

    /// A resource or link was described without `occi.core.id`.
    #[error("no id found, cannot construct a {0}")]
    MissingId(&'static str),

    /// An attribute line could not be split into `name=value`.
    #[error("malformed attribute representation '{0}'")]
    InvalidAttributeRepr(String),

    /// An attribute value was rejected by the entity it was added to.
    #[error("invalid attribute value found: {0}")]
    InvalidAttributeValue(#[from] InvalidAttributeValueError),
}

/// Failure to produce a requested representation of an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A field mandatory for the requested representation is unset.
    #[error("entity '{entity}' has no {field}, cannot render it inline")]
    MissingField {
        /// Identifier of the entity being rendered.
        entity: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// An attribute value violates a model-level constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAttributeValueError {
    /// The attribute name does not follow the dotted lowercase grammar.
    #[error("invalid attribute name '{0}'")]
    InvalidName(String),

    /// A required attribute was given an empty value.
    #[error("attribute '{0}' is required and cannot be empty")]
    RequiredValue(String),
}
