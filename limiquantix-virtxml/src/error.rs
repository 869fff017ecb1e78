//! Error types for the XML transcoder.

use thiserror::Error;

/// Errors that can occur while loading or saving a schema type.
///
/// Every failure is a hard stop for the current `load`/`save` call. The
/// destination value or element is never left partially written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The root element does not carry the tag the schema type expects.
    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    SchemaMismatch {
        expected: &'static str,
        found: String,
    },

    /// A required child element is absent.
    #[error("Missing required element <{element}> in <{parent}>")]
    MissingElement {
        parent: String,
        element: &'static str,
    },

    /// A required attribute is absent.
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A list slot has fewer occurrences than its declared minimum.
    #[error("Element <{element}> occurs {found} time(s) in <{parent}>, expected at least {min}")]
    Cardinality {
        parent: String,
        element: &'static str,
        min: usize,
        found: usize,
    },

    /// A primitive value failed conversion or validation.
    #[error("Invalid {kind} value '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    /// A fixed-value attribute carries a different value.
    #[error("Attribute '{attribute}' on <{element}> must be '{expected}', found '{found}'")]
    ConstantMismatch {
        element: String,
        attribute: &'static str,
        expected: &'static str,
        found: String,
    },

    /// No alternative of a choice matched.
    #[error("No alternative of {choice} matched in <{element}>")]
    VariantExhausted {
        choice: &'static str,
        element: String,
    },

    /// A child element was left unconsumed while unknown content is denied.
    #[error("Unexpected element <{element}> in <{parent}>")]
    UnexpectedElement { parent: String, element: String },

    /// An attribute was found on an element that must be bare.
    #[error("Unexpected attribute '{attribute}' on <{element}>")]
    UnexpectedAttribute { element: String, attribute: String },

    /// A child element a slot asks for was left behind because it appeared
    /// after a later slot's element.
    #[error("Element <{element}> in <{parent}> is out of order")]
    OutOfOrder { parent: String, element: String },

    /// The DOM nesting exceeded the configured depth limit.
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },

    /// A type without a document tag cannot be saved as a whole document.
    #[error("Type {0} has no document tag")]
    AnonymousRoot(&'static str),

    /// The document is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Malformed(String),
}

impl XmlError {
    /// Returns true for failures that abort the whole load, even while a
    /// choice alternative is being attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, XmlError::DepthExceeded { .. } | XmlError::Malformed(_))
    }
}

/// Result type alias for transcoder operations.
pub type Result<T> = std::result::Result<T, XmlError>;
