//! Error types for tool registration and argument extraction.

use thiserror::Error;

/// Result alias for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors raised while turning a [`crate::ToolDeclaration`] into a registered tool.
///
/// Every variant indicates a programming error in a tool's declaration and
/// is meant to abort startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The tool name is empty or blank.
    #[error("tool name cannot be empty")]
    InvalidToolName,

    /// The tool carries no documentation text, or only whitespace.
    #[error("tool `{tool}` has no description")]
    MissingDescription {
        /// Name of the offending tool.
        tool: String,
    },

    /// A parameter was declared without an annotation.
    #[error("parameter `{param}` of tool `{tool}` is missing its annotation")]
    MissingAnnotation {
        /// Name of the offending tool.
        tool: String,
        /// Name of the unannotated parameter.
        param: String,
    },

    /// The annotation metadata does not have the `[description, required]` shape.
    #[error(
        "annotation for parameter `{param}` of tool `{tool}` must carry a description and a required flag, found {found} metadata item(s)"
    )]
    MalformedAnnotation {
        /// Name of the offending tool.
        tool: String,
        /// Name of the offending parameter.
        param: String,
        /// Number of metadata items actually attached.
        found: usize,
    },

    /// The parameter description is not a non-empty string.
    #[error("description for parameter `{param}` of tool `{tool}` must be a non-empty string, found {found}")]
    InvalidDescription {
        /// Name of the offending tool.
        tool: String,
        /// Name of the offending parameter.
        param: String,
        /// Kind of value found in place of the description.
        found: &'static str,
    },

    /// The required flag is not a boolean.
    #[error("required flag for parameter `{param}` of tool `{tool}` must be a bool, found {found}")]
    InvalidRequiredFlag {
        /// Name of the offending tool.
        tool: String,
        /// Name of the offending parameter.
        param: String,
        /// Kind of value found in place of the flag.
        found: &'static str,
    },

    /// Two parameters of the same tool share a name.
    #[error("parameter `{param}` is declared more than once on tool `{tool}`")]
    DuplicateParameter {
        /// Name of the offending tool.
        tool: String,
        /// Repeated parameter name.
        param: String,
    },

    /// A tool with the same name exists and the registrar rejects duplicates.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },
}

/// Errors raised while extracting typed arguments for a tool invocation.
///
/// These surface through the dispatcher as diagnostic strings, never as
/// failures of the dispatch call itself.
#[derive(Debug, Error)]
pub enum ArgumentError {
    /// A required argument was not supplied.
    #[error("missing required argument `{name}`")]
    Missing {
        /// Argument name.
        name: String,
    },

    /// An argument was supplied that the tool does not declare.
    #[error("unexpected argument `{name}`")]
    Unexpected {
        /// Argument name.
        name: String,
    },

    /// An argument value could not be converted to the declared type.
    #[error("invalid value for argument `{name}`: {source}")]
    Invalid {
        /// Argument name.
        name: String,
        /// Underlying conversion error.
        #[source]
        source: serde_json::Error,
    },
}
