//! Tool discovery, registration and dispatch.
//!
//! A [`ToolRegistry`] is created empty at startup, populated through the
//! [`Registrar`] from [`ToolDeclaration`]s, and then served read-mostly:
//! the [`Dispatcher`] invokes tools by name and always yields a string, and
//! the [`Catalog`] exports isolated copies of every [`ToolDescriptor`].

#![warn(missing_docs, clippy::pedantic)]

pub mod catalog;
pub mod declaration;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod registrar;
pub mod store;

pub use catalog::Catalog;
pub use declaration::{Annotation, Invocable, ParamDecl, ToolArgs, ToolDeclaration};
pub use descriptor::{ParamSpec, ToolDescriptor, TypeShape};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use error::{ArgumentError, RegistrationError, RegistrationResult};
pub use registrar::{DuplicatePolicy, Registrar};
pub use store::ToolRegistry;

/// Items referenced by code generated from `#[tool]`. Not a stable API.
#[doc(hidden)]
pub mod __private {
    pub use anyhow;
    pub use serde_json;
}
