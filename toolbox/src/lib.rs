//! Tool registry and dispatcher facade.
//!
//! Bundles the registry crates behind feature flags so hosts can pull in
//! only what they need.

#![warn(missing_docs, clippy::pedantic)]

/// Registration, dispatch and catalog export.
pub use tool_registry as registry;

pub use tool_registry::{
    Catalog, DispatchOutcome, Dispatcher, DuplicatePolicy, Registrar, RegistrationError,
    ToolArgs, ToolDeclaration, ToolDescriptor, ToolRegistry,
};

/// The `#[tool]` attribute (enabled by `macros` feature).
#[cfg(feature = "macros")]
pub use tool_registry_macros::tool;

/// Configuration loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use tool_registry_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use tool_registry_telemetry as telemetry;
