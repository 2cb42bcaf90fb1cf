//! Name-based tool invocation that always yields a string.
//!
//! Unknown names and failing tools are reported, not raised: every call to
//! [`Dispatcher::dispatch`] produces text a planner can read as an
//! observation.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;
use tracing::{debug, warn};

use crate::declaration::ToolArgs;
use crate::store::ToolRegistry;

/// Structured result of one dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The tool returned normally; holds its rendered result.
    Success(String),
    /// No tool is registered under the requested name.
    NotFound {
        /// Requested tool name.
        name: String,
    },
    /// The tool failed or panicked.
    Failed {
        /// Tool that failed.
        name: String,
        /// Full diagnostic text, including the cause chain.
        diagnostic: String,
    },
}

impl DispatchOutcome {
    /// Returns `true` for [`DispatchOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(output) => f.write_str(output),
            Self::NotFound { name } => {
                write!(f, "Tool `{name}` not found. Please use a provided tool.")
            }
            Self::Failed { diagnostic, .. } => f.write_str(diagnostic),
        }
    }
}

/// Resolves tools by name and invokes them.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r ToolRegistry,
}

impl<'r> Dispatcher<'r> {
    /// Creates a dispatcher reading from `registry`.
    #[must_use]
    pub fn new(registry: &'r ToolRegistry) -> Self {
        Self { registry }
    }

    /// Invokes `name` with `args` and renders the outcome as a string.
    #[must_use]
    pub fn dispatch(&self, name: &str, args: &ToolArgs) -> String {
        self.dispatch_outcome(name, args).to_string()
    }

    /// Invokes `name` with `args` and returns the structured outcome.
    #[must_use]
    pub fn dispatch_outcome(&self, name: &str, args: &ToolArgs) -> DispatchOutcome {
        let Some(invocable) = self.registry.invocable(name) else {
            debug!(tool = name, "dispatch to unknown tool");
            return DispatchOutcome::NotFound {
                name: name.to_owned(),
            };
        };

        // The registry read guard is released before the tool body runs.
        let result = catch_unwind(AssertUnwindSafe(|| invocable.invoke(args)));

        match result {
            Ok(Ok(value)) => DispatchOutcome::Success(render_value(value)),
            Ok(Err(err)) => {
                warn!(tool = name, error = %err, "tool invocation failed");
                DispatchOutcome::Failed {
                    name: name.to_owned(),
                    diagnostic: format!("Tool `{name}` failed: {err:?}"),
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(tool = name, panic = %message, "tool invocation panicked");
                DispatchOutcome::Failed {
                    name: name.to_owned(),
                    diagnostic: format!("Tool `{name}` panicked: {message}"),
                }
            }
        }
    }
}

/// Strings render verbatim, everything else as compact JSON.
fn render_value(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
