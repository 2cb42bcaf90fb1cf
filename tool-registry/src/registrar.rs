//! Validation of tool declarations and insertion into the registry.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::declaration::{ParamDecl, ToolDeclaration};
use crate::descriptor::{ParamSpec, ToolDescriptor};
use crate::error::{RegistrationError, RegistrationResult};
use crate::store::ToolRegistry;

/// What to do when a tool name is registered twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one.
    #[default]
    Replace,
    /// The later registration fails with [`RegistrationError::DuplicateTool`].
    Reject,
}

/// Turns declarations into descriptors and stores them.
#[derive(Debug, Clone, Copy)]
pub struct Registrar<'r> {
    registry: &'r ToolRegistry,
    duplicates: DuplicatePolicy,
}

impl<'r> Registrar<'r> {
    /// Creates a registrar writing to `registry` with [`DuplicatePolicy::Replace`].
    #[must_use]
    pub fn new(registry: &'r ToolRegistry) -> Self {
        Self {
            registry,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Sets the duplicate-name policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Validates `declaration`, stores it and returns its descriptor.
    ///
    /// Nothing is inserted when validation fails.
    ///
    /// # Errors
    ///
    /// Returns the [`RegistrationError`] matching the first defect found.
    pub fn register(&self, declaration: ToolDeclaration) -> RegistrationResult<ToolDescriptor> {
        let descriptor = describe(&declaration)?;

        let invocable = declaration.into_invocable();
        match self.duplicates {
            DuplicatePolicy::Reject => {
                if let Err(taken) = self.registry.insert_if_absent(descriptor.clone(), invocable) {
                    return Err(RegistrationError::DuplicateTool {
                        name: taken.name().to_owned(),
                    });
                }
            }
            DuplicatePolicy::Replace => {
                if self.registry.insert(descriptor.clone(), invocable).is_some() {
                    warn!(tool = descriptor.name(), "replaced previously registered tool");
                }
            }
        }

        info!(
            tool = descriptor.name(),
            params = descriptor.params().len(),
            "registered tool"
        );
        debug!(descriptor = ?descriptor, "tool descriptor");

        Ok(descriptor)
    }
}

/// Builds the descriptor for a declaration without touching any registry.
///
/// # Errors
///
/// Returns the [`RegistrationError`] matching the first defect found.
pub fn describe(declaration: &ToolDeclaration) -> RegistrationResult<ToolDescriptor> {
    let name = declaration.name();
    if name.trim().is_empty() {
        return Err(RegistrationError::InvalidToolName);
    }

    let mut seen = HashSet::new();
    let mut params = Vec::with_capacity(declaration.params().len());
    for param in declaration.params() {
        if !seen.insert(param.name()) {
            return Err(RegistrationError::DuplicateParameter {
                tool: name.to_owned(),
                param: param.name().to_owned(),
            });
        }
        params.push(param_spec(name, param)?);
    }

    let description = declaration
        .doc_text()
        .map(str::trim)
        .filter(|doc| !doc.is_empty())
        .ok_or_else(|| RegistrationError::MissingDescription {
            tool: name.to_owned(),
        })?;

    Ok(ToolDescriptor::new(
        name.to_owned(),
        description.to_owned(),
        params,
    ))
}

fn param_spec(tool: &str, param: &ParamDecl) -> RegistrationResult<ParamSpec> {
    let annotation = param
        .annotation()
        .ok_or_else(|| RegistrationError::MissingAnnotation {
            tool: tool.to_owned(),
            param: param.name().to_owned(),
        })?;

    let [description, required] = annotation.metadata() else {
        return Err(RegistrationError::MalformedAnnotation {
            tool: tool.to_owned(),
            param: param.name().to_owned(),
            found: annotation.metadata().len(),
        });
    };

    let description = match description {
        Value::String(text) if !text.trim().is_empty() => text.clone(),
        other => {
            return Err(RegistrationError::InvalidDescription {
                tool: tool.to_owned(),
                param: param.name().to_owned(),
                found: value_kind(other),
            });
        }
    };

    let Value::Bool(required) = *required else {
        return Err(RegistrationError::InvalidRequiredFlag {
            tool: tool.to_owned(),
            param: param.name().to_owned(),
            found: value_kind(required),
        });
    };

    Ok(ParamSpec::new(
        param.name().to_owned(),
        description,
        annotation.shape().to_string(),
        required,
    ))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(text) if text.trim().is_empty() => "empty string",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::declaration::{Annotation, ToolArgs};
    use crate::descriptor::TypeShape;
    use serde_json::json;

    fn noop(name: &str) -> ToolDeclaration {
        ToolDeclaration::new(name, |_: &ToolArgs| -> anyhow::Result<Value> { Ok(Value::Null) })
    }

    fn int_param(name: &str) -> ParamDecl {
        ParamDecl::annotated(
            name,
            Annotation::described(TypeShape::named("i64"), "An integer", true),
        )
    }

    fn expect_rejected(declaration: ToolDeclaration) -> RegistrationError {
        let registry = ToolRegistry::new();
        let err = Registrar::new(&registry)
            .register(declaration)
            .expect_err("declaration should be rejected");
        assert!(registry.is_empty(), "rejected tool must not be stored");
        err
    }

    #[test]
    fn builds_descriptor_in_declaration_order() {
        let registry = ToolRegistry::new();
        let declaration = noop("range_tool")
            .doc("\n    Picks a number.\n  ")
            .param(int_param("seed"))
            .param(ParamDecl::annotated(
                "range",
                Annotation::described(
                    TypeShape::tuple([TypeShape::named("i64"), TypeShape::named("i64")]),
                    "Bounds",
                    false,
                ),
            ));

        let descriptor = Registrar::new(&registry).register(declaration).unwrap();

        assert_eq!(descriptor.name(), "range_tool");
        assert_eq!(descriptor.description(), "Picks a number.");
        let params = descriptor.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name(), "seed");
        assert_eq!(params[0].ty(), "i64");
        assert!(params[0].required());
        assert_eq!(params[1].name(), "range");
        assert_eq!(params[1].ty(), "(i64, i64)");
        assert_eq!(params[1].description(), "Bounds");
        assert!(!params[1].required());
        assert!(registry.contains("range_tool"));
    }

    #[test]
    fn zero_parameter_tool_is_valid() {
        let registry = ToolRegistry::new();
        let descriptor = Registrar::new(&registry)
            .register(noop("ping").doc("Ping"))
            .unwrap();
        assert!(descriptor.params().is_empty());
    }

    #[test]
    fn rejects_unannotated_parameter() {
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::unannotated("x")));
        assert_eq!(
            err,
            RegistrationError::MissingAnnotation {
                tool: "t".into(),
                param: "x".into()
            }
        );
    }

    #[test]
    fn rejects_wrong_metadata_arity() {
        let short = Annotation::new(TypeShape::named("i64")).with_meta("only a description");
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::annotated("x", short)));
        assert!(matches!(err, RegistrationError::MalformedAnnotation { found: 1, .. }));

        let long = Annotation::described(TypeShape::named("i64"), "d", true).with_meta(1);
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::annotated("x", long)));
        assert!(matches!(err, RegistrationError::MalformedAnnotation { found: 3, .. }));
    }

    #[test]
    fn rejects_non_string_description() {
        let annotation = Annotation::new(TypeShape::named("i64"))
            .with_meta(42)
            .with_meta(true);
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::annotated("x", annotation)));
        assert!(matches!(
            err,
            RegistrationError::InvalidDescription { found: "number", .. }
        ));
    }

    #[test]
    fn rejects_blank_description() {
        let annotation = Annotation::described(TypeShape::named("i64"), "  ", true);
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::annotated("x", annotation)));
        assert!(matches!(
            err,
            RegistrationError::InvalidDescription { found: "empty string", .. }
        ));
    }

    #[test]
    fn rejects_non_bool_required_flag() {
        let annotation = Annotation::new(TypeShape::named("i64"))
            .with_meta("An integer")
            .with_meta(json!("yes"));
        let err = expect_rejected(noop("t").doc("Doc").param(ParamDecl::annotated("x", annotation)));
        assert!(matches!(
            err,
            RegistrationError::InvalidRequiredFlag { found: "string", .. }
        ));
    }

    #[test]
    fn rejects_missing_or_blank_doc() {
        let err = expect_rejected(noop("t"));
        assert_eq!(err, RegistrationError::MissingDescription { tool: "t".into() });

        let err = expect_rejected(noop("t").doc(" \n\t "));
        assert_eq!(err, RegistrationError::MissingDescription { tool: "t".into() });
    }

    #[test]
    fn rejects_blank_name_and_repeated_params() {
        assert_eq!(
            expect_rejected(noop(" ").doc("Doc")),
            RegistrationError::InvalidToolName
        );

        let err = expect_rejected(
            noop("t")
                .doc("Doc")
                .param(int_param("x"))
                .param(int_param("x")),
        );
        assert!(matches!(err, RegistrationError::DuplicateParameter { param, .. } if param == "x"));
    }

    #[test]
    fn duplicate_names_replace_by_default() {
        let registry = ToolRegistry::new();
        let registrar = Registrar::new(&registry);
        registrar.register(noop("t").doc("First")).unwrap();
        registrar.register(noop("t").doc("Second")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list_tools()["t"].description(), "Second");
    }

    #[test]
    fn duplicate_names_can_be_rejected() {
        let registry = ToolRegistry::new();
        let registrar = Registrar::new(&registry).with_duplicate_policy(DuplicatePolicy::Reject);
        registrar.register(noop("t").doc("First")).unwrap();

        let err = registrar
            .register(noop("t").doc("Second"))
            .expect_err("duplicate should fail");
        assert_eq!(err, RegistrationError::DuplicateTool { name: "t".into() });
        assert_eq!(registry.list_tools()["t"].description(), "First");
    }

    #[test]
    fn racing_rejecting_registrars_admit_one_winner() {
        let registry = ToolRegistry::new();
        let registrar = Registrar::new(&registry).with_duplicate_policy(DuplicatePolicy::Reject);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    scope.spawn(move || registrar.register(noop("t").doc(format!("Writer {i}"))))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results.iter().filter(|r| r.is_err()).all(|r| {
            matches!(r, Err(RegistrationError::DuplicateTool { name }) if name == "t")
        }));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.list_tools()["t"].description(),
            winners[0].description()
        );
    }
}
