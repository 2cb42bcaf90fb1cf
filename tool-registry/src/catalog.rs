//! Read-only export of registered tool descriptors.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::descriptor::ToolDescriptor;
use crate::store::ToolRegistry;

/// Produces owned snapshots of the registry's descriptors.
///
/// Snapshots share nothing with the registry: callers may mutate them
/// freely, and later registrations never show up in an earlier snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'r> {
    registry: &'r ToolRegistry,
}

impl<'r> Catalog<'r> {
    /// Creates a catalog view over `registry`.
    #[must_use]
    pub fn new(registry: &'r ToolRegistry) -> Self {
        Self { registry }
    }

    /// Returns a copy of every descriptor keyed by tool name.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, ToolDescriptor> {
        let entries = self.registry.read();
        entries
            .descriptors
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
            .collect()
    }

    /// Renders the catalog as planner-facing tool definitions.
    ///
    /// Each entry carries `name`, `description` and an `input_schema`
    /// object, ordered by tool name.
    #[must_use]
    pub fn definitions(&self) -> Vec<Value> {
        self.snapshot()
            .values()
            .map(|descriptor| {
                json!({
                    "name": descriptor.name(),
                    "description": descriptor.description(),
                    "input_schema": descriptor.input_schema(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::declaration::{Annotation, ParamDecl, ToolArgs, ToolDeclaration};
    use crate::descriptor::TypeShape;

    fn declaration(name: &str) -> ToolDeclaration {
        ToolDeclaration::new(name, |_: &ToolArgs| -> anyhow::Result<Value> { Ok(Value::Null) })
            .doc(format!("The {name} tool"))
            .param(ParamDecl::annotated(
                "q",
                Annotation::described(TypeShape::named("String"), "Query", true),
            ))
    }

    #[test]
    fn snapshot_is_isolated_from_registry() {
        let registry = ToolRegistry::new();
        registry.register(declaration("search")).unwrap();
        let catalog = Catalog::new(&registry);

        let mut first = catalog.snapshot();
        first.remove("search");
        first.insert("bogus".into(), registry.list_tools()["search"].clone());

        let second = catalog.snapshot();
        assert_eq!(second.len(), 1);
        assert!(second.contains_key("search"));
        assert!(registry.contains("search"));
        assert!(!registry.contains("bogus"));
    }

    #[test]
    fn snapshot_does_not_follow_later_registrations() {
        let registry = ToolRegistry::new();
        registry.register(declaration("a")).unwrap();
        let snapshot = Catalog::new(&registry).snapshot();

        registry.register(declaration("b")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.list_tools().len(), 2);
    }

    #[test]
    fn consecutive_reads_are_equal() {
        let registry = ToolRegistry::new();
        registry.register(declaration("a")).unwrap();
        registry.register(declaration("b")).unwrap();
        let catalog = Catalog::new(&registry);

        assert_eq!(catalog.snapshot(), catalog.snapshot());
        assert_eq!(catalog.definitions(), catalog.definitions());
    }

    #[test]
    fn definitions_are_ordered_and_schema_shaped() {
        let registry = ToolRegistry::new();
        registry.register(declaration("zeta")).unwrap();
        registry.register(declaration("alpha")).unwrap();

        let definitions = Catalog::new(&registry).definitions();
        assert_eq!(definitions[0]["name"], "alpha");
        assert_eq!(definitions[1]["name"], "zeta");
        assert_eq!(definitions[0]["description"], "The alpha tool");
        assert_eq!(definitions[0]["input_schema"]["required"], json!(["q"]));
    }
}
