//! Descriptor model advertised for every registered tool.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Declared type of a tool parameter.
///
/// Only used for display: the rendered form ends up in [`ParamSpec::ty`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// A plain named type such as `i64` or `String`.
    Named(String),
    /// A fixed-size tuple.
    Tuple(Vec<TypeShape>),
    /// A generic type with type arguments, e.g. `Vec<String>`.
    Generic {
        /// Base type name.
        name: String,
        /// Type arguments in declaration order.
        args: Vec<TypeShape>,
    },
    /// A fixed-size array.
    Array {
        /// Element type.
        elem: Box<TypeShape>,
        /// Length expression as written.
        len: String,
    },
}

impl TypeShape {
    /// Creates a plain named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Creates a tuple type from its element types.
    #[must_use]
    pub fn tuple(elems: impl IntoIterator<Item = TypeShape>) -> Self {
        Self::Tuple(elems.into_iter().collect())
    }

    /// Creates a generic type from its base name and type arguments.
    #[must_use]
    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeShape>) -> Self {
        Self::Generic {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Creates a fixed-size array type.
    #[must_use]
    pub fn array(elem: TypeShape, len: impl Into<String>) -> Self {
        Self::Array {
            elem: Box::new(elem),
            len: len.into(),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeShape]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Tuple(elems) => {
                f.write_str("(")?;
                write_list(f, elems)?;
                if elems.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Self::Generic { name, args } => {
                write!(f, "{name}<")?;
                write_list(f, args)?;
                f.write_str(">")
            }
            Self::Array { elem, len } => write!(f, "[{elem}; {len}]"),
        }
    }
}

/// One declared parameter of a registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamSpec {
    name: String,
    description: String,
    #[serde(rename = "type")]
    ty: String,
    required: bool,
}

impl ParamSpec {
    pub(crate) fn new(name: String, description: String, ty: String, required: bool) -> Self {
        Self {
            name,
            description,
            ty,
            required,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the rendered type tag.
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Returns whether the caller must supply this parameter.
    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }
}

/// Metadata describing one registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub(crate) fn new(name: String, description: String, params: Vec<ParamSpec>) -> Self {
        Self {
            name,
            description,
            params,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the trimmed documentation text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }

    /// Renders the parameters as a JSON-Schema style object for planners.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.ty,
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
