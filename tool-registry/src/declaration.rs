//! Declarative parameter contracts and the invocable half of a tool.
//!
//! A [`ToolDeclaration`] is what a tool author hands to the
//! [`Registrar`](crate::Registrar): a name, documentation text, one
//! [`ParamDecl`] per parameter and the callable itself. Declarations are
//! usually generated by the `#[tool]` attribute but can be assembled by hand.

use std::fmt;
use std::sync::Arc;

use serde::Deserializer;
use serde::de::{self, DeserializeOwned, Visitor};
use serde_json::{Map, Value};

use crate::descriptor::TypeShape;
use crate::error::ArgumentError;

/// Parameter annotation: the declared type plus untyped metadata.
///
/// Well-formed metadata is exactly `[description, required]`, a string and a
/// bool. The shape is checked when the tool is registered, not here.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    shape: TypeShape,
    metadata: Vec<Value>,
}

impl Annotation {
    /// Creates an annotation with no metadata attached.
    #[must_use]
    pub fn new(shape: TypeShape) -> Self {
        Self {
            shape,
            metadata: Vec::new(),
        }
    }

    /// Creates a well-formed annotation.
    #[must_use]
    pub fn described(shape: TypeShape, description: impl Into<String>, required: bool) -> Self {
        Self::new(shape)
            .with_meta(Value::String(description.into()))
            .with_meta(Value::Bool(required))
    }

    /// Appends one metadata item.
    #[must_use]
    pub fn with_meta(mut self, item: impl Into<Value>) -> Self {
        self.metadata.push(item.into());
        self
    }

    /// Returns the declared type.
    #[must_use]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Returns the attached metadata items.
    #[must_use]
    pub fn metadata(&self) -> &[Value] {
        &self.metadata
    }
}

/// One declared parameter, annotated or not.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamDecl {
    name: String,
    annotation: Option<Annotation>,
}

impl ParamDecl {
    /// Creates an annotated parameter.
    #[must_use]
    pub fn annotated(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
        }
    }

    /// Creates a parameter without an annotation.
    #[must_use]
    pub fn unannotated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the annotation, if declared.
    #[must_use]
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }
}

/// Named invocation arguments supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one argument.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns the raw value of an argument.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Number of supplied arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extracts an argument as `T`.
    ///
    /// Only `Option<T>` accepts a missing argument, as `None`. Every other
    /// type, [`Value`] included, reports [`ArgumentError::Missing`]; an
    /// explicit `null` is still handed to `T` as supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Missing`] or [`ArgumentError::Invalid`].
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, ArgumentError> {
        match self.values.get(name) {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(|source| ArgumentError::Invalid {
                    name: name.to_owned(),
                    source,
                })
            }
            None => T::deserialize(Absent).map_err(|_| ArgumentError::Missing {
                name: name.to_owned(),
            }),
        }
    }

    /// Rejects arguments whose names are not in `declared`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::Unexpected`] naming the first unknown argument.
    pub fn deny_unknown(&self, declared: &[&str]) -> Result<(), ArgumentError> {
        match self.values.keys().find(|key| !declared.contains(&key.as_str())) {
            Some(name) => Err(ArgumentError::Unexpected { name: name.clone() }),
            None => Ok(()),
        }
    }
}

/// Stands in for an argument the caller left out.
struct Absent;

impl<'de> Deserializer<'de> for Absent {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("argument is absent"))
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_none()
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

impl From<Map<String, Value>> for ToolArgs {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl TryFrom<Value> for ToolArgs {
    type Error = Value;

    /// Accepts JSON objects; any other value is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(other),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ToolArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Callable body of a tool.
pub trait Invocable: Send + Sync {
    /// Invokes the tool with the given named arguments.
    ///
    /// # Errors
    ///
    /// Any error signals a usage problem or an internal tool failure.
    fn invoke(&self, args: &ToolArgs) -> anyhow::Result<Value>;
}

impl<F> Invocable for F
where
    F: Fn(&ToolArgs) -> anyhow::Result<Value> + Send + Sync,
{
    fn invoke(&self, args: &ToolArgs) -> anyhow::Result<Value> {
        (self)(args)
    }
}

/// Everything needed to register one tool.
#[derive(Clone)]
pub struct ToolDeclaration {
    name: String,
    doc: Option<String>,
    params: Vec<ParamDecl>,
    invocable: Arc<dyn Invocable>,
}

impl fmt::Debug for ToolDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDeclaration")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl ToolDeclaration {
    /// Starts a declaration for the named tool.
    #[must_use]
    pub fn new<T>(name: impl Into<String>, invocable: T) -> Self
    where
        T: Invocable + 'static,
    {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            invocable: Arc::new(invocable),
        }
    }

    /// Sets the documentation text used as the tool description.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a parameter declaration.
    #[must_use]
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw documentation text.
    #[must_use]
    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    pub(crate) fn into_invocable(self) -> Arc<dyn Invocable> {
        self.invocable
    }
}
