//! Core data models for the doctools library
//!
//! Descriptors going into the schema compiler, calls and outputs crossing the
//! tool-invocation boundary, and the link-time registration record emitted by
//! `#[tool]`.

use std::fmt;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DeserializationError, ToolError};

/// A callable's identifier, documentation text and declared parameter types.
///
/// Declared types are primitive type tags (`str`, `int`, `float`, `bool`,
/// `list`, `dict`) keyed by parameter name, in signature order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDescriptor {
    name: String,
    documentation: String,
    declared_types: IndexMap<String, String>,
}

impl FunctionDescriptor {
    pub fn new(name: impl Into<String>, documentation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: documentation.into(),
            declared_types: IndexMap::new(),
        }
    }

    /// Declare a parameter and its type tag.
    pub fn param(mut self, name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        self.declared_types.insert(name.into(), type_tag.into());
        self
    }

    pub fn params<'a>(self, params: impl IntoIterator<Item = &'a (&'a str, &'a str)>) -> Self {
        params
            .into_iter()
            .fold(self, |desc, (name, tag)| desc.param(*name, *tag))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn declared_type(&self, param: &str) -> Option<&str> {
        self.declared_types.get(param).map(String::as_str)
    }

    pub fn declared_types(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.declared_types
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Identifier the API attaches to a tool call; echoed back with the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(String);

impl CallId {
    /// A fresh random identifier for calls that arrive without one.
    pub fn new() -> Self {
        CallId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for CallId {
    fn from(id: String) -> Self {
        CallId(id)
    }
}

impl From<&str> for CallId {
    fn from(id: &str) -> Self {
        CallId(id.to_owned())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a function call with a name and JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CallId>,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    /// Build a call from the JSON-encoded argument string tool-calling APIs send.
    /// A blank string means no arguments.
    pub fn from_encoded(
        id: Option<CallId>,
        name: impl Into<String>,
        arguments: &str,
    ) -> Result<Self, ToolError> {
        let arguments = if arguments.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(arguments).map_err(DeserializationError::from)?
        };
        Ok(Self {
            id,
            name: name.into(),
            arguments,
        })
    }

    pub fn with_id(mut self, id: impl Into<CallId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result of one tool call, shaped for submission back to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: CallId,
    pub output: String,
}

/// Conversion of a tool function's return value into the output string.
///
/// Unit and `None` become the empty string; `Err` becomes
/// [`ToolError::Runtime`].
pub trait IntoToolOutput {
    fn into_output(self) -> Result<String, ToolError>;
}

impl IntoToolOutput for String {
    fn into_output(self) -> Result<String, ToolError> {
        Ok(self)
    }
}

impl IntoToolOutput for &str {
    fn into_output(self) -> Result<String, ToolError> {
        Ok(self.to_owned())
    }
}

impl IntoToolOutput for () {
    fn into_output(self) -> Result<String, ToolError> {
        Ok(String::new())
    }
}

impl IntoToolOutput for Value {
    fn into_output(self) -> Result<String, ToolError> {
        match self {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            other => Ok(serde_json::to_string(&other)?),
        }
    }
}

impl<T: IntoToolOutput> IntoToolOutput for Option<T> {
    fn into_output(self) -> Result<String, ToolError> {
        self.map_or_else(|| Ok(String::new()), IntoToolOutput::into_output)
    }
}

impl<T: IntoToolOutput, E: fmt::Display> IntoToolOutput for Result<T, E> {
    fn into_output(self) -> Result<String, ToolError> {
        self.map_err(|e| ToolError::Runtime(e.to_string()))?
            .into_output()
    }
}

macro_rules! display_output {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoToolOutput for $ty {
                fn into_output(self) -> Result<String, ToolError> {
                    Ok(self.to_string())
                }
            }
        )+
    };
}

display_output!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

/// Async wrapper shared by all registered tools (JSON in → string out).
pub type ToolFunc = dyn Fn(Value) -> BoxFuture<'static, Result<String, ToolError>> + Send + Sync;

/// Link-time registration record submitted by `#[tool]`.
pub struct ToolRegistration {
    /// Function identifier
    pub name: &'static str,
    /// Doc comment, one line per `///`
    pub doc: &'static str,
    /// Parameter names and type tags, in signature order
    pub params: &'static [(&'static str, &'static str)],
    /// Async wrapper  (JSON in → string out)
    pub f: fn(Value) -> BoxFuture<'static, Result<String, ToolError>>,
}

impl ToolRegistration {
    pub const fn new(
        name: &'static str,
        doc: &'static str,
        params: &'static [(&'static str, &'static str)],
        f: fn(Value) -> BoxFuture<'static, Result<String, ToolError>>,
    ) -> Self {
        Self {
            name,
            doc,
            params,
            f,
        }
    }

    pub fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor::new(self.name, self.doc).params(self.params)
    }
}
