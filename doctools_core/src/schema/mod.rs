//! Call-schema model and the documentation compiler.
//!
//! [`compile`] turns a [`FunctionDescriptor`] into a [`CallSchema`]; the
//! schema is wrapped as a [`FunctionDecl`] for tool-calling APIs.

mod docstring;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::models::FunctionDescriptor;
use docstring::DocBlock;

/// JSON-schema type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl JsonType {
    /// Map a declared type token; anything unrecognised is a string.
    pub fn from_type_token(token: &str) -> Self {
        match token {
            "int" => JsonType::Integer,
            "float" => JsonType::Number,
            "bool" => JsonType::Boolean,
            "list" => JsonType::Array,
            "dict" => JsonType::Object,
            _ => JsonType::String,
        }
    }

    /// Turn a raw `Default:` value into a JSON value of this type, or keep
    /// the raw text when it does not parse.
    pub fn coerce(self, raw: &str) -> Value {
        let parsed = match self {
            JsonType::String => Some(Value::String(raw.trim_matches('"').to_owned())),
            JsonType::Integer => raw.parse::<i64>().ok().map(Value::from),
            JsonType::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            JsonType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            JsonType::Array => serde_json::from_str::<Value>(raw)
                .ok()
                .filter(Value::is_array),
            JsonType::Object => serde_json::from_str::<Value>(raw)
                .ok()
                .filter(Value::is_object),
        };
        parsed.unwrap_or_else(|| Value::String(raw.to_owned()))
    }
}

/// Schema of a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub json_type: JsonType,
    pub description: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// The `parameters` object of a call-schema.
///
/// A function without documented parameters serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Parameters {
    Object {
        #[serde(rename = "type")]
        kind: JsonType,
        properties: IndexMap<String, ParameterSpec>,
        required: Vec<String>,
    },
    Empty {},
}

impl Parameters {
    pub fn from_properties(properties: IndexMap<String, ParameterSpec>) -> Self {
        if properties.is_empty() {
            return Parameters::Empty {};
        }
        let required = properties
            .iter()
            .filter(|(_, spec)| spec.is_required())
            .map(|(name, _)| name.clone())
            .collect();
        Parameters::Object {
            kind: JsonType::Object,
            properties,
            required,
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &ParameterSpec)> + '_ {
        let props = match self {
            Parameters::Object { properties, .. } => Some(properties),
            Parameters::Empty {} => None,
        };
        props
            .into_iter()
            .flat_map(|p| p.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn property(&self, name: &str) -> Option<&ParameterSpec> {
        match self {
            Parameters::Object { properties, .. } => properties.get(name),
            Parameters::Empty {} => None,
        }
    }

    pub fn required(&self) -> &[String] {
        match self {
            Parameters::Object { required, .. } => required.as_slice(),
            Parameters::Empty {} => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Parameters::Empty {})
    }
}

/// Compiled call-schema of one tool function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSchema {
    pub name: String,
    pub description: String,
    pub parameters: Parameters,
}

impl CallSchema {
    /// Insert documented defaults for arguments the caller left out.
    pub fn apply_defaults(&self, arguments: &mut Map<String, Value>) {
        for (name, spec) in self.parameters.properties() {
            if let Some(raw) = &spec.default {
                if !arguments.contains_key(name) {
                    arguments.insert(name.to_owned(), spec.json_type.coerce(raw));
                }
            }
        }
    }
}

/// `FunctionDecl` – the tool-definition wrapper expected by tool-calling APIs.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDecl<'a> {
    #[serde(rename = "type")]
    pub function_type: &'static str,
    pub function: &'a CallSchema,
}

impl<'a> FunctionDecl<'a> {
    pub fn new(function: &'a CallSchema) -> Self {
        Self {
            function_type: "function",
            function,
        }
    }
}

/// Compile a function's documentation and declared types into its call-schema.
pub fn compile(descriptor: &FunctionDescriptor) -> Result<CallSchema, ToolError> {
    let name = descriptor.name();
    let block = DocBlock::parse(name, descriptor.documentation())?;

    let mut properties = IndexMap::with_capacity(block.params.len());
    for param in &block.params {
        let json_type = resolve_type(descriptor, &param.name, &param.type_token);
        let text = param.text();
        let spec = ParameterSpec {
            json_type,
            description: text.description,
            enum_values: text.enum_values,
            default: text.default,
        };
        if properties.insert(param.name.clone(), spec).is_some() {
            tracing::warn!(function = name, param = %param.name, "parameter documented twice, keeping the last entry");
        }
    }

    let has_signature = descriptor.declared_types().next().is_some();
    for (param, _) in descriptor.declared_types() {
        if !properties.contains_key(param) {
            tracing::warn!(function = name, param, "parameter is not documented");
        }
    }
    if has_signature {
        for documented in properties.keys() {
            if descriptor.declared_type(documented).is_none() {
                tracing::warn!(function = name, param = %documented, "documented parameter is not in the signature");
            }
        }
    }

    tracing::debug!(function = name, params = properties.len(), "compiled call schema");
    Ok(CallSchema {
        name: name.to_owned(),
        description: block.description,
        parameters: Parameters::from_properties(properties),
    })
}

fn resolve_type(descriptor: &FunctionDescriptor, param: &str, token: &str) -> JsonType {
    let declared = descriptor.declared_type(param);
    if token.is_empty() {
        return declared.map_or(JsonType::String, JsonType::from_type_token);
    }

    let json_type = JsonType::from_type_token(token);
    if let Some(declared) = declared {
        let declared_type = JsonType::from_type_token(declared);
        if declared_type != json_type {
            tracing::warn!(
                function = descriptor.name(),
                param,
                documented = token,
                declared,
                "documented type disagrees with the signature"
            );
        }
    }
    json_type
}
