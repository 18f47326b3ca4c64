#![deny(unsafe_code)]

pub mod error;
pub mod models;
pub mod schema;

use std::{borrow::Cow, sync::Arc};

use futures::{
    future::{self, BoxFuture},
    FutureExt,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{self, Map, Value};

pub use error::{DeserializationError, DocumentationFault, ToolError};
pub use models::{
    CallId, FunctionCall, FunctionDescriptor, IntoToolOutput, ToolFunc, ToolOutput,
    ToolRegistration,
};
pub use schema::{compile, CallSchema, FunctionDecl, JsonType, ParameterSpec, Parameters};

// Paths used by code generated from `#[tool]`.
#[doc(hidden)]
pub mod __private {
    pub use inventory;
    pub use serde;
    pub use serde_json;
}

// ============================================================================
// TOOL COLLECTION
// ============================================================================

struct ToolEntry {
    schema: CallSchema,
    func: Arc<ToolFunc>,
}

/// Registry of tool functions, each stored beside its compiled call-schema.
///
/// Iteration order is registration order.
#[derive(Default)]
pub struct ToolCollection {
    entries: IndexMap<String, ToolEntry>,
}

impl std::fmt::Debug for ToolCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCollection")
            .field("tools", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `descriptor` and register `func` under its name.
    ///
    /// `func` receives the call arguments deserialized into `I`, after
    /// documented defaults were filled in.
    pub fn register<I, O, F, Fut>(
        &mut self,
        descriptor: FunctionDescriptor,
        func: F,
    ) -> Result<&mut Self, ToolError>
    where
        I: 'static + DeserializeOwned + Send,
        O: 'static + IntoToolOutput + Send,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = O> + Send + 'static,
    {
        let func_arc: Arc<F> = Arc::new(func);
        self.insert(
            &descriptor,
            Arc::new(
                move |raw: Value| -> BoxFuture<'static, Result<String, ToolError>> {
                    let func = func_arc.clone();
                    async move {
                        let input: I =
                            serde_json::from_value(raw).map_err(DeserializationError::from)?;
                        (func)(input).await.into_output()
                    }
                    .boxed()
                },
            ),
        )?;
        Ok(self)
    }

    fn insert(
        &mut self,
        descriptor: &FunctionDescriptor,
        func: Arc<ToolFunc>,
    ) -> Result<(), ToolError> {
        let name = descriptor.name();
        if self.entries.contains_key(name) {
            return Err(ToolError::AlreadyRegistered {
                name: name.to_owned(),
            });
        }

        let schema = compile(descriptor)?;
        tracing::debug!(tool = name, "registered tool");
        self.entries
            .insert(name.to_owned(), ToolEntry { schema, func });
        Ok(())
    }

    /// Look up and invoke a tool, returning its output for the API.
    ///
    /// Calls that arrive without an id get a fresh [`CallId`].
    pub async fn call(&self, call: FunctionCall) -> Result<ToolOutput, ToolError> {
        let FunctionCall {
            id,
            name,
            arguments,
        } = call;
        let entry = self
            .entries
            .get(name.as_str())
            .ok_or_else(|| ToolError::FunctionNotFound {
                name: Cow::Owned(name.clone()),
            })?;

        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            Value::Object(mut args) => {
                entry.schema.apply_defaults(&mut args);
                Value::Object(args)
            }
            other => other,
        };

        let id = id.unwrap_or_default();
        tracing::debug!(tool = %name, call_id = %id, "calling tool");
        let output = (entry.func)(arguments).await?;
        Ok(ToolOutput {
            tool_call_id: id,
            output,
        })
    }

    /// Run a batch of calls concurrently; the first failure fails the batch.
    pub async fn call_many(
        &self,
        calls: impl IntoIterator<Item = FunctionCall>,
    ) -> Result<Vec<ToolOutput>, ToolError> {
        future::try_join_all(calls.into_iter().map(|call| self.call(call))).await
    }

    pub fn unregister(&mut self, name: &str) -> Result<(), ToolError> {
        if self.entries.shift_remove(name).is_none() {
            return Err(ToolError::FunctionNotFound {
                name: Cow::Owned(name.to_string()),
            });
        }
        Ok(())
    }

    pub fn schema(&self, name: &str) -> Option<&CallSchema> {
        self.entries.get(name).map(|entry| &entry.schema)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.schema.description.as_str()))
    }

    pub fn declarations(&self) -> Vec<FunctionDecl<'_>> {
        self.entries
            .values()
            .map(|entry| FunctionDecl::new(&entry.schema))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a collection from every `#[tool]` function linked into the
    /// binary, ordered by name.
    pub fn collect_tools() -> Result<Self, ToolError> {
        let mut hub = Self::new();

        let mut regs: Vec<&ToolRegistration> =
            inventory::iter::<ToolRegistration>.into_iter().collect();
        regs.sort_by_key(|reg| reg.name);

        for reg in regs {
            hub.insert(&reg.descriptor(), Arc::new(reg.f))?;
        }

        Ok(hub)
    }

    /// Tool definitions as a JSON array of `{"type": "function", ...}` objects.
    pub fn json(&self) -> Result<Value, ToolError> {
        Ok(serde_json::to_value(self.declarations())?)
    }
}

inventory::collect!(ToolRegistration);

// ============================================================================
// TESTS
// ============================================================================
