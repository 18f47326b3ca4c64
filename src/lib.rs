//! Doc-comment driven tools for function-calling LLM APIs.
//!
//! Annotate a function with [`tool`] and document it; its call-schema is
//! compiled from the doc comment:
//!
//! ```rust,ignore
//! use doctools::prelude::*;
//!
//! #[tool]
//! /// Return the weather forecast for a location
//! /// :param lat: float: The latitude of the location
//! /// :param lon: float: The longitude of the location
//! async fn get_weather_for_location(lat: f64, lon: f64) -> String {
//!     format!("sunny at {lat},{lon}")
//! }
//!
//! let decls = function_declarations()?;
//! ```

use once_cell::sync::OnceCell;
use serde_json::Value;

pub use doctools_core::*;
pub use doctools_macros::tool;

pub mod prelude;

static REGISTRY: OnceCell<ToolCollection> = OnceCell::new();

/// Collect every `#[tool]` function linked into the binary into a fresh
/// collection.
pub fn collect_tools() -> Result<ToolCollection, ToolError> {
    ToolCollection::collect_tools()
}

/// Process-wide collection of `#[tool]` functions, compiled on first use.
pub fn registry() -> Result<&'static ToolCollection, ToolError> {
    REGISTRY.get_or_try_init(collect_tools)
}

/// Tool definitions of every `#[tool]` function, ready for a chat request.
pub fn function_declarations() -> Result<Value, ToolError> {
    registry()?.json()
}

/// Invoke a `#[tool]` function from the process-wide registry.
pub async fn call_tool(call: FunctionCall) -> Result<ToolOutput, ToolError> {
    registry()?.call(call).await
}
