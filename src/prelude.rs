//! Convenient re-exports for common usage patterns.
//!
//! ```rust
//! use doctools::prelude::*;
//! ```

// Core functionality
pub use crate::{call_tool, collect_tools, function_declarations, registry};

// Essential types
pub use crate::{
    CallId, CallSchema, FunctionCall, FunctionDecl, FunctionDescriptor, IntoToolOutput,
    ToolCollection, ToolError, ToolOutput,
};

// Macros
pub use crate::tool;

// Commonly used external types
pub use serde_json::{json, Value};
