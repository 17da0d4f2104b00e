//! Tool contract and registry for Chalice.
//!
//! A [`Tool`] is a named capability with a declarative [`ParameterSchema`]
//! and an async `execute`. Tools live in a [`ToolRegistry`], which resolves a
//! name, checks required parameters and runs the tool:
//!
//! ```text
//! dispatch(name, args)
//!        │
//!        ▼
//! ┌──────────────┐  missing   ┌────────────────────┐
//! │   lookup     │──────────▶│ ToolError::NotFound │
//! └──────────────┘            └────────────────────┘
//!        │
//!        ▼
//! ┌──────────────┐  absent    ┌─────────────────────────────┐
//! │  validate    │──────────▶│ ToolError::MissingParameters │
//! └──────────────┘            └─────────────────────────────┘
//!        │
//!        ▼
//! ┌──────────────┐  Err/panic ┌────────────────────┐
//! │   execute    │──────────▶│ ToolError::Execution│
//! └──────────────┘            └────────────────────┘
//!        │
//!        ▼
//!    Ok(Value)
//! ```
//!
//! `dispatch_json` flattens either side into the JSON payload handed back to a
//! model, so callers always branch on data.

pub mod alias;
pub mod error;
pub mod invoke;
pub mod registry;
pub mod schema;
pub mod spec;
pub mod validation;


pub use alias::AliasedTool;
pub use error::{Result, ToolError};
pub use invoke::{into_payload, invoke_tool};
pub use registry::ToolRegistry;
pub use schema::{ParameterSchema, PropertySchema};
pub use spec::{
    DEFAULT_RETURNS, FunctionTool, Tool, ToolArgs, ToolDefinition, ToolSpec, args_from_value,
    parse_args,
};
pub use validation::{ValidationMode, validate_args};
