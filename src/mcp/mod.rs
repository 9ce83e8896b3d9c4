//! Model Context Protocol (MCP) Module
//!
//! This module contains the protocol core, including:
//! - Protocol models (envelopes, descriptors, constants) and errors
//! - Request validation and argument schema checking
//! - Schema registry, session negotiator and dispatcher
//! - Tool handlers, resources and prompts over the commerce collaborators
//! - HTTP and stdio transports, plus idle-session eviction

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod prompts;
pub mod reaper;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod session;
pub mod stdio;
pub mod tools;
pub mod validator;

// Re-export commonly used types and functions
pub use dispatcher::{Dispatched, Dispatcher};
pub use error::{McpError, McpResult, RegistryError};
pub use handlers::{routes, SharedDispatcher};
pub use registry::SchemaRegistry;
