//! Agent Commerce Library
//!
//! A JSON-RPC 2.0 / MCP tool-invocation server in front of a demo commerce
//! backend (catalog, cart, orders), plus a REST view of the same stores.

// Domain modules
pub mod commerce;
pub mod mcp;

// Infrastructure
pub mod config;
pub mod router;
