//! Tools domain module.
//!
//! Tools are executable functions that can be called by MCP clients to
//! perform specific actions: project inspection, git passthroughs, shared
//! resource access, npm scripts, flat-file stores (todos, handoff, time
//! tracking, notes), randomness, weather, and scaffolding.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per category)
//! - `router.rs` - Dynamic ToolRouter builder for the STDIO transport
//! - `registry.rs` - Central tool registry for listing metadata
//!
//! ## Adding a New Tool
//!
//! 1. Define params, `execute()`, `to_tool()`, and `create_route()` in the
//!    matching `definitions/` file (or a new one)
//! 2. Export in `definitions/mod.rs`
//! 3. Add route in `router.rs` using `with_route()`
//! 4. Register in `registry.rs`
//!
//! The `generate_tool` tool emits a starting point for steps 1-4.

pub mod definitions;
mod registry;
pub mod router;

pub use registry::ToolRegistry;
pub use router::build_tool_router;
