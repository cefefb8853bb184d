//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! app-router.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!
//! <application_path>/<name>/config/*.toml
//!     → loader.rs (merge files in name order, deserialize)
//!     → validation.rs (hostnames, routes)
//!     → Application (route patterns compiled once)
//!
//! On change below application_path:
//!     watcher.rs detects change
//!     → ApplicationRegistry::refresh
//!     → atomic swap of the application snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All router fields have defaults to allow minimal configs
//! - A broken application is skipped, the others still load

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{ApplicationConfig, RouteConfig, RouterConfig};
