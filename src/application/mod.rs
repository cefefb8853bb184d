//! Application subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (Host header, URI)
//!     → registry.rs (snapshot of configured applications)
//!     → resolver.rs (host + base path matching, specificity score)
//!     → context.rs (active application for the rest of the request)
//!
//! Later in the same request:
//!     context.rs → rewrite_reverse(url)
//!     → routing::reverse (route table of the active application)
//! ```
//!
//! # Design Decisions
//! - Forward resolution is authoritative and fails loudly
//! - Reverse resolution is a convenience and never fails
//! - Application descriptors are immutable and shared via `Arc`

pub mod context;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod resolver;

pub use context::{ApplicationContext, ContextGuard};
pub use descriptor::{Application, ApplicationMatch};
pub use error::{NoApplicationSetError, UnknownApplicationError};
pub use registry::{ApplicationRegistry, ApplicationSource, DirectorySource};
pub use resolver::ApplicationResolver;
