//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Forward (request → application):
//!     matcher.rs (exact / glob hostname, base path scoping)
//!
//! Reverse (link → canonical URL):
//!     handler.rs (path → handler identity)
//!     → table.rs (handler → ordered route patterns)
//!     → reverse.rs (pick pattern, substitute parameters)
//!     → rewrite.rs (mount under base path, rewrite documents)
//!
//! Route compilation (at config load):
//!     "$language[en,nl]/product/$id"
//!     → pattern.rs (tagged segments)
//!     → frozen in the application's RouteTable
//! ```
//!
//! # Design Decisions
//! - Patterns parsed once, never re-parsed per request
//! - No regex in the matching path
//! - Deterministic: same input always yields the same route

pub mod handler;
pub mod matcher;
pub mod pattern;
pub mod reverse;
pub mod rewrite;
pub mod table;

pub use handler::{ConfiguredResolver, HandlerResolver};
pub use pattern::{PatternError, RoutePattern, Segment};
pub use reverse::{QueryParams, ReverseResolver};
pub use table::{HandlerId, RouteMatch, RouteTable};
