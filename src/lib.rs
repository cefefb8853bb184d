//! Multi-application request routing library.
//!
//! Maps each incoming request to the configured application that owns it
//! (by hostname and base path) and rewrites internal links into the
//! canonical URLs of that application's route table.

pub mod application;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use application::{
    Application, ApplicationContext, ApplicationMatch, ApplicationRegistry, ApplicationResolver,
};
pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
