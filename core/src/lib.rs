//! Core library for ratt
//!
//! This crate holds the backend service bootstrap, the declarative route
//! table and the router that resolves URL paths against it. Nothing here
//! depends on the HTTP server, so the same types back the `server` and the
//! `ratt` command-line tool.

pub mod error;
pub mod router;
pub mod routes;
pub mod services;

// Re-exports
pub use error::{Error, Result};
pub use router::{ActiveRoute, Navigation, Router};
pub use routes::{build_routes, Page, Resolution, RootBehavior, RouteEntry, RouteTable, RouteTarget};
pub use services::{
    initialize, AuthHandle, BlobStore, DocumentStore, ServiceConfig, ServiceEndpoints, ServiceRegistry,
    Services,
};
