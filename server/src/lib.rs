//! ratt server
//!
//! Serves the application shell: the host document with the root component
//! mounted into it, page fragments for in-app navigation, and a health
//! endpoint.

pub mod config;
pub mod routes;
pub mod shell;
pub mod state;
pub mod templates;
