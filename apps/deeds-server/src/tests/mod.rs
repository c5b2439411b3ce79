//! Server unit and integration tests.
//!
//! Tests are organized into modules by feature area:
//! - `common` - Shared test helpers and utilities
//! - `handlers` - Handler tests calling the axum handlers directly
//! - `router` - Requests through the full router (routing, JSON, errors, CORS)

pub mod common;

mod handlers;
