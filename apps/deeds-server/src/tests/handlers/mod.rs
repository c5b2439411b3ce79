//! Handler integration tests.
//!
//! These tests call the axum handlers directly with extracted arguments,
//! backed by an in-memory SQLite store. They are organized by resource.

mod deeds;
mod groups;
mod rounds;
mod templates;
mod users;
