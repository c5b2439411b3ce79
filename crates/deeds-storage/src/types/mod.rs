//! Type definitions for deeds storage.

mod assignments;
mod groups;
mod ids;
mod members;
mod rounds;
mod templates;

// Re-export all types from submodules
pub use assignments::*;
pub use groups::*;
pub use ids::*;
pub use members::*;
pub use rounds::*;
pub use templates::*;
