//! Provider application actions - business logic functions
//!
//! Actions are async functions called from the HTTP handlers.
//! They do the work and return results directly.

mod apply;
mod queries;

pub use apply::*;
pub use queries::*;
