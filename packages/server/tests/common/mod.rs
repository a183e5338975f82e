// Common test utilities

pub mod fixtures;
pub mod harness;
pub mod multipart;

pub use fixtures::*;
pub use harness::*;
pub use multipart::*;
