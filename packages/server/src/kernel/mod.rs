//! Kernel module - server infrastructure and dependencies.

pub mod clock;
pub mod deps;
pub mod retry;
pub mod test_dependencies;
pub mod traits;

pub use clock::{SystemClock, TokioSleeper};
pub use deps::{AzureBlobAdapter, ServerDeps};
pub use retry::{Attempted, Backoff, Exhausted, RetryPolicy};
pub use test_dependencies::TestDependencies;
pub use traits::*;
