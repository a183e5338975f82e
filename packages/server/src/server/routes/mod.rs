// HTTP routes
pub mod admin;
pub mod health;
pub mod provider_apply;

pub use admin::*;
pub use health::*;
pub use provider_apply::*;
