//! Auth domain - session tokens issued after sign-in with the external
//! identity provider, and the admin policy.

pub mod errors;
pub mod jwt;

pub use errors::AuthError;
pub use jwt::{is_admin, Claims, JwtService};
