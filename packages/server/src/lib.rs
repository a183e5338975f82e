// Course Marketplace - API Core
//
// Backend for provider onboarding: the "become a provider" application flow,
// logo uploads to blob storage, and the admin review listing.
//
// Domains live in domains/*, infrastructure seams in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
