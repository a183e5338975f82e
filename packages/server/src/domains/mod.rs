// Business domains
pub mod auth;
pub mod providers;
pub mod uploads;
