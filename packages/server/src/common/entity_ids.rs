//! Typed ID aliases for persisted entities.

pub use super::id::Id;

/// Marker type for provider applications.
pub struct ProviderApplicationMarker;

pub type ProviderApplicationId = Id<ProviderApplicationMarker>;
