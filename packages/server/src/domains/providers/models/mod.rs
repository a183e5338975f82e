pub mod provider_application;

pub use provider_application::{
    ApplicationFilter, CreateProviderApplication, ProviderApplication, ProviderCategory,
};
