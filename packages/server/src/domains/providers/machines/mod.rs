pub mod onboarding;

pub use onboarding::{
    OnboardingCommand, OnboardingEvent, OnboardingMachine, OnboardingState, Session,
};
