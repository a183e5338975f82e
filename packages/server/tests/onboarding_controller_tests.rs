//! Onboarding controller tests
//!
//! The controller runs the onboarding machine against a real cache and the
//! mock application client; assertions are on published state.

mod common;

use std::sync::Arc;

use crate::common::application_data;
use marketplace_core::domains::providers::machines::{OnboardingState, Session};
use marketplace_core::domains::providers::{
    FieldValue, FormField, OnboardingController, ProviderCategory, ProviderDataCache,
};
use marketplace_core::kernel::test_dependencies::{
    ManualClock, MockApplicationClient, ScriptedFailure,
};

struct Fixture {
    client: MockApplicationClient,
    cache: Arc<ProviderDataCache>,
    controller: OnboardingController,
}

fn fixture(client: MockApplicationClient) -> Fixture {
    let cache = Arc::new(ProviderDataCache::new(
        Arc::new(client.clone()),
        Arc::new(ManualClock::default()),
    ));
    let controller = OnboardingController::new(cache.clone(), Arc::new(client.clone()));
    Fixture {
        client,
        cache,
        controller,
    }
}

fn session() -> Session {
    Session {
        email: "a@b.com".to_string(),
        name: Some("Acme U".to_string()),
    }
}

async fn fill_required(controller: &OnboardingController) {
    controller
        .change_field(
            FormField::Description,
            FieldValue::Text("Online courses".to_string()),
        )
        .await;
    controller
        .change_field(FormField::Type, FieldValue::Type(ProviderCategory::Bootcamp))
        .await;
    controller
        .change_field(
            FormField::Website,
            FieldValue::Text("https://acme.edu".to_string()),
        )
        .await;
}

#[tokio::test]
async fn without_session_nothing_is_loaded() {
    let f = fixture(MockApplicationClient::new());

    f.controller.mount(None).await;

    assert_eq!(f.controller.state(), OnboardingState::Unauthenticated);
    assert_eq!(f.client.fetch_count(), 0);
}

#[tokio::test]
async fn existing_application_is_shown_read_only() {
    let f = fixture(MockApplicationClient::new().with_record(application_data("a@b.com")));

    f.controller.mount(Some(session())).await;

    match f.controller.state() {
        OnboardingState::HasApplication(data) => {
            assert_eq!(data.email, "a@b.com");
            assert_eq!(data.status(), "pending_review");
        }
        other => panic!("expected HasApplication, got {:?}", other),
    }
}

#[tokio::test]
async fn new_user_gets_prefilled_form() {
    let f = fixture(MockApplicationClient::new());

    f.controller.mount(Some(session())).await;

    match f.controller.state() {
        OnboardingState::FormEditing { form, errors } => {
            assert_eq!(form.email, "a@b.com");
            assert_eq!(form.name, "Acme U");
            assert!(errors.is_empty());
        }
        other => panic!("expected FormEditing, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_form_never_reaches_the_network() {
    let f = fixture(MockApplicationClient::new());
    f.controller.mount(Some(session())).await;

    f.controller.submit().await;

    match f.controller.state() {
        OnboardingState::FormEditing { errors, .. } => {
            assert_eq!(
                errors.get(FormField::Description),
                Some("Description is required")
            );
        }
        other => panic!("expected FormEditing, got {:?}", other),
    }
    assert!(f.client.submit_calls().is_empty());
}

#[tokio::test]
async fn successful_submit_updates_cache() {
    let f = fixture(MockApplicationClient::new());
    f.controller.mount(Some(session())).await;
    fill_required(&f.controller).await;

    f.controller.submit().await;

    let submitted = match f.controller.state() {
        OnboardingState::Submitted(data) => data,
        other => panic!("expected Submitted, got {:?}", other),
    };
    assert_eq!(submitted.provider_type, ProviderCategory::Bootcamp);
    assert_eq!(submitted.website.as_deref(), Some("https://acme.edu"));
    assert!(!submitted.is_verified);

    let submissions = f.client.submit_calls();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].email, "a@b.com");

    // Remounting is served from the updated cache
    f.controller.mount(Some(session())).await;
    assert_eq!(
        f.controller.state(),
        OnboardingState::HasApplication(submitted.clone())
    );
    assert_eq!(f.client.fetch_count(), 1);
    assert_eq!(
        f.cache.get("a@b.com", false).await.unwrap().into_option(),
        Some(submitted)
    );
}

#[tokio::test]
async fn conflict_keeps_the_form_with_server_message() {
    let f = fixture(MockApplicationClient::new());
    f.controller.mount(Some(session())).await;
    fill_required(&f.controller).await;
    f.client.fail_next_submit(ScriptedFailure::Status {
        status: 409,
        message: "Provider application with this email already exists".to_string(),
    });

    f.controller.submit().await;

    match f.controller.state() {
        OnboardingState::SubmitError { form, message } => {
            assert_eq!(message, "Provider application with this email already exists");
            assert_eq!(form.description, "Online courses");
        }
        other => panic!("expected SubmitError, got {:?}", other),
    }
}

#[tokio::test]
async fn network_failure_allows_resubmission() {
    let f = fixture(MockApplicationClient::new());
    f.controller.mount(Some(session())).await;
    fill_required(&f.controller).await;
    f.client.fail_next_submit(ScriptedFailure::Network);

    f.controller.submit().await;
    match f.controller.state() {
        OnboardingState::SubmitError { message, .. } => {
            assert_eq!(message, "Network error. Please try again.")
        }
        other => panic!("expected SubmitError, got {:?}", other),
    }

    f.controller.submit().await;
    assert!(matches!(
        f.controller.state(),
        OnboardingState::Submitted(_)
    ));
    assert_eq!(f.client.submit_calls().len(), 2);
}

#[tokio::test]
async fn load_failure_can_be_retried() {
    let f = fixture(MockApplicationClient::new().with_record(application_data("a@b.com")));
    f.client.fail_next_fetch(ScriptedFailure::Status {
        status: 500,
        message: "Failed to fetch provider data".to_string(),
    });

    f.controller.mount(Some(session())).await;
    assert_eq!(
        f.controller.state(),
        OnboardingState::LoadFailed {
            message: "Failed to fetch provider data".to_string()
        }
    );

    f.controller.retry().await;
    assert!(matches!(
        f.controller.state(),
        OnboardingState::HasApplication(_)
    ));
    assert_eq!(f.client.fetch_count(), 2);
}

#[tokio::test]
async fn subscribers_see_settled_state() {
    let f = fixture(MockApplicationClient::new());
    let mut rx = f.controller.subscribe();

    f.controller.mount(Some(session())).await;

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(!state.is_busy());
    assert!(matches!(state, OnboardingState::FormEditing { .. }));
}
