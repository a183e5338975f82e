//! Drives [`OnboardingMachine`] against the cache and the application client.
//!
//! State is published on a `watch` channel; views subscribe and render, they
//! never own it. Every command is awaited to completion and its outcome is fed
//! back as an event, so a busy state is always followed by a settled one.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domains::providers::cache::ProviderDataCache;
use crate::domains::providers::client::ApplicationClient;
use crate::domains::providers::data::ProviderApplicationData;
use crate::domains::providers::form::{FieldValue, FormField};
use crate::domains::providers::machines::{
    OnboardingCommand, OnboardingEvent, OnboardingMachine, OnboardingState, Session,
};

pub struct OnboardingController {
    machine: Mutex<OnboardingMachine>,
    cache: Arc<ProviderDataCache>,
    client: Arc<dyn ApplicationClient>,
    state_tx: watch::Sender<OnboardingState>,
}

impl OnboardingController {
    pub fn new(cache: Arc<ProviderDataCache>, client: Arc<dyn ApplicationClient>) -> Self {
        let machine = OnboardingMachine::new();
        let (state_tx, _) = watch::channel(machine.state().clone());
        Self {
            machine: Mutex::new(machine),
            cache,
            client,
            state_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> OnboardingState {
        self.state_tx.borrow().clone()
    }

    pub async fn mount(&self, session: Option<Session>) {
        self.dispatch(OnboardingEvent::Mounted { session }).await;
    }

    pub async fn change_field(&self, field: FormField, value: FieldValue) {
        self.dispatch(OnboardingEvent::FieldChanged { field, value })
            .await;
    }

    pub async fn submit(&self) {
        self.dispatch(OnboardingEvent::SubmitRequested).await;
    }

    pub async fn retry(&self) {
        self.dispatch(OnboardingEvent::Retry).await;
    }

    /// Feed an event and run whatever commands follow until the machine settles.
    pub async fn dispatch(&self, event: OnboardingEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let Some(command) = self.decide(event) else {
                break;
            };
            next = Some(self.execute(command).await);
        }
    }

    fn decide(&self, event: OnboardingEvent) -> Option<OnboardingCommand> {
        let Ok(mut machine) = self.machine.lock() else {
            warn!("Onboarding machine lock poisoned");
            return None;
        };
        let command = machine.decide(event);
        self.state_tx.send_replace(machine.state().clone());
        command
    }

    async fn execute(&self, command: OnboardingCommand) -> OnboardingEvent {
        match command {
            OnboardingCommand::LoadApplication {
                identity,
                force_refresh,
            } => match self.cache.get(&identity, force_refresh).await {
                Ok(lookup) => OnboardingEvent::ApplicationLoaded(lookup.into_option()),
                Err(e) => {
                    warn!(identity = %identity, error = %e, "Failed to load provider application");
                    OnboardingEvent::LoadFailed {
                        message: e.user_message(),
                    }
                }
            },
            OnboardingCommand::SubmitApplication {
                identity,
                submission,
            } => match self.client.submit(&submission).await {
                Ok(summary) => {
                    info!(application_id = %summary.id, "Provider application submitted");
                    let record = ProviderApplicationData::from_submission(&summary, &submission);
                    self.cache.update(&identity, record.clone()).await;
                    OnboardingEvent::SubmitSucceeded(record)
                }
                Err(e) => {
                    warn!(identity = %identity, error = %e, "Provider application rejected");
                    OnboardingEvent::SubmitFailed {
                        message: e.user_message(),
                    }
                }
            },
        }
    }
}
