use tracing::debug;

use crate::domains::providers::data::ProviderApplicationData;
use crate::domains::providers::form::{
    ApplicationForm, ApplicationSubmission, FieldErrors, FieldValue, FormField,
};

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingState {
    /// Waiting for external sign-in
    Unauthenticated,
    Loading,
    /// Read-only status; resubmission is not offered
    HasApplication(ProviderApplicationData),
    /// The lookup itself failed; `Retry` reloads
    LoadFailed { message: String },
    FormEditing {
        form: ApplicationForm,
        errors: FieldErrors,
    },
    Submitting { form: ApplicationForm },
    Submitted(ProviderApplicationData),
    /// Form is kept so the user can correct and resubmit
    SubmitError {
        form: ApplicationForm,
        message: String,
    },
}

impl OnboardingState {
    /// A request is in flight; the submit control should be disabled
    pub fn is_busy(&self) -> bool {
        matches!(self, OnboardingState::Loading | OnboardingState::Submitting { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingEvent {
    Mounted { session: Option<Session> },
    SignedIn(Session),
    SignedOut,
    ApplicationLoaded(Option<ProviderApplicationData>),
    LoadFailed { message: String },
    Retry,
    /// Re-read the application ignoring the cache
    Refresh,
    FieldChanged { field: FormField, value: FieldValue },
    SubmitRequested,
    SubmitSucceeded(ProviderApplicationData),
    SubmitFailed { message: String },
    /// Leave the error view and return to the form
    EditRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnboardingCommand {
    LoadApplication {
        identity: String,
        force_refresh: bool,
    },
    SubmitApplication {
        identity: String,
        submission: ApplicationSubmission,
    },
}

/// Onboarding machine - pure decision logic
///
/// Owns the current state; each event yields at most one command for the
/// controller to execute. Events that make no sense in the current state are
/// ignored.
pub struct OnboardingMachine {
    state: OnboardingState,
    session: Option<Session>,
}

impl OnboardingMachine {
    pub fn new() -> Self {
        Self {
            state: OnboardingState::Unauthenticated,
            session: None,
        }
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn load(&mut self, force_refresh: bool) -> Option<OnboardingCommand> {
        let identity = self.session.as_ref()?.email.clone();
        self.state = OnboardingState::Loading;
        Some(OnboardingCommand::LoadApplication {
            identity,
            force_refresh,
        })
    }

    fn submit(&mut self, form: ApplicationForm) -> Option<OnboardingCommand> {
        let Some(identity) = self.session.as_ref().map(|s| s.email.clone()) else {
            self.state = OnboardingState::Unauthenticated;
            return None;
        };
        match form.validate() {
            Ok(submission) => {
                self.state = OnboardingState::Submitting { form };
                Some(OnboardingCommand::SubmitApplication {
                    identity,
                    submission,
                })
            }
            Err(errors) => {
                // Client-side rejection: no network call
                self.state = OnboardingState::FormEditing { form, errors };
                None
            }
        }
    }

    pub fn decide(&mut self, event: OnboardingEvent) -> Option<OnboardingCommand> {
        let state = std::mem::replace(&mut self.state, OnboardingState::Unauthenticated);

        match (state, event) {
            // Session changes apply from any state
            (_, OnboardingEvent::Mounted { session: None }) | (_, OnboardingEvent::SignedOut) => {
                self.session = None;
                self.state = OnboardingState::Unauthenticated;
                None
            }
            (_, OnboardingEvent::Mounted { session: Some(session) })
            | (_, OnboardingEvent::SignedIn(session)) => {
                self.session = Some(session);
                self.load(false)
            }

            // Lookup results
            (OnboardingState::Loading, OnboardingEvent::ApplicationLoaded(Some(app))) => {
                self.state = OnboardingState::HasApplication(app);
                None
            }
            (OnboardingState::Loading, OnboardingEvent::ApplicationLoaded(None)) => {
                let form = self
                    .session
                    .as_ref()
                    .map(|s| ApplicationForm::for_user(&s.email, s.name.as_deref()))
                    .unwrap_or_default();
                self.state = OnboardingState::FormEditing {
                    form,
                    errors: FieldErrors::default(),
                };
                None
            }
            (OnboardingState::Loading, OnboardingEvent::LoadFailed { message }) => {
                self.state = OnboardingState::LoadFailed { message };
                None
            }
            (OnboardingState::LoadFailed { .. }, OnboardingEvent::Retry)
            | (OnboardingState::HasApplication(_), OnboardingEvent::Refresh)
            | (OnboardingState::Submitted(_), OnboardingEvent::Refresh) => self.load(true),

            // Editing
            (
                OnboardingState::FormEditing {
                    mut form,
                    mut errors,
                },
                OnboardingEvent::FieldChanged { field, value },
            ) => {
                form.set(field, value);
                errors.remove(field);
                self.state = OnboardingState::FormEditing { form, errors };
                None
            }
            (
                OnboardingState::SubmitError { mut form, .. },
                OnboardingEvent::FieldChanged { field, value },
            ) => {
                form.set(field, value);
                self.state = OnboardingState::FormEditing {
                    form,
                    errors: FieldErrors::default(),
                };
                None
            }
            (OnboardingState::SubmitError { form, .. }, OnboardingEvent::EditRequested) => {
                self.state = OnboardingState::FormEditing {
                    form,
                    errors: FieldErrors::default(),
                };
                None
            }

            // Submission
            (OnboardingState::FormEditing { form, .. }, OnboardingEvent::SubmitRequested)
            | (OnboardingState::SubmitError { form, .. }, OnboardingEvent::SubmitRequested) => {
                self.submit(form)
            }
            (OnboardingState::Submitting { .. }, OnboardingEvent::SubmitSucceeded(app)) => {
                self.state = OnboardingState::Submitted(app);
                None
            }
            (OnboardingState::Submitting { form }, OnboardingEvent::SubmitFailed { message }) => {
                self.state = OnboardingState::SubmitError { form, message };
                None
            }

            (state, event) => {
                debug!(?event, "Ignoring onboarding event in current state");
                self.state = state;
                None
            }
        }
    }
}

impl Default for OnboardingMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::providers::models::ProviderCategory;

    fn session() -> Session {
        Session {
            email: "a@b.com".into(),
            name: Some("Acme U".into()),
        }
    }

    fn application() -> ProviderApplicationData {
        ProviderApplicationData {
            id: "id-1".into(),
            name: "Acme U".into(),
            description: "Courses".into(),
            logo: None,
            website: None,
            provider_type: ProviderCategory::University,
            email: "a@b.com".into(),
            phone: None,
            address: None,
            country: None,
            is_verified: false,
            is_active: true,
        }
    }

    fn editing() -> OnboardingMachine {
        let mut machine = OnboardingMachine::new();
        machine.decide(OnboardingEvent::Mounted {
            session: Some(session()),
        });
        machine.decide(OnboardingEvent::ApplicationLoaded(None));
        machine
    }

    fn text(field: FormField, value: &str) -> OnboardingEvent {
        OnboardingEvent::FieldChanged {
            field,
            value: FieldValue::Text(value.into()),
        }
    }

    #[test]
    fn stays_unauthenticated_without_session() {
        let mut machine = OnboardingMachine::new();
        let cmd = machine.decide(OnboardingEvent::Mounted { session: None });
        assert_eq!(cmd, None);
        assert_eq!(machine.state(), &OnboardingState::Unauthenticated);

        assert_eq!(machine.decide(OnboardingEvent::SubmitRequested), None);
        assert_eq!(machine.state(), &OnboardingState::Unauthenticated);
    }

    #[test]
    fn mount_with_session_loads_from_cache() {
        let mut machine = OnboardingMachine::new();
        let cmd = machine.decide(OnboardingEvent::Mounted {
            session: Some(session()),
        });
        assert_eq!(
            cmd,
            Some(OnboardingCommand::LoadApplication {
                identity: "a@b.com".into(),
                force_refresh: false,
            })
        );
        assert!(machine.state().is_busy());
    }

    #[test]
    fn existing_application_is_read_only() {
        let mut machine = OnboardingMachine::new();
        machine.decide(OnboardingEvent::SignedIn(session()));
        machine.decide(OnboardingEvent::ApplicationLoaded(Some(application())));
        assert_eq!(machine.state(), &OnboardingState::HasApplication(application()));

        assert_eq!(machine.decide(OnboardingEvent::SubmitRequested), None);
        assert!(matches!(machine.state(), OnboardingState::HasApplication(_)));
    }

    #[test]
    fn absent_application_opens_prefilled_form() {
        let machine = editing();
        let OnboardingState::FormEditing { form, errors } = machine.state() else {
            panic!("expected form, got {:?}", machine.state());
        };
        assert_eq!(form.email, "a@b.com");
        assert_eq!(form.name, "Acme U");
        assert!(errors.is_empty());
    }

    #[test]
    fn invalid_submit_blocks_without_command() {
        let mut machine = editing();
        machine.decide(text(FormField::Email, "nope"));

        let cmd = machine.decide(OnboardingEvent::SubmitRequested);
        assert_eq!(cmd, None);
        let OnboardingState::FormEditing { errors, .. } = machine.state() else {
            panic!("expected form");
        };
        assert_eq!(errors.get(FormField::Description), Some("Description is required"));
        assert_eq!(errors.get(FormField::Email), Some("Please enter a valid email address"));

        // Typing clears that field's error
        machine.decide(text(FormField::Description, "Courses"));
        let OnboardingState::FormEditing { errors, .. } = machine.state() else {
            panic!("expected form");
        };
        assert_eq!(errors.get(FormField::Description), None);
        assert!(errors.get(FormField::Email).is_some());
    }

    #[test]
    fn valid_submit_issues_command_and_ignores_double_submit() {
        let mut machine = editing();
        machine.decide(text(FormField::Description, "Courses"));

        let cmd = machine.decide(OnboardingEvent::SubmitRequested);
        let Some(OnboardingCommand::SubmitApplication { identity, submission }) = cmd else {
            panic!("expected submit command");
        };
        assert_eq!(identity, "a@b.com");
        assert_eq!(submission.description, "Courses");
        assert!(machine.state().is_busy());

        assert_eq!(machine.decide(OnboardingEvent::SubmitRequested), None);
        assert!(matches!(machine.state(), OnboardingState::Submitting { .. }));
    }

    #[test]
    fn success_moves_to_submitted() {
        let mut machine = editing();
        machine.decide(text(FormField::Description, "Courses"));
        machine.decide(OnboardingEvent::SubmitRequested);
        machine.decide(OnboardingEvent::SubmitSucceeded(application()));
        assert_eq!(machine.state(), &OnboardingState::Submitted(application()));
    }

    #[test]
    fn failure_keeps_form_for_resubmission() {
        let mut machine = editing();
        machine.decide(text(FormField::Description, "Courses"));
        machine.decide(OnboardingEvent::SubmitRequested);
        machine.decide(OnboardingEvent::SubmitFailed {
            message: "Network error. Please try again.".into(),
        });

        let OnboardingState::SubmitError { form, message } = machine.state() else {
            panic!("expected error state");
        };
        assert_eq!(message, "Network error. Please try again.");
        assert_eq!(form.description, "Courses");

        let cmd = machine.decide(OnboardingEvent::SubmitRequested);
        assert!(matches!(cmd, Some(OnboardingCommand::SubmitApplication { .. })));
    }

    #[test]
    fn edit_from_error_returns_to_form() {
        let mut machine = editing();
        machine.decide(text(FormField::Description, "Courses"));
        machine.decide(OnboardingEvent::SubmitRequested);
        machine.decide(OnboardingEvent::SubmitFailed {
            message: "boom".into(),
        });
        machine.decide(OnboardingEvent::EditRequested);
        assert!(matches!(machine.state(), OnboardingState::FormEditing { .. }));
    }

    #[test]
    fn load_failure_can_be_retried() {
        let mut machine = OnboardingMachine::new();
        machine.decide(OnboardingEvent::SignedIn(session()));
        machine.decide(OnboardingEvent::LoadFailed {
            message: "Failed to fetch provider data".into(),
        });
        assert!(matches!(machine.state(), OnboardingState::LoadFailed { .. }));

        let cmd = machine.decide(OnboardingEvent::Retry);
        assert_eq!(
            cmd,
            Some(OnboardingCommand::LoadApplication {
                identity: "a@b.com".into(),
                force_refresh: true,
            })
        );
    }

    #[test]
    fn sign_out_resets() {
        let mut machine = editing();
        machine.decide(OnboardingEvent::SignedOut);
        assert_eq!(machine.state(), &OnboardingState::Unauthenticated);
        assert!(machine.session().is_none());
    }
}
