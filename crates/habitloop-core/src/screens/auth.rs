//! Login, create-account and forgot-password forms.

use habitloop_remote::AuthError;
use log::warn;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use super::emit;
use crate::error::Result;
use crate::repository::AuthRepository;

/// One-shot outcome of an auth form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Signed in; the dashboard is next
    Success,
    Failure(AuthError),
    /// Rejected locally before contacting the identity service
    ValidationFailed(String),
    GoToCreateAccount,
    GoToForgotPassword,
    GoToLogin,
}

fn report(events: &mpsc::UnboundedSender<AuthEvent>, outcome: Result<()>) {
    match outcome {
        Ok(()) => emit(events, AuthEvent::Success),
        Err(e) => {
            warn!("Authentication failed: {}", e);
            emit(events, AuthEvent::Failure(e.auth_kind()));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginState {
    pub email: String,
    pub password: String,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    EmailChanged(String),
    PasswordChanged(String),
    LoginClicked,
    CreateAccountClicked,
    ForgotPasswordClicked,
}

pub struct LoginStore {
    state: watch::Sender<LoginState>,
    events: mpsc::UnboundedSender<AuthEvent>,
    auth: Arc<AuthRepository>,
}

impl LoginStore {
    #[must_use]
    pub fn new(auth: Arc<AuthRepository>) -> (Self, mpsc::UnboundedReceiver<AuthEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: watch::channel(LoginState::default()).0,
            events,
            auth,
        };
        (store, receiver)
    }

    #[must_use]
    pub fn current(&self) -> LoginState {
        self.state.borrow().clone()
    }

    pub async fn on_action(&mut self, action: LoginAction) {
        match action {
            LoginAction::EmailChanged(email) => self.state.send_modify(|s| s.email = email),
            LoginAction::PasswordChanged(password) => {
                self.state.send_modify(|s| s.password = password);
            }
            LoginAction::CreateAccountClicked => emit(&self.events, AuthEvent::GoToCreateAccount),
            LoginAction::ForgotPasswordClicked => {
                emit(&self.events, AuthEvent::GoToForgotPassword);
            }
            LoginAction::LoginClicked => {
                let form = self.current();
                if form.email.trim().is_empty() || form.password.is_empty() {
                    emit(
                        &self.events,
                        AuthEvent::ValidationFailed("Email and password are required".to_string()),
                    );
                    return;
                }
                self.state.send_modify(|s| s.is_loading = true);
                let outcome = self.auth.sign_in(form.email.trim(), &form.password).await;
                self.state.send_modify(|s| s.is_loading = false);
                report(&self.events, outcome);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateAccountState {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub is_loading: bool,
}

impl CreateAccountState {
    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.password.is_empty() {
            return Err("All fields are required");
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateAccountAction {
    NameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    ConfirmPasswordChanged(String),
    CreateAccountClicked,
    LoginClicked,
}

pub struct CreateAccountStore {
    state: watch::Sender<CreateAccountState>,
    events: mpsc::UnboundedSender<AuthEvent>,
    auth: Arc<AuthRepository>,
}

impl CreateAccountStore {
    #[must_use]
    pub fn new(auth: Arc<AuthRepository>) -> (Self, mpsc::UnboundedReceiver<AuthEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: watch::channel(CreateAccountState::default()).0,
            events,
            auth,
        };
        (store, receiver)
    }

    #[must_use]
    pub fn current(&self) -> CreateAccountState {
        self.state.borrow().clone()
    }

    pub async fn on_action(&mut self, action: CreateAccountAction) {
        match action {
            CreateAccountAction::NameChanged(name) => self.state.send_modify(|s| s.name = name),
            CreateAccountAction::EmailChanged(email) => self.state.send_modify(|s| s.email = email),
            CreateAccountAction::PasswordChanged(password) => {
                self.state.send_modify(|s| s.password = password);
            }
            CreateAccountAction::ConfirmPasswordChanged(password) => {
                self.state.send_modify(|s| s.confirm_password = password);
            }
            CreateAccountAction::LoginClicked => emit(&self.events, AuthEvent::GoToLogin),
            CreateAccountAction::CreateAccountClicked => {
                let form = self.current();
                if let Err(reason) = form.validate() {
                    emit(&self.events, AuthEvent::ValidationFailed(reason.to_string()));
                    return;
                }
                self.state.send_modify(|s| s.is_loading = true);
                let outcome = self
                    .auth
                    .sign_up(form.name.trim(), form.email.trim(), &form.password)
                    .await;
                self.state.send_modify(|s| s.is_loading = false);
                report(&self.events, outcome);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordState {
    pub email: String,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgotPasswordAction {
    EmailChanged(String),
    SubmitClicked,
    BackToLoginClicked,
}

pub struct ForgotPasswordStore {
    state: watch::Sender<ForgotPasswordState>,
    events: mpsc::UnboundedSender<AuthEvent>,
    auth: Arc<AuthRepository>,
}

impl ForgotPasswordStore {
    #[must_use]
    pub fn new(auth: Arc<AuthRepository>) -> (Self, mpsc::UnboundedReceiver<AuthEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let store = Self {
            state: watch::channel(ForgotPasswordState::default()).0,
            events,
            auth,
        };
        (store, receiver)
    }

    #[must_use]
    pub fn current(&self) -> ForgotPasswordState {
        self.state.borrow().clone()
    }

    pub async fn on_action(&mut self, action: ForgotPasswordAction) {
        match action {
            ForgotPasswordAction::EmailChanged(email) => self.state.send_modify(|s| s.email = email),
            ForgotPasswordAction::BackToLoginClicked => emit(&self.events, AuthEvent::GoToLogin),
            ForgotPasswordAction::SubmitClicked => {
                let email = self.current().email.trim().to_string();
                if email.is_empty() {
                    emit(&self.events, AuthEvent::ValidationFailed("Email is required".to_string()));
                    return;
                }
                self.state.send_modify(|s| s.is_loading = true);
                let outcome = self.auth.forgot_password(&email).await;
                self.state.send_modify(|s| s.is_loading = false);
                report(&self.events, outcome);
            }
        }
    }
}
