/// Sign-in, sign-up and password reset command handlers
use anyhow::{bail, Result};
use habitloop_core::screens::{
    AuthEvent, CreateAccountAction, CreateAccountStore, ForgotPasswordAction,
    ForgotPasswordStore, LoginAction, LoginStore,
};
use habitloop_core::AppContainer;
use tokio::sync::mpsc::UnboundedReceiver;

/// Print every queued auth event; fails if the form reported a failure
fn finish(events: &mut UnboundedReceiver<AuthEvent>, success: &str) -> Result<()> {
    let mut failure = None;
    while let Ok(event) = events.try_recv() {
        match event {
            AuthEvent::Success => println!("{success}"),
            AuthEvent::Failure(kind) => failure = Some(kind.to_string()),
            AuthEvent::ValidationFailed(reason) => failure = Some(reason),
            AuthEvent::GoToCreateAccount | AuthEvent::GoToForgotPassword | AuthEvent::GoToLogin => {}
        }
    }
    match failure {
        Some(reason) => bail!(reason),
        None => Ok(()),
    }
}

pub async fn handle_login(app: &AppContainer, email: String, password: String) -> Result<()> {
    let (mut store, mut events) = LoginStore::new(app.auth.clone());
    store.on_action(LoginAction::EmailChanged(email)).await;
    store.on_action(LoginAction::PasswordChanged(password)).await;
    store.on_action(LoginAction::LoginClicked).await;
    finish(&mut events, "Signed in")?;

    if let Some(user) = app.auth.user() {
        println!("Welcome back, {}", user.name);
    }
    println!("{} habits in cache", app.habits.snapshot().len());
    Ok(())
}

pub async fn handle_signup(
    app: &AppContainer,
    name: String,
    email: String,
    password: String,
    confirm: String,
) -> Result<()> {
    let (mut store, mut events) = CreateAccountStore::new(app.auth.clone());
    for action in [
        CreateAccountAction::NameChanged(name),
        CreateAccountAction::EmailChanged(email),
        CreateAccountAction::PasswordChanged(password),
        CreateAccountAction::ConfirmPasswordChanged(confirm),
        CreateAccountAction::CreateAccountClicked,
    ] {
        store.on_action(action).await;
    }
    finish(&mut events, "Account created and signed in")
}

pub async fn handle_forgot_password(app: &AppContainer, email: String) -> Result<()> {
    let (mut store, mut events) = ForgotPasswordStore::new(app.auth.clone());
    store.on_action(ForgotPasswordAction::EmailChanged(email)).await;
    store.on_action(ForgotPasswordAction::SubmitClicked).await;
    finish(&mut events, "Password reset email sent")
}
