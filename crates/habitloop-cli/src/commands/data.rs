/// Sync, backup, restore, cache and quote command handlers
use anyhow::Result;
use habitloop_core::screens::{SettingsAction, SettingsEvent, SettingsStore};
use habitloop_core::AppContainer;

pub async fn handle_sync(app: &AppContainer) -> Result<()> {
    if !app.auth.is_signed_in() {
        println!("Not signed in; nothing to sync");
        return Ok(());
    }
    let count = app.habits.sync_with_remote().await?;
    println!("Synced {count} habits from the cloud");
    app.auth.refresh_current_user().await;
    Ok(())
}

/// Run one of the settings screen's data actions and print its toast
pub async fn handle_data_action(app: &AppContainer, action: SettingsAction) {
    let (mut store, mut events) = SettingsStore::new(
        app.auth.clone(),
        app.habits.clone(),
        app.quotes.clone(),
        app.scheduler.clone(),
    );
    store.on_action(action).await;
    while let Ok(SettingsEvent::Toast(message)) = events.try_recv() {
        println!("{message}");
    }
}

pub async fn handle_quote(app: &AppContainer, refresh: bool) -> Result<()> {
    let wanted = refresh || app.quotes.current().is_none();
    if wanted && !app.quotes.refresh_quote().await? {
        println!("Could not reach the quote service, showing the cached quote");
    }
    match app.quotes.current() {
        Some(quote) => println!("\"{}\"\n  - {}", quote.text, quote.author),
        None => println!("No quote cached yet"),
    }
    Ok(())
}
