/// Foreground reminder runner
use anyhow::Result;
use chrono::Local;
use habitloop_core::streak::next_reminder_time;
use habitloop_core::AppContainer;
use log::info;
use std::time::Duration;

/// Schedule every habit reminder plus the daily quote and run until Ctrl-C.
/// Reminders re-arm for the next day after they fire.
pub async fn handle_remind(app: &AppContainer) -> Result<()> {
    let quotes_on = app
        .auth
        .user()
        .map(|user| user.daily_quote_notifications)
        .unwrap_or(true);
    if quotes_on {
        app.scheduler.schedule_daily_quote(app.quotes.clone());
    }

    let scheduled = arm_reminders(app);
    println!(
        "{scheduled} reminders scheduled{}. Press Ctrl-C to stop.",
        if quotes_on { ", daily quote on" } else { "" }
    );

    let mut rearm = tokio::time::interval(Duration::from_secs(60 * 60));
    rearm.tick().await;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = rearm.tick() => {
                if app.scheduler.active_count() <= usize::from(quotes_on) {
                    let count = arm_reminders(app);
                    info!("Re-armed {} reminders", count);
                }
            }
        }
    }

    app.scheduler.cancel_all();
    println!("Stopped reminders");
    Ok(())
}

fn arm_reminders(app: &AppContainer) -> usize {
    let now = Local::now();
    let mut count = 0;
    for habit in app.habits.snapshot() {
        let Some((hour, minute)) = habit.reminder_time() else {
            continue;
        };
        if let Some(at) = next_reminder_time(hour, minute, &now) {
            if app.scheduler.schedule_reminder(&habit, &at) {
                println!("  {} at {}", habit.name, at.format("%a %H:%M"));
                count += 1;
            }
        }
    }
    count
}
