use super::paths::{habit_document, user_document};
use super::*;
use crate::config::SessionFile;
use crate::error::Error;
use crate::testing::{FakeAuth, FakeObjects, FakeQuotes, Fixture};
use habitloop_remote::{AuthError, RemoteError};
use habitloop_storage::{Frequency, Habit, Quote, User};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

fn habits_for(fixture: &Fixture) -> HabitRepository {
    HabitRepository::new(fixture.db.clone(), fixture.store.clone(), fixture.session.clone()).unwrap()
}

fn auth_for(fixture: &Fixture) -> (AuthRepository, Arc<HabitRepository>) {
    let habits = Arc::new(habits_for(fixture));
    let auth = AuthRepository::new(
        Arc::new(FakeAuth {
            password: "hunter22".to_string(),
        }),
        fixture.store.clone(),
        fixture.db.clone(),
        fixture.session.clone(),
        habits.clone(),
    )
    .unwrap();
    (auth, habits)
}

fn sample(name: &str) -> Habit {
    Habit::new(name.to_string(), "Health".to_string(), Frequency::Daily)
}

#[tokio::test]
async fn test_insert_is_visible_without_network() {
    let fixture = Fixture::signed_in("a@b.c");
    fixture.store.set_offline(true);
    let repo = habits_for(&fixture);
    let stream = repo.habits();

    let habit = sample("Walk");
    repo.insert_habit(&habit).await.unwrap();

    assert_eq!(*stream.borrow(), vec![habit.clone()]);
    assert_eq!(repo.habit(&habit.id).unwrap(), Some(habit));
    assert_eq!(fixture.store.doc_count(), 0);
}

#[tokio::test]
async fn test_insert_pushes_to_user_collection() {
    let fixture = Fixture::signed_in("a@b.c");
    let repo = habits_for(&fixture);

    let habit = sample("Walk");
    repo.insert_habit(&habit).await.unwrap();

    let doc = fixture
        .store
        .get(&habit_document("uid-a@b.c", &habit.id))
        .unwrap();
    assert_eq!(doc["name"], json!("Walk"));
    assert_eq!(doc["lastCompletedDate"], json!(0));
}

#[tokio::test]
async fn test_signed_out_write_stays_local() {
    let fixture = Fixture::new();
    let repo = habits_for(&fixture);

    repo.insert_habit(&sample("Walk")).await.unwrap();
    assert_eq!(repo.snapshot().len(), 1);
    assert_eq!(fixture.store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_update_twice_keeps_one_row() {
    let fixture = Fixture::new();
    let repo = habits_for(&fixture);

    let mut habit = sample("Walk");
    repo.insert_habit(&habit).await.unwrap();
    habit.streak = 4;
    repo.update_habit(&habit).await.unwrap();
    repo.update_habit(&habit).await.unwrap();

    let all = repo.snapshot();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].streak, 4);
}

#[tokio::test]
async fn test_sync_overwrites_by_id() {
    let fixture = Fixture::signed_in("a@b.c");
    let repo = habits_for(&fixture);

    let mut local = sample("Walk");
    repo.insert_habit(&local).await.unwrap();

    local.streak = 9;
    local.name = "Long walk".to_string();
    fixture.store.insert(
        &habit_document("uid-a@b.c", &local.id),
        serde_json::to_value(&local).unwrap(),
    );
    fixture.store.insert(
        &habit_document("uid-a@b.c", "remote-only"),
        json!({"name": "Stretch", "frequency": "Weekly", "customFrequencyDays": null}),
    );
    fixture.store.insert(
        &habit_document("uid-a@b.c", "broken"),
        json!({"name": 42}),
    );

    assert_eq!(repo.sync_with_remote().await.unwrap(), 2);

    let all = repo.snapshot();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Long walk");
    assert_eq!(all[0].streak, 9);
    assert_eq!(all[1].id, "remote-only");
    assert_eq!(all[1].frequency, Frequency::Weekly);
}

#[tokio::test]
async fn test_sync_propagates_remote_failure() {
    let fixture = Fixture::signed_in("a@b.c");
    fixture.store.set_offline(true);
    let repo = habits_for(&fixture);

    let err = repo.sync_with_remote().await.unwrap_err();
    assert!(matches!(err, Error::Remote(RemoteError::NoInternet)));

    let signed_out = Fixture::new();
    assert_eq!(habits_for(&signed_out).sync_with_remote().await.unwrap(), 0);
}

#[tokio::test]
async fn test_backup_restore_clear() {
    let fixture = Fixture::signed_in("a@b.c");
    fixture.store.set_offline(true);
    let repo = habits_for(&fixture);
    repo.insert_habit(&sample("Walk")).await.unwrap();
    repo.insert_habit(&sample("Read")).await.unwrap();
    fixture.store.set_offline(false);

    assert_eq!(repo.backup().await.unwrap(), 2);
    assert_eq!(fixture.store.doc_count(), 2);

    assert_eq!(repo.clear().await.unwrap(), 2);
    assert!(repo.snapshot().is_empty());
    assert_eq!(fixture.store.doc_count(), 0);

    fixture.store.insert(
        &habit_document("uid-a@b.c", "h1"),
        serde_json::to_value(sample("Swim")).unwrap(),
    );
    assert_eq!(repo.restore().await.unwrap(), 1);
    assert_eq!(repo.snapshot()[0].name, "Swim");
}

#[tokio::test]
async fn test_backup_requires_session() {
    let fixture = Fixture::new();
    let repo = habits_for(&fixture);
    assert!(matches!(repo.backup().await, Err(Error::NotSignedIn)));
    assert!(matches!(repo.restore().await, Err(Error::NotSignedIn)));
}

#[tokio::test]
async fn test_sign_in_loads_profile_and_persists_session() {
    let dir = TempDir::new().unwrap();
    let fixture = Fixture::new();
    fixture.store.insert(
        &user_document("uid-a@b.c"),
        json!({"name": "Ada", "email": "a@b.c", "motivation_mode": false}),
    );
    let (auth, _) = auth_for(&fixture);
    let auth = auth.with_session_file(SessionFile::new(dir.path().join("session.json")));
    let stream = auth.current_user();

    auth.sign_in("a@b.c", "hunter22").await.unwrap();

    assert!(auth.is_signed_in());
    let user = stream.borrow().clone().unwrap();
    assert_eq!(user.uid, "uid-a@b.c");
    assert_eq!(user.name, "Ada");
    assert!(!user.motivation_mode);
    assert!(user.pin_security);

    let saved = SessionFile::new(dir.path().join("session.json")).load().unwrap();
    assert_eq!(saved.unwrap().uid, "uid-a@b.c");
}

#[tokio::test]
async fn test_sign_in_failures_carry_auth_kind() {
    let fixture = Fixture::new();
    let (auth, _) = auth_for(&fixture);

    let err = auth.sign_in("a@b.c", "wrong").await.unwrap_err();
    assert_eq!(err.auth_kind(), AuthError::InvalidCredentials);
    let err = auth.sign_in("nobody@b.c", "hunter22").await.unwrap_err();
    assert_eq!(err.auth_kind(), AuthError::UserNotFound);
    assert!(!auth.is_signed_in());
}

#[tokio::test]
async fn test_sign_in_survives_offline_store() {
    let fixture = Fixture::new();
    fixture.store.set_offline(true);
    let (auth, _) = auth_for(&fixture);

    auth.sign_in("a@b.c", "hunter22").await.unwrap();
    assert!(auth.is_signed_in());
    assert!(auth.user().is_none());
}

#[tokio::test]
async fn test_sign_up_creates_profile_document() {
    let fixture = Fixture::new();
    let (auth, _) = auth_for(&fixture);

    auth.sign_up("Ada", "a@b.c", "secret").await.unwrap();

    let doc = fixture.store.get(&user_document("uid-a@b.c")).unwrap();
    assert_eq!(doc["name"], json!("Ada"));
    assert_eq!(doc["uid"], json!("uid-a@b.c"));
    assert!(doc["createdAt"].as_i64().unwrap() > 0);
    assert_eq!(auth.user().unwrap().email, "a@b.c");
    assert!(fixture.db.get_user("uid-a@b.c").unwrap().is_some());
}

#[tokio::test]
async fn test_forgot_password() {
    let fixture = Fixture::new();
    let (auth, _) = auth_for(&fixture);
    auth.forgot_password("a@b.c").await.unwrap();
    let err = auth.forgot_password("nobody@b.c").await.unwrap_err();
    assert_eq!(err.auth_kind(), AuthError::UserNotFound);
}

#[tokio::test]
async fn test_log_out_clears_cache() {
    let fixture = Fixture::new();
    let (auth, habits) = auth_for(&fixture);
    auth.sign_up("Ada", "a@b.c", "secret").await.unwrap();
    habits.insert_habit(&sample("Walk")).await.unwrap();

    auth.log_out().unwrap();

    assert!(!auth.is_signed_in());
    assert!(auth.user().is_none());
    assert!(habits.snapshot().is_empty());
    assert!(fixture.db.get_user("uid-a@b.c").unwrap().is_none());
    // remote copy is untouched
    assert_eq!(fixture.store.doc_count(), 2);
}

#[tokio::test]
async fn test_update_user_reports_remote_failure() {
    let fixture = Fixture::signed_in("a@b.c");
    let (auth, _) = auth_for(&fixture);
    let mut user = User::new("uid-a@b.c".to_string(), "Ada".to_string(), "a@b.c".to_string());
    user.notification_sound = false;

    fixture.store.set_offline(true);
    let err = auth.update_user(&user).await.unwrap_err();
    assert!(matches!(err, Error::Remote(RemoteError::NoInternet)));
    assert!(!fixture.db.get_user("uid-a@b.c").unwrap().unwrap().notification_sound);

    fixture.store.set_offline(false);
    auth.update_user(&user).await.unwrap();
    let doc = fixture.store.get(&user_document("uid-a@b.c")).unwrap();
    assert_eq!(doc["is_notification_sound_on"], json!(false));
}

#[tokio::test]
async fn test_quote_refresh() {
    let fixture = Fixture::new();
    let quote = Quote {
        text: "Well begun is half done.".to_string(),
        author: "Aristotle".to_string(),
    };
    let repo = QuoteRepository::new(
        fixture.db.clone(),
        Arc::new(FakeQuotes {
            quote: Some(quote.clone()),
        }),
    )
    .unwrap();
    assert!(repo.current().is_none());
    assert!(repo.refresh_quote().await.unwrap());
    assert_eq!(*repo.latest().borrow(), Some(quote.clone()));

    let offline = QuoteRepository::new(fixture.db.clone(), Arc::new(FakeQuotes { quote: None })).unwrap();
    assert_eq!(offline.current(), Some(quote.clone()));
    assert!(!offline.refresh_quote().await.unwrap());
    assert_eq!(offline.current(), Some(quote));
}

#[tokio::test]
async fn test_profile_picture_upload() {
    let objects = Arc::new(FakeObjects::default());
    let repo = ProfilePictureRepository::new(objects.clone());

    let url = repo
        .upload_profile_picture(vec![1, 2, 3], "image/png")
        .await
        .unwrap();

    let uploaded = objects.uploaded.lock().unwrap().clone();
    assert_eq!(uploaded.len(), 1);
    let (name, size, content_type) = &uploaded[0];
    assert_eq!(name.len(), 36);
    assert_eq!(*size, 3);
    assert_eq!(content_type, "image/png");
    assert_eq!(url, format!("https://objects.test/public/{name}"));

    let failing = ProfilePictureRepository::new(Arc::new(FakeObjects {
        fail: true,
        ..FakeObjects::default()
    }));
    assert!(failing.upload_profile_picture(vec![0], "image/png").await.is_err());
}
