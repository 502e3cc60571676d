use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::models::User;

impl Database {
    /// Insert or update the cached profile for `user.uid`
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert operation fails
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO user (uid, name, email, profile_image_url, motivation_mode, biometric_security,
                               pin_security, notification_sound, notification_vibration,
                               notification_frequency, daily_quote_notifications)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(uid) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                profile_image_url = excluded.profile_image_url,
                motivation_mode = excluded.motivation_mode,
                biometric_security = excluded.biometric_security,
                pin_security = excluded.pin_security,
                notification_sound = excluded.notification_sound,
                notification_vibration = excluded.notification_vibration,
                notification_frequency = excluded.notification_frequency,
                daily_quote_notifications = excluded.daily_quote_notifications",
            params![
                user.uid,
                user.name,
                user.email,
                user.profile_image_url,
                i32::from(user.motivation_mode),
                i32::from(user.biometric_security),
                i32::from(user.pin_security),
                i32::from(user.notification_sound),
                i32::from(user.notification_vibration),
                user.notification_frequency,
                i32::from(user.daily_quote_notifications),
            ],
        )?;
        Ok(())
    }

    /// Get the cached profile for a uid
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_user(&self, uid: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT uid, name, email, profile_image_url, motivation_mode, biometric_security,
                        pin_security, notification_sound, notification_vibration,
                        notification_frequency, daily_quote_notifications
                 FROM user WHERE uid = ?1",
                params![uid],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Remove every cached profile (sign-out)
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete operation fails
    pub fn clear_users(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM user", [])?)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            uid: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            profile_image_url: row.get(3)?,
            motivation_mode: row.get::<_, i32>(4)? != 0,
            biometric_security: row.get::<_, i32>(5)? != 0,
            pin_security: row.get::<_, i32>(6)? != 0,
            notification_sound: row.get::<_, i32>(7)? != 0,
            notification_vibration: row.get::<_, i32>(8)? != 0,
            notification_frequency: row.get(9)?,
            daily_quote_notifications: row.get::<_, i32>(10)? != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_user_updates_preferences() {
        let db = Database::in_memory().unwrap();
        let mut user = User::new("u1".to_string(), "Sam".to_string(), "sam@example.com".to_string());
        db.upsert_user(&user).unwrap();

        user.notification_sound = false;
        user.profile_image_url = Some("https://cdn.example.com/p.png".to_string());
        db.upsert_user(&user).unwrap();

        let cached = db.get_user("u1").unwrap().unwrap();
        assert_eq!(cached, user);
    }

    #[test]
    fn test_clear_users() {
        let db = Database::in_memory().unwrap();
        db.upsert_user(&User::new("u1".to_string(), "A".to_string(), "a@x".to_string()))
            .unwrap();

        assert_eq!(db.clear_users().unwrap(), 1);
        assert!(db.get_user("u1").unwrap().is_none());
    }
}
