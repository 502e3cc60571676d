use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

/// How often a habit is meant to be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    /// Only on the weekdays listed in `Habit::custom_days`
    Custom,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Custom => "Custom",
        }
    }

    /// Parse a frequency label, falling back to `Daily` for anything unknown
    #[must_use]
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "weekly" => Self::Weekly,
            "custom" => Self::Custom,
            _ => Self::Daily,
        }
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-defined recurring task tracked for completion and streaks.
///
/// Serialized with the field names used by the remote document store, so the
/// same struct is written to the cache and to `users/<uid>/habits/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub frequency: Frequency,
    #[serde(
        rename = "customFrequencyDays",
        deserialize_with = "null_as_default"
    )]
    pub custom_days: Vec<Weekday>,
    pub reminder: bool,
    pub reminder_hour: Option<u32>,
    pub reminder_minute: Option<u32>,
    pub streak: u32,
    pub next_occurrence: String,
    /// Epoch timestamp of the last completion, 0 when never completed.
    /// Older records may hold seconds instead of milliseconds.
    #[serde(rename = "lastCompletedDate")]
    pub last_completed: i64,
}

impl Habit {
    #[must_use]
    pub fn new(name: String, category: String, frequency: Frequency) -> Self {
        Self {
            id: uuid_v4_string(),
            name,
            category,
            frequency,
            ..Self::default()
        }
    }

    /// Reminder time-of-day as `(hour, minute)`, if a reminder is configured
    #[must_use]
    pub fn reminder_time(&self) -> Option<(u32, u32)> {
        if !self.reminder {
            return None;
        }
        Some((self.reminder_hour.unwrap_or(0), self.reminder_minute.unwrap_or(0)))
    }
}

/// Signed-in account profile and preference flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct User {
    pub uid: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "profileImageUrl")]
    pub profile_image_url: Option<String>,
    pub motivation_mode: bool,
    #[serde(rename = "is_biometric_security_on")]
    pub biometric_security: bool,
    #[serde(rename = "is_pin_security_on")]
    pub pin_security: bool,
    #[serde(rename = "is_notification_sound_on")]
    pub notification_sound: bool,
    #[serde(rename = "is_notification_vibration_on")]
    pub notification_vibration: bool,
    pub notification_frequency: String,
    #[serde(rename = "is_daily_quote_notifications_on")]
    pub daily_quote_notifications: bool,
}

impl Default for User {
    fn default() -> Self {
        Self {
            uid: String::new(),
            name: String::new(),
            email: String::new(),
            profile_image_url: None,
            motivation_mode: true,
            biometric_security: false,
            pin_security: true,
            notification_sound: true,
            notification_vibration: true,
            notification_frequency: "Daily".to_string(),
            daily_quote_notifications: true,
        }
    }
}

impl User {
    #[must_use]
    pub fn new(uid: String, name: String, email: String) -> Self {
        Self {
            uid,
            name,
            email,
            ..Self::default()
        }
    }
}

/// Motivational quote shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn uuid_v4_string() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_habit_serializes_with_remote_field_names() {
        let mut habit = Habit::new("Read".to_string(), "Study".to_string(), Frequency::Custom);
        habit.custom_days = vec![Weekday::Mon, Weekday::Thu];
        habit.last_completed = 1_700_000_000_000;

        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(value["frequency"], "Custom");
        assert_eq!(value["customFrequencyDays"][0], "Mon");
        assert_eq!(value["lastCompletedDate"], 1_700_000_000_000_i64);
        assert!(value.get("custom_days").is_none());
    }

    #[test]
    fn test_habit_tolerates_sparse_remote_document() {
        let value = serde_json::json!({
            "id": "h1",
            "name": "Walk",
            "frequency": "",
            "customFrequencyDays": null,
            "completed": true
        });
        let habit: Habit = serde_json::from_value(value).unwrap();
        assert_eq!(habit.id, "h1");
        assert_eq!(habit.frequency, Frequency::Daily);
        assert!(habit.custom_days.is_empty());
        assert_eq!(habit.last_completed, 0);
    }

    #[test]
    fn test_user_defaults_fill_missing_preferences() {
        let value = serde_json::json!({
            "uid": "u1",
            "name": "Sam",
            "email": "sam@example.com",
            "createdAt": 1_700_000_000_000_i64
        });
        let user: User = serde_json::from_value(value).unwrap();
        assert!(user.motivation_mode);
        assert!(user.pin_security);
        assert!(!user.biometric_security);
        assert_eq!(user.notification_frequency, "Daily");
    }

    #[test]
    fn test_reminder_time_requires_flag() {
        let mut habit = Habit::default();
        habit.reminder_hour = Some(7);
        assert_eq!(habit.reminder_time(), None);
        habit.reminder = true;
        assert_eq!(habit.reminder_time(), Some((7, 0)));
    }
}
