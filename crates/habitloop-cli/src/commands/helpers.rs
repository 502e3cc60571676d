//! Helper utility functions for CLI commands

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use habitloop_storage::Habit;
use std::path::Path;

/// Safely truncate a string to a maximum number of characters (not bytes).
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Parse a `HH:MM` time of day
pub fn parse_time(s: &str) -> Result<(u32, u32)> {
    let (hour, minute) = s
        .split_once(':')
        .with_context(|| format!("Expected HH:MM, got '{s}'"))?;
    let hour: u32 = hour.trim().parse().with_context(|| format!("Invalid hour in '{s}'"))?;
    let minute: u32 = minute
        .trim()
        .parse()
        .with_context(|| format!("Invalid minute in '{s}'"))?;
    if hour > 23 || minute > 59 {
        bail!("Time out of range: {s}");
    }
    Ok((hour, minute))
}

/// Parse a comma-separated weekday list such as `mon,wed,fri`
pub fn parse_weekdays(s: &str) -> Result<Vec<Weekday>> {
    let mut days = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: Weekday = part
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown weekday: {part}"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Parse `on`/`off` style switches
pub fn parse_switch(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("Expected on or off, got '{other}'"),
    }
}

pub fn switch_label(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Image content type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Find the habit whose id starts with `prefix`; the prefix must be unambiguous
pub fn resolve_habit<'a>(habits: &'a [Habit], prefix: &str) -> Result<&'a Habit> {
    if let Some(exact) = habits.iter().find(|h| h.id == prefix) {
        return Ok(exact);
    }
    let matches: Vec<&Habit> = habits.iter().filter(|h| h.id.starts_with(prefix)).collect();
    match matches.as_slice() {
        [one] => Ok(one),
        [] => bail!("No habit with id {prefix}"),
        _ => bail!("Id prefix {prefix} matches {} habits", matches.len()),
    }
}

/// Hide all but the first few characters of a secret
pub fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    format!("{}***", s.chars().take(6).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitloop_storage::Frequency;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 5), "hello");
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("07:30").unwrap(), (7, 30));
        assert_eq!(parse_time("23:59").unwrap(), (23, 59));
        assert!(parse_time("24:00").is_err());
        assert!(parse_time("7").is_err());
        assert!(parse_time("aa:bb").is_err());
    }

    #[test]
    fn test_parse_weekdays() {
        assert_eq!(
            parse_weekdays("mon, Wed,friday,mon").unwrap(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
        assert!(parse_weekdays("").unwrap().is_empty());
        assert!(parse_weekdays("mon,funday").is_err());
    }

    #[test]
    fn test_parse_switch() {
        assert!(parse_switch("ON").unwrap());
        assert!(!parse_switch("off").unwrap());
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("me.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("me.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("me")), "application/octet-stream");
    }

    #[test]
    fn test_resolve_habit() {
        let mut a = Habit::new("Walk".to_string(), "Health".to_string(), Frequency::Daily);
        a.id = "abc123".to_string();
        let mut b = Habit::new("Read".to_string(), "Study".to_string(), Frequency::Daily);
        b.id = "abd456".to_string();
        let habits = vec![a, b];

        assert_eq!(resolve_habit(&habits, "abc").unwrap().name, "Walk");
        assert_eq!(resolve_habit(&habits, "abd456").unwrap().name, "Read");
        assert!(resolve_habit(&habits, "ab").is_err());
        assert!(resolve_habit(&habits, "zzz").is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AIzaSyExampleKey"), "AIzaSy***");
        assert_eq!(mask_secret(""), "");
    }
}
