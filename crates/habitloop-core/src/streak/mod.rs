//! Completion-state and streak arithmetic over cached habits.
//!
//! All calendar comparisons happen in the zone of the supplied `now`, so the
//! stores pass `Local::now()` and tests pass fixed-offset instants.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use habitloop_storage::Habit;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Largest value still treated as a seconds-since-epoch timestamp
pub const SECONDS_EPOCH_LIMIT: i64 = 10_000_000_000;

/// Convert a stored completion timestamp to milliseconds.
///
/// Older records were written in seconds; anything in `1..=SECONDS_EPOCH_LIMIT`
/// is scaled up, everything else (0 included) is returned as is.
#[must_use]
pub fn normalize_to_millis(ts: i64) -> i64 {
    if (1..=SECONDS_EPOCH_LIMIT).contains(&ts) {
        ts * 1000
    } else {
        ts
    }
}

/// Calendar date of a completion timestamp in `tz`, `None` when never completed
pub fn completion_date<Tz: TimeZone>(ts: i64, tz: &Tz) -> Option<NaiveDate> {
    if ts <= 0 {
        return None;
    }
    tz.timestamp_millis_opt(normalize_to_millis(ts))
        .single()
        .map(|at| at.date_naive())
}

#[must_use]
pub fn is_completed_today<Tz: TimeZone>(ts: i64, now: &DateTime<Tz>) -> bool {
    completion_date(ts, &now.timezone()) == Some(now.date_naive())
}

#[must_use]
pub fn was_completed_yesterday<Tz: TimeZone>(ts: i64, now: &DateTime<Tz>) -> bool {
    let Some(yesterday) = now.date_naive().pred_opt() else {
        return false;
    };
    completion_date(ts, &now.timezone()) == Some(yesterday)
}

/// Flip a habit's completion for today.
///
/// Completing sets the timestamp to `now` and extends the streak when the
/// previous completion was yesterday, otherwise restarts it at 1. Undoing a
/// completion made today clears the timestamp and takes one off the streak.
#[must_use]
pub fn toggle_completion<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> Habit {
    let mut next = habit.clone();
    if is_completed_today(habit.last_completed, now) {
        next.last_completed = 0;
        next.streak = habit.streak.saturating_sub(1);
    } else {
        next.streak = if was_completed_yesterday(habit.last_completed, now) {
            habit.streak.saturating_add(1)
        } else {
            1
        };
        next.last_completed = now.timestamp_millis();
    }
    next
}

/// Day identifier: consecutive calendar dates map to consecutive integers,
/// including across year boundaries.
#[must_use]
pub fn day_id(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn sorted_unique(day_ids: &[i64]) -> Vec<i64> {
    let mut days = day_ids.to_vec();
    days.sort_unstable();
    days.dedup();
    days
}

/// Length of the longest run of consecutive day identifiers
#[must_use]
pub fn longest_run(day_ids: &[i64]) -> u32 {
    let days = sorted_unique(day_ids);
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<i64> = None;
    for day in days {
        run = match previous {
            Some(prev) if day == prev + 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Length of the run of consecutive day identifiers ending exactly at `today`
#[must_use]
pub fn current_run(day_ids: &[i64], today: i64) -> u32 {
    let days: HashSet<i64> = day_ids.iter().copied().collect();
    let mut run = 0;
    let mut day = today;
    while days.contains(&day) {
        run += 1;
        day -= 1;
    }
    run
}

/// Aggregate figures shown on the profile screen and by `habitloop stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub total_habits: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Percentage of habits completed at least once
    pub completion_rate: u32,
}

#[must_use]
pub fn compute_stats<Tz: TimeZone>(habits: &[Habit], now: &DateTime<Tz>) -> HabitStats {
    if habits.is_empty() {
        return HabitStats::default();
    }

    let tz = now.timezone();
    let day_ids: Vec<i64> = habits
        .iter()
        .filter_map(|habit| completion_date(habit.last_completed, &tz))
        .map(day_id)
        .collect();

    let completed_once = habits.iter().filter(|h| h.last_completed > 0).count();
    let rate = completed_once * 100 / habits.len();

    HabitStats {
        total_habits: habits.len(),
        current_streak: current_run(&day_ids, day_id(now.date_naive())),
        longest_streak: longest_run(&day_ids),
        completion_rate: u32::try_from(rate).unwrap_or(100),
    }
}

/// Share of habits completed today, per ISO week of their next occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyProgress {
    /// `YYYY-Www`, sortable
    pub week_label: String,
    pub completion: f32,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weekly_progress<Tz: TimeZone>(habits: &[Habit], now: &DateTime<Tz>) -> Vec<WeeklyProgress> {
    let mut by_week: BTreeMap<String, (usize, usize)> = BTreeMap::new();
    for habit in habits {
        let label = habit.next_occurrence.trim();
        if label.is_empty() {
            continue;
        }
        let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") else {
            continue;
        };
        let week = date.iso_week();
        let key = format!("{}-W{:02}", week.year(), week.week());
        let entry = by_week.entry(key).or_insert((0, 0));
        entry.0 += 1;
        if is_completed_today(habit.last_completed, now) {
            entry.1 += 1;
        }
    }

    by_week
        .into_iter()
        .map(|(week_label, (total, completed))| WeeklyProgress {
            week_label,
            completion: completed as f32 / total as f32,
        })
        .collect()
}

/// Next instant at `hour:minute:00` in `now`'s zone: today if still ahead,
/// otherwise tomorrow. `None` for an invalid time of day.
#[must_use]
pub fn next_reminder_time<Tz: TimeZone>(
    hour: u32,
    minute: u32,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let at_day = |date: NaiveDate| {
        date.and_hms_opt(hour, minute, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
    };

    let today = at_day(now.date_naive())?;
    if today > *now {
        return Some(today);
    }
    at_day(now.date_naive() + Duration::days(1))
}
