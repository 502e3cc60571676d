use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::helpers::{parse_weekdays, to_u32};
use super::Database;
use crate::models::{Frequency, Habit};

const HABIT_COLUMNS: &str = "id, name, description, category, frequency, custom_days, reminder,
     reminder_hour, reminder_minute, streak, next_occurrence, last_completed";

impl Database {
    /// Insert a habit or replace the row with the same id
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert or JSON serialization fails
    pub fn upsert_habit(&self, habit: &Habit) -> Result<()> {
        let conn = self.conn()?;
        Self::write_habit(&conn, habit)
    }

    /// Upsert a batch of habits in one transaction
    ///
    /// # Errors
    ///
    /// Returns an error if any upsert fails; the batch is rolled back
    pub fn upsert_habits(&self, habits: &[Habit]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for habit in habits {
            Self::write_habit(&tx, habit)?;
        }
        tx.commit()?;
        Ok(habits.len())
    }

    /// Get all cached habits
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_habits(&self) -> Result<Vec<Habit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits ORDER BY name COLLATE NOCASE, id"
        ))?;

        let habits = stmt
            .query_map([], Self::row_to_habit)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// Get a single habit by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let conn = self.conn()?;
        let habit = conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                Self::row_to_habit,
            )
            .optional()?;

        Ok(habit)
    }

    /// Delete every cached habit
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete operation fails
    pub fn clear_habits(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM habits", [])?;
        Ok(deleted)
    }

    fn write_habit(conn: &Connection, habit: &Habit) -> Result<()> {
        let custom_days_json = serde_json::to_string(&habit.custom_days)?;

        conn.execute(
            "INSERT INTO habits (id, name, description, category, frequency, custom_days, reminder,
                                 reminder_hour, reminder_minute, streak, next_occurrence, last_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                frequency = excluded.frequency,
                custom_days = excluded.custom_days,
                reminder = excluded.reminder,
                reminder_hour = excluded.reminder_hour,
                reminder_minute = excluded.reminder_minute,
                streak = excluded.streak,
                next_occurrence = excluded.next_occurrence,
                last_completed = excluded.last_completed",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.category,
                habit.frequency.as_str(),
                custom_days_json,
                i32::from(habit.reminder),
                habit.reminder_hour,
                habit.reminder_minute,
                habit.streak,
                habit.next_occurrence,
                habit.last_completed,
            ],
        )?;
        Ok(())
    }

    fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
        Ok(Habit {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            frequency: Frequency::parse_lenient(&row.get::<_, String>(4)?),
            custom_days: parse_weekdays(5, &row.get::<_, String>(5)?)?,
            reminder: row.get::<_, i32>(6)? != 0,
            reminder_hour: row.get(7)?,
            reminder_minute: row.get(8)?,
            streak: to_u32(9, row.get(9)?)?,
            next_occurrence: row.get(10)?,
            last_completed: row.get(11)?,
        })
    }
}
