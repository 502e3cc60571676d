use anyhow::Result;
use rusqlite::Connection;

/// Version of the cache schema compiled into this build.
///
/// Bump whenever a table definition changes. Older caches are dropped and
/// rebuilt; everything in them can be pulled again from the remote store.
pub const SCHEMA_VERSION: i32 = 4;

const TABLES: [&str; 3] = ["habits", "quotes", "user"];

/// Initialize database schema, rebuilding it when the stored version differs
///
/// # Errors
///
/// Returns an error if reading the version pragma or any DDL statement fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    let stored: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if stored != SCHEMA_VERSION {
        if stored != 0 {
            log::warn!(
                "Cache schema version {stored} does not match {SCHEMA_VERSION}, rebuilding cache"
            );
        }
        drop_all(conn)?;
    }

    // Habits table - local copy of users/<uid>/habits
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            frequency TEXT NOT NULL,
            custom_days TEXT NOT NULL DEFAULT '[]',
            reminder INTEGER NOT NULL,
            reminder_hour INTEGER,
            reminder_minute INTEGER,
            streak INTEGER NOT NULL DEFAULT 0,
            next_occurrence TEXT NOT NULL DEFAULT '',
            last_completed INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // Quotes table - only the latest row is ever read
    conn.execute(
        "CREATE TABLE IF NOT EXISTS quotes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL,
            author TEXT NOT NULL
        )",
        [],
    )?;

    // User table - signed-in profile and preferences
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user (
            uid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            profile_image_url TEXT,
            motivation_mode INTEGER NOT NULL DEFAULT 1,
            biometric_security INTEGER NOT NULL DEFAULT 0,
            pin_security INTEGER NOT NULL DEFAULT 1,
            notification_sound INTEGER NOT NULL DEFAULT 1,
            notification_vibration INTEGER NOT NULL DEFAULT 1,
            notification_frequency TEXT NOT NULL DEFAULT 'Daily',
            daily_quote_notifications INTEGER NOT NULL DEFAULT 1
        )",
        [],
    )?;

    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;

    Ok(())
}

fn drop_all(conn: &Connection) -> Result<()> {
    for table in TABLES {
        conn.execute(&format!("DROP TABLE IF EXISTS {table}"), [])?;
    }
    log::info!("Dropped cache tables: {}", TABLES.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_count(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('habits', 'quotes', 'user')",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_init_schema_creates_tables_and_sets_version() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(table_count(&conn), 3);
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_init_schema_is_idempotent_for_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute("INSERT INTO quotes (text, author) VALUES ('a', 'b')", [])
            .unwrap();

        init_schema(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_version_mismatch_destroys_old_data() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE habits (id TEXT PRIMARY KEY, name TEXT, completed INTEGER);
             INSERT INTO habits (id, name, completed) VALUES ('h1', 'old', 1);
             PRAGMA user_version = 2;",
        )
        .unwrap();

        init_schema(&conn).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
        // New column exists after the rebuild
        conn.execute("UPDATE habits SET last_completed = 0", []).unwrap();
    }

    #[test]
    fn test_unversioned_cache_is_rebuilt() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE habits (id TEXT PRIMARY KEY, name TEXT, completed INTEGER);
             INSERT INTO habits (id, name, completed) VALUES ('h1', 'legacy', 0);",
        )
        .unwrap();

        init_schema(&conn).unwrap();

        conn.execute("UPDATE habits SET last_completed = 0", []).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM habits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }
}
