use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::models::Quote;

impl Database {
    /// Append a quote; the newest row is the one shown
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert operation fails
    pub fn insert_quote(&self, quote: &Quote) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO quotes (text, author) VALUES (?1, ?2)",
            params![quote.text, quote.author],
        )?;
        Ok(())
    }

    /// Get the most recently stored quote
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn latest_quote(&self) -> Result<Option<Quote>> {
        let conn = self.conn()?;
        let quote = conn
            .query_row(
                "SELECT text, author FROM quotes ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(Quote {
                        text: row.get(0)?,
                        author: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_quote_returns_newest() {
        let db = Database::in_memory().unwrap();
        assert!(db.latest_quote().unwrap().is_none());

        for (text, author) in [("First", "A"), ("Second", "B")] {
            db.insert_quote(&Quote {
                text: text.to_string(),
                author: author.to_string(),
            })
            .unwrap();
        }

        let latest = db.latest_quote().unwrap().unwrap();
        assert_eq!(latest.text, "Second");
        assert_eq!(latest.author, "B");
    }
}
