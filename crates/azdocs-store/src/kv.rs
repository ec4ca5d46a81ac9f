use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::models::Entry;

impl Database {
    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_value(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }

    pub fn list_entries(&self) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT key, value, updated_at FROM kv ORDER BY key")?;

        let rows = stmt.query_map([], row_to_entry)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    let key: String = row.get(0)?;
    let value: String = row.get(1)?;
    let ts_str: String = row.get(2)?;

    let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Entry {
        key,
        value,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_overwrite_remove() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_value("k").unwrap(), None);

        db.set_value("k", "one").unwrap();
        db.set_value("k", "two").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("two"));
        assert_eq!(db.list_entries().unwrap().len(), 1);

        assert!(db.remove_value("k").unwrap());
        assert!(!db.remove_value("k").unwrap());
        assert_eq!(db.get_value("k").unwrap(), None);
    }
}
