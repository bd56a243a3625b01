//! Database schema and preference storage

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

const DARK_MODE_KEY: &str = "dark_mode";

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- User preferences that survive across sessions
        CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn get_preference(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM preferences WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn set_preference(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
        (key, value),
    )?;
    Ok(())
}

/// Load the dark mode preference, off when never saved
pub fn load_dark_mode(conn: &Connection) -> Result<bool> {
    Ok(get_preference(conn, DARK_MODE_KEY)?.is_some_and(|value| value == "true"))
}

pub fn save_dark_mode(conn: &Connection, enabled: bool) -> Result<()> {
    set_preference(conn, DARK_MODE_KEY, if enabled { "true" } else { "false" })
}

/// Flip the dark mode preference and return the new value
pub fn toggle_dark_mode(conn: &Connection) -> Result<bool> {
    let enabled = !load_dark_mode(conn)?;
    save_dark_mode(conn, enabled)?;
    Ok(enabled)
}
