//! Session table descriptor.

use crate::StoreError;

/// Describes where sessions live in the durable store.
///
/// The table has exactly two columns:
///
/// | column       | type   | notes       |
/// |--------------|--------|-------------|
/// | `session_id` | TEXT   | primary key |
/// | `user_id`    | BIGINT | not null    |
///
/// The table name is interpolated into SQL, so it is restricted to a
/// plain identifier (`[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSchema {
    table: String,
}

impl SessionSchema {
    pub const DEFAULT_TABLE: &'static str = "sessions";

    /// PostgreSQL's identifier limit.
    const MAX_IDENT_LEN: usize = 63;

    /// Creates a descriptor for a custom table name.
    ///
    /// # Errors
    /// [`StoreError::InvalidTableName`] if `table` is not a plain identifier.
    pub fn new(table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_identifier(&table) || table.len() > Self::MAX_IDENT_LEN {
            return Err(StoreError::InvalidTableName(table));
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             session_id TEXT PRIMARY KEY, \
             user_id BIGINT NOT NULL)",
            self.table
        )
    }

    pub fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (session_id, user_id) VALUES ($1, $2)",
            self.table
        )
    }

    pub fn select_sql(&self) -> String {
        format!("SELECT user_id FROM {} WHERE session_id = $1", self.table)
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE session_id = $1", self.table)
    }
}

impl Default for SessionSchema {
    fn default() -> Self {
        Self {
            table: Self::DEFAULT_TABLE.to_string(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
