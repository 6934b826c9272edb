use rusqlite::params;

use crate::db::DbPool;

use super::Storage;

/// SQLite-backed implementation of the Storage trait.
/// Every key is one row in the `kv` table.
pub struct SqliteStorage {
    pub pool: DbPool,
}

impl SqliteStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }

    pub fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool)
    }
}

impl Storage for SqliteStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .ok()
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = CURRENT_TIMESTAMP",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
