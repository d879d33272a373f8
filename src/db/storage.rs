use chrono::Utc;
use crate::errors::CiphertraceError;
use super::Database;

/// String key/value storage with the semantics of browser local storage.
impl Database {
    pub fn get_item(&self, key: &str) -> Result<Option<String>, CiphertraceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT value FROM local_storage WHERE key = ?1")
            .map_err(|e| CiphertraceError::Database(format!("Query failed: {}", e)))?;

        match stmt.query_row(rusqlite::params![key], |row: &rusqlite::Row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CiphertraceError::Database(format!("Query error: {}", e))),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), CiphertraceError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, Utc::now().to_rfc3339()],
        ).map_err(|e| CiphertraceError::Database(format!("Insert failed: {}", e)))?;
        Ok(())
    }

    /// Returns true if a value was removed.
    pub fn remove_item(&self, key: &str) -> Result<bool, CiphertraceError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM local_storage WHERE key = ?1",
            rusqlite::params![key],
        ).map_err(|e| CiphertraceError::Database(format!("Delete failed: {}", e)))?;
        Ok(removed > 0)
    }

    /// Write several keys atomically: either every value lands or none does.
    pub fn set_items(&self, items: &[(&str, &str)]) -> Result<(), CiphertraceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()
            .map_err(|e| CiphertraceError::Database(format!("Transaction failed: {}", e)))?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in items {
            tx.execute(
                "INSERT OR REPLACE INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![key, value, now],
            ).map_err(|e| CiphertraceError::Database(format!("Insert failed: {}", e)))?;
        }
        tx.commit()
            .map_err(|e| CiphertraceError::Database(format!("Commit failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_item() {
        let db = Database::in_memory().unwrap();
        db.set_item("ciphertrace.call-tracer.current", "{}").unwrap();
        assert_eq!(db.get_item("ciphertrace.call-tracer.current").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_get_missing_item() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_item("nope").unwrap().is_none());
    }

    #[test]
    fn test_set_item_overwrites() {
        let db = Database::in_memory().unwrap();
        db.set_item("k", "one").unwrap();
        db.set_item("k", "two").unwrap();
        assert_eq!(db.get_item("k").unwrap(), Some("two".to_string()));
    }

    #[test]
    fn test_remove_item() {
        let db = Database::in_memory().unwrap();
        db.set_item("k", "v").unwrap();
        assert!(db.remove_item("k").unwrap());
        assert!(!db.remove_item("k").unwrap());
        assert!(db.get_item("k").unwrap().is_none());
    }

    #[test]
    fn test_set_items_writes_all() {
        let db = Database::in_memory().unwrap();
        db.set_items(&[("a", "1"), ("b", "2")]).unwrap();
        assert_eq!(db.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(db.get_item("b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn test_set_items_rolls_back_on_failure() {
        let db = Database::in_memory().unwrap();
        db.set_item("a", "old").unwrap();
        db.lock().unwrap().execute_batch(
            "CREATE TRIGGER reject_b BEFORE INSERT ON local_storage WHEN NEW.key = 'b'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        ).unwrap();

        assert!(db.set_items(&[("a", "new"), ("b", "2")]).is_err());
        assert_eq!(db.get_item("a").unwrap(), Some("old".to_string()));
        assert!(db.get_item("b").unwrap().is_none());
    }

    #[test]
    fn test_on_disk_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.db");
        let path = path.to_str().unwrap();
        {
            let db = Database::new(path).unwrap();
            db.set_item("k", "v").unwrap();
        }
        let reopened = Database::new(path).unwrap();
        assert_eq!(reopened.get_item("k").unwrap(), Some("v".to_string()));
    }
}
