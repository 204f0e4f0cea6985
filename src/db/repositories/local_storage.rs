use anyhow::Result;

use crate::db::{
    helpers::{delete_item, read_item, write_item},
    Database,
};

impl Database {
    /// Raw value stored under `key`, if any
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.execute(move |conn| read_item(conn, &key)).await
    }

    /// Store `value` under `key`, replacing any previous value
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        self.execute(move |conn| write_item(conn, &key, &value)).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.execute(move |conn| delete_item(conn, &key)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::temp_database;

    #[tokio::test]
    async fn set_get_remove() {
        let (_dir, db) = temp_database();

        assert_eq!(db.get_item("workingHours").await.unwrap(), None);

        db.set_item("workingHours", "8").await.unwrap();
        db.set_item("workingHours", "6").await.unwrap();
        assert_eq!(
            db.get_item("workingHours").await.unwrap().as_deref(),
            Some("6")
        );

        db.remove_item("workingHours").await.unwrap();
        assert_eq!(db.get_item("workingHours").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.sqlite3");
        {
            let db = crate::db::Database::new(path.clone()).unwrap();
            db.set_item("sendEndOfDayNotification", "true").await.unwrap();
        }
        let db = crate::db::Database::new(path).unwrap();
        assert_eq!(
            db.get_item("sendEndOfDayNotification").await.unwrap().as_deref(),
            Some("true")
        );
    }
}
