use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod helpers;
mod migrations;
pub mod models;
mod repositories;

use migrations::run_migrations;

pub use models::{Configuration, IgnoreLedger, IgnoredHoursEntry, LedgerCommand};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

/// Owns the worker thread. Dropping the last handle closes the queue and waits for the
/// worker to finish whatever was already submitted.
struct Worker {
    queue: Option<mpsc::Sender<DbTask>>,
    thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        drop(self.queue.take());
        if let Some(thread) = self.thread.take() {
            if let Err(join_err) = thread.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database {}", path.display()))?;

    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        error!("Failed to enable WAL mode: {err}");
    }

    run_migrations(&mut conn).context("failed to run database migrations")?;
    Ok(conn)
}

/// Handle to the local key/value store backing the ignore ledger and configuration.
///
/// All statements run on one worker thread, in the order they were submitted, so each
/// `execute` closure is an atomic read-modify-write with respect to every other call.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (queue, tasks) = mpsc::channel::<DbTask>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let path = db_path.clone();

        let thread = thread::Builder::new()
            .name("timesheet-guard-db".into())
            .spawn(move || {
                let mut conn = match open_connection(&path) {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };

                // Runs until every `Database` handle is gone.
                for task in tasks {
                    task(&mut conn);
                }

                info!("Database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                queue: Some(queue),
                thread: Some(thread),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let queue = self
            .worker
            .queue
            .as_ref()
            .ok_or_else(|| anyhow!("database worker already stopped"))?;
        let (reply_tx, reply_rx) = oneshot::channel();

        queue
            .send(Box::new(move |conn| {
                if reply_tx.send(task(conn)).is_err() {
                    error!("DB caller dropped before receiving result");
                }
            }))
            .map_err(|_| anyhow!("database worker is not accepting tasks"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;

    /// Fresh database in a temp dir. Keep the `TempDir` alive for the test's duration.
    pub fn temp_database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(dir.path().join("guard.sqlite3")).expect("open database");
        (dir, db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tasks_run_in_submission_order() {
        let (_dir, db) = test_support::temp_database();

        let first = db.execute(|conn| {
            conn.execute_batch("CREATE TABLE trail (step INTEGER NOT NULL)")?;
            conn.execute("INSERT INTO trail (step) VALUES (1)", [])?;
            Ok(())
        });
        let second = db.execute(|conn| {
            conn.execute("INSERT INTO trail (step) VALUES (2)", [])?;
            Ok(())
        });
        let (first, second) = tokio::join!(first, second);
        first.unwrap();
        second.unwrap();

        let steps: Vec<i64> = db
            .execute(|conn| {
                let mut stmt = conn.prepare("SELECT step FROM trail ORDER BY rowid")?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                Ok(rows.collect::<rusqlite::Result<Vec<i64>>>()?)
            })
            .await
            .unwrap();
        assert_eq!(steps, vec![1, 2]);
    }

    #[tokio::test]
    async fn task_errors_reach_the_caller() {
        let (_dir, db) = test_support::temp_database();
        let err = db
            .execute(|conn| Ok(conn.execute("INSERT INTO missing_table VALUES (1)", [])?))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing_table"));
    }

    #[test]
    fn unopenable_path_fails_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a database file.
        assert!(Database::new(dir.path().to_path_buf()).is_err());
    }
}
