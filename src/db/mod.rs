use crate::config::Config;
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A Discord user linked to a Minecraft account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub discord_id: String,
    pub minecraft_username: String,
    pub minecraft_uuid: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        Self::open(&config.database_url)
    }

    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            CREATE TABLE IF NOT EXISTS user_profiles (
                discord_id TEXT PRIMARY KEY,
                minecraft_username TEXT NOT NULL,
                minecraft_uuid TEXT NOT NULL,
                linked_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
        ";
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Link (or relink) a Discord user to a Minecraft account.
    pub fn link_profile(
        &self,
        discord_id: &str,
        minecraft_username: &str,
        minecraft_uuid: &str,
    ) -> anyhow::Result<()> {
        debug!(
            "Database: Linking {} to Minecraft account {}",
            discord_id, minecraft_username
        );
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user_profiles (discord_id, minecraft_username, minecraft_uuid)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(discord_id) DO UPDATE SET
                 minecraft_username = excluded.minecraft_username,
                 minecraft_uuid = excluded.minecraft_uuid,
                 linked_at = CURRENT_TIMESTAMP",
            (discord_id, minecraft_username, minecraft_uuid),
        )?;
        Ok(())
    }

    pub fn get_profile(&self, discord_id: &str) -> anyhow::Result<Option<ProfileRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT discord_id, minecraft_username, minecraft_uuid
                 FROM user_profiles WHERE discord_id = ?1",
                [discord_id],
                |row| {
                    Ok(ProfileRecord {
                        discord_id: row.get(0)?,
                        minecraft_username: row.get(1)?,
                        minecraft_uuid: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Returns the number of rows removed (0 when the user wasn't linked).
    pub fn unlink_profile(&self, discord_id: &str) -> anyhow::Result<usize> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM user_profiles WHERE discord_id = ?1",
            [discord_id],
        )?;
        Ok(removed)
    }

    /// Run a closure against the database on the blocking thread pool, so
    /// async callers never hold the connection lock on a runtime worker.
    pub async fn run_blocking<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}
