use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::game_log::{GameLog, LogUpdate, NewGameLog, encode_protocols};
use crate::stats::{StatsSnapshot, aggregate};

const SELECT_COLUMNS: &str = "id, timestamp, player1_name, player1_protocols, \
     player2_name, player2_protocols, winner_name";

/// SQLite-backed game log table.
pub struct LogStore {
    conn: Connection,
}

impl LogStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        log::debug!("opened game log store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Raw handle for seeding fixture rows the typed API refuses to write.
    #[doc(hidden)]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn append(&self, timestamp: &str, game: &NewGameLog) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO game_logs(timestamp, player1_name, player1_protocols, player2_name, player2_protocols, winner_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    timestamp,
                    game.player1_name,
                    encode_protocols(&game.player1_protocols),
                    game.player2_name,
                    encode_protocols(&game.player2_protocols),
                    game.winner_name,
                ],
            )
            .context("insert game log")?;
        let id = self.conn.last_insert_rowid();
        log::info!("game log added: id={id}");
        Ok(id)
    }

    /// All logs, newest first.
    pub fn list(&self) -> Result<Vec<GameLog>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM game_logs ORDER BY id DESC"
            ))
            .context("prepare list game logs query")?;
        let rows = stmt
            .query_map([], game_log_from_row)
            .context("query game logs")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode game log row")?);
        }
        Ok(out)
    }

    pub fn get(&self, id: i64) -> Result<Option<GameLog>> {
        self.conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM game_logs WHERE id = ?1"),
                params![id],
                game_log_from_row,
            )
            .optional()
            .with_context(|| format!("load game log {id}"))
    }

    /// Rewrites names, protocols and winner. Returns rows affected (0 or 1).
    pub fn update(&self, id: i64, update: &LogUpdate) -> Result<usize> {
        let changed = self
            .conn
            .execute(
                "UPDATE game_logs
                 SET player1_name = ?1, player1_protocols = ?2, player2_name = ?3,
                     player2_protocols = ?4, winner_name = ?5
                 WHERE id = ?6",
                params![
                    update.player1_name,
                    encode_protocols(&update.player1_protocols),
                    update.player2_name,
                    encode_protocols(&update.player2_protocols),
                    update.winner_name,
                    id,
                ],
            )
            .with_context(|| format!("update game log {id}"))?;
        if changed > 0 {
            log::info!("game log updated: id={id}");
        }
        Ok(changed)
    }

    pub fn delete(&self, id: i64) -> Result<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM game_logs WHERE id = ?1", params![id])
            .with_context(|| format!("delete game log {id}"))?;
        if changed > 0 {
            log::info!("game log deleted: id={id}");
        }
        Ok(changed)
    }

    pub fn clear(&self) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM game_logs", [])
            .context("clear game logs")?;
        log::info!("all game logs cleared ({removed} removed)");
        Ok(true)
    }

    /// Distinct non-empty player names, case-insensitive order.
    pub fn player_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT DISTINCT player_name FROM (
                    SELECT player1_name AS player_name FROM game_logs
                    UNION
                    SELECT player2_name AS player_name FROM game_logs
                )
                WHERE player_name IS NOT NULL AND player_name != ''
                ORDER BY player_name COLLATE NOCASE ASC
                "#,
            )
            .context("prepare player names query")?;
        let rows = stmt
            .query_map([], |row| text_column(row, 0))
            .context("query player names")?;

        let mut out = Vec::new();
        for row in rows {
            if let Some(name) = row.context("decode player name")? {
                out.push(name);
            }
        }
        Ok(out)
    }

    /// Aggregates the full history as it stands right now.
    pub fn load_stats(&self) -> Result<StatsSnapshot> {
        let logs = self.list().context("load game logs for stats")?;
        Ok(aggregate(&logs))
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS game_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            player1_name TEXT NOT NULL,
            player1_protocols TEXT NOT NULL,
            player2_name TEXT NOT NULL,
            player2_protocols TEXT NOT NULL,
            winner_name TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn game_log_from_row(row: &Row<'_>) -> rusqlite::Result<GameLog> {
    Ok(GameLog {
        id: row.get(0)?,
        timestamp: text_column(row, 1)?.unwrap_or_default(),
        player1_name: text_column(row, 2)?,
        player1_protocols: text_column(row, 3)?,
        player2_name: text_column(row, 4)?,
        player2_protocols: text_column(row, 5)?,
        winner_name: text_column(row, 6)?,
    })
}

// Column affinity is advisory in SQLite; read whatever storage class is there.
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(n) => Some(n.to_string()),
        ValueRef::Real(n) => Some(n.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    })
}
