use crate::Database;
use crate::models::{MessageRow, SentimentCountRow, SentimentPatch, UserRow};
use crate::timestamp;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    /// Returns `None` when the username is already taken.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password, created_at) VALUES (?1, ?2, ?3)",
                (username, password_hash, timestamp::to_db(created_at)),
            );

            match inserted {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, username, password, created_at FROM users ORDER BY username")?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    }

    /// Label counts per author over public messages and sent private messages.
    /// One grouped query for every user (eliminates N+1 in the user listing).
    pub fn sentiment_counts(&self, user_id: Option<i64>) -> Result<Vec<SentimentCountRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT author_id, sentiment, COUNT(*)
                 FROM (
                     SELECT user_id AS author_id, sentiment FROM messages WHERE sentiment IS NOT NULL
                     UNION ALL
                     SELECT sender_id AS author_id, sentiment FROM private_messages WHERE sentiment IS NOT NULL
                 )
                 WHERE ?1 IS NULL OR author_id = ?1
                 GROUP BY author_id, sentiment",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(SentimentCountRow {
                        user_id: row.get(0)?,
                        sentiment: row.get(1)?,
                        count: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Public messages --

    /// First half of a send: the row is visible with null sentiment fields
    /// until `set_message_sentiment` runs.
    pub fn insert_message(&self, user_id: i64, content: &str, sent_at: DateTime<Utc>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (content, sent_at, user_id) VALUES (?1, ?2, ?3)",
                (content, timestamp::to_db(sent_at), user_id),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn set_message_sentiment(&self, id: i64, patch: &SentimentPatch<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE messages
                 SET sentiment = ?2, sentiment_confidence = ?3, sentiment_scores = ?4
                 WHERE id = ?1",
                (id, patch.label, patch.confidence, patch.scores_json),
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{MESSAGE_COLUMNS} WHERE m.id = ?1");
            Ok(conn.query_row(&sql, [id], message_from_row).optional()?)
        })
    }

    /// Newest first, optionally restricted to one author.
    pub fn list_messages(&self, user_id: Option<i64>, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{MESSAGE_COLUMNS}
                 WHERE ?1 IS NULL OR m.user_id = ?1
                 ORDER BY m.sent_at DESC, m.id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

// JOIN users to fetch the author's username in the same query
const MESSAGE_COLUMNS: &str =
    "SELECT m.id, m.content, m.sent_at, m.user_id, u.username,
            m.sentiment, m.sentiment_confidence, m.sentiment_scores
     FROM messages m
     JOIN users u ON u.id = m.user_id";

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        content: row.get(1)?,
        sent_at: row.get(2)?,
        user_id: row.get(3)?,
        username: row.get(4)?,
        sentiment: row.get(5)?,
        sentiment_confidence: row.get(6)?,
        sentiment_scores: row.get(7)?,
    })
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, value: P) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password, created_at FROM users WHERE {filter}");
    let row = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}
