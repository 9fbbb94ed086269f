use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, messages, private messages)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE CHECK (length(username) BETWEEN 1 AND 50),
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE messages (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                content                 TEXT NOT NULL CHECK (length(content) > 0),
                sent_at                 TEXT NOT NULL,
                user_id                 INTEGER NOT NULL REFERENCES users(id),
                sentiment               TEXT,
                sentiment_confidence    REAL,
                sentiment_scores        TEXT
            );

            CREATE INDEX idx_messages_sent ON messages(sent_at);
            CREATE INDEX idx_messages_user ON messages(user_id, sent_at);

            -- status: 0 = sent, 1 = delivered, 2 = read
            CREATE TABLE private_messages (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                content                 TEXT NOT NULL CHECK (length(content) > 0),
                sent_at                 TEXT NOT NULL,
                sender_id               INTEGER NOT NULL REFERENCES users(id),
                receiver_id             INTEGER NOT NULL REFERENCES users(id),
                status                  INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1, 2)),
                read_at                 TEXT,
                sentiment               TEXT,
                sentiment_confidence    REAL,
                sentiment_scores        TEXT,
                CHECK ((status = 2) = (read_at IS NOT NULL))
            );

            CREATE INDEX idx_private_sender ON private_messages(sender_id, receiver_id);
            CREATE INDEX idx_private_receiver ON private_messages(receiver_id, sender_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
