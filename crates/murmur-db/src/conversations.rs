use crate::Database;
use crate::models::{ConversationRow, PrivateMessageRow, SentimentPatch, StatusUpdate};
use crate::timestamp;
use anyhow::Result;
use chrono::{DateTime, Utc};
use murmur_types::models::MessageStatus;
use rusqlite::OptionalExtension;

impl Database {
    /// Inserted with status `Sent`, no read timestamp and no sentiment.
    pub fn insert_private_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO private_messages (content, sent_at, sender_id, receiver_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (content, timestamp::to_db(sent_at), sender_id, receiver_id, MessageStatus::Sent.code()),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn set_private_message_sentiment(&self, id: i64, patch: &SentimentPatch<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE private_messages
                 SET sentiment = ?2, sentiment_confidence = ?3, sentiment_scores = ?4
                 WHERE id = ?1",
                (id, patch.label, patch.confidence, patch.scores_json),
            )?;
            Ok(())
        })
    }

    pub fn get_private_message(&self, id: i64) -> Result<Option<PrivateMessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("{PRIVATE_MESSAGE_COLUMNS} WHERE pm.id = ?1");
            Ok(conn.query_row(&sql, [id], private_message_from_row).optional()?)
        })
    }

    /// Every message exchanged between two users, oldest first.
    pub fn get_conversation(&self, user_a: i64, user_b: i64) -> Result<Vec<PrivateMessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "{PRIVATE_MESSAGE_COLUMNS}
                 WHERE (pm.sender_id = ?1 AND pm.receiver_id = ?2)
                    OR (pm.sender_id = ?2 AND pm.receiver_id = ?1)
                 ORDER BY pm.sent_at ASC, pm.id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_a, user_b], private_message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One row per counterpart, most recent activity first.
    pub fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "WITH mine AS (
                     SELECT id, content, sent_at, receiver_id, status,
                            CASE WHEN sender_id = ?1 THEN receiver_id ELSE sender_id END AS other_id
                     FROM private_messages
                     WHERE sender_id = ?1 OR receiver_id = ?1
                 ),
                 ranked AS (
                     SELECT other_id, id, content, sent_at,
                            ROW_NUMBER() OVER (
                                PARTITION BY other_id ORDER BY sent_at DESC, id DESC
                            ) AS recency,
                            SUM(CASE WHEN receiver_id = ?1 AND status <> ?2 THEN 1 ELSE 0 END)
                                OVER (PARTITION BY other_id) AS unread
                     FROM mine
                 )
                 SELECT r.other_id, u.username, r.sent_at, r.content, r.unread
                 FROM ranked r
                 JOIN users u ON u.id = r.other_id
                 WHERE r.recency = 1
                 ORDER BY r.sent_at DESC, r.id DESC",
            )?;

            let rows = stmt
                .query_map([user_id, MessageStatus::Read.code()], |row| {
                    Ok(ConversationRow {
                        other_user_id: row.get(0)?,
                        other_username: row.get(1)?,
                        last_message_at: row.get(2)?,
                        last_message_content: row.get(3)?,
                        unread_count: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Marks everything `sender_id` sent to `reader_id` as read. Messages the
    /// reader sent are left alone. Returns the number of rows advanced.
    pub fn mark_conversation_read(&self, reader_id: i64, sender_id: i64, now: DateTime<Utc>) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE private_messages
                 SET status = ?3, read_at = ?4
                 WHERE receiver_id = ?1 AND sender_id = ?2 AND status <> ?3",
                (reader_id, sender_id, MessageStatus::Read.code(), timestamp::to_db(now)),
            )?;
            Ok(changed)
        })
    }

    /// Moves one message to `status` unless it is already further along.
    /// Re-applying the current status is a no-op that keeps the original
    /// read timestamp.
    pub fn set_private_message_status(
        &self,
        id: i64,
        status: MessageStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusUpdate> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE private_messages
                 SET status = ?2,
                     read_at = CASE WHEN ?2 = ?3 THEN COALESCE(read_at, ?4) ELSE NULL END
                 WHERE id = ?1 AND status <= ?2",
                (id, status.code(), MessageStatus::Read.code(), timestamp::to_db(now)),
            )?;

            if changed > 0 {
                return Ok(StatusUpdate::Applied);
            }

            let current: Option<i64> = conn
                .query_row("SELECT status FROM private_messages WHERE id = ?1", [id], |r| r.get(0))
                .optional()?;

            Ok(match current {
                Some(current) => StatusUpdate::Regression { current },
                None => StatusUpdate::NotFound,
            })
        })
    }
}

const PRIVATE_MESSAGE_COLUMNS: &str =
    "SELECT pm.id, pm.content, pm.sent_at,
            pm.sender_id, s.username, pm.receiver_id, r.username,
            pm.status, pm.read_at,
            pm.sentiment, pm.sentiment_confidence, pm.sentiment_scores
     FROM private_messages pm
     JOIN users s ON s.id = pm.sender_id
     JOIN users r ON r.id = pm.receiver_id";

fn private_message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PrivateMessageRow> {
    Ok(PrivateMessageRow {
        id: row.get(0)?,
        content: row.get(1)?,
        sent_at: row.get(2)?,
        sender_id: row.get(3)?,
        sender_username: row.get(4)?,
        receiver_id: row.get(5)?,
        receiver_username: row.get(6)?,
        status: row.get(7)?,
        read_at: row.get(8)?,
        sentiment: row.get(9)?,
        sentiment_confidence: row.get(10)?,
        sentiment_scores: row.get(11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SENT: i64 = 0;
    const READ: i64 = 2;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, minute, 0).unwrap()
    }

    fn setup() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let alice = db.create_user("alice", "h", at(0)).unwrap().unwrap();
        let bob = db.create_user("bob", "h", at(0)).unwrap().unwrap();
        let carol = db.create_user("carol", "h", at(0)).unwrap().unwrap();
        (db, alice, bob, carol)
    }

    #[test]
    fn new_private_message_starts_sent_and_unread() {
        let (db, alice, bob, _) = setup();
        let id = db.insert_private_message(alice, bob, "selam", at(1)).unwrap();

        let row = db.get_private_message(id).unwrap().unwrap();
        assert_eq!(row.status, SENT);
        assert!(row.read_at.is_none());
        assert!(row.sentiment.is_none());
        assert_eq!(row.sender_username, "alice");
        assert_eq!(row.receiver_username, "bob");
    }

    #[test]
    fn private_message_to_missing_user_is_not_stored() {
        let (db, alice, _, _) = setup();
        assert!(db.insert_private_message(alice, 404, "hello?", at(1)).is_err());
        assert!(db.list_conversations(alice).unwrap().is_empty());
    }

    #[test]
    fn conversation_is_oldest_first_and_excludes_others() {
        let (db, alice, bob, carol) = setup();
        db.insert_private_message(bob, alice, "second", at(2)).unwrap();
        db.insert_private_message(alice, bob, "first", at(1)).unwrap();
        db.insert_private_message(alice, carol, "elsewhere", at(3)).unwrap();

        let contents: Vec<String> =
            db.get_conversation(alice, bob).unwrap().into_iter().map(|m| m.content).collect();
        assert_eq!(contents, ["first", "second"]);

        // Argument order does not matter.
        assert_eq!(db.get_conversation(bob, alice).unwrap().len(), 2);
    }

    #[test]
    fn summaries_order_by_latest_activity() {
        let (db, alice, bob, carol) = setup();
        db.insert_private_message(alice, bob, "t1", at(1)).unwrap();
        db.insert_private_message(carol, alice, "t2", at(2)).unwrap();
        db.insert_private_message(bob, alice, "t3", at(3)).unwrap();

        let summaries = db.list_conversations(alice).unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].other_user_id, bob);
        assert_eq!(summaries[0].other_username, "bob");
        assert_eq!(summaries[0].last_message_content, "t3");
        assert_eq!(summaries[0].unread_count, 1);

        assert_eq!(summaries[1].other_user_id, carol);
        assert_eq!(summaries[1].last_message_content, "t2");
        assert_eq!(summaries[1].unread_count, 1);
    }

    #[test]
    fn mark_read_only_touches_incoming() {
        let (db, alice, bob, _) = setup();
        let incoming_1 = db.insert_private_message(bob, alice, "one", at(1)).unwrap();
        let incoming_2 = db.insert_private_message(bob, alice, "two", at(2)).unwrap();
        let outgoing = db.insert_private_message(alice, bob, "reply", at(3)).unwrap();

        assert_eq!(db.list_conversations(alice).unwrap()[0].unread_count, 2);

        let changed = db.mark_conversation_read(alice, bob, at(4)).unwrap();
        assert_eq!(changed, 2);

        for id in [incoming_1, incoming_2] {
            let row = db.get_private_message(id).unwrap().unwrap();
            assert_eq!(row.status, READ);
            assert!(row.read_at.is_some());
        }
        let untouched = db.get_private_message(outgoing).unwrap().unwrap();
        assert_eq!(untouched.status, SENT);
        assert!(untouched.read_at.is_none());

        assert_eq!(db.list_conversations(alice).unwrap()[0].unread_count, 0);
        // Bob's own reply is still unread on his side.
        assert_eq!(db.list_conversations(bob).unwrap()[0].unread_count, 1);

        // Second call finds nothing to do.
        assert_eq!(db.mark_conversation_read(alice, bob, at(5)).unwrap(), 0);
    }

    #[test]
    fn status_only_moves_forward() {
        let (db, alice, bob, _) = setup();
        let id = db.insert_private_message(alice, bob, "hey", at(1)).unwrap();

        assert_eq!(
            db.set_private_message_status(id, MessageStatus::Delivered, at(2)).unwrap(),
            StatusUpdate::Applied
        );
        assert_eq!(
            db.set_private_message_status(id, MessageStatus::Read, at(3)).unwrap(),
            StatusUpdate::Applied
        );
        let first_read_at = db.get_private_message(id).unwrap().unwrap().read_at;
        assert!(first_read_at.is_some());

        // Idempotent: the original read timestamp survives.
        assert_eq!(
            db.set_private_message_status(id, MessageStatus::Read, at(9)).unwrap(),
            StatusUpdate::Applied
        );
        assert_eq!(db.get_private_message(id).unwrap().unwrap().read_at, first_read_at);

        assert_eq!(
            db.set_private_message_status(id, MessageStatus::Sent, at(10)).unwrap(),
            StatusUpdate::Regression { current: READ }
        );
        assert_eq!(db.get_private_message(id).unwrap().unwrap().status, READ);
    }

    #[test]
    fn status_update_for_unknown_message() {
        let (db, _, _, _) = setup();
        assert_eq!(
            db.set_private_message_status(77, MessageStatus::Read, at(1)).unwrap(),
            StatusUpdate::NotFound
        );
    }
}
