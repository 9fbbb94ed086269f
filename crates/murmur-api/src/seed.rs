use chrono::{Duration, SubsecRound, Utc};
use tracing::info;

use murmur_db::Database;
use murmur_db::models::SentimentPatch;

use crate::auth::hash_password;

const DEMO_USERS: [&str; 3] = ["admin1", "alice05", "bob22"];
const DEMO_PASSWORD: &str = "1234";

struct DemoMessage {
    author: usize,
    minutes_ago: i64,
    content: &'static str,
    label: &'static str,
    confidence: f64,
    scores_json: &'static str,
}

const DEMO_MESSAGES: [DemoMessage; 3] = [
    DemoMessage {
        author: 1,
        minutes_ago: 30,
        content: "Merhaba! Bu harika bir chat uygulaması!",
        label: "pozitif",
        confidence: 0.85,
        scores_json: r#"{"pozitif":0.85,"nötr":0.10,"negatif":0.05}"#,
    },
    DemoMessage {
        author: 2,
        minutes_ago: 25,
        content: "AI duygu analizi gerçekten çalışıyor mu?",
        label: "nötr",
        confidence: 0.75,
        scores_json: r#"{"pozitif":0.15,"nötr":0.75,"negatif":0.10}"#,
    },
    DemoMessage {
        author: 1,
        minutes_ago: 20,
        content: "Evet, çok etkileyici! Bu proje mükemmel.",
        label: "pozitif",
        confidence: 0.90,
        scores_json: r#"{"pozitif":0.90,"nötr":0.05,"negatif":0.05}"#,
    },
];

/// Fills an empty database with a few users and labeled messages.
/// Does nothing once any user exists.
pub fn seed_demo_data(db: &Database) -> anyhow::Result<()> {
    if db.count_users()? > 0 {
        return Ok(());
    }

    let now = Utc::now().trunc_subsecs(6);
    let mut ids = Vec::with_capacity(DEMO_USERS.len());
    for name in DEMO_USERS {
        let hash = hash_password(DEMO_PASSWORD)?;
        let id = db
            .create_user(name, &hash, now - Duration::hours(1))?
            .ok_or_else(|| anyhow::anyhow!("demo user {} already exists", name))?;
        ids.push(id);
    }

    for message in &DEMO_MESSAGES {
        let sent_at = now - Duration::minutes(message.minutes_ago);
        let id = db.insert_message(ids[message.author], message.content, sent_at)?;
        db.set_message_sentiment(
            id,
            &SentimentPatch {
                label: message.label,
                confidence: message.confidence,
                scores_json: message.scores_json,
            },
        )?;
    }

    info!("Seeded {} demo users and {} messages", ids.len(), DEMO_MESSAGES.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use murmur_types::models::Sentiment;

    use super::*;
    use crate::service::test_support::service;

    #[tokio::test]
    async fn seeds_once_and_users_can_log_in() {
        let service = service();
        seed_demo_data(service.db()).unwrap();
        seed_demo_data(service.db()).unwrap();

        assert_eq!(service.db().count_users().unwrap(), 3);
        let alice = service.login("alice05", "1234").await.unwrap();

        let feed = service.list_messages(None).await.unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].content, "Evet, çok etkileyici! Bu proje mükemmel.");
        assert_eq!(feed[0].user_id, alice.id);
        assert_eq!(feed[1].sentiment, Some(Sentiment::Neutral));
        assert_eq!(feed[1].username, "bob22");
        assert_eq!(feed[2].sentiment_confidence, Some(0.85));

        let users = service.list_users().await.unwrap();
        let alice_row = users.iter().find(|u| u.username == "alice05").unwrap();
        assert_eq!(alice_row.avg_sentiment, Some(Sentiment::Positive));
        assert_eq!(alice_row.avg_sentiment_confidence, Some(1.0));
    }

    #[tokio::test]
    async fn existing_users_block_seeding() {
        let service = service();
        service.register("someone", "pw", true).await.unwrap();
        seed_demo_data(service.db()).unwrap();
        assert_eq!(service.db().count_users().unwrap(), 1);
        assert!(service.list_messages(None).await.unwrap().is_empty());
    }
}
