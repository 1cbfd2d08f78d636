// tests/telegram_notifier.rs
//! Telegram delivery against a local stand-in for the Bot API.

use axum::{extract::State, http::Uri, Json, Router};
use crypto_news_sentinel::notify::{format_batch, BatchLabel, TelegramNotifier};
use crypto_news_sentinel::{
    Article, BatchNotifier, Delivery, Notifier, ScoreBreakdown, ScoredArticle,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn bot_api(reply: Value) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .fallback(move |State(seen): State<Seen>, uri: Uri, Json(body): Json<Value>| {
            let reply = reply.clone();
            async move {
                seen.lock().unwrap().push((uri.path().to_string(), body));
                Json(reply)
            }
        })
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn scored(title: &str) -> ScoredArticle {
    ScoredArticle {
        article: Article {
            title: title.into(),
            description: "Regulator files suit.".into(),
            url: "https://www.reuters.com/x".into(),
            source_name: "Reuters".into(),
            published_at: "2024-05-01T11:00:00Z".into(),
        },
        score: 9,
        tags: vec!["SEC".into()],
        sentiment: -0.8,
        breakdown: ScoreBreakdown::default(),
    }
}

#[tokio::test]
async fn accepted_message_posts_html_payload() {
    let (base, seen) = bot_api(json!({"ok": true, "result": {"message_id": 1}})).await;
    let n = TelegramNotifier::new("4242token".into(), "-100123".into()).with_api_base(&base);

    n.send("<b>hello</b>").await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (path, body) = &seen[0];
    assert_eq!(path, "/bot4242token/sendMessage");
    assert_eq!(body["chat_id"], "-100123");
    assert_eq!(body["text"], "<b>hello</b>");
    assert_eq!(body["parse_mode"], "HTML");
    assert_eq!(body["disable_web_page_preview"], true);
}

#[tokio::test]
async fn rejected_message_surfaces_description() {
    let (base, _seen) = bot_api(json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: chat not found"
    }))
    .await;
    let n = TelegramNotifier::new("4242token".into(), "nope".into()).with_api_base(&base);

    let err = n.send("hi").await.unwrap_err().to_string();
    assert!(err.contains("chat not found"), "{err}");
    assert!(err.contains("400"), "{err}");
}

#[tokio::test]
async fn batch_notifier_sends_one_message_for_the_batch() {
    let (base, seen) = bot_api(json!({"ok": true})).await;
    let n = TelegramNotifier::new("t".into(), "1".into()).with_api_base(&base);
    let batch = BatchNotifier::new(Arc::new(n), 2, Duration::ZERO);

    let items = vec![scored("First"), scored("Second"), scored("Third")];
    let delivered = batch
        .deliver(&items, &BatchLabel::Symbol("Bitcoin".into()))
        .await;
    assert_eq!(delivered, Delivery::Sent(2));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let text = seen[0].1["text"].as_str().unwrap().to_string();
    let (expected, included) = format_batch(&items[..2], &BatchLabel::Symbol("Bitcoin".into()));
    assert_eq!(included, 2);
    assert_eq!(text, expected);
    assert!(text.contains("<b>1. First</b>"));
    assert!(text.contains("<b>2. Second</b>"));
    assert!(!text.contains("Third"));
}

#[tokio::test]
async fn rejected_batch_counts_as_nothing_delivered() {
    let (base, seen) = bot_api(json!({"ok": false, "error_code": 429, "description": "Too Many Requests"})).await;
    let n = TelegramNotifier::new("t".into(), "1".into()).with_api_base(&base);
    let batch = BatchNotifier::new(Arc::new(n), 2, Duration::from_millis(10));

    let delivered = batch.deliver(&[scored("Only")], &BatchLabel::Global).await;
    assert_eq!(delivered, Delivery::Failed);
    assert_eq!(delivered.sent(), 0);
    // exactly one attempt: no retry
    assert_eq!(seen.lock().unwrap().len(), 1);
}
