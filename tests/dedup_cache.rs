// tests/dedup_cache.rs
use crypto_news_sentinel::DedupCache;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test]
async fn persisted_set_reloads_equal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent_news.json");

    let ids = [
        "https://www.coindesk.com/a",
        "https://www.reuters.com/b",
        "Headline without a link",
    ];
    {
        let cache = DedupCache::load(&path).await;
        for id in ids.iter().rev() {
            cache.add(id).await;
        }
        cache.flush().await.unwrap();
    }

    // a "new process"
    let reloaded = DedupCache::load(&path).await;
    let got: HashSet<String> = reloaded.snapshot().await.into_iter().collect();
    let want: HashSet<String> = ids.iter().map(|s| s.to_string()).collect();
    assert_eq!(got, want);
}

#[tokio::test]
async fn file_is_a_plain_json_array_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent.json");

    let cache = DedupCache::load(&path).await;
    cache.add("b").await;
    cache.add("a").await;
    cache.flush().await.unwrap();
    let first: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(first, vec!["a", "b"]);

    cache.add("c").await;
    cache.flush().await.unwrap();
    let second: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(second, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn existing_file_is_honoured_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent.json");
    std::fs::write(&path, r#"["https://x.test/old"]"#).unwrap();

    let cache = DedupCache::load(&path).await;
    assert!(cache.contains("https://x.test/old").await);
    assert!(!cache.claim("https://x.test/old").await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_have_exactly_one_winner_per_id() {
    let cache = Arc::new(DedupCache::in_memory());
    let mut tasks = Vec::new();
    for worker in 0..8 {
        let c = cache.clone();
        tasks.push(tokio::spawn(async move {
            let mut won = Vec::new();
            for i in 0..50 {
                let id = format!("https://x.test/{i}");
                if c.claim(&id).await {
                    won.push((worker, id));
                }
            }
            won
        }));
    }

    let mut winners = Vec::new();
    for t in tasks {
        winners.extend(t.await.unwrap());
    }
    assert_eq!(winners.len(), 50);
    assert_eq!(cache.len().await, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_add_and_flush_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent.json");
    let cache = Arc::new(DedupCache::load(&path).await);

    let mut tasks = Vec::new();
    for worker in 0..4 {
        let c = cache.clone();
        tasks.push(tokio::spawn(async move {
            for i in 0..25 {
                c.add(&format!("w{worker}-{i}")).await;
                c.flush().await.unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let on_disk: Vec<String> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 100);
}
