//! # seed
//!
//! Writes a sample forum cache into the configured store so offline search
//! can be tried without a server. Both cached-post shapes are included.

use anyhow::{ensure, Result};
use configs::Settings;
use domains::{CachedPost, KeyValueStore};
use serde_json::{json, Value};
use storage_adapters::FileKvStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn sample_posts() -> Value {
    json!([
        {
            "id": "seed-1",
            "body": "My employer has not paid my overtime for three months. What can I do?",
            "category": "Labor Law",
            "created_at": "2024-04-01T08:15:00Z",
            "user_id": "u-juan",
            "users": {"id": "u-juan", "username": "juan_dc", "full_name": "Juan Dela Cruz", "role": "user"}
        },
        {
            "id": "seed-2",
            "content": "The store refused to refund a phone that broke after two days.",
            "category": "Consumer Law",
            "createdAt": 1712131200000_i64,
            "user": {"id": "u-maria", "username": "maria_santos", "fullName": "Maria Santos", "isLawyer": false}
        },
        {
            "id": "seed-3",
            "body": "You can file in small claims court if the amount is within the limit.",
            "category": "Civil Law",
            "created_at": "2024-04-02T10:00:00Z",
            "users": {"id": "u-ana", "username": "atty_cruz", "full_name": "Ana Cruz", "role": "lawyer"}
        },
        {
            "id": "seed-4",
            "content": "How is child custody decided after an annulment?",
            "category": "Family Law",
            "createdAt": "2024-03-28T16:45:00Z",
            "isAnonymous": true,
            "user": {"id": "u-hidden", "username": "worried_parent", "fullName": "Hidden Name"}
        },
        {
            "id": "seed-5",
            "content": "Bail for theft charges and what to expect at arraignment.",
            "category": "Criminal Law",
            "createdAt": "2024-04-04T09:00:00Z",
            "user": {"id": "u-grace", "username": "atty_lim", "fullName": "Grace Lim", "isLawyer": true}
        },
        {
            "id": "seed-6",
            "body": "Is a labour contract valid without a signature?",
            "category": "Labor Law",
            "created_at": "2024-04-05T07:30:00Z",
            "users": {"id": "u-lito", "username": "lito", "full_name": "Lito Garcia"}
        }
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load()?;
    let raw = serde_json::to_string(&sample_posts())?;

    let parsed = CachedPost::parse_list(&raw)?;
    ensure!(parsed.len() == 6, "sample posts no longer match a cached shape");

    let store = FileKvStore::new(&settings.storage.path);
    store.set(&settings.search.cache_key, &raw).await?;

    info!(
        path = %settings.storage.path,
        key = %settings.search.cache_key,
        posts = parsed.len(),
        "seeded forum cache"
    );
    Ok(())
}
