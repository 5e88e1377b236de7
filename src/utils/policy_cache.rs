use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;

use crate::model::setting::Setting;

/// How long a fetched settings map stays fresh. Policy edits are rare and
/// take effect on the next recording call after expiry or invalidation.
const SETTINGS_TTL_SECS: u64 = 30;

const CACHE_KEY: &str = "settings";

/// Single-entry cache for the flat settings map.
static SETTINGS_CACHE: Lazy<Cache<&'static str, HashMap<String, String>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(1)
        .time_to_live(Duration::from_secs(SETTINGS_TTL_SECS))
        .build()
});

/// Current settings as a key/value map, served from cache when fresh.
pub async fn settings_map(pool: &MySqlPool) -> Result<HashMap<String, String>, sqlx::Error> {
    if let Some(map) = SETTINGS_CACHE.get(&CACHE_KEY).await {
        return Ok(map);
    }

    let map = load_settings(pool).await?;
    SETTINGS_CACHE.insert(CACHE_KEY, map.clone()).await;
    Ok(map)
}

/// Drops the cached map so the next read observes fresh values. Called
/// after every settings upsert.
pub async fn invalidate() {
    SETTINGS_CACHE.invalidate(&CACHE_KEY).await;
}

/// Primes the cache once at startup.
pub async fn warmup(pool: &MySqlPool) -> Result<()> {
    let map = load_settings(pool).await?;
    log::info!("Settings cache warmup complete: {} keys", map.len());
    SETTINGS_CACHE.insert(CACHE_KEY, map).await;
    Ok(())
}

async fn load_settings(pool: &MySqlPool) -> Result<HashMap<String, String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, Setting>("SELECT id, `key`, `value` FROM settings")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|s| (s.key, s.value)).collect())
}
