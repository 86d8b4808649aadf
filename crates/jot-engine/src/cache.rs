//! Summary caches keyed by note, content fingerprint, and language.
//!
//! The fingerprint in the key is what makes invalidation implicit: an edit
//! changes the fingerprint, so prior entries become unreachable and simply
//! age out via TTL.
//!
//! ## Configuration (Redis cache)
//!
//! Environment variables:
//! - `REDIS_ENABLED`: Set to "false" to disable caching (default: true)
//! - `REDIS_URL`: Redis connection URL (default: redis://localhost:6379)
//! - `SUMMARY_CACHE_TTL_SECS`: Cache TTL in seconds (default: 3600)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use jot_core::{
    defaults::{SUMMARY_CACHE_PREFIX, SUMMARY_CACHE_TTL_SECS},
    fingerprint, Language, Summary, SummaryCache,
};

/// Cache key for a summary of this exact content in this language.
fn cache_key(note_id: Uuid, content: &str, language: Language) -> String {
    format!(
        "{}{}:{}:{}",
        SUMMARY_CACHE_PREFIX,
        note_id,
        fingerprint(content),
        language
    )
}

/// Summary cache backed by Redis.
///
/// A missing or failing Redis degrades to a forced miss on every probe;
/// summaries are always recomputable, so the cache never surfaces errors.
#[derive(Clone)]
pub struct RedisSummaryCache {
    inner: Arc<RedisSummaryCacheInner>,
}

struct RedisSummaryCacheInner {
    /// Redis connection manager (None if disabled).
    connection: RwLock<Option<ConnectionManager>>,
    /// Cache TTL in seconds.
    ttl_seconds: u64,
}

impl RedisSummaryCache {
    /// Create a new summary cache from environment configuration.
    pub async fn from_env() -> Self {
        let enabled = std::env::var("REDIS_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let ttl_seconds: u64 = std::env::var("SUMMARY_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SUMMARY_CACHE_TTL_SECS);

        let connection = if enabled {
            match redis::Client::open(redis_url.as_str()) {
                Ok(client) => match ConnectionManager::new(client).await {
                    Ok(conn) => {
                        info!(
                            subsystem = "engine",
                            component = "cache",
                            ttl_secs = ttl_seconds,
                            "Redis summary cache enabled"
                        );
                        Some(conn)
                    }
                    Err(e) => {
                        warn!("Failed to connect to Redis, summary cache disabled: {}", e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Invalid Redis URL, summary cache disabled: {}", e);
                    None
                }
            }
        } else {
            info!("Redis summary cache disabled via REDIS_ENABLED=false");
            None
        };

        Self {
            inner: Arc::new(RedisSummaryCacheInner {
                connection: RwLock::new(connection),
                ttl_seconds,
            }),
        }
    }

    /// Create a disabled cache (for testing or when Redis is unavailable).
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(RedisSummaryCacheInner {
                connection: RwLock::new(None),
                ttl_seconds: SUMMARY_CACHE_TTL_SECS,
            }),
        }
    }

    /// Check if the cache is connected.
    pub async fn is_connected(&self) -> bool {
        self.inner.connection.read().await.is_some()
    }
}

#[async_trait]
impl SummaryCache for RedisSummaryCache {
    async fn get(&self, note_id: Uuid, content: &str, language: Language) -> Option<Summary> {
        let key = cache_key(note_id, content, language);
        let mut conn_guard = self.inner.connection.write().await;
        let conn = conn_guard.as_mut()?;

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(summary) => {
                    debug!(cache_hit = true, "Summary cache HIT: {}", key);
                    Some(summary)
                }
                Err(e) => {
                    warn!("Summary cache deserialization error: {}", e);
                    None
                }
            },
            Ok(None) => {
                debug!(cache_hit = false, "Summary cache MISS: {}", key);
                None
            }
            Err(e) => {
                error!("Redis GET error: {}", e);
                None
            }
        }
    }

    async fn put(&self, note_id: Uuid, content: &str, language: Language, summary: &Summary) {
        let key = cache_key(note_id, content, language);
        let mut conn_guard = self.inner.connection.write().await;
        let conn = match conn_guard.as_mut() {
            Some(c) => c,
            None => return,
        };

        let serialized = match serde_json::to_string(summary) {
            Ok(s) => s,
            Err(e) => {
                error!("Summary cache serialization error: {}", e);
                return;
            }
        };

        match conn
            .set_ex::<_, _, ()>(&key, serialized, self.inner.ttl_seconds)
            .await
        {
            Ok(_) => {
                debug!(
                    "Summary cache SET: {} (TTL: {}s)",
                    key, self.inner.ttl_seconds
                );
            }
            Err(e) => {
                error!("Redis SET error: {}", e);
            }
        }
    }
}

/// In-process summary cache with TTL, for tests and single-node setups.
#[derive(Clone)]
pub struct MemorySummaryCache {
    entries: Arc<Mutex<HashMap<String, (Summary, Instant)>>>,
    ttl: Duration,
}

impl MemorySummaryCache {
    /// Create a cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(SUMMARY_CACHE_TTL_SECS))
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|(_, stored)| stored.elapsed() < self.ttl)
            .count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemorySummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryCache for MemorySummaryCache {
    async fn get(&self, note_id: Uuid, content: &str, language: Language) -> Option<Summary> {
        let key = cache_key(note_id, content, language);
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some((summary, stored)) if stored.elapsed() < self.ttl => Some(summary.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, note_id: Uuid, content: &str, language: Language, summary: &Summary) {
        let key = cache_key(note_id, content, language);
        let mut entries = self.entries.lock().await;
        // Superseded-fingerprint keys are never probed again, so sweep
        // expired entries here to keep the map bounded.
        entries.retain(|_, (_, stored)| stored.elapsed() < self.ttl);
        entries.insert(key, (summary.clone(), Instant::now()));
    }
}
