//! LLM response caching to reduce API calls

use super::CompletionParams;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;
use std::time::{Duration, SystemTime};

/// Upper bound on cached entries before expired ones are swept
const SWEEP_THRESHOLD: usize = 4096;

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: SystemTime,
}

/// In-memory cache for LLM responses
pub struct LLMCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl LLMCache {
    /// Create new cache with default TTL of 1 hour
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    /// Create cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl: ttl,
        }
    }

    /// Get cached value if exists and not expired
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if SystemTime::now() < entry.expires_at {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Set cached value with default TTL
    pub fn set(&self, key: String, value: String) {
        let expires_at = SystemTime::now() + self.default_ttl;

        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= SWEEP_THRESHOLD {
                let now = SystemTime::now();
                entries.retain(|_, entry| now < entry.expires_at);
            }
            entries.insert(key, CacheEntry { value, expires_at });
        }
    }

    /// Clear all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if let Ok(entries) = self.entries.read() {
            let now = SystemTime::now();
            let total = entries.len();
            let expired = entries.values().filter(|e| now >= e.expires_at).count();

            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
            }
        } else {
            CacheStats::default()
        }
    }
}

impl Default for LLMCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

fn hash_parts(parts: &[&str]) -> u64 {
    use std::collections::hash_map::DefaultHasher;

    let mut hasher = DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    hasher.finish()
}

/// Generate cache key for embeddings
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    format!("embed:{}:{:x}", model, hash_parts(&[model, text]))
}

/// Generate cache key for chat completions
///
/// Sampling parameters are part of the key: the same prompt asked for a
/// 5-token score and a 300-token answer must not share an entry.
pub fn chat_cache_key(model: &str, params: &CompletionParams, messages: &str) -> String {
    let params = format!("{}:{}", params.max_tokens, params.temperature);
    format!("chat:{}:{:x}", model, hash_parts(&[model, &params, messages]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let cache = LLMCache::new();

        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiry() {
        let cache = LLMCache::with_ttl(Duration::from_millis(50));

        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));

        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.stats().expired_entries, 1);
    }

    #[test]
    fn test_cache_clear() {
        let cache = LLMCache::new();
        cache.set("a".to_string(), "1".to_string());
        cache.clear();
        assert_eq!(cache.stats().total_entries, 0);
    }

    #[test]
    fn test_chat_key_depends_on_params() {
        let short = CompletionParams {
            max_tokens: 5,
            temperature: 0.3,
        };
        let long = CompletionParams {
            max_tokens: 300,
            temperature: 0.3,
        };
        assert_ne!(
            chat_cache_key("m", &short, "same"),
            chat_cache_key("m", &long, "same")
        );
        assert_eq!(
            chat_cache_key("m", &short, "same"),
            chat_cache_key("m", &short, "same")
        );
    }

    #[test]
    fn test_embedding_key_prefix() {
        assert!(embedding_cache_key("ada", "text").starts_with("embed:ada:"));
    }
}
