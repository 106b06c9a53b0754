use sha2::{Digest, Sha256};
use shared::AnalysisResponse;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::models::CachedAnalysis;

/// In-memory store of finished analyses keyed by image hash.
///
/// Inference is deterministic for a fixed model, so identical uploads can reuse
/// the earlier response. Entries are evicted oldest first once `capacity` is
/// reached; a capacity of zero disables caching.
#[derive(Clone)]
pub struct CacheService {
    state: Arc<RwLock<CacheState>>,
    capacity: usize,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedAnalysis>,
    insertion_order: VecDeque<String>,
}

impl CacheService {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            capacity,
        }
    }

    pub fn calculate_image_hash(image_data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(image_data);
        hex::encode(hasher.finalize())
    }

    pub async fn get_cached_analysis(&self, image_hash: &str) -> Option<AnalysisResponse> {
        let mut state = self.state.write().await;
        let entry = state.entries.get_mut(image_hash)?;
        entry.touch();
        log::debug!(
            "Cache hit for {} (served {} times)",
            image_hash,
            entry.access_count
        );
        Some(entry.to_cached_response())
    }

    pub async fn cache_analysis(&self, image_hash: String, response: AnalysisResponse) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state.write().await;
        if state.entries.contains_key(&image_hash) {
            return;
        }
        while state.entries.len() >= self.capacity {
            match state.insertion_order.pop_front() {
                Some(oldest) => {
                    state.entries.remove(&oldest);
                }
                None => break,
            }
        }
        state.insertion_order.push_back(image_hash.clone());
        state
            .entries
            .insert(image_hash, CachedAnalysis::new(response));
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Predictions;

    fn response(id: &str) -> AnalysisResponse {
        AnalysisResponse {
            id: id.to_string(),
            analyzed_at: "2025-01-01T00:00:00Z".to_string(),
            width: 1,
            height: 1,
            predictions: Predictions::new(),
            highest_confidence: None,
            heatmaps: Vec::new(),
            cached: false,
        }
    }

    #[test]
    fn image_hash_is_sha256_hex() {
        assert_eq!(
            CacheService::calculate_image_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[actix_web::test]
    async fn hit_is_marked_cached() {
        let cache = CacheService::new(4);
        assert!(cache.get_cached_analysis("k").await.is_none());

        cache.cache_analysis("k".to_string(), response("first")).await;
        let hit = cache.get_cached_analysis("k").await.unwrap();
        assert_eq!(hit.id, "first");
        assert!(hit.cached);

        cache.get_cached_analysis("k").await.unwrap();
        let state = cache.state.read().await;
        assert_eq!(state.entries["k"].access_count, 2);
        assert!(!state.entries["k"].response.cached);
    }

    #[actix_web::test]
    async fn oldest_entry_is_evicted() {
        let cache = CacheService::new(2);
        cache.cache_analysis("a".to_string(), response("a")).await;
        cache.cache_analysis("b".to_string(), response("b")).await;
        cache.cache_analysis("c".to_string(), response("c")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get_cached_analysis("a").await.is_none());
        assert!(cache.get_cached_analysis("b").await.is_some());
        assert!(cache.get_cached_analysis("c").await.is_some());
    }

    #[actix_web::test]
    async fn zero_capacity_disables_caching() {
        let cache = CacheService::new(0);
        cache.cache_analysis("a".to_string(), response("a")).await;
        assert_eq!(cache.len().await, 0);
    }
}
