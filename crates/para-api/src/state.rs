//! Application state management
//!
//! Author: hephaex@gmail.com

use para_core::config::AppConfig;
use para_extractor::Analyzer;
use para_store::{DocumentStore, MemoryStore, Records};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Ready status
    pub is_ready: AtomicBool,
    /// Typed access to the document store
    pub records: Records,
    /// Prompt, generate and parse pipeline (disabled without an LLM)
    pub analyzer: Analyzer,
}

impl AppState {
    /// Create new application state over an existing store
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, analyzer: Analyzer) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            is_ready: AtomicBool::new(true),
            records: Records::new(store),
            analyzer,
        }
    }

    /// In-memory store and no language model
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()), Analyzer::disabled())
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if service is ready
    pub fn is_ready(&self) -> bool {
        self.is_ready.load(Ordering::SeqCst)
    }

    /// Set ready status
    pub fn set_ready(&self, ready: bool) {
        self.is_ready.store(ready, Ordering::SeqCst);
    }

    /// Upper bound on records scanned by a nearby query
    pub fn nearby_scan_limit(&self) -> usize {
        self.config.geo.nearby_scan_limit
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_counter() {
        let state = AppState::default();
        assert_eq!(state.get_request_count(), 0);
        state.increment_requests();
        state.increment_requests();
        assert_eq!(state.get_request_count(), 2);
    }

    #[test]
    fn test_ready_toggle() {
        let state = AppState::default();
        assert!(state.is_ready());
        state.set_ready(false);
        assert!(!state.is_ready());
        assert!(!state.analyzer.is_enabled());
        assert_eq!(state.nearby_scan_limit(), 1000);
    }
}
