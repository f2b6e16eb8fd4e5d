//! Symbol cache registry.
//!
//! Owns one [`SymbolCache`] per open, eligible document and routes document lifecycle events
//! to it. Documents of kind [`DocumentKind::Special`] never get a cache.

use std::collections::HashMap;
use std::sync::Arc;

use lsp_types::Uri;
use parking_lot::RwLock;
use tracing::debug;

use crate::cache::SymbolCache;
use crate::config::{OutlineConfig, SharedConfig};
use crate::document::{DocumentKind, SymbolDocument};
use crate::provider::SymbolProvider;

/// Registry of symbol caches keyed by document URI.
pub struct OutlineRegistry {
	provider: Arc<dyn SymbolProvider>,
	config: SharedConfig,
	caches: RwLock<HashMap<String, Arc<SymbolCache>>>,
}

impl std::fmt::Debug for OutlineRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OutlineRegistry")
			.field("documents", &self.caches.read().len())
			.field("config", &self.config.load())
			.finish()
	}
}

impl OutlineRegistry {
	/// Creates an empty registry.
	pub fn new(provider: Arc<dyn SymbolProvider>, config: SharedConfig) -> Self {
		Self {
			provider,
			config,
			caches: RwLock::new(HashMap::new()),
		}
	}

	/// Shared configuration handle read by every cache.
	pub fn config(&self) -> &SharedConfig {
		&self.config
	}

	/// Publishes a new configuration to all caches.
	pub fn update_config(&self, config: OutlineConfig) {
		self.config.store(config);
	}

	/// Creates the cache for `document`, or returns the existing one.
	///
	/// Returns `None` for special documents.
	pub fn attach(&self, document: Arc<dyn SymbolDocument>) -> Option<Arc<SymbolCache>> {
		if document.kind() == DocumentKind::Special {
			debug!(uri = document.uri().as_str(), "outline.attach: special document skipped");
			return None;
		}
		let key = document.uri().as_str().to_string();
		let mut caches = self.caches.write();
		let cache = caches
			.entry(key)
			.or_insert_with(|| {
				debug!(uri = document.uri().as_str(), "outline.attach");
				Arc::new(SymbolCache::new(document.clone(), self.provider.clone(), self.config.clone()))
			})
			.clone();
		Some(cache)
	}

	/// Cache for `uri`, if attached.
	pub fn get(&self, uri: &Uri) -> Option<Arc<SymbolCache>> {
		self.caches.read().get(uri.as_str()).cloned()
	}

	/// Whether a cache exists for `uri`.
	pub fn contains(&self, uri: &Uri) -> bool {
		self.caches.read().contains_key(uri.as_str())
	}

	/// Removes and disposes the cache for `uri`.
	pub fn detach(&self, uri: &Uri) -> bool {
		let removed = self.caches.write().remove(uri.as_str());
		match removed {
			Some(cache) => {
				cache.dispose();
				true
			}
			None => false,
		}
	}

	/// Routes a document change to its cache.
	///
	/// Pending work is cancelled; with `auto_update_current_function` enabled a debounced
	/// refresh is scheduled.
	pub fn notify_change(&self, uri: &Uri) {
		let Some(cache) = self.get(uri) else {
			return;
		};
		cache.on_change();
		if self.config.load().auto_update_current_function {
			cache.schedule_fetch();
		}
	}

	/// Number of attached documents.
	pub fn len(&self) -> usize {
		self.caches.read().len()
	}

	/// Whether no document is attached.
	pub fn is_empty(&self) -> bool {
		self.caches.read().is_empty()
	}

	/// Disposes and removes every cache.
	pub fn dispose_all(&self) {
		let caches: Vec<_> = self.caches.write().drain().map(|(_, cache)| cache).collect();
		for cache in caches {
			cache.dispose();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	use async_trait::async_trait;
	use lsp_types::DocumentSymbolResponse;
	use tokio_util::sync::CancellationToken;

	use super::*;
	use crate::Result;
	use crate::config::TEST_DEBOUNCE_MS;
	use crate::document::{DocumentSnapshot, TextDocument};

	#[derive(Default)]
	struct CountingProvider {
		calls: AtomicUsize,
	}

	#[async_trait]
	impl SymbolProvider for CountingProvider {
		async fn document_symbols(&self, _document: DocumentSnapshot, _cancel: CancellationToken) -> Result<Option<DocumentSymbolResponse>> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			Ok(Some(DocumentSymbolResponse::Flat(Vec::new())))
		}
	}

	fn document(uri: &str) -> Arc<TextDocument> {
		Arc::new(TextDocument::new(uri.parse().unwrap(), "rust", "fn main() {}\n"))
	}

	fn setup(config: OutlineConfig) -> (Arc<CountingProvider>, OutlineRegistry) {
		let provider = Arc::new(CountingProvider::default());
		let registry = OutlineRegistry::new(provider.clone(), SharedConfig::new(config));
		(provider, registry)
	}

	#[test]
	fn special_documents_get_no_cache() {
		let (_provider, registry) = setup(OutlineConfig::for_tests());
		let doc = Arc::new(TextDocument::new("untitled:prompt".parse().unwrap(), "text", "").with_kind(DocumentKind::Special));

		assert!(registry.attach(doc).is_none());
		assert!(registry.is_empty());
	}

	#[test]
	fn attach_is_idempotent_per_uri() {
		let (_provider, registry) = setup(OutlineConfig::for_tests());
		let doc = document("file:///main.rs");

		let first = registry.attach(doc.clone()).unwrap();
		let second = registry.attach(doc).unwrap();
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn detach_disposes_cache() {
		let (_provider, registry) = setup(OutlineConfig::for_tests());
		let doc = document("file:///main.rs");
		let uri = doc.uri().clone();

		let cache = registry.attach(doc).unwrap();
		assert!(registry.detach(&uri));
		assert!(cache.is_disposed());
		assert!(!registry.contains(&uri));
		assert!(!registry.detach(&uri));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn change_schedules_refresh_when_auto_update_enabled() {
		let (provider, registry) = setup(OutlineConfig::for_tests().auto_update(true));
		let doc = document("file:///main.rs");
		let cache = registry.attach(doc.clone()).unwrap();

		doc.insert(0, "\n");
		registry.notify_change(doc.uri());
		tokio::time::sleep(Duration::from_millis(TEST_DEBOUNCE_MS * 5)).await;

		assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
		assert_eq!(cache.committed_version(), Some(1));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn change_only_cancels_when_auto_update_disabled() {
		let (provider, registry) = setup(OutlineConfig::for_tests());
		let doc = document("file:///main.rs");
		let cache = registry.attach(doc.clone()).unwrap();

		cache.schedule_fetch();
		registry.notify_change(doc.uri());
		tokio::time::sleep(Duration::from_millis(TEST_DEBOUNCE_MS * 5)).await;

		assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
		assert!(!cache.is_pending());
	}

	#[test]
	fn config_updates_reach_attached_caches() {
		let (_provider, registry) = setup(OutlineConfig::for_tests());
		registry.attach(document("file:///a.rs")).unwrap();
		registry.update_config(OutlineConfig::for_tests().auto_update(true));
		assert!(registry.config().load().auto_update_current_function);

		registry.dispose_all();
		assert!(registry.is_empty());
	}
}
