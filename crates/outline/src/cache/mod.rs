//! Per-document symbol cache.
//!
//! A [`SymbolCache`] serves the freshest affordable symbol snapshot for one document:
//! - reads at the committed version are answered without a provider call
//! - background refreshes are debounced, so a burst of edits costs one provider call
//! - at most one provider call is in flight; starting another cancels the previous one
//! - a result is only committed for the version sampled when its fetch started, and is
//!   discarded if the document changed (and cancelled the fetch) in the meantime
//!
//! The debounce timer and the in-flight provider call share one [`CancellationToken`], so a
//! single [`SymbolCache::cancel`] revokes both.

mod features;

use std::sync::Arc;

pub use features::{RangeSelection, SelectionTarget};
use lsp_types::{DocumentSymbolResponse, Uri};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::SharedConfig;
use crate::document::{DocumentSnapshot, SymbolDocument};
use crate::events::{OutlineEvent, OutlineEvents, OutlineSubscription};
use crate::provider::SymbolProvider;
use crate::symbol::SymbolInfo;
use crate::{Error, Result, normalize, task};

/// Result of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
	/// A new snapshot was committed.
	Committed,
	/// The snapshot already matched the document version.
	UpToDate,
	/// Cancelled or disposed before commit.
	Cancelled,
	/// The provider returned no data or failed; the previous snapshot stays.
	NoData,
}

/// The single outstanding fetch, covering both its debounce wait and its provider call.
struct InFlight {
	generation: u64,
	cancel: CancellationToken,
}

struct CacheState {
	/// Document version of `symbols`, `None` until the first commit.
	version: Option<i32>,
	symbols: Arc<[SymbolInfo]>,
	in_flight: Option<InFlight>,
	generation: u64,
	disposed: bool,
}

struct CacheInner {
	document: Arc<dyn SymbolDocument>,
	provider: Arc<dyn SymbolProvider>,
	config: SharedConfig,
	state: Mutex<CacheState>,
	events: OutlineEvents,
	status: watch::Sender<String>,
}

/// Symbol cache and refresh engine for one document.
pub struct SymbolCache {
	inner: Arc<CacheInner>,
}

impl std::fmt::Debug for SymbolCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("SymbolCache")
			.field("uri", &self.inner.document.uri().as_str())
			.field("version", &state.version)
			.field("symbols", &state.symbols.len())
			.field("in_flight", &state.in_flight.is_some())
			.field("disposed", &state.disposed)
			.finish()
	}
}

impl SymbolCache {
	/// Creates an empty cache for `document`.
	pub fn new(document: Arc<dyn SymbolDocument>, provider: Arc<dyn SymbolProvider>, config: SharedConfig) -> Self {
		let (status, _) = watch::channel(String::new());
		Self {
			inner: Arc::new(CacheInner {
				document,
				provider,
				config,
				state: Mutex::new(CacheState {
					version: None,
					symbols: Arc::from(Vec::new()),
					in_flight: None,
					generation: 0,
					disposed: false,
				}),
				events: OutlineEvents::new(),
				status,
			}),
		}
	}

	/// URI of the cached document.
	pub fn uri(&self) -> &Uri {
		self.inner.document.uri()
	}

	/// Version of the committed snapshot, `None` before the first commit.
	pub fn committed_version(&self) -> Option<i32> {
		self.inner.state.lock().version
	}

	/// The committed snapshot, possibly stale. Never triggers a fetch.
	pub fn snapshot(&self) -> Arc<[SymbolInfo]> {
		self.inner.state.lock().symbols.clone()
	}

	/// Whether a debounced or in-flight fetch is outstanding.
	pub fn is_pending(&self) -> bool {
		self.inner.state.lock().in_flight.is_some()
	}

	/// Whether [`Self::dispose`] was called.
	pub fn is_disposed(&self) -> bool {
		self.inner.state.lock().disposed
	}

	/// Subscribes to outline updates.
	pub fn subscribe(&self) -> OutlineSubscription {
		self.inner.events.subscribe()
	}

	/// Observes the decorated current-function name published for the status line.
	pub fn current_function_status(&self) -> watch::Receiver<String> {
		self.inner.status.subscribe()
	}

	/// Returns the symbols for the current document version.
	///
	/// Synchronizes the document first. A snapshot at the current version is returned as is.
	/// Otherwise pending work is cancelled and a fetch runs to completion; if it yields no
	/// usable result, the previous snapshot is returned.
	///
	/// # Errors
	///
	/// [`Error::NoProvider`] when no provider serves the document, [`Error::Disposed`] after
	/// [`Self::dispose`]. Provider failures are logged, not returned.
	pub async fn request_symbols(&self) -> Result<Arc<[SymbolInfo]>> {
		self.inner.live_symbols()?;
		self.inner.document.synchronize().await;

		let document = self.inner.document.snapshot();
		{
			let state = self.inner.state.lock();
			if state.disposed {
				return Err(Error::Disposed);
			}
			if state.version == Some(document.version) {
				return Ok(state.symbols.clone());
			}
		}

		if !self.inner.provider.has_provider(&document) {
			return Err(Error::NoProvider);
		}

		let (generation, cancel) = self.inner.begin_fetch().ok_or(Error::Disposed)?;
		let outcome = self.inner.fetch(generation, cancel, document).await;
		debug!(uri = self.uri().as_str(), outcome = ?outcome, "outline.request");
		self.inner.live_symbols()
	}

	/// Notifies the cache of a document change.
	///
	/// Cancels the debounce timer and any in-flight fetch. Does not schedule a new fetch.
	pub fn on_change(&self) {
		self.inner.cancel();
	}

	/// Schedules a debounced background refresh.
	///
	/// Supersedes any pending refresh. Failures are logged and never surfaced.
	pub fn schedule_fetch(&self) {
		let Some((generation, cancel)) = self.inner.begin_fetch() else {
			return;
		};
		let delay = self.inner.config.load().debounce();
		let inner = Arc::clone(&self.inner);
		let spawned = task::spawn_background("outline.debounce", async move {
			tokio::select! {
				_ = cancel.cancelled() => return,
				_ = tokio::time::sleep(delay) => {}
			}

			let document = inner.document.snapshot();
			if !inner.provider.has_provider(&document) {
				debug!(uri = document.uri.as_str(), "outline.schedule: no provider");
				inner.finish(generation);
				return;
			}
			inner.fetch(generation, cancel, document).await;
		});
		if spawned.is_none() {
			warn!(uri = self.uri().as_str(), "outline.schedule: no runtime available");
			self.inner.finish(generation);
		}
	}

	/// Cancels the debounce timer and the in-flight fetch, if any. Idempotent.
	pub fn cancel(&self) {
		self.inner.cancel();
	}

	/// Cancels all work and releases the snapshot and the update stream.
	///
	/// Results of provider calls still running are ignored when they return.
	pub fn dispose(&self) {
		self.inner.dispose();
	}
}

impl Drop for SymbolCache {
	fn drop(&mut self) {
		self.inner.dispose();
	}
}

impl CacheInner {
	fn live_symbols(&self) -> Result<Arc<[SymbolInfo]>> {
		let state = self.state.lock();
		if state.disposed {
			return Err(Error::Disposed);
		}
		Ok(state.symbols.clone())
	}

	/// Starts a new fetch generation, cancelling the previous one.
	fn begin_fetch(&self) -> Option<(u64, CancellationToken)> {
		let mut state = self.state.lock();
		if state.disposed {
			return None;
		}
		if let Some(previous) = state.in_flight.take() {
			previous.cancel.cancel();
		}
		state.generation = state.generation.wrapping_add(1);
		let cancel = CancellationToken::new();
		state.in_flight = Some(InFlight {
			generation: state.generation,
			cancel: cancel.clone(),
		});
		Some((state.generation, cancel))
	}

	/// Releases the in-flight slot if it still belongs to `generation`.
	fn finish(&self, generation: u64) {
		let mut state = self.state.lock();
		if state.in_flight.as_ref().is_some_and(|f| f.generation == generation) {
			state.in_flight = None;
		}
	}

	fn cancel(&self) {
		if let Some(in_flight) = self.state.lock().in_flight.take() {
			in_flight.cancel.cancel();
		}
	}

	fn dispose(&self) {
		{
			let mut state = self.state.lock();
			if state.disposed {
				return;
			}
			state.disposed = true;
			if let Some(in_flight) = state.in_flight.take() {
				in_flight.cancel.cancel();
			}
			state.symbols = Arc::from(Vec::new());
		}
		self.events.close();
		debug!(uri = self.document.uri().as_str(), "outline.dispose");
	}

	async fn fetch(&self, generation: u64, cancel: CancellationToken, document: DocumentSnapshot) -> FetchOutcome {
		let version = document.version;
		let uri = document.uri.clone();
		if self.state.lock().version == Some(version) {
			self.finish(generation);
			return FetchOutcome::UpToDate;
		}

		debug!(uri = uri.as_str(), version, "outline.fetch.start");
		let result = tokio::select! {
			_ = cancel.cancelled() => {
				self.finish(generation);
				debug!(uri = uri.as_str(), version, "outline.fetch.cancelled");
				return FetchOutcome::Cancelled;
			}
			result = self.provider.document_symbols(document, cancel.clone()) => result,
		};

		match result {
			Ok(Some(response)) => self.commit(generation, &cancel, uri, version, &response),
			Ok(None) => {
				self.finish(generation);
				debug!(uri = uri.as_str(), version, "outline.fetch: no data");
				FetchOutcome::NoData
			}
			Err(err) => {
				self.finish(generation);
				warn!(uri = uri.as_str(), version, error = %err, "outline.fetch failed");
				FetchOutcome::NoData
			}
		}
	}

	fn commit(&self, generation: u64, cancel: &CancellationToken, uri: Uri, version: i32, response: &DocumentSymbolResponse) -> FetchOutcome {
		let symbols: Arc<[SymbolInfo]> = normalize::flatten(response).into();
		let tree = normalize::outline_tree(response).into();
		{
			let mut state = self.state.lock();
			if state.in_flight.as_ref().is_some_and(|f| f.generation == generation) {
				state.in_flight = None;
			}
			// Edits cancel under this lock, so a token checked here cannot be revoked mid-commit.
			if state.disposed || cancel.is_cancelled() {
				debug!(uri = uri.as_str(), version, "outline.commit: discarded");
				return FetchOutcome::Cancelled;
			}
			if state.version.is_some_and(|committed| committed >= version) {
				return FetchOutcome::UpToDate;
			}
			state.version = Some(version);
			state.symbols = symbols;
		}

		debug!(uri = uri.as_str(), version, empty = normalize::is_empty(response), "outline.commit");
		self.events.publish(OutlineEvent { uri, version, tree });
		FetchOutcome::Committed
	}
}
