//! Outline update notifications.
//!
//! Each [`crate::SymbolCache`] owns one [`OutlineEvents`] hub and publishes an [`OutlineEvent`]
//! after every successful commit. Subscribers hold an [`OutlineSubscription`]; dropping or
//! disposing it unsubscribes.

use std::sync::{Arc, Weak};

use lsp_types::Uri;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::symbol::OutlineNode;

/// Hierarchical outline committed for one document version.
#[derive(Debug, Clone)]
pub struct OutlineEvent {
	/// Document URI.
	pub uri: Uri,
	/// Version the outline was computed against.
	pub version: i32,
	/// Top-level outline nodes in document order.
	pub tree: Arc<[OutlineNode]>,
}

#[derive(Debug, Default)]
struct Subscribers {
	next_id: u64,
	senders: Vec<(u64, mpsc::UnboundedSender<OutlineEvent>)>,
	closed: bool,
}

/// Publish/subscribe hub for [`OutlineEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct OutlineEvents {
	inner: Arc<Mutex<Subscribers>>,
}

impl OutlineEvents {
	/// Creates an empty hub.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new subscriber.
	///
	/// Subscribing to a closed hub yields a subscription that never receives events. The queue is
	/// unbounded, so callers must keep draining the subscription or drop it.
	pub fn subscribe(&self) -> OutlineSubscription {
		let (tx, rx) = mpsc::unbounded_channel();
		let mut inner = self.inner.lock();
		inner.next_id = inner.next_id.wrapping_add(1);
		let id = inner.next_id;
		if !inner.closed {
			inner.senders.push((id, tx));
		}
		OutlineSubscription {
			id,
			rx,
			hub: Arc::downgrade(&self.inner),
		}
	}

	/// Delivers `event` to every live subscriber and returns how many received it.
	pub fn publish(&self, event: OutlineEvent) -> usize {
		let mut inner = self.inner.lock();
		inner.senders.retain(|(_, tx)| tx.send(event.clone()).is_ok());
		inner.senders.len()
	}

	/// Number of registered subscribers.
	pub fn subscriber_count(&self) -> usize {
		self.inner.lock().senders.len()
	}

	/// Drops every subscriber and rejects new ones. Pending events stay readable.
	pub fn close(&self) {
		let mut inner = self.inner.lock();
		inner.closed = true;
		inner.senders.clear();
	}
}

/// Receiving end of an [`OutlineEvents`] subscription.
#[derive(Debug)]
pub struct OutlineSubscription {
	id: u64,
	rx: mpsc::UnboundedReceiver<OutlineEvent>,
	hub: Weak<Mutex<Subscribers>>,
}

impl OutlineSubscription {
	/// Waits for the next event. Returns `None` once the hub is closed and drained.
	pub async fn recv(&mut self) -> Option<OutlineEvent> {
		self.rx.recv().await
	}

	/// Returns the next event if one is queued.
	pub fn try_recv(&mut self) -> Option<OutlineEvent> {
		self.rx.try_recv().ok()
	}

	/// Unsubscribes.
	pub fn dispose(self) {}
}

impl Drop for OutlineSubscription {
	fn drop(&mut self) {
		if let Some(hub) = self.hub.upgrade() {
			hub.lock().senders.retain(|(id, _)| *id != self.id);
		}
	}
}
