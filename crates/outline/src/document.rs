//! Document collaborator.
//!
//! The cache reads versions and text through [`SymbolDocument`]; it never owns the buffer.
//! [`TextDocument`] is a rope-backed implementation for hosts without their own buffer type.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use lsp_types::Uri;
use parking_lot::RwLock;
use ropey::Rope;

/// Eligibility class of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
	/// A regular file-backed document.
	#[default]
	File,
	/// An internal document (prompt, terminal, scratch panel, ...). Never gets a cache.
	Special,
}

/// Immutable view of a document at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
	/// Document URI.
	pub uri: Uri,
	/// Version the text belongs to.
	pub version: i32,
	/// Language identifier (e.g. `"rust"`).
	pub language_id: String,
	/// Full text. Cloning is cheap.
	pub text: Rope,
}

/// A document whose symbols are cached.
#[async_trait]
pub trait SymbolDocument: Send + Sync {
	/// Document URI.
	fn uri(&self) -> &Uri;

	/// Eligibility class.
	fn kind(&self) -> DocumentKind {
		DocumentKind::File
	}

	/// Current version. Increases on every change.
	fn version(&self) -> i32;

	/// Captures the current text and version.
	fn snapshot(&self) -> DocumentSnapshot;

	/// Flushes pending edits to the provider side before a forced read.
	async fn synchronize(&self) {}
}

/// In-memory document backed by a [`Rope`].
#[derive(Debug)]
pub struct TextDocument {
	uri: Uri,
	kind: DocumentKind,
	language_id: String,
	version: AtomicI32,
	text: RwLock<Rope>,
}

impl TextDocument {
	/// Creates a file document at version 0.
	pub fn new(uri: Uri, language_id: impl Into<String>, text: &str) -> Self {
		Self {
			uri,
			kind: DocumentKind::File,
			language_id: language_id.into(),
			version: AtomicI32::new(0),
			text: RwLock::new(Rope::from_str(text)),
		}
	}

	/// Sets the eligibility class.
	pub fn with_kind(mut self, kind: DocumentKind) -> Self {
		self.kind = kind;
		self
	}

	/// Replaces the whole text and returns the new version.
	pub fn set_text(&self, text: &str) -> i32 {
		let mut rope = self.text.write();
		*rope = Rope::from_str(text);
		self.version.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Inserts `text` at a char offset and returns the new version.
	///
	/// Offsets past the end are clamped.
	pub fn insert(&self, char_idx: usize, text: &str) -> i32 {
		let mut rope = self.text.write();
		let idx = char_idx.min(rope.len_chars());
		rope.insert(idx, text);
		self.version.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Current text.
	pub fn text(&self) -> Rope {
		self.text.read().clone()
	}
}

#[async_trait]
impl SymbolDocument for TextDocument {
	fn uri(&self) -> &Uri {
		&self.uri
	}

	fn kind(&self) -> DocumentKind {
		self.kind
	}

	fn version(&self) -> i32 {
		self.version.load(Ordering::Acquire)
	}

	fn snapshot(&self) -> DocumentSnapshot {
		// Text and version are written under the same lock.
		let text = self.text.read();
		DocumentSnapshot {
			uri: self.uri.clone(),
			version: self.version(),
			language_id: self.language_id.clone(),
			text: text.clone(),
		}
	}
}
