//! Document symbol outline cache and positional symbol queries.
//!
//! This crate keeps an up-to-date outline of the structural symbols of open documents
//! (functions, classes, methods, ...) as reported by an external symbol provider, usually a
//! language server, and answers positional queries against it:
//! - which symbol contains the cursor ([`SymbolCache::current_function`], [`SymbolCache::symbol_at`])
//! - which range to select for the symbol enclosing a position or selection
//!   ([`SymbolCache::select_symbol_range`])
//! - the flattened, document-ordered symbol list ([`SymbolCache::request_symbols`])
//!
//! The crate never computes symbols itself. Provider calls are expensive, so each
//! [`SymbolCache`] debounces background refreshes, keeps at most one provider call in flight,
//! and only commits results for the document version they were requested against.
//!
//! ## Layers
//!
//! - [`cache`]: the per-document refresh engine (debounce, cancellation, version gating).
//! - [`query`]: stateless algorithms over a flattened snapshot.
//! - [`normalize`]: conversion of flat or nested provider results into one canonical shape.
//! - [`registry`]: one cache per eligible open document.
#![warn(missing_docs)]

/// Re-export of the [`lsp_types`] dependency of this crate.
pub use lsp_types;

pub mod cache;
pub mod config;
pub mod document;
pub mod events;
pub mod normalize;
pub mod provider;
pub mod query;
pub mod registry;
pub mod symbol;
mod task;

pub use cache::{RangeSelection, SelectionTarget, SymbolCache};
pub use config::{OutlineConfig, SharedConfig};
pub use document::{DocumentKind, DocumentSnapshot, SymbolDocument, TextDocument};
pub use events::{OutlineEvent, OutlineEvents, OutlineSubscription};
pub use provider::SymbolProvider;
pub use registry::OutlineRegistry;
pub use symbol::{OutlineNode, SymbolInfo};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// No symbol provider is available for the document.
	#[error("no document symbol provider available")]
	NoProvider,
	/// The cache was disposed before or during the operation.
	#[error("symbol cache disposed")]
	Disposed,
	/// The symbol provider failed to answer.
	#[error("symbol provider failed: {0}")]
	Provider(String),
	/// A configuration value could not be decoded.
	#[error("invalid outline configuration: {0}")]
	Config(#[from] serde_json::Error),
}
