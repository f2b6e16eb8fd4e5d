//! Symbol provider collaborator.

use async_trait::async_trait;
use lsp_types::DocumentSymbolResponse;
use tokio_util::sync::CancellationToken;

use crate::Result;
use crate::document::DocumentSnapshot;

/// Source of document symbols, typically a language server client.
///
/// Implementations should stop work once `cancel` fires. The cache discards any result that
/// arrives after cancellation either way.
#[async_trait]
pub trait SymbolProvider: Send + Sync {
	/// Whether a provider is available for this document.
	fn has_provider(&self, _document: &DocumentSnapshot) -> bool {
		true
	}

	/// Requests symbols for `document`.
	///
	/// `Ok(None)` means the provider produced no data, which is distinct from an empty outline.
	async fn document_symbols(&self, document: DocumentSnapshot, cancel: CancellationToken) -> Result<Option<DocumentSymbolResponse>>;
}
