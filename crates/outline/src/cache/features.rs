//! Read features built on the cache: current function, symbol-range selection and lookup.

use lsp_types::{Position, Range, SymbolKind};

use super::SymbolCache;
use crate::Result;
use crate::query::{self, point_range};
use crate::symbol::{FUNCTION_LIKE_KINDS, SymbolInfo};

/// Reference for [`SymbolCache::select_symbol_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
	/// Cursor position in normal mode.
	Cursor(Position),
	/// Active visual selection.
	Visual(Range),
}

impl SelectionTarget {
	/// Range the enclosing symbol must contain.
	pub fn range(&self) -> Range {
		match *self {
			Self::Cursor(position) => point_range(position),
			Self::Visual(range) => range,
		}
	}
}

/// Outcome of [`SymbolCache::select_symbol_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
	/// Select this range.
	Select(Range),
	/// No enclosing symbol; restore the previous visual selection.
	KeepVisual(Range),
	/// No enclosing symbol around the cursor.
	Nothing,
}

impl SymbolCache {
	/// Innermost symbol containing `target`, optionally restricted to `kinds`.
	pub async fn symbol_at(&self, target: Range, kinds: Option<&[SymbolKind]>) -> Result<Option<SymbolInfo>> {
		let symbols = self.request_symbols().await?;
		Ok(query::innermost(&symbols, target, kinds).cloned())
	}

	/// Name of the class, method, function or struct enclosing `position`, prefixed with its
	/// configured kind label. Empty when nothing encloses it.
	///
	/// With `auto_update_current_function` enabled, the name is also published to
	/// [`SymbolCache::current_function_status`].
	pub async fn current_function(&self, position: Position) -> Result<String> {
		let symbols = self.request_symbols().await?;
		let config = self.inner.config.load();
		let name = query::innermost(&symbols, point_range(position), Some(&FUNCTION_LIKE_KINDS))
			.map(|symbol| query::decorated_name(symbol, &config.kind_labels))
			.unwrap_or_default();
		if config.auto_update_current_function {
			self.inner.status.send_replace(name.clone());
		}
		Ok(name)
	}

	/// Range of the innermost symbol of one of `kinds` enclosing `target`.
	///
	/// A symbol whose range equals the visual selection is skipped, so repeated calls with the
	/// previous result walk outward. With `inner`, the range is narrowed to the symbol body, and a
	/// symbol whose body equals the visual selection is skipped as well.
	pub async fn select_symbol_range(&self, target: SelectionTarget, kinds: &[SymbolKind], inner: bool) -> Result<RangeSelection> {
		let symbols = self.request_symbols().await?;
		let reference = target.range();
		let text = inner.then(|| self.inner.document.snapshot().text);
		let body = |symbol: &SymbolInfo| match &text {
			Some(text) => query::inner_range(text, symbol.range),
			None => symbol.range,
		};

		let Some(symbol) = query::enclosing_symbol_where(&symbols, reference, kinds, |symbol| body(symbol) != reference) else {
			return Ok(match target {
				SelectionTarget::Visual(range) => RangeSelection::KeepVisual(range),
				SelectionTarget::Cursor(_) => RangeSelection::Nothing,
			});
		};
		Ok(RangeSelection::Select(body(symbol)))
	}
}
