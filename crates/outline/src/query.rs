//! Stateless queries over a flattened symbol snapshot.
//!
//! All searches scan the snapshot backwards. Since [`crate::normalize`] emits every symbol
//! directly before its descendants, the first containing match found from the end is the most
//! deeply nested one, without rebuilding the tree.

use std::cmp::Ordering;
use std::collections::HashMap;

use lsp_types::{Position, Range, SymbolKind};
use ropey::Rope;

use crate::symbol::SymbolInfo;

/// Compares two positions in document order.
pub fn compare_positions(a: Position, b: Position) -> Ordering {
	(a.line, a.character).cmp(&(b.line, b.character))
}

/// Whether `outer` contains `inner`, bounds included.
pub fn range_contains(outer: &Range, inner: &Range) -> bool {
	compare_positions(outer.start, inner.start) != Ordering::Greater && compare_positions(inner.end, outer.end) != Ordering::Greater
}

/// Zero-width range at `position`.
pub fn point_range(position: Position) -> Range {
	Range::new(position, position)
}

/// Finds the innermost symbol whose range contains `target`.
///
/// Anonymous callback entries (names ending in `") callback"`) are skipped so the search
/// continues to the next enclosing symbol. When `kinds` is given, only those kinds match.
pub fn innermost<'a>(symbols: &'a [SymbolInfo], target: Range, kinds: Option<&[SymbolKind]>) -> Option<&'a SymbolInfo> {
	symbols.iter().rev().find(|symbol| {
		!symbol.is_callback() && kinds.is_none_or(|kinds| kinds.contains(&symbol.kind)) && range_contains(&symbol.range, &target)
	})
}

/// Finds the innermost symbol of one of `kinds` enclosing `reference`, excluding a symbol whose
/// range equals `reference`.
///
/// Feeding the returned range back in walks outward through successively larger symbols.
pub fn enclosing_symbol<'a>(symbols: &'a [SymbolInfo], reference: Range, kinds: &[SymbolKind]) -> Option<&'a SymbolInfo> {
	enclosing_symbol_where(symbols, reference, kinds, |_| true)
}

/// Like [`enclosing_symbol`], additionally skipping symbols rejected by `accept`.
pub fn enclosing_symbol_where<'a>(
	symbols: &'a [SymbolInfo],
	reference: Range,
	kinds: &[SymbolKind],
	accept: impl Fn(&SymbolInfo) -> bool,
) -> Option<&'a SymbolInfo> {
	symbols
		.iter()
		.rev()
		.find(|symbol| kinds.contains(&symbol.kind) && symbol.range != reference && range_contains(&symbol.range, &reference) && accept(symbol))
}

/// Narrows a symbol range to its body, dropping the first and last lines.
///
/// The body starts after the indentation of the second line and ends at the end of the
/// penultimate line. Ranges spanning fewer than three lines have no body and are returned as is.
pub fn inner_range(text: &Rope, range: Range) -> Range {
	if range.end.line.saturating_sub(range.start.line) < 2 {
		return range;
	}
	let start_line = range.start.line + 1;
	let end_line = range.end.line - 1;
	let start = line_chars(text, start_line)
		.take_while(|c| c.is_whitespace())
		.map(char::len_utf16)
		.sum::<usize>();
	let end = line_chars(text, end_line).map(char::len_utf16).sum::<usize>();
	Range::new(Position::new(start_line, start as u32), Position::new(end_line, end as u32))
}

/// Characters of line `line`, without its line terminator.
fn line_chars(text: &Rope, line: u32) -> impl Iterator<Item = char> + '_ {
	text.get_line(line as usize)
		.into_iter()
		.flat_map(|slice| slice.chars())
		.filter(|c| *c != '\n' && *c != '\r')
}

/// Prefixes the symbol name with the label configured for its lower-cased kind name.
///
/// `{"method": "m"}` turns method `bar` into `"m bar"`; kinds without a label keep the bare name.
pub fn decorated_name(symbol: &SymbolInfo, labels: &HashMap<String, String>) -> String {
	match labels.get(&symbol.kind_name().to_ascii_lowercase()) {
		Some(label) if !label.is_empty() => format!("{label} {}", symbol.text),
		_ => symbol.text.clone(),
	}
}
