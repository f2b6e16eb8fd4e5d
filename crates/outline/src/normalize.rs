//! Normalization of provider results.
//!
//! Providers answer either with a flat `SymbolInformation[]` list, where nesting is only hinted
//! at through container names, or with a `DocumentSymbol[]` tree. Both shapes are converted at
//! this boundary into:
//! - a flattened pre-order [`SymbolInfo`] list with explicit nesting levels, used by queries
//! - an [`OutlineNode`] tree, emitted to subscribers
//!
//! Siblings are ordered by range start, then by range end descending, so that a symbol which
//! fully contains a same-start symbol comes first.

use std::cmp::Ordering;

use lsp_types::{DocumentSymbol, DocumentSymbolResponse, Range, SymbolInformation};

use crate::query::compare_positions;
use crate::symbol::{OutlineNode, SymbolInfo};

/// Returns `range` with its bounds swapped if they are reversed.
pub fn ordered_range(range: Range) -> Range {
	if compare_positions(range.start, range.end) == Ordering::Greater {
		Range::new(range.end, range.start)
	} else {
		range
	}
}

/// Document order: start ascending, then end descending.
fn compare_ranges(a: &Range, b: &Range) -> Ordering {
	compare_positions(a.start, b.start).then_with(|| compare_positions(b.end, a.end))
}

/// Flattens a provider result into the canonical pre-order symbol list.
pub fn flatten(response: &DocumentSymbolResponse) -> Vec<SymbolInfo> {
	match response {
		DocumentSymbolResponse::Flat(items) => flatten_flat(items),
		DocumentSymbolResponse::Nested(items) => {
			let mut out = Vec::new();
			flatten_nested(items, 0, &mut out);
			out
		}
	}
}

fn flatten_flat(items: &[SymbolInformation]) -> Vec<SymbolInfo> {
	let mut out: Vec<SymbolInfo> = items
		.iter()
		.map(|item| {
			let range = ordered_range(item.location.range);
			SymbolInfo {
				text: item.name.clone(),
				kind: item.kind,
				range,
				selection_range: None,
				level: 0,
				container_name: item.container_name.clone(),
				lnum: range.start.line.saturating_add(1),
				col: range.start.character.saturating_add(1),
			}
		})
		.collect();
	out.sort_by(|a, b| compare_ranges(&a.range, &b.range));
	out
}

fn sorted_siblings(items: &[DocumentSymbol]) -> Vec<&DocumentSymbol> {
	let mut siblings: Vec<&DocumentSymbol> = items.iter().collect();
	siblings.sort_by(|a, b| compare_ranges(&ordered_range(a.range), &ordered_range(b.range)));
	siblings
}

fn flatten_nested(items: &[DocumentSymbol], level: usize, out: &mut Vec<SymbolInfo>) {
	for item in sorted_siblings(items) {
		let range = ordered_range(item.range);
		out.push(SymbolInfo {
			text: item.name.clone(),
			kind: item.kind,
			range,
			selection_range: Some(ordered_range(item.selection_range)),
			level,
			container_name: None,
			lnum: range.start.line.saturating_add(1),
			col: range.start.character.saturating_add(1),
		});
		if let Some(children) = item.children.as_deref() {
			flatten_nested(children, level + 1, out);
		}
	}
}

/// Builds the hierarchical outline emitted to subscribers.
///
/// Flat results become a one-level tree so subscribers always see the same shape.
pub fn outline_tree(response: &DocumentSymbolResponse) -> Vec<OutlineNode> {
	match response {
		DocumentSymbolResponse::Flat(items) => {
			let mut ordered: Vec<&SymbolInformation> = items.iter().collect();
			ordered.sort_by(|a, b| compare_ranges(&ordered_range(a.location.range), &ordered_range(b.location.range)));
			ordered
				.into_iter()
				.map(|item| {
					let range = ordered_range(item.location.range);
					OutlineNode {
						name: item.name.clone(),
						detail: item.container_name.clone(),
						kind: item.kind,
						range,
						selection_range: range,
						children: Vec::new(),
					}
				})
				.collect()
		}
		DocumentSymbolResponse::Nested(items) => nested_nodes(items),
	}
}

fn nested_nodes(items: &[DocumentSymbol]) -> Vec<OutlineNode> {
	sorted_siblings(items)
		.into_iter()
		.map(|item| OutlineNode {
			name: item.name.clone(),
			detail: item.detail.clone(),
			kind: item.kind,
			range: ordered_range(item.range),
			selection_range: ordered_range(item.selection_range),
			children: item.children.as_deref().map(nested_nodes).unwrap_or_default(),
		})
		.collect()
}

/// Whether a provider result carries no symbols at all.
pub fn is_empty(response: &DocumentSymbolResponse) -> bool {
	match response {
		DocumentSymbolResponse::Flat(items) => items.is_empty(),
		DocumentSymbolResponse::Nested(items) => items.is_empty(),
	}
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
	use lsp_types::{Location, Position, SymbolKind, Uri};

	use super::*;

	fn range(start: (u32, u32), end: (u32, u32)) -> Range {
		Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
	}

	fn node(name: &str, kind: SymbolKind, r: Range, children: Vec<DocumentSymbol>) -> DocumentSymbol {
		DocumentSymbol {
			name: name.into(),
			detail: None,
			kind,
			tags: None,
			deprecated: None,
			range: r,
			selection_range: Range::new(r.start, r.start),
			children: if children.is_empty() { None } else { Some(children) },
		}
	}

	fn info(name: &str, r: Range, container: Option<&str>) -> SymbolInformation {
		SymbolInformation {
			name: name.into(),
			kind: SymbolKind::FUNCTION,
			tags: None,
			deprecated: None,
			location: Location {
				uri: "file:///test.rs".parse::<Uri>().unwrap(),
				range: r,
			},
			container_name: container.map(Into::into),
		}
	}

	#[test]
	fn nested_result_flattens_in_preorder_with_levels() {
		let response = DocumentSymbolResponse::Nested(vec![node(
			"Foo",
			SymbolKind::CLASS,
			range((0, 0), (10, 1)),
			vec![
				node("baz", SymbolKind::METHOD, range((5, 2), (8, 3)), vec![]),
				node("bar", SymbolKind::METHOD, range((1, 2), (4, 3)), vec![]),
			],
		)]);

		let flat = flatten(&response);
		let names: Vec<_> = flat.iter().map(|s| (s.text.as_str(), s.level)).collect();
		assert_eq!(names, vec![("Foo", 0), ("bar", 1), ("baz", 1)]);
		assert!(flat.iter().all(|s| s.selection_range.is_some()));
	}

	#[test]
	fn children_follow_parent_before_next_sibling() {
		let response = DocumentSymbolResponse::Nested(vec![
			node("second", SymbolKind::FUNCTION, range((20, 0), (30, 0)), vec![]),
			node(
				"first",
				SymbolKind::CLASS,
				range((0, 0), (10, 0)),
				vec![node("inner", SymbolKind::METHOD, range((2, 0), (3, 0)), vec![])],
			),
		]);

		let names: Vec<_> = flatten(&response).into_iter().map(|s| s.text).collect();
		assert_eq!(names, vec!["first", "inner", "second"]);
	}

	#[test]
	fn flat_result_sorts_containing_symbol_first() {
		let response = DocumentSymbolResponse::Flat(vec![
			info("later", range((12, 0), (14, 0)), None),
			info("narrow", range((2, 0), (3, 0)), Some("Outer")),
			info("wide", range((2, 0), (9, 0)), None),
		]);

		let flat = flatten(&response);
		let names: Vec<_> = flat.iter().map(|s| s.text.as_str()).collect();
		assert_eq!(names, vec!["wide", "narrow", "later"]);
		assert!(flat.iter().all(|s| s.level == 0));
		assert_eq!(flat[1].container_name.as_deref(), Some("Outer"));
	}

	#[test]
	fn line_and_column_are_one_based() {
		let response = DocumentSymbolResponse::Flat(vec![info("f", range((4, 7), (6, 0)), None)]);
		let flat = flatten(&response);
		assert_eq!((flat[0].lnum, flat[0].col), (5, 8));
	}

	#[test]
	fn extreme_positions_saturate() {
		let response = DocumentSymbolResponse::Nested(vec![node("edge", SymbolKind::FUNCTION, range((u32::MAX, u32::MAX), (u32::MAX, u32::MAX)), vec![])]);
		let flat = flatten(&response);
		assert_eq!((flat[0].lnum, flat[0].col), (u32::MAX, u32::MAX));

		let response = DocumentSymbolResponse::Flat(vec![info("f", range((0, u32::MAX), (1, 0)), None)]);
		let flat = flatten(&response);
		assert_eq!((flat[0].lnum, flat[0].col), (1, u32::MAX));
	}

	#[test]
	fn reversed_ranges_are_reordered() {
		let response = DocumentSymbolResponse::Flat(vec![info("f", range((6, 0), (4, 7)), None)]);
		let flat = flatten(&response);
		assert_eq!(flat[0].range, range((4, 7), (6, 0)));
	}

	#[test]
	fn flat_result_becomes_one_level_tree() {
		let response = DocumentSymbolResponse::Flat(vec![
			info("b", range((5, 0), (6, 0)), Some("mod")),
			info("a", range((1, 0), (2, 0)), None),
		]);

		let tree = outline_tree(&response);
		assert_eq!(tree.len(), 2);
		assert_eq!(tree[0].name, "a");
		assert!(tree.iter().all(|n| n.children.is_empty()));
		assert_eq!(tree[1].detail.as_deref(), Some("mod"));
	}

	#[test]
	fn nested_tree_keeps_children_sorted() {
		let response = DocumentSymbolResponse::Nested(vec![node(
			"Foo",
			SymbolKind::CLASS,
			range((0, 0), (10, 1)),
			vec![
				node("baz", SymbolKind::METHOD, range((5, 2), (8, 3)), vec![]),
				node("bar", SymbolKind::METHOD, range((1, 2), (4, 3)), vec![]),
			],
		)]);

		let tree = outline_tree(&response);
		assert_eq!(tree[0].subtree_len(), 3);
		let children: Vec<_> = tree[0].children.iter().map(|n| n.name.as_str()).collect();
		assert_eq!(children, vec!["bar", "baz"]);
	}
}
