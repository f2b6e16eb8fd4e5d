//! Query-facing symbol records.

use lsp_types::{Range, SymbolKind};

/// Kinds considered by "current function" resolution.
pub const FUNCTION_LIKE_KINDS: [SymbolKind; 4] = [SymbolKind::CLASS, SymbolKind::METHOD, SymbolKind::FUNCTION, SymbolKind::STRUCT];

/// Display names of the standard LSP symbol kinds.
const KIND_NAMES: [(SymbolKind, &str); 26] = [
	(SymbolKind::FILE, "File"),
	(SymbolKind::MODULE, "Module"),
	(SymbolKind::NAMESPACE, "Namespace"),
	(SymbolKind::PACKAGE, "Package"),
	(SymbolKind::CLASS, "Class"),
	(SymbolKind::METHOD, "Method"),
	(SymbolKind::PROPERTY, "Property"),
	(SymbolKind::FIELD, "Field"),
	(SymbolKind::CONSTRUCTOR, "Constructor"),
	(SymbolKind::ENUM, "Enum"),
	(SymbolKind::INTERFACE, "Interface"),
	(SymbolKind::FUNCTION, "Function"),
	(SymbolKind::VARIABLE, "Variable"),
	(SymbolKind::CONSTANT, "Constant"),
	(SymbolKind::STRING, "String"),
	(SymbolKind::NUMBER, "Number"),
	(SymbolKind::BOOLEAN, "Boolean"),
	(SymbolKind::ARRAY, "Array"),
	(SymbolKind::OBJECT, "Object"),
	(SymbolKind::KEY, "Key"),
	(SymbolKind::NULL, "Null"),
	(SymbolKind::ENUM_MEMBER, "EnumMember"),
	(SymbolKind::STRUCT, "Struct"),
	(SymbolKind::EVENT, "Event"),
	(SymbolKind::OPERATOR, "Operator"),
	(SymbolKind::TYPE_PARAMETER, "TypeParameter"),
];

/// Returns the display name of a symbol kind (e.g. `"Function"`).
///
/// Kinds outside the standard set map to `"Unknown"`.
pub fn symbol_kind_name(kind: SymbolKind) -> &'static str {
	KIND_NAMES.iter().find(|(k, _)| *k == kind).map(|(_, name)| *name).unwrap_or("Unknown")
}

/// Parses a kind display name, ignoring ASCII case.
pub fn symbol_kind_from_name(name: &str) -> Option<SymbolKind> {
	KIND_NAMES.iter().find(|(_, n)| n.eq_ignore_ascii_case(name)).map(|(kind, _)| *kind)
}

/// A flattened symbol as served to queries.
///
/// Produced by [`crate::normalize`] in document pre-order: every symbol is immediately followed
/// by its descendants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
	/// Display name of the symbol.
	pub text: String,
	/// Symbol kind.
	pub kind: SymbolKind,
	/// Span of the whole symbol body. Never reversed.
	pub range: Range,
	/// Span of the symbol name, for hierarchical results only.
	pub selection_range: Option<Range>,
	/// Nesting depth, `0` for top-level symbols.
	pub level: usize,
	/// Enclosing scope name, for flat results only.
	pub container_name: Option<String>,
	/// One-based line of `range.start`.
	pub lnum: u32,
	/// One-based column of `range.start`.
	pub col: u32,
}

impl SymbolInfo {
	/// Display name of this symbol's kind.
	pub fn kind_name(&self) -> &'static str {
		symbol_kind_name(self.kind)
	}

	/// Whether this entry is an anonymous callback argument reported as a function.
	pub fn is_callback(&self) -> bool {
		self.text.ends_with(") callback")
	}
}

/// A node of the hierarchical outline emitted to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
	/// Symbol name.
	pub name: String,
	/// Optional detail string (e.g. a signature).
	pub detail: Option<String>,
	/// Symbol kind.
	pub kind: SymbolKind,
	/// Span of the whole symbol body.
	pub range: Range,
	/// Span of the symbol name.
	pub selection_range: Range,
	/// Child symbols in document order.
	pub children: Vec<OutlineNode>,
}

impl OutlineNode {
	/// Total number of nodes in this subtree, including `self`.
	pub fn subtree_len(&self) -> usize {
		1 + self.children.iter().map(OutlineNode::subtree_len).sum::<usize>()
	}
}
