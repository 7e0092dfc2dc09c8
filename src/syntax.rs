//! JSON/JSONC syntax trees with source offsets.
//!
//! Parsing goes through tree-sitter, then the CST is copied into an arena
//! where parent and child links are indices. Node ids are assigned in
//! document (pre-)order.

use std::ops::Range;

use tree_sitter::Parser;

use crate::grammar;

/// Deepest nesting accepted when converting a parse tree.
const MAX_DEPTH: usize = 512;

/// The property key that marks a JSON Reference.
pub const REF_KEY: &str = "$ref";

/// One node of the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// What the node is, with the fields relevant to that kind.
    pub kind: NodeKind,
    /// Enclosing node, `None` for the root.
    pub parent: Option<NodeId>,
    /// Byte range in the source text. Always inside the parent's span.
    pub span: Range<usize>,
}

/// Index of a node in its `SyntaxTree`. Only meaningful for the tree that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(
    /// Position in the arena.
    usize,
);

/// Node variants. Object children are always `Property` nodes and a
/// property's key is always a `String` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `[ ... ]` with its elements in order.
    Array(Vec<NodeId>),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
    /// A number, kept as its source lexeme.
    Number(String),
    /// `{ ... }` with its properties in order.
    Object(Vec<NodeId>),
    /// A `"key": value` member of an object.
    Property {
        /// The key node.
        key: NodeId,
        /// The value node.
        value: NodeId,
    },
    /// A string, already unescaped.
    String(String),
}

/// A parsed document. Owns every node; links are `NodeId`s.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    /// All nodes in pre-order.
    nodes: Vec<Node>,
    /// The top-level value.
    root: NodeId,
}

impl SyntaxTree {
    /// Child ids in document order. A property yields `[key, value]`.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        return match self.kind(id) {
            Some(NodeKind::Array(children) | NodeKind::Object(children)) => children.clone(),
            Some(NodeKind::Property { key, value }) => vec![*key, *value],
            _ => Vec::new(),
        };
    }

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        return self.node(id).map(|n| return &n.kind);
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        return self.nodes.get(id.0);
    }

    /// Innermost node whose span contains `offset`, right bound inclusive.
    /// When two siblings both touch the offset the rightmost one wins.
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        if !self.contains(self.root, offset) {
            return None;
        }
        let mut current = self.root;
        loop {
            let next = self
                .children(current)
                .into_iter()
                .rev()
                .find(|child| return self.contains(*child, offset));
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    /// Enclosing node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        return self.node(id).and_then(|n| return n.parent);
    }

    /// Key text of a property node.
    pub fn property_key(&self, property: NodeId) -> Option<&str> {
        let Some(NodeKind::Property { key, .. }) = self.kind(property) else {
            return None;
        };
        return self.string_value(*key);
    }

    /// If `property` is a `"$ref": "<string>"` member, its value node and raw text.
    pub fn ref_value(&self, property: NodeId) -> Option<(NodeId, &str)> {
        let Some(NodeKind::Property { value, .. }) = self.kind(property) else {
            return None;
        };
        if self.property_key(property)? != REF_KEY {
            return None;
        }
        let raw = self.string_value(*value)?;
        return Some((*value, raw));
    }

    /// The top-level value.
    pub const fn root(&self) -> NodeId {
        return self.root;
    }

    /// Byte range of a node.
    pub fn span(&self, id: NodeId) -> Option<Range<usize>> {
        return self.node(id).map(|n| return n.span.clone());
    }

    /// Text of a string node.
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        return match self.kind(id) {
            Some(NodeKind::String(text)) => Some(text.as_str()),
            _ => None,
        };
    }

    /// Whether a node's span covers `offset`, inclusive on both ends.
    fn contains(&self, id: NodeId, offset: usize) -> bool {
        return self
            .node(id)
            .is_some_and(|n| return n.span.start <= offset && offset <= n.span.end);
    }
}

/// Parse JSON or JSONC text. Returns `None` for malformed text, an empty
/// document, more than one top-level value, or nesting deeper than `MAX_DEPTH`.
pub fn parse(text: &str) -> Option<SyntaxTree> {
    let mut parser = Parser::new();
    parser.set_language(&grammar::json()).ok()?;
    let tree = parser.parse(text, None)?;
    let document = tree.root_node();
    if document.has_error() {
        return None;
    }

    let mut cursor = document.walk();
    let mut values = document
        .named_children(&mut cursor)
        .filter(|n| return n.kind() != "comment");
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    let mut builder = TreeBuilder {
        nodes: Vec::new(),
        source: text,
    };
    let root = builder.convert(value, None, 0)?;
    return Some(SyntaxTree {
        nodes: builder.nodes,
        root,
    });
}

/// Copies a tree-sitter CST into the arena.
struct TreeBuilder<'s> {
    /// Arena under construction.
    nodes: Vec<Node>,
    /// Source text the CST was parsed from.
    source: &'s str,
}

impl TreeBuilder<'_> {
    /// Convert one CST value node (and its subtree). `None` on any shape the
    /// arena cannot represent.
    fn convert(
        &mut self,
        cst: tree_sitter::Node<'_>,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Option<NodeId> {
        if depth > MAX_DEPTH {
            return None;
        }
        let id = NodeId(self.nodes.len());
        // Reserve the slot first so ids follow document order.
        self.nodes.push(Node {
            kind: NodeKind::Null,
            parent,
            span: cst.start_byte()..cst.end_byte(),
        });

        let next = depth.saturating_add(1);
        let kind = match cst.kind() {
            "array" => NodeKind::Array(self.convert_members(cst, id, next)?),
            "false" => NodeKind::Boolean(false),
            "null" => NodeKind::Null,
            "number" => NodeKind::Number(self.text(cst)?.to_string()),
            "object" => NodeKind::Object(self.convert_members(cst, id, next)?),
            "pair" => self.convert_pair(cst, id, next)?,
            "string" => NodeKind::String(decode_string(self.text(cst)?)),
            "true" => NodeKind::Boolean(true),
            _ => return None,
        };
        self.nodes.get_mut(id.0)?.kind = kind;
        return Some(id);
    }

    /// Convert the non-comment named children of an object or array.
    fn convert_members(
        &mut self,
        cst: tree_sitter::Node<'_>,
        parent: NodeId,
        depth: usize,
    ) -> Option<Vec<NodeId>> {
        let is_object = cst.kind() == "object";
        let mut cursor = cst.walk();
        let members: Vec<tree_sitter::Node<'_>> = cst
            .named_children(&mut cursor)
            .filter(|n| return n.kind() != "comment")
            .collect();

        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            if is_object && member.kind() != "pair" {
                return None;
            }
            ids.push(self.convert(member, Some(parent), depth)?);
        }
        return Some(ids);
    }

    /// Convert a `pair` into a property whose key must be a string.
    fn convert_pair(
        &mut self,
        cst: tree_sitter::Node<'_>,
        id: NodeId,
        depth: usize,
    ) -> Option<NodeKind> {
        let key_cst = cst.child_by_field_name("key")?;
        let value_cst = cst.child_by_field_name("value")?;
        let key = self.convert(key_cst, Some(id), depth)?;
        if !matches!(self.nodes.get(key.0)?.kind, NodeKind::String(_)) {
            return None;
        }
        let value = self.convert(value_cst, Some(id), depth)?;
        return Some(NodeKind::Property { key, value });
    }

    /// Source text of a CST node.
    fn text(&self, cst: tree_sitter::Node<'_>) -> Option<&str> {
        return self.source.get(cst.start_byte()..cst.end_byte());
    }
}

/// Unescape a quoted string literal. Falls back to the raw contents when the
/// literal holds something strict JSON rejects (raw control characters).
fn decode_string(literal: &str) -> String {
    if let Ok(decoded) = serde_json::from_str::<String>(literal) {
        return decoded;
    }
    let inner = literal.strip_prefix('"').unwrap_or(literal);
    return inner.strip_suffix('"').unwrap_or(inner).to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_property_value(tree: &SyntaxTree, name: &str) -> NodeId {
        tree.children(tree.root())
            .into_iter()
            .find(|p| tree.property_key(*p) == Some(name))
            .and_then(|p| match tree.kind(p) {
                Some(NodeKind::Property { value, .. }) => Some(*value),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn parses_scalars_and_containers() {
        let tree = parse(r#"{"a": [1, true, null, "x\ny"], "b": -2.5e3}"#).unwrap();
        let a = root_property_value(&tree, "a");
        let items = tree.children(a);
        assert_eq!(items.len(), 4);
        assert_eq!(tree.kind(items[0]), Some(&NodeKind::Number("1".to_string())));
        assert_eq!(tree.kind(items[1]), Some(&NodeKind::Boolean(true)));
        assert_eq!(tree.kind(items[2]), Some(&NodeKind::Null));
        assert_eq!(tree.string_value(items[3]), Some("x\ny"));

        let b = root_property_value(&tree, "b");
        assert_eq!(tree.kind(b), Some(&NodeKind::Number("-2.5e3".to_string())));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let text = r#"{"k": "v"}"#;
        let tree = parse(text).unwrap();
        assert_eq!(tree.span(tree.root()), Some(0..text.len()));
        let v = root_property_value(&tree, "k");
        assert_eq!(tree.span(v), Some(6..9));
    }

    #[test]
    fn property_children_are_key_then_value() {
        let tree = parse(r#"{"k": 1}"#).unwrap();
        let property = tree.children(tree.root())[0];
        let children = tree.children(property);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.string_value(children[0]), Some("k"));
        assert_eq!(tree.parent(children[1]), Some(property));
        assert_eq!(tree.parent(property), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn accepts_comments() {
        let text = "// leading\n{\n  /* inner */ \"a\": 1 // trailing\n}\n";
        let tree = parse(text).unwrap();
        assert_eq!(tree.children(tree.root()).len(), 1);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(parse(r#"{"a": }"#).is_none());
        assert!(parse(r#"{"a": 1"#).is_none());
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }

    #[test]
    fn rejects_multiple_top_level_values() {
        assert!(parse("1 2").is_none());
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
        assert!(parse(&deep).is_none());
        let shallow = format!("{}{}", "[".repeat(10), "]".repeat(10));
        assert!(parse(&shallow).is_some());
    }

    #[test]
    fn node_at_offset_finds_innermost() {
        let text = r##"{"$ref": "#/a"}"##;
        let tree = parse(text).unwrap();
        let inside_value = text.find("#/a").unwrap();
        let node = tree.node_at_offset(inside_value).unwrap();
        assert_eq!(tree.string_value(node), Some("#/a"));

        let inside_key = text.find("ref").unwrap();
        let node = tree.node_at_offset(inside_key).unwrap();
        assert_eq!(tree.string_value(node), Some("$ref"));
    }

    #[test]
    fn node_at_offset_right_bound_is_inclusive() {
        let text = r#"{"a": "xy" }"#;
        let tree = parse(text).unwrap();
        let end_of_value = text.find("\" }").unwrap() + 1;
        let node = tree.node_at_offset(end_of_value).unwrap();
        assert_eq!(tree.string_value(node), Some("xy"));
    }

    #[test]
    fn node_at_offset_outside_document() {
        let tree = parse("  {}").unwrap();
        assert_eq!(tree.node_at_offset(0), None);
        assert_eq!(tree.node_at_offset(2), Some(tree.root()));
    }

    #[test]
    fn ref_value_requires_ref_key_and_string() {
        let tree = parse(r##"{"$ref": "#/x", "other": "#/y", "$ref2": 1}"##).unwrap();
        let props = tree.children(tree.root());
        let (_, raw) = tree.ref_value(props[0]).unwrap();
        assert_eq!(raw, "#/x");
        assert!(tree.ref_value(props[1]).is_none());
        assert!(tree.ref_value(props[2]).is_none());
    }
}
