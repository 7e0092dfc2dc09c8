//! Walks a pointer path through a syntax tree.

use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::types::PointerSegment;

/// Find the node a pointer path designates, starting at the tree root.
/// The empty path designates the root.
///
/// Objects match keys exactly; an index segment on an object matches the key
/// spelled the same way, so `#/0` finds a property named `"0"`. Arrays only
/// accept index segments. A located property resolves to its value.
pub fn find(tree: &SyntaxTree, path: &[PointerSegment]) -> Option<NodeId> {
    let mut current = tree.root();
    for segment in path {
        current = step(tree, current, segment)?;
    }
    if let Some(NodeKind::Property { value, .. }) = tree.kind(current) {
        return Some(*value);
    }
    return Some(current);
}

/// Descend one segment. `None` when the segment does not resolve.
fn step(tree: &SyntaxTree, node: NodeId, segment: &PointerSegment) -> Option<NodeId> {
    return match (tree.kind(node)?, segment) {
        (NodeKind::Array(items), PointerSegment::Index(index)) => items.get(*index).copied(),
        (NodeKind::Object(properties), PointerSegment::Index(index)) => {
            property_value(tree, properties, &index.to_string())
        },
        (NodeKind::Object(properties), PointerSegment::Key(key)) => property_value(tree, properties, key),
        _ => None,
    };
}

/// Value of the first property whose key equals `key`.
fn property_value(tree: &SyntaxTree, properties: &[NodeId], key: &str) -> Option<NodeId> {
    return properties.iter().find_map(|property| {
        let Some(NodeKind::Property { key: key_node, value }) = tree.kind(*property) else {
            return None;
        };
        return (tree.string_value(*key_node) == Some(key)).then_some(*value);
    });
}
