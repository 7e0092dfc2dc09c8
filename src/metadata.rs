//! Descriptive fields of a schema node, for hover rendering.

use crate::syntax::{NodeId, NodeKind, SyntaxTree};
use crate::types::SchemaMetadata;

/// Read `title`, `description`, and `type` from the direct properties of an
/// object node. Anything other than an object yields empty metadata.
/// Later duplicate keys overwrite earlier ones.
pub fn extract(tree: &SyntaxTree, node: NodeId) -> SchemaMetadata {
    let mut metadata = SchemaMetadata::default();
    let Some(NodeKind::Object(properties)) = tree.kind(node) else {
        return metadata;
    };

    for property in properties {
        let Some(NodeKind::Property { key, value }) = tree.kind(*property) else {
            continue;
        };
        match tree.string_value(*key) {
            Some("description") => {
                if let Some(text) = tree.string_value(*value) {
                    metadata.description = Some(text.to_string());
                }
            },
            Some("title") => {
                if let Some(text) = tree.string_value(*value) {
                    metadata.title = Some(text.to_string());
                }
            },
            Some("type") => {
                if let Some(type_name) = type_name(tree, *value) {
                    metadata.type_name = Some(type_name);
                }
            },
            _ => {},
        }
    }

    return metadata;
}

/// A string `type` verbatim, or the string members of a `type` array joined
/// by ` | `. Other shapes are ignored.
fn type_name(tree: &SyntaxTree, value: NodeId) -> Option<String> {
    return match tree.kind(value)? {
        NodeKind::String(text) => Some(text.clone()),
        NodeKind::Array(items) => {
            let names: Vec<&str> = items
                .iter()
                .filter_map(|item| return tree.string_value(*item))
                .collect();
            Some(names.join(" | "))
        },
        _ => None,
    };
}
