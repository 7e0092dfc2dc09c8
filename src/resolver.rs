use crate::error::ReferenceError;
use crate::loader::DocumentLoader;
use crate::locator;
use crate::metadata;
use crate::navigator;
use crate::pointer;
use crate::position;
use crate::syntax;
use crate::types::{Document, ResolvedTarget};

/// Resolve one raw `$ref` value found in `document`.
///
/// Locates the target, loads it (the current document's own text is used
/// for self-references), parses it, walks the pointer, and reads metadata
/// from the node found. Nothing is cached between calls.
///
/// # Errors
///
/// Returns `ReferenceError::UnsupportedScheme` or `ReferenceError::MalformedReference`
/// when the file part cannot be located, `ReferenceError::FileNotFound` or
/// `ReferenceError::FileTooLarge` when the target cannot be loaded,
/// `ReferenceError::UnparsableDocument` when the target is not JSON,
/// or `ReferenceError::PointerNotFound` when the pointer does not resolve.
pub fn resolve(
    document: &Document,
    raw: &str,
    loader: &dyn DocumentLoader,
) -> Result<ResolvedTarget, ReferenceError> {
    let location = locator::locate(&document.id, raw)?;

    let loaded;
    let text = if location.target == document.id {
        document.text.as_str()
    } else {
        loaded = loader
            .load(&location.target)
            .map_err(|e| return attach_file_part(e, &location.file_part))?;
        loaded.as_str()
    };

    let tree = syntax::parse(text).ok_or_else(|| {
        return ReferenceError::UnparsableDocument {
            path: location.target.path().to_path_buf(),
            pointer: location.pointer_part.clone(),
        };
    })?;

    let node = navigator::find(&tree, &location.pointer).ok_or_else(|| {
        return ReferenceError::PointerNotFound {
            pointer: location.pointer_part.clone(),
        };
    })?;
    let span = tree.span(node).ok_or_else(|| {
        return ReferenceError::PointerNotFound {
            pointer: location.pointer_part.clone(),
        };
    })?;

    return Ok(ResolvedTarget {
        metadata: metadata::extract(&tree, node),
        pointer: pointer::encode(&location.pointer),
        pointer_display: location.pointer_display,
        position: position::position_of(text, span.start),
        span,
        target: location.target,
    });
}

/// Record the reference's file part on a load failure; loaders only know the path.
fn attach_file_part(error: ReferenceError, file_part: &str) -> ReferenceError {
    return match error {
        ReferenceError::FileNotFound { path, .. } => ReferenceError::FileNotFound {
            file_part: file_part.to_string(),
            path,
        },
        other => other,
    };
}

#[cfg(test)]
pub mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{DocumentId, Position};

    /// In-memory loader for tests.
    #[derive(Default)]
    pub struct MemoryLoader {
        pub files: HashMap<DocumentId, String>,
    }

    impl MemoryLoader {
        pub fn with(mut self, path: &str, text: &str) -> Self {
            self.files.insert(DocumentId::new(path), text.to_string());
            self
        }
    }

    impl DocumentLoader for MemoryLoader {
        fn load(&self, id: &DocumentId) -> Result<String, ReferenceError> {
            self.files.get(id).cloned().ok_or_else(|| ReferenceError::FileNotFound {
                file_part: String::new(),
                path: id.path().to_path_buf(),
            })
        }
    }

    fn doc(text: &str) -> Document {
        Document::new(DocumentId::new("/work/a.json"), text.to_string())
    }

    #[test]
    fn resolves_into_other_file() {
        let loader = MemoryLoader::default().with(
            "/work/defs.json",
            "{\n  \"definitions\": {\n    \"Foo\": {\"title\": \"Foo\", \"type\": \"object\"}\n  }\n}",
        );
        let target = resolve(&doc("{}"), "defs.json#/definitions/Foo", &loader).unwrap();
        assert_eq!(target.target, DocumentId::new("/work/defs.json"));
        assert_eq!(target.pointer_display, "#/definitions/Foo");
        assert_eq!(target.metadata.title.as_deref(), Some("Foo"));
        assert_eq!(target.metadata.type_name.as_deref(), Some("object"));
        assert_eq!(target.position, Position { column: 12, line: 3 });
    }

    #[test]
    fn pointer_is_reported_in_canonical_form() {
        let text = r#"{"definitions": {"a/b": {"type": "string"}}}"#;
        let target = resolve(&doc(text), "#definitions/a~1b", &MemoryLoader::default()).unwrap();
        assert_eq!(target.pointer, "/definitions/a~1b");
        assert_eq!(target.pointer_display, "#definitions/a~1b");
    }

    #[test]
    fn self_reference_uses_in_memory_text() {
        // Nothing on "disk"; the document's own text must be used.
        let loader = MemoryLoader::default();
        let source = doc(r##"{"defs": {"Foo": {"description": "d"}}, "$ref": "#/defs/Foo"}"##);
        let target = resolve(&source, "#/defs/Foo", &loader).unwrap();
        assert_eq!(target.target, source.id);
        assert_eq!(target.metadata.description.as_deref(), Some("d"));
    }

    #[test]
    fn missing_file_carries_file_part() {
        let err = resolve(&doc("{}"), "./missing.json", &MemoryLoader::default()).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::FileNotFound {
                file_part: "./missing.json".to_string(),
                path: "/work/missing.json".into(),
            }
        );
    }

    #[test]
    fn missing_pointer() {
        let err = resolve(&doc(r#"{"a": 1}"#), "#/nope", &MemoryLoader::default()).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::PointerNotFound {
                pointer: "/nope".to_string()
            }
        );
    }

    #[test]
    fn unparsable_target() {
        let loader = MemoryLoader::default().with("/work/bad.json", "{ not json");
        let err = resolve(&doc("{}"), "bad.json#/x", &loader).unwrap_err();
        assert!(matches!(err, ReferenceError::UnparsableDocument { ref pointer, .. } if pointer == "/x"));
    }

    #[test]
    fn remote_reference_is_refused() {
        let err = resolve(&doc("{}"), "https://example.com/s.json#/a", &MemoryLoader::default())
            .unwrap_err();
        assert!(matches!(err, ReferenceError::UnsupportedScheme { .. }));
    }

    #[test]
    fn whole_document_reference() {
        let loader = MemoryLoader::default().with("/work/b.json", r#"{"title": "B"}"#);
        let target = resolve(&doc("{}"), "b.json", &loader).unwrap();
        assert_eq!(target.pointer_display, "");
        assert_eq!(target.span, 0..14);
        assert_eq!(target.metadata.title.as_deref(), Some("B"));
    }
}
