//! Point lookup of the `$ref` under a cursor, for hover and go-to-definition.
//!
//! Every failure is reported as `None`: an invalid reference simply has no
//! hover. The scanner is what reports broken references.

use crate::loader::DocumentLoader;
use crate::resolver;
use crate::syntax;
use crate::types::{Document, ResolvedTarget};

/// Resolve the `$ref` value at `offset` in `document`, if there is one.
///
/// The offset must fall inside (or at the edge of) the string value of a
/// `"$ref"` property; anywhere else yields `None`.
pub fn lookup_at(
    document: &Document,
    offset: usize,
    loader: &dyn DocumentLoader,
) -> Option<ResolvedTarget> {
    let tree = syntax::parse(&document.text)?;
    let node = tree.node_at_offset(offset)?;
    let property = tree.parent(node)?;
    let (value, raw) = tree.ref_value(property)?;
    if value != node {
        return None;
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    return match resolver::resolve(document, trimmed, loader) {
        Ok(target) => Some(target),
        Err(e) => {
            tracing::debug!(reference = trimmed, error = %e, "lookup found no target");
            None
        },
    };
}
