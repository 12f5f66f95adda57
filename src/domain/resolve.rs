//! Optional-value extraction on top of tag search.

use super::document::NodeRef;

/// Text of the first `tag` under `node`; absent on no match or no text.
pub fn resolve_text(node: NodeRef<'_>, tag: &str) -> Option<String> {
    node.find(tag).and_then(|n| n.text()).map(str::to_string)
}

/// Like [`resolve_text`] for a `.//A//B` path.
pub fn resolve_path_text(node: NodeRef<'_>, path: &[&str]) -> Option<String> {
    node.select_first(path)
        .and_then(|n| n.text())
        .map(str::to_string)
}

/// Concatenated text of the first `tag` under `node`, inline markup included.
pub fn resolve_rich_text(node: NodeRef<'_>, tag: &str) -> Option<String> {
    node.find(tag).map(|n| n.rich_text())
}

pub fn resolve_attr(node: NodeRef<'_>, name: &str) -> Option<String> {
    node.attr(name).map(str::to_string)
}

/// `Y`/`N` attribute flag: true only for the literal `"Y"`, false otherwise
/// (missing attribute included).
pub fn resolve_bool_attr(node: NodeRef<'_>, name: &str) -> bool {
    node.attr(name) == Some("Y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Document, ElementData};

    fn with_flag(value: Option<&str>) -> Document {
        let mut doc = Document::new();
        let mut data = ElementData::new("Author");
        if let Some(v) = value {
            data = data.with_attr("ValidYN", v);
        }
        let root = doc.insert_node(data, None);
        doc.insert_node(ElementData::new("LastName").with_text("Curie"), Some(root));
        doc.insert_node(ElementData::new("ForeName"), Some(root));
        doc
    }

    #[test]
    fn given_flag_values_when_resolving_bool_then_only_literal_y_is_true() {
        assert!(resolve_bool_attr(with_flag(Some("Y")).root().unwrap(), "ValidYN"));
        for value in [None, Some("N"), Some("y"), Some(""), Some("Yes")] {
            let doc = with_flag(value);
            assert!(
                !resolve_bool_attr(doc.root().unwrap(), "ValidYN"),
                "{value:?} must resolve to false"
            );
        }
    }

    #[test]
    fn given_child_without_text_when_resolving_then_returns_none() {
        let doc = with_flag(None);
        let root = doc.root().unwrap();
        assert_eq!(resolve_text(root, "LastName").as_deref(), Some("Curie"));
        assert_eq!(resolve_text(root, "ForeName"), None);
        assert_eq!(resolve_text(root, "Initials"), None);
        assert_eq!(resolve_attr(root, "ValidYN"), None);
    }
}
