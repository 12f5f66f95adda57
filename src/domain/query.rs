//! Tag search over a parsed document.
//!
//! Every query looks at descendants only, walks the full subtree, and compares
//! tag names verbatim. An empty result is a normal outcome.

use super::document::NodeRef;

impl<'a> NodeRef<'a> {
    /// First descendant named `tag` in document order.
    pub fn find(&self, tag: &str) -> Option<NodeRef<'a>> {
        self.descendants().find(|n| n.tag() == tag)
    }

    /// All descendants named `tag` in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeRef<'a>> {
        self.descendants().filter(|n| n.tag() == tag).collect()
    }

    /// Descendants matching a `.//A//B//C` style path.
    ///
    /// A node qualifies when its tag equals the last path step and the
    /// preceding steps appear, in order, among its ancestors strictly below
    /// `self`. Each node is returned at most once, in document order.
    pub fn select(&self, path: &[&str]) -> Vec<NodeRef<'a>> {
        let Some((last, chain)) = path.split_last() else {
            return Vec::new();
        };
        self.descendants()
            .filter(|n| n.tag() == *last && self.has_ancestor_chain(*n, chain))
            .collect()
    }

    /// First node of [`NodeRef::select`].
    pub fn select_first(&self, path: &[&str]) -> Option<NodeRef<'a>> {
        let (last, chain) = path.split_last()?;
        self.descendants()
            .find(|n| n.tag() == *last && self.has_ancestor_chain(*n, chain))
    }

    fn has_ancestor_chain(&self, node: NodeRef<'a>, chain: &[&str]) -> bool {
        let mut pending = chain.iter().rev().peekable();
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if pending.peek().is_none() || ancestor == *self {
                break;
            }
            if pending.peek().is_some_and(|tag| ancestor.tag() == **tag) {
                pending.next();
            }
            current = ancestor.parent();
        }
        pending.peek().is_none()
    }
}
