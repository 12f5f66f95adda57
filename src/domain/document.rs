use std::collections::BTreeMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

/// Payload of one element in a parsed citation document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name, compared verbatim (no namespace handling)
    pub tag: String,
    /// Attribute mapping; order carries no meaning
    pub attrs: BTreeMap<String, String>,
    /// Text before the first child element
    pub text: Option<String>,
    /// Text following this element inside its parent
    pub tail: Option<String>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn append_text(&mut self, fragment: &str) {
        self.text.get_or_insert_with(String::new).push_str(fragment);
    }

    pub fn append_tail(&mut self, fragment: &str) {
        self.tail.get_or_insert_with(String::new).push_str(fragment);
    }
}

impl fmt::Display for ElementData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.tag)
    }
}

/// Element slot in the arena-backed document.
#[derive(Debug)]
pub struct DocNode {
    pub data: ElementData,
    /// Index of the enclosing element, None for the root
    pub parent: Option<Index>,
    /// Child elements in document order
    pub children: Vec<Index>,
}

/// Arena-based document tree handed over by a tree provider.
///
/// Elements are addressed by generational indices, so a [`NodeRef`] is a
/// cheap `Copy` handle. The mapping layer only ever reads from a document.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DocNode>,
    root: Option<Index>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: ElementData, parent: Option<Index>) -> Index {
        let node = DocNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&DocNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut DocNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|idx| NodeRef { doc: self, idx })
    }

    pub fn node(&self, idx: Index) -> Option<NodeRef<'_>> {
        self.arena.get(idx).map(|_| NodeRef { doc: self, idx })
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Read-only handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    idx: Index,
}

impl<'a> NodeRef<'a> {
    fn slot(&self) -> &'a DocNode {
        // Handles are only minted for live indices and documents are never shrunk.
        &self.doc.arena[self.idx]
    }

    pub fn index(&self) -> Index {
        self.idx
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a ElementData {
        &self.slot().data
    }

    pub fn tag(&self) -> &'a str {
        &self.slot().data.tag
    }

    pub fn attrs(&self) -> &'a BTreeMap<String, String> {
        &self.slot().data.attrs
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.slot().data.attrs.get(name).map(String::as_str)
    }

    /// Leading text of this element (before its first child).
    pub fn text(&self) -> Option<&'a str> {
        self.slot().data.text.as_deref()
    }

    pub fn tail(&self) -> Option<&'a str> {
        self.slot().data.tail.as_deref()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.slot().parent.map(|idx| NodeRef { doc: self.doc, idx })
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.slot()
            .children
            .iter()
            .map(move |&idx| NodeRef { doc, idx })
    }

    /// All descendants in document order (pre-order), excluding `self`.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants::new(*self)
    }

    /// Every text fragment under this element, in document order.
    ///
    /// Inline children contribute their own text followed by their tail, so
    /// `<T>a <i>b</i> c</T>` yields `"a b c"`.
    pub fn rich_text(&self) -> String {
        let mut out = String::new();
        // (node, emit_tail): a false entry emits the node's text and schedules
        // its children, a true entry emits its tail once the subtree is done.
        let mut stack = vec![(*self, false)];
        while let Some((node, emit_tail)) = stack.pop() {
            if emit_tail {
                if let Some(tail) = node.tail() {
                    out.push_str(tail);
                }
                continue;
            }
            if let Some(text) = node.text() {
                out.push_str(text);
            }
            for &idx in node.slot().children.iter().rev() {
                let child = NodeRef { doc: self.doc, idx };
                stack.push((child, true));
                stack.push((child, false));
            }
        }
        out
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.idx == other.idx
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("tag", &self.tag())
            .field("index", &self.idx)
            .finish()
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data())
    }
}

/// Depth-first, document-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<Index>,
}

impl<'a> Descendants<'a> {
    fn new(start: NodeRef<'a>) -> Self {
        // Push children in reverse order for left-to-right traversal
        let stack = start.slot().children.iter().rev().copied().collect();
        Self {
            doc: start.doc,
            stack,
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.doc.get_node(current_idx)?;
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(NodeRef {
            doc: self.doc,
            idx: current_idx,
        })
    }
}
