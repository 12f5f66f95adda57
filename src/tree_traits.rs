//! Tree rendering of parsed documents (`show --tree`)

use termtree::Tree;
use tracing::instrument;

use crate::domain::{Document, NodeRef};

/// Longest text excerpt shown next to a tag.
const TEXT_PREVIEW: usize = 60;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef<'_> {
    fn to_tree_string(&self) -> Tree<String> {
        // Post-order build: each open element owns one frame of finished leaves.
        let mut frames: Vec<Vec<Tree<String>>> = vec![Vec::new()];
        let mut stack = vec![(*self, false)];
        while let Some((node, closing)) = stack.pop() {
            if closing {
                let leaves = frames.pop().unwrap_or_default();
                let tree = Tree::new(label(node)).with_leaves(leaves);
                if let Some(parent) = frames.last_mut() {
                    parent.push(tree);
                }
                continue;
            }
            frames.push(Vec::new());
            stack.push((node, true));
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|c| (c, false)));
        }
        frames
            .pop()
            .and_then(|mut built| built.pop())
            .unwrap_or_else(|| Tree::new(label(*self)))
    }
}

impl TreeNodeConvert for Document {
    #[instrument(level = "debug", skip(self), fields(nodes = self.len()))]
    fn to_tree_string(&self) -> Tree<String> {
        match self.root() {
            Some(root) => root.to_tree_string(),
            None => Tree::new("Empty document".to_string()),
        }
    }
}

fn label(node: NodeRef<'_>) -> String {
    let mut label = node.tag().to_string();
    for (name, value) in node.attrs() {
        label.push_str(&format!(" {name}={value:?}"));
    }
    if let Some(text) = node.text().map(str::trim).filter(|t| !t.is_empty()) {
        let preview: String = text.chars().take(TEXT_PREVIEW).collect();
        let ellipsis = if text.chars().count() > TEXT_PREVIEW { "..." } else { "" };
        label.push_str(&format!(": {preview}{ellipsis}"));
    }
    label
}
