//! Collapsible indented tree view.

use colored::Colorize;
use termtree::Tree;

use crate::domain::{Forest, HierarchyNode, NodeKind};
use crate::views::{kind_color, ViewOptions};

const EXPANDED: &str = "▾";
const COLLAPSED: &str = "▸";
const LEAF: &str = " ";
const SELECTED_MARK: &str = " ◀";

/// One visible line of the tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: String,
    pub depth: usize,
    pub label: String,
    pub kind: NodeKind,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
}

pub struct TreeView<'a> {
    forest: &'a Forest,
    opts: ViewOptions<'a>,
}

impl<'a> TreeView<'a> {
    pub fn new(forest: &'a Forest, opts: ViewOptions<'a>) -> Self {
        Self { forest, opts }
    }

    /// Visible rows; children of collapsed nodes are skipped.
    ///
    /// A front end maps a clicked row index back to a node id with this.
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        for root in self.forest.roots() {
            self.collect_rows(root, 0, &mut rows);
        }
        rows
    }

    fn collect_rows(&self, node: &HierarchyNode, depth: usize, rows: &mut Vec<TreeRow>) {
        let expanded = self.opts.shows_children(&node.id, depth);
        rows.push(TreeRow {
            id: node.id.clone(),
            depth,
            label: node.to_string(),
            kind: node.kind(),
            has_children: node.has_children(),
            expanded,
            selected: self.opts.is_selected(&node.id),
        });
        if expanded {
            for child in &node.children {
                self.collect_rows(child, depth + 1, rows);
            }
        }
    }

    fn line(&self, node: &HierarchyNode, expanded: bool) -> String {
        let toggle = match (node.has_children(), expanded) {
            (false, _) => LEAF,
            (true, true) => EXPANDED,
            (true, false) => COLLAPSED,
        };
        let kind = node.kind();
        let selected = self.opts.is_selected(&node.id);
        if !self.opts.color {
            let mark = if selected { SELECTED_MARK } else { "" };
            return format!("{} {} {}{}", toggle, kind.icon(), node, mark);
        }
        let icon = kind.icon().color(kind_color(kind));
        let label = if selected {
            node.to_string().bright_blue().bold().to_string()
        } else {
            node.to_string()
        };
        let mark = if selected {
            SELECTED_MARK.bright_blue().to_string()
        } else {
            String::new()
        };
        format!("{} {} {}{}", toggle.dimmed(), icon, label, mark)
    }

    fn build(&self, node: &HierarchyNode, depth: usize) -> Tree<String> {
        let expanded = self.opts.shows_children(&node.id, depth);
        let mut tree = Tree::new(self.line(node, expanded));
        if expanded {
            for child in &node.children {
                tree.push(self.build(child, depth + 1));
            }
        }
        tree
    }

    /// One `termtree` per root.
    pub fn trees(&self) -> Vec<Tree<String>> {
        self.forest
            .roots()
            .iter()
            .map(|root| self.build(root, 0))
            .collect()
    }

    /// Header plus every root tree.
    pub fn render(&self) -> String {
        let roots = self.forest.roots().len();
        let header = format!("Hierarchy ({} {})", roots, if roots == 1 { "root" } else { "roots" });
        let mut out = if self.opts.color {
            header.cyan().bold().to_string()
        } else {
            header
        };
        out.push('\n');
        if self.forest.is_empty() {
            out.push_str("(empty)\n");
        }
        for tree in self.trees() {
            out.push_str(&tree.to_string());
        }
        out
    }
}
