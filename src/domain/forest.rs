//! Persistent forest of hierarchy nodes.
//!
//! Every mutator returns a new `Forest`. Only the spine from a root down to a
//! changed node is rebuilt; all other subtrees are the same `Arc` as in the
//! input, so `Arc::ptr_eq` can be used for change detection.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{HierarchyNode, NodeKind, NodeUpdate};

/// Outcome of visiting one node during a rebuild.
enum Change {
    Keep,
    Replace(Arc<HierarchyNode>),
    Remove,
}

/// Rebuild a sibling list, returning `None` when every sibling was kept.
fn rebuild<F>(nodes: &[Arc<HierarchyNode>], mut visit: F) -> Option<Vec<Arc<HierarchyNode>>>
where
    F: FnMut(&Arc<HierarchyNode>) -> Change,
{
    let mut out: Option<Vec<Arc<HierarchyNode>>> = None;
    for (i, node) in nodes.iter().enumerate() {
        match visit(node) {
            Change::Keep => {
                if let Some(v) = out.as_mut() {
                    v.push(Arc::clone(node));
                }
            }
            Change::Replace(new) => out.get_or_insert_with(|| nodes[..i].to_vec()).push(new),
            Change::Remove => {
                out.get_or_insert_with(|| nodes[..i].to_vec());
            }
        }
    }
    out
}

/// Same scalar fields as `node`, new child list.
fn respine(node: &HierarchyNode, children: Vec<Arc<HierarchyNode>>) -> Arc<HierarchyNode> {
    Arc::new(HierarchyNode {
        id: node.id.clone(),
        name: node.name.clone(),
        node_type: node.node_type,
        code: node.code.clone(),
        description: node.description.clone(),
        is_active: node.is_active,
        hierarchy_attribute: node.hierarchy_attribute.clone(),
        effective_date: node.effective_date,
        children,
    })
}

fn update_in(node: &Arc<HierarchyNode>, update: &NodeUpdate, hits: &mut usize) -> Change {
    if node.id == update.id {
        *hits += 1;
        let mut updated = update.apply_to(node);
        // kept children may hold the same id again
        if update.children.is_none() {
            if let Some(children) = rebuild(&node.children, |c| update_in(c, update, hits)) {
                updated.children = children;
            }
        }
        return Change::Replace(Arc::new(updated));
    }
    match rebuild(&node.children, |c| update_in(c, update, hits)) {
        Some(children) => Change::Replace(respine(node, children)),
        None => Change::Keep,
    }
}

fn add_in(
    node: &Arc<HierarchyNode>,
    parent_id: &str,
    child: &Arc<HierarchyNode>,
    hits: &mut usize,
) -> Change {
    if node.id == parent_id {
        *hits += 1;
        let mut children = node.children.clone();
        children.push(Arc::clone(child));
        return Change::Replace(respine(node, children));
    }
    match rebuild(&node.children, |c| add_in(c, parent_id, child, hits)) {
        Some(children) => Change::Replace(respine(node, children)),
        None => Change::Keep,
    }
}

fn delete_in(node: &Arc<HierarchyNode>, node_id: &str, removed: &mut usize) -> Change {
    if node.id == node_id {
        *removed += node.subtree_size();
        return Change::Remove;
    }
    match rebuild(&node.children, |c| delete_in(c, node_id, removed)) {
        Some(children) => Change::Replace(respine(node, children)),
        None => Change::Keep,
    }
}

fn filter_in(node: &Arc<HierarchyNode>, needle: &str) -> Change {
    if node.matches_lowercase(needle) {
        return Change::Keep;
    }
    if !node.has_children() {
        return Change::Remove;
    }
    match rebuild(&node.children, |c| filter_in(c, needle)) {
        None => Change::Keep,
        Some(children) if children.is_empty() => Change::Remove,
        Some(children) => Change::Replace(respine(node, children)),
    }
}

/// Ordered list of root nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Forest {
    roots: Vec<Arc<HierarchyNode>>,
}

impl From<Vec<HierarchyNode>> for Forest {
    fn from(roots: Vec<HierarchyNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }
}

impl Forest {
    pub fn new(roots: Vec<Arc<HierarchyNode>>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[Arc<HierarchyNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn rebuilt(&self, roots: Option<Vec<Arc<HierarchyNode>>>) -> Forest {
        match roots {
            Some(roots) => Forest { roots },
            None => self.clone(),
        }
    }

    /// Replace the scalar fields of every node with `update.id`.
    ///
    /// Children are kept unless the update carries its own list.
    #[instrument(level = "debug", skip(self, update), fields(id = %update.id))]
    pub fn update_node(&self, update: &NodeUpdate) -> DomainResult<Forest> {
        let mut hits = 0;
        let roots = rebuild(&self.roots, |n| update_in(n, update, &mut hits));
        if hits == 0 {
            return Err(DomainError::NodeNotFound(update.id.clone()));
        }
        debug!("update_node: {} node(s) updated", hits);
        Ok(self.rebuilt(roots))
    }

    /// Append `child` as the last child of `parent_id`.
    ///
    /// The caller is responsible for giving `child` a unique id.
    #[instrument(level = "debug", skip(self, child), fields(child = %child.id))]
    pub fn add_child(&self, parent_id: &str, child: HierarchyNode) -> DomainResult<Forest> {
        let child = Arc::new(child);
        let mut hits = 0;
        let roots = rebuild(&self.roots, |n| add_in(n, parent_id, &child, &mut hits));
        if hits == 0 {
            return Err(DomainError::NodeNotFound(parent_id.to_string()));
        }
        Ok(self.rebuilt(roots))
    }

    /// Append a new root node.
    pub fn add_root(&self, root: HierarchyNode) -> Forest {
        let mut roots = self.roots.clone();
        roots.push(Arc::new(root));
        Forest { roots }
    }

    /// Remove `node_id` and its whole subtree, wherever it sits.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_subtree(&self, node_id: &str) -> DomainResult<Forest> {
        let mut removed = 0;
        let roots = rebuild(&self.roots, |n| delete_in(n, node_id, &mut removed));
        if removed == 0 {
            return Err(DomainError::NodeNotFound(node_id.to_string()));
        }
        debug!("delete_subtree: removed {} node(s)", removed);
        Ok(self.rebuilt(roots))
    }

    /// Keep nodes whose name or code contains `query` (case-insensitive),
    /// plus the ancestor chain of every match.
    ///
    /// A directly matching node keeps all of its children. A node kept only
    /// for a matching descendant keeps only the filtered children.
    #[instrument(level = "debug", skip(self))]
    pub fn filter_by_substring(&self, query: &str) -> Forest {
        if query.is_empty() {
            return self.clone();
        }
        let needle = query.to_lowercase();
        let roots = rebuild(&self.roots, |n| filter_in(n, &needle));
        self.rebuilt(roots)
    }

    /// Pre-order traversal yielding `(depth, node)`.
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter::new(self)
    }

    pub fn find(&self, id: &str) -> Option<&Arc<HierarchyNode>> {
        self.iter().map(|(_, n)| n).find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Path from a root down to `id`, both ends included.
    pub fn ancestors(&self, id: &str) -> Option<Vec<Arc<HierarchyNode>>> {
        fn walk(
            node: &Arc<HierarchyNode>,
            id: &str,
            path: &mut Vec<Arc<HierarchyNode>>,
        ) -> bool {
            path.push(Arc::clone(node));
            if node.id == id || node.children.iter().any(|c| walk(c, id, path)) {
                return true;
            }
            path.pop();
            false
        }

        let mut path = Vec::new();
        let found = self.roots.iter().any(|r| walk(r, id, &mut path));
        found.then_some(path)
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.subtree_size()).sum()
    }

    pub fn depth(&self) -> usize {
        self.roots.iter().map(|r| r.depth()).max().unwrap_or(0)
    }

    pub fn kind_counts(&self) -> HashMap<NodeKind, usize> {
        self.iter().map(|(_, n)| n.kind()).counts()
    }

    /// Ids that occur more than once, with their count.
    pub fn duplicate_ids(&self) -> Vec<(String, usize)> {
        self.iter()
            .map(|(_, n)| n.id.clone())
            .counts()
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .sorted()
            .collect()
    }
}

pub struct ForestIter<'a> {
    stack: Vec<(usize, &'a Arc<HierarchyNode>)>,
}

impl<'a> ForestIter<'a> {
    fn new(forest: &'a Forest) -> Self {
        let stack = forest.roots.iter().rev().map(|r| (0, r)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = (usize, &'a Arc<HierarchyNode>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodeType;

    fn two_roots() -> Forest {
        Forest::from(vec![
            HierarchyNode::new("a", "Alpha", NodeType::Manufacturer)
                .with_children(vec![HierarchyNode::new("a1", "A-One", NodeType::Brand)]),
            HierarchyNode::new("b", "Beta", NodeType::Manufacturer),
        ])
    }

    #[test]
    fn given_forest_when_iterating_then_visits_preorder_with_depth() {
        let ids: Vec<_> = two_roots()
            .iter()
            .map(|(d, n)| (d, n.id.clone()))
            .collect();
        assert_eq!(
            ids,
            vec![(0, "a".to_string()), (1, "a1".to_string()), (0, "b".to_string())]
        );
    }

    #[test]
    fn given_nested_id_when_ancestors_then_returns_root_to_node_path() {
        let forest = two_roots();
        let path: Vec<_> = forest
            .ancestors("a1")
            .unwrap()
            .iter()
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(path, vec!["a", "a1"]);
        assert!(forest.ancestors("zz").is_none());
    }

    #[test]
    fn given_root_id_when_delete_then_removes_root() {
        let forest = two_roots();
        let result = forest.delete_subtree("a").unwrap();
        assert_eq!(result.roots().len(), 1);
        assert!(Arc::ptr_eq(&result.roots()[0], &forest.roots()[1]));
    }

    #[test]
    fn given_duplicate_ids_when_checked_then_reports_them() {
        let forest = two_roots().add_root(HierarchyNode::new("b", "Beta 2", NodeType::Brand));
        assert_eq!(forest.duplicate_ids(), vec![("b".to_string(), 2)]);
    }
}
