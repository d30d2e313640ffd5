//! Manufacturer hierarchy screen controller
//!
//! Owns the current forest and every piece of transient view state
//! (selection, search query, collapsed nodes). Views only read from it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::form::{self, FormMode};
use crate::domain::{DomainError, Forest, HierarchyNode, IdGenerator, NodeType, NodeUpdate};
use crate::views::ViewOptions;

pub struct HierarchyService {
    fixture: Forest,
    forest: Forest,
    selected: Option<String>,
    query: String,
    collapsed: HashSet<String>,
    ids: Arc<dyn IdGenerator>,
    today: Option<NaiveDate>,
}

impl HierarchyService {
    /// Start a session on `fixture`.
    pub fn new(fixture: Forest, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            forest: fixture.clone(),
            fixture,
            selected: None,
            query: String::new(),
            collapsed: HashSet::new(),
            ids,
            today: None,
        }
    }

    /// Pin the date used for add-mode defaults.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn fixture(&self) -> &Forest {
        &self.fixture
    }

    // ------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Arc<HierarchyNode>> {
        self.selected.as_deref().and_then(|id| self.forest.find(id))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: &str) -> ApplicationResult<Arc<HierarchyNode>> {
        let node = self
            .forest
            .find(id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()))?;
        self.selected = Some(node.id.clone());
        Ok(node)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ------------------------------------------------------------
    // Search
    // ------------------------------------------------------------

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        debug!("set_query: {:?}", self.query);
    }

    /// Current forest narrowed by the search query.
    pub fn visible(&self) -> Forest {
        self.forest.filter_by_substring(&self.query)
    }

    // ------------------------------------------------------------
    // Expand / collapse
    // ------------------------------------------------------------

    pub fn is_expanded(&self, id: &str) -> bool {
        !self.collapsed.contains(id)
    }

    /// Flip one node; returns the new expanded state.
    pub fn toggle(&mut self, id: &str) -> ApplicationResult<bool> {
        if !self.forest.contains(id) {
            return Err(DomainError::NodeNotFound(id.to_string()).into());
        }
        if self.collapsed.remove(id) {
            Ok(true)
        } else {
            self.collapsed.insert(id.to_string());
            Ok(false)
        }
    }

    pub fn collapse(&mut self, id: &str) -> ApplicationResult<()> {
        if self.is_expanded(id) {
            self.toggle(id)?;
        }
        Ok(())
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapse_all(&mut self) {
        self.collapsed = self
            .forest
            .iter()
            .filter(|(_, n)| n.has_children())
            .map(|(_, n)| n.id.clone())
            .collect();
    }

    pub fn collapsed(&self) -> &HashSet<String> {
        &self.collapsed
    }

    /// Read-only state handed to the views.
    pub fn view_options(&self) -> ViewOptions<'_> {
        ViewOptions {
            selected: self.selected.as_deref(),
            collapsed: Some(&self.collapsed),
            ..ViewOptions::default()
        }
    }

    // ------------------------------------------------------------
    // Details form
    // ------------------------------------------------------------

    /// Apply a details-form submission.
    ///
    /// - `edit` updates the selected node; the payload id must match it.
    /// - `add` creates a child of the selected node, or a new root when
    ///   nothing is selected, and selects it.
    #[instrument(level = "debug", skip(self, payload))]
    pub fn save(
        &mut self,
        mode: FormMode,
        payload: NodeUpdate,
    ) -> ApplicationResult<Arc<HierarchyNode>> {
        let level = form::validate(&payload, mode)?;
        match mode {
            FormMode::View => Err(DomainError::ReadOnly.into()),
            FormMode::Edit => self.save_edit(payload),
            FormMode::Add => self.save_add(payload, level),
        }
    }

    fn save_edit(&mut self, payload: NodeUpdate) -> ApplicationResult<Arc<HierarchyNode>> {
        let selected = self.selected.clone().ok_or(ApplicationError::NoSelection)?;
        if payload.id != selected {
            return Err(DomainError::IdMismatch {
                expected: selected,
                actual: payload.id,
            }
            .into());
        }
        self.forest = self.forest.update_node(&payload)?;
        info!("updated node {}", selected);
        self.lookup(&selected)
    }

    fn save_add(
        &mut self,
        mut payload: NodeUpdate,
        level: NodeType,
    ) -> ApplicationResult<Arc<HierarchyNode>> {
        payload.id = self.ids.next_id();
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let payload = form::apply_add_defaults(payload, today);

        let parent = self.selected().cloned();
        let node = payload.into_node(level);
        let id = node.id.clone();

        self.forest = match &parent {
            Some(parent) => self.forest.add_child(&parent.id, node)?,
            None => self.forest.add_root(node),
        };
        info!(
            "added node {} under {}",
            id,
            parent.as_ref().map_or("<root>", |p| p.id.as_str())
        );
        self.selected = Some(id.clone());
        self.lookup(&id)
    }

    /// Remove `id` with its subtree; returns the number of removed nodes.
    ///
    /// Selection and collapse entries inside the removed subtree are dropped.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, id: &str) -> ApplicationResult<usize> {
        let removed: HashSet<String> = match self.forest.find(id) {
            Some(node) => subtree_ids(node),
            None => return Err(DomainError::NodeNotFound(id.to_string()).into()),
        };
        self.forest = self.forest.delete_subtree(id)?;

        if self
            .selected
            .as_ref()
            .is_some_and(|s| removed.contains(s))
        {
            self.selected = None;
        }
        self.collapsed.retain(|c| !removed.contains(c));
        info!("deleted {} ({} nodes)", id, removed.len());
        Ok(removed.len())
    }

    /// Drop all edits and view state, back to the loaded fixture.
    pub fn reset(&mut self) {
        self.forest = self.fixture.clone();
        self.selected = None;
        self.query.clear();
        self.collapsed.clear();
    }

    fn lookup(&self, id: &str) -> ApplicationResult<Arc<HierarchyNode>> {
        self.forest
            .find(id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound(id.to_string()).into())
    }
}

fn subtree_ids(node: &HierarchyNode) -> HashSet<String> {
    let mut ids = HashSet::new();
    let mut stack = vec![node];
    while let Some(n) = stack.pop() {
        ids.insert(n.id.clone());
        stack.extend(n.children.iter().map(|c| c.as_ref()));
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_node_when_subtree_ids_then_includes_all_descendants() {
        let node = HierarchyNode::new("1", "A", NodeType::Manufacturer).with_children(vec![
            HierarchyNode::new("2", "B", NodeType::Brand)
                .with_children(vec![HierarchyNode::new("3", "C", NodeType::Model)]),
        ]);
        let ids = subtree_ids(&node);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("3"));
    }
}
