//! Hierarchy node entities
//!
//! Nodes are immutable once built; children are shared through `Arc` so a new
//! forest value can reuse every subtree a mutation did not touch.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Level of a node in the manufacturer hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Manufacturer,
    Brand,
    Model,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Manufacturer => "manufacturer",
            NodeType::Brand => "brand",
            NodeType::Model => "model",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manufacturer" => Ok(NodeType::Manufacturer),
            "brand" => Ok(NodeType::Brand),
            "model" => Ok(NodeType::Model),
            other => Err(format!("unknown node type: {other}")),
        }
    }
}

/// Display bucket used for icons and colors in both views.
///
/// `hierarchyAttribute` wins over `type` when present; unknown attributes
/// fall into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Manufacturer,
    Brand,
    Model,
    Other,
}

impl NodeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::Manufacturer => "▣",
            NodeKind::Brand => "◆",
            NodeKind::Model => "⚡",
            NodeKind::Other => "▢",
        }
    }
}

/// One node of the manufacturer → brand → model forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<HierarchyNode>>,
}

impl HierarchyNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type,
            code: None,
            description: None,
            is_active: None,
            hierarchy_attribute: None,
            effective_date: None,
            children: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_children(mut self, children: Vec<HierarchyNode>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn kind(&self) -> NodeKind {
        let key = self
            .hierarchy_attribute
            .as_deref()
            .map(str::to_lowercase)
            .filter(|a| !a.is_empty());
        match key.as_deref() {
            Some("manufacturer") => NodeKind::Manufacturer,
            Some("brand") => NodeKind::Brand,
            Some("model") => NodeKind::Model,
            Some(_) => NodeKind::Other,
            None => match self.node_type {
                NodeType::Manufacturer => NodeKind::Manufacturer,
                NodeType::Brand => NodeKind::Brand,
                NodeType::Model => NodeKind::Model,
            },
        }
    }

    /// Label shown above the name: the attribute if set, else the type.
    pub fn kind_label(&self) -> String {
        match self.hierarchy_attribute.as_deref() {
            Some(attr) if !attr.is_empty() => attr.to_string(),
            _ => self.node_type.to_string(),
        }
    }

    /// Number of nodes in this subtree including the node itself.
    pub fn subtree_size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.subtree_size())
            .sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Case-insensitive substring match on name or code.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .code
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }
}

impl fmt::Display for HierarchyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.name, code),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Edit payload from the details form.
///
/// `id` addresses the node; every other field replaces the node's value only
/// when present. `children` replaces the subtree when supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeUpdate {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub hierarchy_attribute: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub children: Option<Vec<Arc<HierarchyNode>>>,
}

impl NodeUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Full scalar payload of an existing node, children left untouched.
    pub fn from_node(node: &HierarchyNode) -> Self {
        Self {
            id: node.id.clone(),
            name: Some(node.name.clone()),
            node_type: Some(node.node_type),
            code: node.code.clone(),
            description: node.description.clone(),
            is_active: node.is_active,
            hierarchy_attribute: node.hierarchy_attribute.clone(),
            effective_date: node.effective_date,
            children: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.node_type.is_none()
            && self.code.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.hierarchy_attribute.is_none()
            && self.effective_date.is_none()
            && self.children.is_none()
    }

    /// Copy of `node` with this update applied.
    pub fn apply_to(&self, node: &HierarchyNode) -> HierarchyNode {
        HierarchyNode {
            id: node.id.clone(),
            name: self.name.clone().unwrap_or_else(|| node.name.clone()),
            node_type: self.node_type.unwrap_or(node.node_type),
            code: self.code.clone().or_else(|| node.code.clone()),
            description: self
                .description
                .clone()
                .or_else(|| node.description.clone()),
            is_active: self.is_active.or(node.is_active),
            hierarchy_attribute: self
                .hierarchy_attribute
                .clone()
                .or_else(|| node.hierarchy_attribute.clone()),
            effective_date: self.effective_date.or(node.effective_date),
            children: self
                .children
                .clone()
                .unwrap_or_else(|| node.children.clone()),
        }
    }

    /// Full payload as the edit form submits it: `node`'s current values with
    /// this update's fields on top.
    pub fn over(self, node: &HierarchyNode) -> NodeUpdate {
        let mut full = NodeUpdate::from_node(&self.apply_to(node));
        full.id = self.id;
        full.children = self.children;
        full
    }

    /// Turn an add-mode payload into a fresh leaf node.
    pub fn into_node(self, fallback_type: NodeType) -> HierarchyNode {
        let node_type = self.node_type.unwrap_or(fallback_type);
        let name = self
            .name
            .or_else(|| self.description.clone())
            .unwrap_or_default();
        HierarchyNode {
            id: self.id,
            name,
            node_type,
            code: self.code,
            description: self.description,
            is_active: self.is_active,
            hierarchy_attribute: self.hierarchy_attribute,
            effective_date: self.effective_date,
            children: self.children.unwrap_or_default(),
        }
    }
}
