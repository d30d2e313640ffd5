//! Read-only text projections of a forest
//!
//! Views never change the forest. Selection and expand/collapse state come in
//! through [`ViewOptions`] and stay owned by the caller.

use std::collections::HashSet;

use colored::Color;

use crate::domain::NodeKind;

pub mod org_chart;
pub mod tree;

pub use org_chart::OrgChart;
pub use tree::{TreeRow, TreeView};

/// Render-time state passed down from the owning screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewOptions<'a> {
    /// Node to highlight
    pub selected: Option<&'a str>,
    /// Nodes whose children are hidden (everything else is expanded)
    pub collapsed: Option<&'a HashSet<String>>,
    /// Number of levels to show, `None` for all
    pub max_depth: Option<usize>,
    /// Emit ANSI colors
    pub color: bool,
}

impl<'a> ViewOptions<'a> {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected == Some(id)
    }

    /// Whether children of a node at `depth` are shown.
    pub fn shows_children(&self, id: &str, depth: usize) -> bool {
        let within_depth = self.max_depth.map_or(true, |max| depth + 1 < max);
        let collapsed = self.collapsed.is_some_and(|c| c.contains(id));
        within_depth && !collapsed
    }
}

/// Color bucket shared by both views.
pub fn kind_color(kind: NodeKind) -> Color {
    match kind {
        NodeKind::Manufacturer => Color::Blue,
        NodeKind::Brand => Color::Green,
        NodeKind::Model => Color::Magenta,
        NodeKind::Other => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_max_depth_when_checking_children_then_cuts_at_level() {
        let opts = ViewOptions {
            max_depth: Some(2),
            ..ViewOptions::default()
        };
        assert!(opts.shows_children("a", 0));
        assert!(!opts.shows_children("a", 1));
    }

    #[test]
    fn given_collapsed_id_when_checking_children_then_hidden() {
        let collapsed: HashSet<String> = ["a".to_string()].into_iter().collect();
        let opts = ViewOptions {
            collapsed: Some(&collapsed),
            ..ViewOptions::default()
        };
        assert!(!opts.shows_children("a", 0));
        assert!(opts.shows_children("b", 0));
    }
}
