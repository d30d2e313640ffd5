//! Top-down org chart view.
//!
//! Each node is a box (kind label, name, code) centered over its children,
//! joined by box-drawing connectors. Layout is bottom-up: a subtree block is
//! as wide as the wider of its box and its children row.

use colored::Colorize;

use crate::domain::{Forest, HierarchyNode};
use crate::views::{kind_color, ViewOptions};

const SIBLING_GAP: usize = 2;
const ROOT_GAP: usize = 4;

struct Border {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
    up_tee: char,
    down_tee: char,
}

const LIGHT: Border = Border {
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
    horizontal: '─',
    vertical: '│',
    up_tee: '┴',
    down_tee: '┬',
};

const HEAVY: Border = Border {
    top_left: '┏',
    top_right: '┓',
    bottom_left: '┗',
    bottom_right: '┛',
    horizontal: '━',
    vertical: '┃',
    up_tee: '┷',
    down_tee: '┯',
};

/// Rendered subtree. Every line is exactly `width` visible columns;
/// lines may carry ANSI codes so widths are never measured after coloring.
struct Block {
    lines: Vec<String>,
    width: usize,
    /// Column of the box center (where the parent connector lands)
    center: usize,
}

impl Block {
    fn padded(&self, left: usize, total: usize) -> Vec<String> {
        let right = total - left - self.width;
        self.lines
            .iter()
            .map(|l| format!("{}{}{}", " ".repeat(left), l, " ".repeat(right)))
            .collect()
    }
}

/// Connector glyph for a cell with lines going in the given directions.
fn junction(up: bool, down: bool, left: bool, right: bool) -> char {
    match (up, down, left, right) {
        (true, true, true, true) => '┼',
        (false, true, true, true) => '┬',
        (true, false, true, true) => '┴',
        (true, true, false, true) => '├',
        (true, true, true, false) => '┤',
        (false, true, false, true) => '┌',
        (false, true, true, false) => '┐',
        (true, false, false, true) => '└',
        (true, false, true, false) => '┘',
        (false, false, _, _) if left || right => '─',
        _ => '│',
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn center_text(text: &str, width: usize) -> String {
    let len = char_len(text);
    let left = (width - len) / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(width - len - left))
}

/// Join blocks side by side, top aligned. Returns lines, width and the
/// absolute center column of every block.
fn hjoin(blocks: &[Block], gap: usize) -> (Vec<String>, usize, Vec<usize>) {
    let height = blocks.iter().map(|b| b.lines.len()).max().unwrap_or(0);
    let width = blocks.iter().map(|b| b.width).sum::<usize>()
        + gap * blocks.len().saturating_sub(1);

    let mut centers = Vec::with_capacity(blocks.len());
    let mut offset = 0;
    for b in blocks {
        centers.push(offset + b.center);
        offset += b.width + gap;
    }

    let lines = (0..height)
        .map(|row| {
            blocks
                .iter()
                .map(|b| {
                    b.lines
                        .get(row)
                        .cloned()
                        .unwrap_or_else(|| " ".repeat(b.width))
                })
                .collect::<Vec<_>>()
                .join(&" ".repeat(gap))
        })
        .collect();
    (lines, width, centers)
}

pub struct OrgChart<'a> {
    forest: &'a Forest,
    opts: ViewOptions<'a>,
}

impl<'a> OrgChart<'a> {
    pub fn new(forest: &'a Forest, opts: ViewOptions<'a>) -> Self {
        Self { forest, opts }
    }

    fn node_box(&self, node: &HierarchyNode, has_parent: bool, shows_children: bool) -> Block {
        let mut content = vec![node.kind_label().to_uppercase(), node.name.clone()];
        if let Some(code) = node.code.as_deref().filter(|c| !c.is_empty()) {
            content.push(code.to_string());
        }
        if node.has_children() && !shows_children {
            content.push(format!("[+{}]", node.children.len()));
        }

        let inner = content.iter().map(|c| char_len(c)).max().unwrap_or(0);
        let width = inner + 4;
        let center = width / 2;
        let selected = self.opts.is_selected(&node.id);
        let b = if selected { &HEAVY } else { &LIGHT };

        let edge = |left: char, right: char, tee: Option<char>| -> String {
            (0..width)
                .map(|col| {
                    if col == 0 {
                        left
                    } else if col == width - 1 {
                        right
                    } else if col == center {
                        tee.unwrap_or(b.horizontal)
                    } else {
                        b.horizontal
                    }
                })
                .collect()
        };

        let mut lines = Vec::with_capacity(content.len() + 2);
        lines.push(edge(b.top_left, b.top_right, has_parent.then_some(b.up_tee)));
        for text in &content {
            lines.push(format!(
                "{} {} {}",
                b.vertical,
                center_text(text, inner),
                b.vertical
            ));
        }
        lines.push(edge(
            b.bottom_left,
            b.bottom_right,
            (shows_children && node.has_children()).then_some(b.down_tee),
        ));

        if self.opts.color {
            let color = kind_color(node.kind());
            lines = lines
                .into_iter()
                .map(|l| {
                    let colored = l.color(color);
                    if selected {
                        colored.bold().to_string()
                    } else {
                        colored.to_string()
                    }
                })
                .collect();
        }

        Block {
            lines,
            width,
            center,
        }
    }

    fn block(&self, node: &HierarchyNode, depth: usize, has_parent: bool) -> Block {
        let shows_children = node.has_children() && self.opts.shows_children(&node.id, depth);
        let node_box = self.node_box(node, has_parent, shows_children);
        if !shows_children {
            return node_box;
        }

        let children: Vec<Block> = node
            .children
            .iter()
            .map(|c| self.block(c, depth + 1, true))
            .collect();
        let (child_lines, child_width, child_centers) = hjoin(&children, SIBLING_GAP);

        let width = node_box.width.max(child_width);
        let box_offset = (width - node_box.width) / 2;
        let child_offset = (width - child_width) / 2;
        let parent_col = box_offset + node_box.center;
        let centers: Vec<usize> = child_centers.iter().map(|c| c + child_offset).collect();

        let lo = centers.first().copied().unwrap_or(parent_col).min(parent_col);
        let hi = centers.last().copied().unwrap_or(parent_col).max(parent_col);
        let connector: String = (0..width)
            .map(|col| {
                if col < lo || col > hi {
                    ' '
                } else {
                    junction(col == parent_col, centers.contains(&col), col > lo, col < hi)
                }
            })
            .collect();

        let mut lines = node_box.padded(box_offset, width);
        lines.push(connector);
        let child_block = Block {
            lines: child_lines,
            width: child_width,
            center: 0,
        };
        lines.extend(child_block.padded(child_offset, width));

        Block {
            lines,
            width,
            center: parent_col,
        }
    }

    /// Rendered chart, trailing spaces trimmed.
    pub fn render(&self) -> String {
        if self.forest.is_empty() {
            return "(empty)\n".to_string();
        }
        let roots: Vec<Block> = self
            .forest
            .roots()
            .iter()
            .map(|r| self.block(r, 0, false))
            .collect();
        let (lines, _, _) = hjoin(&roots, ROOT_GAP);
        let mut out = String::new();
        for line in lines {
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
