//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::domain::{NodeType, NodeUpdate};

/// Manufacturer hierarchy manager: browse, search and edit the manufacturer → brand → model tree
#[derive(Parser, Debug)]
#[command(name = "dmsh")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Hierarchy fixture (JSON), overrides config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub fixture: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hierarchy as indented tree
    Tree(ViewArgs),

    /// Show hierarchy as org chart
    Chart(ViewArgs),

    /// Filter by name or code (keeps ancestors of matches)
    Search {
        /// Case-insensitive substring
        query: String,
        /// Print filtered forest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details of one node
    Show {
        /// Node id
        id: String,
    },

    /// Add a node under a parent (or as a new root)
    Add(AddArgs),

    /// Update fields of a node
    Update(UpdateArgs),

    /// Delete a node and its subtree
    Delete {
        /// Node id
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check fixture for duplicate ids and blank names
    Check,

    /// Show node counts
    Stats,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by the tree and chart views
#[derive(Args, Debug, Default, Clone)]
pub struct ViewArgs {
    /// Only show matches of this query and their ancestors
    #[arg(short, long)]
    pub query: Option<String>,

    /// Highlight this node
    #[arg(short, long)]
    pub select: Option<String>,

    /// Collapse this node (repeatable)
    #[arg(short, long = "collapse", value_name = "ID")]
    pub collapse: Vec<String>,

    /// Collapse every node
    #[arg(long, conflicts_with = "collapse")]
    pub collapse_all: bool,

    /// Number of levels to show (at least 1)
    #[arg(long, value_parser = parse_depth)]
    pub depth: Option<usize>,
}

fn parse_depth(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("depth must be at least 1".to_string()),
        Ok(depth) => Ok(depth),
        Err(e) => Err(e.to_string()),
    }
}

/// Where a mutated forest goes (default: stdout)
#[derive(Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Write resulting fixture to file
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input fixture
    #[arg(long)]
    pub in_place: bool,
}

/// Details form fields
#[derive(Args, Debug, Default, Clone)]
pub struct NodeFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Node type: manufacturer, brand, model
    #[arg(long = "type", value_name = "TYPE")]
    pub node_type: Option<NodeType>,

    /// Hierarchy code
    #[arg(long)]
    pub code: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Hierarchy attribute: Manufacturer, Brand, Model
    #[arg(long = "attribute", value_name = "ATTRIBUTE")]
    pub hierarchy_attribute: Option<String>,

    /// Mark active
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Mark inactive
    #[arg(long)]
    pub inactive: bool,

    /// Effective date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub effective_date: Option<NaiveDate>,
}

impl NodeFields {
    fn is_active(&self) -> Option<bool> {
        match (self.active, self.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Form payload for `id` carrying only the given flags.
    pub fn to_update(&self, id: impl Into<String>) -> NodeUpdate {
        NodeUpdate {
            id: id.into(),
            name: self.name.clone(),
            node_type: self.node_type,
            code: self.code.clone(),
            description: self.description.clone(),
            is_active: self.is_active(),
            hierarchy_attribute: self.hierarchy_attribute.clone(),
            effective_date: self.effective_date,
            children: None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Parent node id
    #[arg(required_unless_present = "root")]
    pub parent: Option<String>,

    /// Add as a new root
    #[arg(long, conflicts_with = "parent")]
    pub root: bool,

    #[command(flatten)]
    pub fields: NodeFields,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Node id
    pub id: String,

    #[command(flatten)]
    pub fields: NodeFields,

    /// Read the update payload (JSON) from file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub payload: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
