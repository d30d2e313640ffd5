//! Command dispatch: one function per subcommand.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{to_json, FixtureService, HierarchyService};
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{
    AddArgs, Cli, Commands, ConfigCommands, OutputArgs, UpdateArgs, ViewArgs,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::form::FormMode;
use crate::domain::{Forest, NodeKind, NodeUpdate};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::views::{OrgChart, TreeView, ViewOptions};

/// Run the parsed command.
///
/// `cwd` is where local config lives (`.dmsh.toml`).
pub fn execute_command(cli: &Cli, container: &ServiceContainer, cwd: &Path) -> CliResult<()> {
    let color = container.settings.view.color && !cli.no_color;
    let fixture = cli.fixture.as_deref();
    match &cli.command {
        Some(Commands::Tree(args)) => cmd_tree(container, fixture, args, color),
        Some(Commands::Chart(args)) => cmd_chart(container, fixture, args, color),
        Some(Commands::Search { query, json }) => {
            cmd_search(container, fixture, query, *json, color)
        }
        Some(Commands::Show { id }) => cmd_show(container, fixture, id),
        Some(Commands::Add(args)) => cmd_add(container, fixture, args),
        Some(Commands::Update(args)) => cmd_update(container, fixture, args),
        Some(Commands::Delete { id, output }) => cmd_delete(container, fixture, id, output),
        Some(Commands::Check) => cmd_check(container, fixture),
        Some(Commands::Stats) => cmd_stats(container, fixture),
        Some(Commands::Config { command }) => cmd_config(container, command, cwd),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `dmsh --help`".into(),
        )),
    }
}

// ============================================================
// Views
// ============================================================

/// Session with the view arguments applied to its state.
fn view_session(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    args: &ViewArgs,
) -> CliResult<HierarchyService> {
    let forest = container.load_forest(fixture)?;
    let mut session = container.hierarchy_service(forest);
    if let Some(query) = &args.query {
        session.set_query(query.clone());
    }
    if let Some(id) = &args.select {
        session.select(id)?;
    }
    if args.collapse_all {
        session.collapse_all();
    }
    for id in &args.collapse {
        session.collapse(id)?;
    }
    Ok(session)
}

fn view_options<'a>(
    session: &'a HierarchyService,
    container: &ServiceContainer,
    args: &ViewArgs,
    color: bool,
) -> ViewOptions<'a> {
    ViewOptions {
        max_depth: args.depth.or(container.settings.view.default_depth),
        color,
        ..session.view_options()
    }
}

#[instrument(skip(container, args))]
fn cmd_tree(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    args: &ViewArgs,
    color: bool,
) -> CliResult<()> {
    let session = view_session(container, fixture, args)?;
    let visible = session.visible();
    let opts = view_options(&session, container, args, color);
    print!("{}", TreeView::new(&visible, opts).render());
    Ok(())
}

#[instrument(skip(container, args))]
fn cmd_chart(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    args: &ViewArgs,
    color: bool,
) -> CliResult<()> {
    let session = view_session(container, fixture, args)?;
    let visible = session.visible();
    let opts = view_options(&session, container, args, color);
    print!("{}", OrgChart::new(&visible, opts).render());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_search(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    query: &str,
    json: bool,
    color: bool,
) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let filtered = forest.filter_by_substring(query);
    debug!(
        "search: {} of {} nodes kept",
        filtered.node_count(),
        forest.node_count()
    );
    if json {
        print!("{}", to_json(&filtered)?);
        return Ok(());
    }
    if filtered.is_empty() {
        output::info(&format!("No match for '{}'", query));
        return Ok(());
    }
    let opts = ViewOptions {
        color,
        ..ViewOptions::default()
    };
    print!("{}", TreeView::new(&filtered, opts).render());
    Ok(())
}

fn cmd_show(container: &ServiceContainer, fixture: Option<&Path>, id: &str) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let mut session = container.hierarchy_service(forest);
    let node = session.select(id)?;
    let path = session
        .forest()
        .ancestors(id)
        .unwrap_or_default()
        .iter()
        .map(|n| n.name.clone())
        .join(" › ");

    let none = || "-".to_string();
    output::header(&node);
    output::field("id", &node.id);
    output::field("path", &path);
    output::field("type", &node.node_type);
    output::field(
        "attribute",
        &node.hierarchy_attribute.clone().unwrap_or_else(none),
    );
    output::field("code", &node.code.clone().unwrap_or_else(none));
    output::field("description", &node.description.clone().unwrap_or_else(none));
    output::field(
        "active",
        &node.is_active.map(|a| if a { "yes" } else { "no" }).unwrap_or("-"),
    );
    output::field(
        "effective date",
        &node
            .effective_date
            .map(|d| d.to_string())
            .unwrap_or_else(none),
    );
    output::field(
        "children",
        &node.children.iter().map(|c| c.name.as_str()).join(", "),
    );
    Ok(())
}

// ============================================================
// Mutations
// ============================================================

/// Emit the mutated forest: file, in-place, or stdout.
fn write_result(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    out: &OutputArgs,
    forest: &Forest,
    message: &str,
) -> CliResult<()> {
    let target: Option<PathBuf> = if out.in_place {
        let source = fixture
            .map(Path::to_path_buf)
            .or_else(|| container.settings.fixture.clone())
            .ok_or_else(|| {
                CliError::Usage("--in-place needs a fixture file (built-in fixture is read-only)".into())
            })?;
        Some(source)
    } else {
        out.output.clone()
    };

    match target {
        Some(path) => {
            container.fixture_service().save(&path, forest)?;
            output::success(&format!("{} → {}", message, path.display()));
        }
        None => {
            print!("{}", to_json(forest)?);
            output::success_stderr(&message);
        }
    }
    Ok(())
}

#[instrument(skip(container, args))]
fn cmd_add(container: &ServiceContainer, fixture: Option<&Path>, args: &AddArgs) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let mut session = container.hierarchy_service(forest);
    if let Some(parent) = &args.parent {
        session.select(parent)?;
    }

    let mut payload = args.fields.to_update(String::new());
    if payload.hierarchy_attribute.is_none() {
        // the form always carries an attribute; derive it from --type
        payload.hierarchy_attribute = payload.node_type.map(|t| capitalize(t.as_str()));
    }
    let node = session.save(FormMode::Add, payload)?;
    let message = format!(
        "Added {} '{}' ({})",
        node.node_type,
        node.name,
        node.id
    );
    write_result(container, fixture, &args.output, session.forest(), &message)
}

#[instrument(skip(container, args))]
fn cmd_update(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    args: &UpdateArgs,
) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let mut session = container.hierarchy_service(forest);
    let current = session.select(&args.id)?;

    let update = match &args.payload {
        Some(path) => {
            let flags = args.fields.to_update(args.id.clone());
            if !flags.is_empty() {
                return Err(CliError::InvalidArgs(
                    "--payload cannot be combined with field flags".into(),
                ));
            }
            read_payload(container, path)?
        }
        None => args.fields.to_update(args.id.clone()),
    };
    if update.is_empty() {
        return Err(CliError::InvalidArgs("nothing to update".into()));
    }

    let node = session.save(FormMode::Edit, update.over(&current))?;
    let message = format!("Updated '{}' ({})", node.name, node.id);
    write_result(container, fixture, &args.output, session.forest(), &message)
}

fn read_payload(container: &ServiceContainer, path: &Path) -> CliResult<NodeUpdate> {
    let content = container
        .fs
        .read_to_string(path)
        .with_path_context("read payload", path)?;
    serde_json::from_str(&content).map_err(|e| {
        CliError::from(ApplicationError::Fixture {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })
}

#[instrument(skip(container, out))]
fn cmd_delete(
    container: &ServiceContainer,
    fixture: Option<&Path>,
    id: &str,
    out: &OutputArgs,
) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let mut session = container.hierarchy_service(forest);
    let removed = session.delete(id)?;
    let message = format!("Deleted {} ({} node(s))", id, removed);
    write_result(container, fixture, out, session.forest(), &message)
}

// ============================================================
// Fixture info
// ============================================================

fn cmd_check(container: &ServiceContainer, fixture: Option<&Path>) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let issues = FixtureService::check(&forest);
    if issues.is_empty() {
        output::success(&format!("Fixture OK ({} nodes)", forest.node_count()));
        return Ok(());
    }
    for issue in &issues {
        output::warning(issue);
    }
    Err(CliError::FixtureIssues(issues.len()))
}

fn cmd_stats(container: &ServiceContainer, fixture: Option<&Path>) -> CliResult<()> {
    let forest = container.load_forest(fixture)?;
    let counts = forest.kind_counts();
    let count = |kind| counts.get(&kind).copied().unwrap_or(0);

    output::header(&"Hierarchy");
    output::field("roots", &forest.roots().len());
    output::field("nodes", &forest.node_count());
    output::field("depth", &forest.depth());
    output::field("manufacturers", &count(NodeKind::Manufacturer));
    output::field("brands", &count(NodeKind::Brand));
    output::field("models", &count(NodeKind::Model));
    output::field("other", &count(NodeKind::Other));
    Ok(())
}

// ============================================================
// Config
// ============================================================

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    cwd: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let body = toml::to_string_pretty(container.settings.as_ref())
                .map_err(|e| CliError::from(ApplicationError::Config {
                    message: e.to_string(),
                }))?;
            output::info(&body);
            Ok(())
        }
        ConfigCommands::Path => {
            let exists = |p: &Path| if p.exists() { "" } else { " (missing)" };
            match global_config_path() {
                Some(p) => output::info(&format!("global: {}{}", p.display(), exists(&p))),
                None => output::info("global: <unavailable>"),
            }
            let local = local_config_path(cwd);
            output::info(&format!("local:  {}{}", local.display(), exists(&local)));
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(cwd)
            };
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            let template = Settings::template()?;
            container
                .fs
                .ensure_parent(&path)
                .and_then(|()| container.fs.write(&path, &template))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_type_name_when_capitalized_then_matches_form_attribute() {
        assert_eq!(capitalize("brand"), "Brand");
        assert_eq!(capitalize(""), "");
    }
}
