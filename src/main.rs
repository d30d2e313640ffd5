use std::env;
use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use dms_hierarchy::cli::output;
use dms_hierarchy::cli::{execute_command, Cli};
use dms_hierarchy::config::Settings;
use dms_hierarchy::exitcode;
use dms_hierarchy::infrastructure::di::ServiceContainer;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let cwd = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            output::error(&format!("cannot determine working directory: {}", e));
            process::exit(exitcode::OSERR);
        }
    };

    let settings = match Settings::load(Some(cwd.as_path())) {
        Ok(settings) => settings,
        Err(e) => {
            output::error(&e);
            process::exit(exitcode::CONFIG);
        }
    };
    tracing::debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    if let Err(e) = execute_command(&cli, &container, &cwd) {
        output::error(&e);
        process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Log lines go to stderr; stdout carries trees, charts and JSON
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
