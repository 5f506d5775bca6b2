use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tfsync_cli::project::DEFAULT_PROJECT_FILE;
use tfsync_cli::{load_project, logging, output, Config};
use tfsync_core::{Mode, TestOrchestrator};
use tfsync_remote::HttpTransformationStore;
use tokio_util::sync::CancellationToken;

fn cli() -> Command {
    Command::new("tfsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Test transformations and transformation libraries against the remote")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (defaults to tfsync.toml when present)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging and failure detail"),
        )
        .subcommand(
            Command::new("test")
                .about("Stage changed code and run its tests")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Test every transformation and library"),
                )
                .arg(
                    Arg::new("modified")
                        .long("modified")
                        .action(ArgAction::SetTrue)
                        .help("Test modified resources and their consumers (default)"),
                )
                .arg(
                    Arg::new("id")
                        .long("id")
                        .value_name("ID")
                        .help("Test one transformation or library by ID"),
                )
                .group(ArgGroup::new("mode").args(["all", "modified", "id"]))
                .arg(
                    Arg::new("project")
                        .long("project")
                        .default_value(DEFAULT_PROJECT_FILE)
                        .value_parser(value_parser!(PathBuf))
                        .help("Project manifest"),
                ),
        )
}

fn mode(args: &ArgMatches) -> Mode {
    if args.get_flag("all") {
        Mode::All
    } else if let Some(id) = args.get_one::<String>("id") {
        Mode::Single(id.clone())
    } else {
        Mode::Modified
    }
}

async fn run_test(args: &ArgMatches, config: &Config, verbose: bool) -> Result<bool> {
    let project = args
        .get_one::<PathBuf>("project")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECT_FILE));
    let local = load_project(&project)?;

    let store = HttpTransformationStore::new(config.store_config())
        .context("building transformations API client")?;
    let orchestrator = TestOrchestrator::new(Arc::new(store), config.orchestrator_config());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let results = orchestrator
        .run(&local, &mode(args), &cancel)
        .await
        .context("test run failed")?;
    for line in output::render(&results, verbose) {
        println!("{line}");
    }
    Ok(!results.has_failures())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("log-json"), matches.get_flag("verbose"));

    let config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("test", args)) => {
            let passed = run_test(args, &config, matches.get_flag("verbose")).await?;
            Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}
