use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use slslint_core::{Config, Issue};
use slslint_tfcompat::{load_config, Snapshot, SnapshotRunner};

#[derive(Parser, Debug)]
#[command(author, version, about = "slslint: serverless best-practice rules for Terraform resources")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text, global = true)]
    format: Format,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the enabled rules over a resource snapshot (YAML or .json)
    Check {
        snapshot: PathBuf,
        /// Rule configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Run only this rule; repeatable
        #[arg(long = "only")]
        only: Vec<String>,
    },
    /// List every rule with its default state
    Rules,
}

fn level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn print_issues(format: Format, issues: &[Issue]) -> Result<()> {
    match format {
        Format::Text => {
            for issue in issues {
                println!("{issue}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(issues)?),
    }
    Ok(())
}

fn print_rules(format: Format) -> Result<()> {
    let ruleset = slslint_aws::ruleset();
    match format {
        Format::Text => {
            for rule in ruleset.rules() {
                let state = if rule.enabled() { "enabled" } else { "disabled" };
                println!("{:<56} {:<8} {:<7} {}", rule.name(), state, rule.severity(), rule.link());
            }
        }
        Format::Json => {
            let rules: Vec<_> = ruleset
                .rules()
                .map(|r| {
                    json!({
                        "name": r.name(),
                        "enabled": r.enabled(),
                        "severity": r.severity(),
                        "link": r.link(),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "name": ruleset.name,
                    "version": ruleset.version,
                    "rules": rules,
                }))?
            );
        }
    }
    Ok(())
}

fn check(snapshot: &Path, config: Option<&Path>, only: Vec<String>) -> Result<Vec<Issue>> {
    let mut config = match config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.only.extend(only);

    let snapshot = Snapshot::from_path(snapshot)?;
    info!(resources = snapshot.resources.len(), "snapshot loaded");

    let mut runner = SnapshotRunner::new(snapshot);
    slslint_aws::ruleset()
        .check(&mut runner, &config)
        .context("rule check failed")?;
    Ok(runner.into_issues())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_max_level(level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Cmd::Rules => {
            print_rules(cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Check { snapshot, config, only } => {
            let issues = check(&snapshot, config.as_deref(), only)?;
            info!(issues = issues.len(), "check finished");
            print_issues(cli.format, &issues)?;
            Ok(if issues.is_empty() { ExitCode::SUCCESS } else { ExitCode::from(2) })
        }
    }
}
