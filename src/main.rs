//! kube-versions CLI - workload version report across Kubernetes contexts

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use kube_versions::config::{ContextSelection, OutputFormat, Overrides, ReportConfig, Settings};
use kube_versions::utils::errors::{ReportError, display_error_and_exit};
use kube_versions::utils::logger;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kube-versions")]
#[command(author, version, about = "Report workload versions across Kubernetes contexts", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    /// -v: INFO, -vv: DEBUG, -vvv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to kubeconfig file (default: KUBECONFIG, then ~/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Path to settings file (default: .kube-versions.toml or ~/.config/kube-versions/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only report on this context; failing to reach it is an error
    #[arg(short, long, global = true)]
    context: Option<String>,

    /// Namespaces to report (repeatable or comma-separated), instead of the configured list
    #[arg(short, long)]
    namespace: Vec<String>,

    /// One row per context with one column per namespace
    #[arg(short, long)]
    table: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Derive the per-namespace version summary from image tags only
    #[arg(long)]
    summary_from_images: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check kubeconfig, credential plugins, and context reachability
    Check,

    /// Print an example settings file
    Config,

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let result = match &cli.command {
        Some(Commands::Check) => handle_check_command(&cli).await,
        Some(Commands::Config) => handle_config_command(),
        Some(Commands::Completion { shell }) => handle_completion_command(*shell),
        None => handle_report_command(&cli).await,
    };

    if let Err(err) = &result
        && let Some(report_err) = err.downcast_ref::<ReportError>()
    {
        display_error_and_exit(report_err);
    }

    result
}

async fn handle_report_command(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    let overrides = Overrides {
        namespaces: cli.namespace.clone(),
        context: cli.context.clone(),
        table: cli.table,
        output: cli.output,
        summary_from_images: cli.summary_from_images,
    };
    let config = ReportConfig::build(&settings, &overrides)?;

    let kubeconfig = kubeconfig_path(cli, &settings);
    kube_versions::commands::run_report(&config, kubeconfig.as_deref()).await
}

/// --kubeconfig, then the settings file unless KUBECONFIG is set
fn kubeconfig_path(cli: &Cli, settings: &Settings) -> Option<PathBuf> {
    if cli.kubeconfig.is_some() {
        return cli.kubeconfig.clone();
    }
    if std::env::var_os("KUBECONFIG").is_some() {
        return None;
    }
    settings.defaults.kubeconfig.as_ref().map(PathBuf::from)
}

async fn handle_check_command(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let kubeconfig = kubeconfig_path(cli, &settings);

    let selection = match &cli.context {
        Some(name) => ContextSelection::Single(name.clone()),
        None => ContextSelection::All,
    };

    if !kube_versions::commands::check::check(kubeconfig.as_deref(), &selection).await? {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_config_command() -> Result<()> {
    print!("{}", Settings::example_config()?);
    Ok(())
}

fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "kube-versions", &mut io::stdout());
    Ok(())
}
