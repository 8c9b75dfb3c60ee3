use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use holdfast_engine::config::{ConfigLoader, HoldfastConfig};
use holdfast_engine::profile::UiProfile;
use holdfast_engine::report::{RunReport, format_report};
use holdfast_engine::scenario::ScenarioContent;
use holdfast_engine::workflows::{self, WorkflowKind};
use holdfast_wd::{BrowserOptions, WebDriverSession};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holdfast", version, about = "Resilient end-to-end workflows for SPA back offices")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ./holdfast.yaml, then ~/.holdfast/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, global = true)]
    webdriver_url: Option<String>,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    /// Directory the browser saves downloads into
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,

    /// Application under test
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// UI profile replacing the built-in one
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run workflows by name, or `all` for the whole catalogue
    Run {
        #[arg(default_value = "all")]
        workflows: Vec<String>,
    },
    /// List the workflow catalogue
    List,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "holdfast=debug,holdfast_engine=debug,holdfast_wd=debug"
    } else {
        "holdfast=info,holdfast_engine=info,holdfast_wd=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Reports go to stdout; logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(args: &Args) -> anyhow::Result<HoldfastConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ConfigLoader::load_from(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            ConfigLoader::apply_env(&mut config, |name| std::env::var(name).ok())?;
            config
        }
        None => ConfigLoader::load_default().await?,
    };

    if let Some(url) = &args.webdriver_url {
        config.browser.webdriver_url = url.clone();
    }
    if args.headless {
        config.browser.headless = true;
    }
    if let Some(dir) = &args.download_dir {
        config.browser.download_dir = Some(dir.clone());
    }
    if let Some(url) = &args.base_url {
        config.target.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(profile) = &args.profile {
        config.target.profile = Some(profile.clone());
    }
    Ok(config)
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}\n", format_report(report));
    }
    Ok(())
}

async fn run(args: &Args, names: &[String]) -> anyhow::Result<ExitCode> {
    let selected = workflows::select(names).map_err(|e| anyhow!(e))?;
    let config = load_config(args).await?;
    let profile = UiProfile::load_or_builtin(config.target.profile.as_deref()).await?;
    if let Some(dir) = &config.browser.download_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating download dir {}", dir.display()))?;
    }
    info!(
        "Running {} workflow(s) against {} with profile '{}'",
        selected.len(),
        config.target.base_url,
        profile.name
    );

    let mut failed = Vec::new();
    for kind in selected {
        let mut driver = WebDriverSession::new(BrowserOptions::from(&config.browser));
        match kind
            .run(&mut driver, &profile, &config, ScenarioContent::new_scenario())
            .await
        {
            Ok(report) => {
                print_report(&report, args.json)?;
                if !report.is_completed() {
                    failed.push(kind);
                }
            }
            Err(e) => {
                error!("Workflow '{}' could not run: {}", kind, e);
                failed.push(kind);
            }
        }
    }

    if failed.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        let names: Vec<&str> = failed.iter().map(|k| k.name()).collect();
        error!("Failed workflows: {}", names.join(", "));
        Ok(ExitCode::FAILURE)
    }
}

fn list() {
    for kind in WorkflowKind::ALL {
        println!("{:<18} {}", kind.name(), kind.description());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Run { workflows } => run(&args, workflows).await,
        Command::List => {
            list();
            Ok(ExitCode::SUCCESS)
        }
    }
}
