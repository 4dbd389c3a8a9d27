//! CLI binary for plan-finder.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use plan_finder::report::{render_json, render_text};
use plan_finder::{FinderConfig, OrganizationReport, OutputFormat, parse_batch, run_batch};
use plan_search::{DiscoveryEngine, DiscoveryRequest, MatchPolicy};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// plan-finder: find and verify organizations' improvement and strategic plans.
#[derive(Parser)]
#[command(name = "plan-finder", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Discover planning documents for one organization.
    Discover {
        /// Organization name, e.g. "Maywood School District 89".
        name: String,

        /// Region prefixed to every query, e.g. a state.
        #[arg(long)]
        region: Option<String>,

        /// The organization's own domain or homepage URL.
        #[arg(long)]
        domain: Option<String>,

        /// Number of ranked candidates to return.
        #[arg(long)]
        top: Option<usize>,

        /// Search for PDFs first; run plain queries only if that comes up short.
        #[arg(long)]
        pdf_first: bool,

        /// Match policy: loose, strict or domain.
        #[arg(long)]
        policy: Option<MatchPolicy>,

        /// Skip reachability probes.
        #[arg(long)]
        no_verify: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Discover documents for every organization listed in a file.
    Batch {
        /// One organization per line: name[<TAB>region[<TAB>domain]].
        file: PathBuf,

        /// Number of ranked candidates per organization.
        #[arg(long)]
        top: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the paths a site's robots.txt disallows for all agents.
    Robots {
        /// Any URL on the site.
        url: String,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Destination (defaults to the standard config path).
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for JSON.
    let default_filter = if cli.verbose {
        "plan_finder=debug,plan_search=debug"
    } else {
        "plan_finder=info,plan_search=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Discover {
            name,
            region,
            domain,
            top,
            pdf_first,
            policy,
            no_verify,
            json,
        } => {
            let mut config = FinderConfig::load(cli.config.as_deref())?;
            config.search.pdf_first |= pdf_first;
            config.search.verify &= !no_verify;
            if let Some(policy) = policy {
                config.search.match_policy = policy;
            }
            let request = DiscoveryRequest::new(name.as_str())
                .with_region(region.as_deref())
                .with_domain(domain.as_deref())
                .with_top_n(top);
            discover(&config, &request, json).await
        }
        Command::Batch { file, top, json } => {
            let config = FinderConfig::load(cli.config.as_deref())?;
            batch(&config, &file, top, json).await
        }
        Command::Robots { url } => robots(&url).await,
        Command::InitConfig { path } => init_config(path),
    }
}

fn output_format(config: &FinderConfig, json: bool) -> OutputFormat {
    if json { OutputFormat::Json } else { config.output.format }
}

async fn discover(
    config: &FinderConfig,
    request: &DiscoveryRequest,
    json: bool,
) -> anyhow::Result<()> {
    let engine = DiscoveryEngine::from_config(&config.search)?;
    let candidates = engine.discover(request).await?;

    match output_format(config, json) {
        OutputFormat::Json => println!("{}", render_json(&candidates)?),
        OutputFormat::Text => {
            let report = OrganizationReport::found(
                &request.name,
                request.region_hint.as_deref(),
                candidates,
            );
            print!("{}", render_text(&report));
        }
    }
    Ok(())
}

async fn batch(
    config: &FinderConfig,
    file: &std::path::Path,
    top_n: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read batch file {}", file.display()))?;
    let entries = parse_batch(&content);
    info!(organizations = entries.len(), "batch started");

    let engine = DiscoveryEngine::from_config(&config.search)?;
    let reports = run_batch(&engine, &entries, top_n).await;

    match output_format(config, json) {
        OutputFormat::Json => println!("{}", render_json(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", render_text(report));
            }
        }
    }
    Ok(())
}

async fn robots(url: &str) -> anyhow::Result<()> {
    let client = plan_search::http::build_probe_client(
        plan_search::identity::random_user_agent(),
        std::time::Duration::from_secs(5),
        5,
    )?;
    let paths = plan_search::robots::disallowed_paths(&client, url).await;
    if paths.is_empty() {
        println!("nothing disallowed for all agents");
    }
    for path in paths {
        println!("{path}");
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(FinderConfig::default_config_path);
    if path.exists() {
        anyhow::bail!("{} already exists; not overwriting", path.display());
    }
    FinderConfig::default().save_to_file(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}
