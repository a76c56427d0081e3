mod config;
mod http;
mod report;
mod server;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pillars_core::{Chart, analyze, export_profile, import_chart};
use rmcp::{ServiceExt, transport::stdio};

use crate::config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "pillars", about = "Four Pillars five-element energy analysis")]
struct Cli {
    /// Config file (default: $PILLARS_CONFIG, then ~/.pillars/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a chart given as four pillars (e.g. 甲子 丙寅 戊辰 庚午 or jia-zi ...)
    Chart {
        #[arg(required = true, num_args = 4)]
        pillars: Vec<String>,

        /// Print the JSON profile instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// List stem and branch relations of a chart
    Relations {
        #[arg(required = true, num_args = 4)]
        pillars: Vec<String>,
    },

    /// Analyze a JSON chart file ("-" reads stdin)
    File {
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Start MCP server on stdio transport
    Serve,

    /// Start the HTTP JSON endpoint
    Http {
        /// Listen address (overrides config and PILLARS_HTTP_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
}

fn init_tracing(verbose: bool, filter: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else if let Some(directive) = filter {
        EnvFilter::new(directive)
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, config.log.filter.as_deref());

    match &cli.command {
        Commands::Chart { pillars, json } => {
            let chart = Chart::from_tokens(pillars).context("failed to parse chart")?;
            print_profile(&chart, output_format(&config, *json), cli.verbose)
        }
        Commands::Relations { pillars } => cmd_relations(pillars),
        Commands::File { path, json } => {
            let chart = read_chart(path)?;
            print_profile(&chart, output_format(&config, *json), cli.verbose)
        }
        Commands::Serve => cmd_serve().await,
        Commands::Http { bind } => {
            let addr = bind.clone().unwrap_or(config.http.bind);
            http::serve(&addr).await
        }
    }
}

fn output_format(config: &Config, json_flag: bool) -> OutputFormat {
    if json_flag {
        OutputFormat::Json
    } else {
        config.output.format
    }
}

fn print_profile(chart: &Chart, format: OutputFormat, verbose: bool) -> Result<()> {
    let profile = analyze(chart);
    match format {
        OutputFormat::Json => {
            let json = export_profile(chart, &profile).context("failed to serialize profile")?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{}", report::render(&profile, verbose)),
    }
    Ok(())
}

fn cmd_relations(pillars: &[String]) -> Result<()> {
    let chart = Chart::from_tokens(pillars).context("failed to parse chart")?;
    print!("{}", report::relations(&analyze(&chart)));
    Ok(())
}

fn read_chart(path: &Path) -> Result<Chart> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    import_chart(&content).with_context(|| format!("failed to load chart from {}", path.display()))
}

async fn cmd_serve() -> Result<()> {
    tracing::info!("starting MCP server");
    let service = server::PillarsServer::new()
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await?;
    Ok(())
}
