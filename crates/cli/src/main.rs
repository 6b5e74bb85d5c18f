//! GraphMorph CLI
//!
//! Command-line front end for probing, fetching and normalizing API schemas.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use graphmorph_common::{GraphmorphConfig, Verdict};
use graphmorph_discovery::{graphql, openapi, ApiExplorer, HttpExplorer};
use graphmorph_parser::{parse_schema, SchemaFormat};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "GRAPHMORPH_LOG";

#[derive(Parser)]
#[command(name = "graphmorph")]
#[command(version, about = "Discover GraphQL and REST APIs and normalize their schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./graphmorph.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug events to stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an endpoint speaks GraphQL or publishes an OpenAPI spec
    #[command(after_help = "EXAMPLES:\n  \
        graphmorph probe https://countries.trevorblades.com/graphql\n  \
        graphmorph probe https://petstore.swagger.io")]
    Probe {
        /// Endpoint or base URL
        url: String,
    },

    /// Download a schema and print its digest
    #[command(after_help = "EXAMPLES:\n  \
        # GraphQL introspection\n  \
        graphmorph fetch https://countries.trevorblades.com/graphql --out countries.json\n\n  \
        # OpenAPI document\n  \
        graphmorph fetch https://petstore.swagger.io/v2/swagger.json --openapi")]
    Fetch {
        /// GraphQL endpoint, or spec URL with --openapi
        url: String,

        /// Treat the URL as an OpenAPI document
        #[arg(long)]
        openapi: bool,

        /// Write the raw payload to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Normalize a downloaded schema into entities
    #[command(after_help = "EXAMPLES:\n  \
        graphmorph parse --spec countries.json\n  \
        graphmorph parse --spec petstore.json --format openapi --source petstore")]
    Parse {
        /// Path to the schema file (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Schema format (auto-detected if not specified)
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// Name stamped on every entity (defaults to the file stem)
        #[arg(long)]
        source: Option<String>,

        /// Print the entity list as JSON after the summary
        #[arg(long)]
        entities: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// GraphQL introspection result
    Graphql,
    /// OpenAPI 3.x or Swagger 2.0 document
    Openapi,
}

impl From<FormatArg> for SchemaFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Graphql => SchemaFormat::Graphql,
            FormatArg::Openapi => SchemaFormat::Openapi,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Probe { url } => {
            let explorer = explorer(cli.config.as_deref())?;
            probe_command(&explorer, &url)
        }
        Commands::Fetch { url, openapi, out } => {
            let explorer = explorer(cli.config.as_deref())?;
            fetch_command(&explorer, &url, openapi, out.as_deref())
        }
        Commands::Parse {
            spec,
            format,
            source,
            entities,
        } => parse_command(&spec, format, source.as_deref(), entities),
    }
}

/// Install the stderr subscriber; `GRAPHMORPH_LOG` wins over the flags
fn init_logging(verbose: bool, quiet: bool) {
    let fallback = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn explorer(config_path: Option<&Path>) -> Result<HttpExplorer> {
    let config = match config_path {
        Some(path) => GraphmorphConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GraphmorphConfig::load().context("Failed to load configuration")?,
    };
    tracing::debug!(
        timeout_secs = config.http.request_timeout_secs,
        parallel_scan = config.http.parallel_scan,
        authenticated = config.http.bearer_token.is_some(),
        "configuration loaded"
    );

    HttpExplorer::new(&config.http).context("Failed to build HTTP client")
}

fn probe_command(explorer: &dyn ApiExplorer, url: &str) -> Result<()> {
    println!("{} Probing {}", "→".cyan(), url);

    let probe = explorer.probe_graphql(url);
    print_line(&probe.summary());
    if probe.is_graphql() {
        return Ok(());
    }

    println!("{} Scanning for OpenAPI documents", "→".cyan());
    match explorer.probe_openapi(url) {
        Ok(scan) => print_line(&scan.summary()),
        Err(err) => print_line(&openapi::scan_failure_line(&err)),
    }
    Ok(())
}

fn fetch_command(
    explorer: &dyn ApiExplorer,
    url: &str,
    as_openapi: bool,
    out: Option<&Path>,
) -> Result<()> {
    println!("{} Fetching {}", "→".cyan(), url);

    let fetched = if as_openapi {
        explorer
            .fetch_openapi_spec(url)
            .map_err(|err| openapi::fetch_failure_line(&err))
    } else {
        explorer
            .fetch_graphql_schema(url)
            .map_err(|err| graphql::fetch_failure_line(&err))
    };

    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(line) => {
            print_line(&line);
            bail!("fetch failed");
        }
    };
    print_line(&fetched.digest);

    if let Some(path) = out {
        write_payload(path, &fetched.raw)?;
        println!("\n{} Wrote raw payload to {}", "✓".green(), path.display());
    }
    Ok(())
}

fn parse_command(
    spec_path: &Path,
    format: Option<FormatArg>,
    source: Option<&str>,
    show_entities: bool,
) -> Result<()> {
    println!("{} Parsing schema file: {}", "→".cyan(), spec_path.display());

    let value = read_payload(spec_path)?;
    let source = source
        .map(String::from)
        .or_else(|| infer_source_name(spec_path))
        .unwrap_or_else(|| "unknown".to_string());

    let report = match parse_schema(&value, &source, format.map(SchemaFormat::from)) {
        Ok(report) => report,
        Err(err) => {
            print_line(&Verdict::Error.line(parse_failure(&err)));
            bail!("parse failed");
        }
    };

    println!(
        "{} Detected {} schema for '{}'",
        "→".cyan(),
        report.format.to_string().yellow(),
        source
    );
    print_line(&report.summary());

    if show_entities {
        let text = report
            .to_transcript_text()
            .context("Failed to serialize entities")?;
        println!("\n{}", text);
    }
    Ok(())
}

/// Parse failures carry the user-facing message without the error prefix
fn parse_failure(err: &graphmorph_common::GraphmorphError) -> String {
    match err {
        graphmorph_common::GraphmorphError::Parse(message) => message.clone(),
        other => other.to_string(),
    }
}

fn read_payload(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

fn write_payload(path: &Path, raw: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(raw).context("Failed to serialize payload")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}

/// Source name from a file stem, e.g. `countries.introspection.json` → `countries`
fn infer_source_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Print a verdict line colored by its prefix; continuation lines stay plain
fn print_line(text: &str) {
    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (text, None),
    };

    let first = match Verdict::of(first) {
        Some(Verdict::Yes) | Some(Verdict::Success) => first.green().bold(),
        Some(Verdict::Maybe) => first.yellow().bold(),
        Some(Verdict::No) => first.normal(),
        Some(Verdict::Error) => first.red().bold(),
        None => first.normal(),
    };
    println!("{}", first);
    if let Some(rest) = rest {
        println!("{}", rest);
    }
}
