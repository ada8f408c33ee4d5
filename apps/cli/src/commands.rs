//! CLI definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use civis_core::{
    FieldRegistry, ProcessEnv, report_pipeline, resolve_spec, validate_required,
};
use civis_sender::{DeliveryMode, sender_for};
use civis_shared::{ConfigOverrides, PluginConfig, VisibilityType, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Report CI pipeline runs to Datadog CI Visibility.
#[derive(Parser)]
#[command(
    name = "civis",
    version,
    about = "Normalize CI environment variables into a pipeline event and send it to Datadog.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub plugin: PluginArgs,

    /// Defaults to `send`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Plugin settings. Each flag falls back to its `PLUGIN_*` variable.
#[derive(Args, Debug)]
pub(crate) struct PluginArgs {
    /// Log the payload instead of sending it.
    #[arg(long, env = "PLUGIN_DRY_RUN", value_parser = FalseyValueParser::new(), global = true)]
    pub dry_run: bool,

    /// Datadog API key.
    #[arg(long, env = "PLUGIN_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Datadog site prefix, e.g. `us5` or `eu`.
    #[arg(long, env = "PLUGIN_REGION", global = true)]
    pub region: Option<String>,

    /// Full intake URL, replacing the region-derived one.
    #[arg(long, env = "PLUGIN_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Event kind to report. Only `pipeline` is supported.
    #[arg(long, env = "PLUGIN_CI_VISIBILITY_TYPE", global = true)]
    pub ci_visibility_type: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long, env = "PLUGIN_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Optional TOML config file.
    #[arg(long, env = "PLUGIN_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

impl PluginArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dry_run: self.dry_run,
            api_key: self.api_key.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            visibility_type: self.ci_visibility_type.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve, validate, build, and deliver the pipeline event.
    Send,
    /// Only check that every required variable is set.
    Validate,
    /// Show the field table and what each field resolves to.
    Fields,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "civis=info",
        1 => "civis=debug",
        _ => "civis=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let registry = FieldRegistry::pipeline_visibility();

    match cli.command.unwrap_or(Command::Send) {
        Command::Send => cmd_send(&cli.plugin, &registry).await,
        Command::Validate => cmd_validate(&registry),
        Command::Fields => cmd_fields(&registry),
    }
}

async fn cmd_send(args: &PluginArgs, registry: &FieldRegistry) -> Result<()> {
    let file = load_config(args.config.as_deref())?;
    let config = PluginConfig::resolve(&file, args.overrides())?;
    let mode = DeliveryMode::from_config(&config)?;

    info!(
        dry_run = config.dry_run,
        visibility_type = %config.visibility_type,
        "reporting CI visibility event"
    );

    let sender = sender_for(mode)?;
    match config.visibility_type {
        VisibilityType::Pipeline => {
            report_pipeline(registry, &ProcessEnv, sender.as_ref()).await?;
        }
    }

    Ok(())
}

fn cmd_validate(registry: &FieldRegistry) -> Result<()> {
    validate_required(registry, &ProcessEnv)?;
    println!("all required fields are set");
    Ok(())
}

fn cmd_fields(registry: &FieldRegistry) -> Result<()> {
    let env = ProcessEnv;
    let width = registry.iter().map(|s| s.key.len()).max().unwrap_or(0);

    for spec in registry.iter() {
        let value = resolve_spec(spec, &env);
        let marker = if spec.required { "*" } else { " " };
        let candidates: Vec<&str> = spec
            .candidates
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
            .collect();
        let source = if candidates.is_empty() {
            format!("(default {:?})", spec.default)
        } else {
            candidates.join(" > ")
        };
        println!("{marker} {:<width$}  {:<40}  {source}", spec.key, format!("{value:?}"));
    }

    println!();
    println!("  * required");
    Ok(())
}
