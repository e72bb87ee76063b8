mod cli;
mod core;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ccl", about = "Claude Code token usage and cost ledger", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate session logs into monthly and recent-days cost tables
    Report {
        /// Recent window length in days (default: config value, then 30)
        #[arg(short, long)]
        days: Option<u32>,

        /// Skip the pricing fetch and cache; price with builtin rates only
        #[arg(long)]
        offline: bool,

        /// Refetch the price table even when the cache is fresh
        #[arg(long)]
        refresh: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = core::config::AppConfig::load().unwrap_or_default();

    let output_opts = cli::output::OutputOptions {
        format: cli::output::resolve_format(
            cli.json,
            cli.format.as_deref(),
            &config.settings.default_format,
        ),
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &config.settings.color),
    };

    match cli.command {
        None | Some(Commands::Report { .. }) => {
            let (days, offline, refresh) = match cli.command {
                Some(Commands::Report {
                    days,
                    offline,
                    refresh,
                }) => (days, offline, refresh),
                _ => (None, false, false),
            };
            cli::report_cmd::run(days, offline, refresh, &output_opts).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
        },
    }

    Ok(())
}
