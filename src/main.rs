use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pleme_clusterscope::client::DEFAULT_BASE_URL;
use pleme_clusterscope::commands::{self, grid::GridSource, grid::GridView};

#[derive(Parser)]
#[command(
    name = "clusterscope",
    version,
    about = "Health grid for Kubernetes clusters reporting to monitoring workspaces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Path to config file (default: ~/.config/clusterscope/config.yaml)
    #[arg(long)]
    config: Option<String>,

    /// Cluster inventory file (overrides config)
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Interpret a recorded batch response instead of calling the engine
    #[arg(long)]
    response: Option<PathBuf>,

    /// Output format (table or json)
    #[arg(long, default_value = "table")]
    format: String,
}

impl SourceArgs {
    fn source(&self) -> GridSource {
        GridSource {
            config: self.config.clone(),
            inventory: self.inventory.clone(),
            response: self.response.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Query all workspaces once and print the cluster grid
    Grid {
        #[command(flatten)]
        source: SourceArgs,

        /// Sort column (name, type, version, status, nodes, user-pods, system-pods)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Case-insensitive cluster name filter
        #[arg(long, default_value = "")]
        filter: String,

        /// Status category (all, critical, warning, healthy, unknown, unmonitored)
        #[arg(long)]
        status: Option<String>,
    },

    /// Query all workspaces once and print status counts
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Run the clusterscope daemon (REST + GraphQL + telemetry)
    Daemon {
        /// HTTP listen address (overrides config)
        #[arg(long)]
        http_addr: Option<String>,

        /// Log level (overrides config)
        #[arg(long)]
        log_level: Option<String>,

        /// Cluster inventory file (overrides config)
        #[arg(long)]
        inventory: Option<String>,

        /// Path to config file (default: ~/.config/clusterscope/config.yaml)
        #[arg(long)]
        config: Option<String>,
    },

    /// Query a clusterscope daemon's REST API
    Query {
        /// Daemon base URL
        #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
        url: String,

        /// Output format (table or json)
        #[arg(long, global = true, default_value = "table")]
        format: String,

        #[command(subcommand)]
        command: commands::query::QueryCommands,
    },
}

/// Plain stderr logging for one-shot commands. The daemon installs its own
/// JSON subscriber.
fn init_cli_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Grid {
            source,
            sort,
            desc,
            filter,
            status,
        } => {
            init_cli_tracing();
            let view = GridView {
                sort,
                direction: desc.then(|| "desc".to_string()),
                search: filter,
                status,
            };
            commands::grid::run(source.source(), view, &source.format)
        }
        Commands::Summary { source } => {
            init_cli_tracing();
            commands::summary::run(source.source(), &source.format)
        }
        Commands::Daemon {
            http_addr,
            log_level,
            inventory,
            config,
        } => commands::daemon::run(http_addr, log_level, inventory, config),
        Commands::Query {
            url,
            format,
            command,
        } => {
            init_cli_tracing();
            commands::query::run(&url, &format, &command)
        }
    }
}
