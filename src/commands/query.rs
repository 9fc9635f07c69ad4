//! `clusterscope query`: query a running daemon via its REST API.

use anyhow::Result;
use clap::Subcommand;

use crate::api::rest::GridParams;
use crate::client::ClusterscopeClient;
use crate::commands::output::{self, print_output};

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Daemon health check
    Health,
    /// Current grid
    Grid {
        /// Sort column (name, type, version, status, nodes, user-pods, system-pods)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Case-insensitive cluster name filter
        #[arg(long)]
        search: Option<String>,
        /// Status category (all, critical, warning, healthy, unknown, unmonitored)
        #[arg(long)]
        status: Option<String>,
    },
    /// Status counts
    Summary,
    /// Managed-cluster inventory
    Clusters,
    /// One cluster by name or cluster id
    Cluster {
        key: String,
    },
    /// Force a refresh and print the resulting grid
    Refresh,
}

pub fn run(url: &str, format: &str, command: &QueryCommands) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(url, format, command))
}

async fn run_async(url: &str, format: &str, command: &QueryCommands) -> Result<()> {
    let client = ClusterscopeClient::new(url)?;

    match command {
        QueryCommands::Health => {
            let data = client.health().await?;
            print_output(format, &data)
        }
        QueryCommands::Grid {
            sort,
            desc,
            search,
            status,
        } => {
            let params = GridParams {
                sort: sort.clone(),
                direction: desc.then(|| "desc".to_string()),
                search: search.clone(),
                status: status.clone(),
            };
            let data = client.grid(&params).await?;
            if format == "json" {
                print_output(format, &data)
            } else {
                output::print_grid(&data);
                Ok(())
            }
        }
        QueryCommands::Summary => {
            let data = client.summary().await?;
            print_output(format, &data)
        }
        QueryCommands::Clusters => {
            let data = client.clusters().await?;
            print_output(format, &data)
        }
        QueryCommands::Cluster { key } => {
            let data = client.cluster(key).await?;
            print_output(format, &data)
        }
        QueryCommands::Refresh => {
            let data = client.refresh().await?;
            if format == "json" {
                print_output(format, &data)
            } else {
                if !data.applied {
                    println!("refresh {} was superseded by a newer one", data.sequence);
                }
                output::print_grid(&data.grid);
                Ok(())
            }
        }
    }
}
