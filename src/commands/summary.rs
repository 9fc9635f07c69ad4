//! `clusterscope summary`: status counts only.

use anyhow::Result;

use crate::commands::grid::{load_grid, GridSource};
use crate::commands::output;

pub fn run(source: GridSource, format: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let service = load_grid(&source).await?;
        let summary = service.summary().await?;
        match format {
            "json" => output::print_output("json", &summary),
            _ => {
                output::print_summary(&summary);
                Ok(())
            }
        }
    })
}
