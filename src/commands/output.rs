//! Terminal rendering shared by the CLI commands.

use anyhow::Result;
use colored::{ColoredString, Colorize};

use crate::domain::grid::{ClusterRowView, ClusterStatusSummary, GridColumn};
use crate::domain::grid_service::GridState;

pub fn print_output<T: serde::Serialize>(format: &str, data: &T) -> Result<()> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{}", json);
        }
        _ => {
            let value = serde_json::to_value(data)?;
            print_value(&value, 0);
        }
    }
    Ok(())
}

fn print_value(value: &serde_json::Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                match val {
                    serde_json::Value::Object(_) => {
                        println!("{}{}:", pad, key);
                        print_value(val, indent + 1);
                    }
                    serde_json::Value::Array(arr) if arr.is_empty() => {
                        println!("{}{}: []", pad, key);
                    }
                    serde_json::Value::Array(_) => {
                        println!("{}{}:", pad, key);
                        print_value(val, indent + 1);
                    }
                    _ => println!("{}{}: {}", pad, key, format_scalar(val)),
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                if item.is_object() {
                    println!("{}[{}]:", pad, i);
                    print_value(item, indent + 1);
                } else {
                    println!("{}- {}", pad, format_scalar(item));
                }
            }
        }
        _ => println!("{}{}", pad, format_scalar(value)),
    }
}

fn format_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn paint(icon: &str, text: &str) -> ColoredString {
    match icon {
        "critical" => text.red().bold(),
        "error" => text.red(),
        "warning" => text.yellow(),
        "healthy" => text.green(),
        "unknown" => text.blue(),
        _ => text.dimmed(),
    }
}

fn cells(row: &ClusterRowView) -> [&str; 7] {
    [
        &row.name,
        &row.cluster_type,
        &row.version,
        &row.status,
        &row.nodes,
        &row.user_pods,
        &row.system_pods,
    ]
}

/// Print the grid as an aligned table. Padding is applied before colour
/// so escape codes do not skew the widths.
pub fn print_grid(state: &GridState) {
    let mut widths = GridColumn::ALL.map(|c| c.header().chars().count());
    for row in &state.rows {
        for (w, cell) in widths.iter_mut().zip(cells(row)) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let header: Vec<String> = GridColumn::ALL
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<w$}", c.header()))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in &state.rows {
        let line: Vec<String> = cells(row)
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                let padded = format!("{:<w$}", cell);
                if i == GridColumn::Status.index() {
                    paint(&row.status_icon, &padded).to_string()
                } else {
                    padded
                }
            })
            .collect();
        println!("{}", line.join("  "));
    }

    if state.rows.is_empty() {
        println!("{}", "(no clusters match)".dimmed());
    }

    for row in state.rows.iter().filter(|r| r.message.is_some()) {
        if let Some(message) = &row.message {
            println!("{} {}: {}", "!!".yellow().bold(), row.name, message);
        }
    }

    if let Some(error) = &state.error {
        println!("{} {}", "!!".red().bold(), error);
    }
    println!();
    print_summary(&state.summary);
}

pub fn print_summary(summary: &ClusterStatusSummary) {
    println!(
        "{} {} total  {} critical  {} warning  {} healthy  {} unknown  {} unmonitored",
        "::".blue().bold(),
        summary.total,
        paint("critical", &summary.critical.to_string()),
        paint("warning", &summary.warning.to_string()),
        paint("healthy", &summary.healthy.to_string()),
        paint("unknown", &summary.unknown.to_string()),
        paint("unmonitored", &summary.unmonitored.to_string()),
    );
}
