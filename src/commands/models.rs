//! Model catalog and liveness commands
//!
//! `docchat models` lists what the relay reports (or the mock catalog when
//! the server cannot be used); `docchat probe` runs the liveness cascade
//! and prints what each probe answered.

use crate::client::{ModelClient, ModelInfo};
use crate::config::Config;
use crate::error::{DocchatError, Result};
use crate::liveness::ProbeReport;
use colored::Colorize;
use prettytable::{row, Table};

/// List available models
///
/// # Arguments
///
/// * `config` - Configuration containing client settings
/// * `json` - Print JSON instead of a table
///
/// # Errors
///
/// Returns error if the client cannot be created or serialization fails
///
/// # Examples
///
/// ```no_run
/// use docchat::config::Config;
/// use docchat::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    let client = ModelClient::new(&config.client)?;
    let reachable = client.is_reachable().await;
    let models = client.list_models().await;

    tracing::info!(count = models.len(), reachable, "Listed models");

    if json {
        output_models_json(&models)?;
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available from {}", client.relay_url());
        return Ok(());
    }
    output_models_table(&models, client.relay_url(), !reachable);
    Ok(())
}

/// Run the liveness cascade and print every probe outcome
///
/// # Errors
///
/// Returns error if the probe clients cannot be created
pub async fn probe(config: &Config) -> Result<()> {
    let client = ModelClient::new(&config.client)?;
    let reports = client.detector().report().await;
    let reachable = client.is_reachable().await;

    output_probe_table(&reports);
    if reachable {
        println!("{}", "Ollama is reachable".green());
    } else {
        println!("{}", "Ollama is not reachable".red());
    }
    Ok(())
}

/// Output models in JSON format
///
/// # Errors
///
/// Returns `DocchatError::Serialization` if serialization fails
fn output_models_json(models: &[ModelInfo]) -> Result<()> {
    let json = serde_json::to_string_pretty(models).map_err(DocchatError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output models in table format
fn output_models_table(models: &[ModelInfo], source: &str, simulated: bool) {
    let mut table = Table::new();
    table.add_row(row!["Model Name", "Size", "Modified"]);

    for model in models {
        let name = if simulated {
            format!("{} (mock)", model.name)
        } else {
            model.name.clone()
        };
        table.add_row(row![name, format_size(model.size), model.modified_at]);
    }

    println!("\nAvailable models from {}:\n", source);
    table.printstd();
    println!();
}

fn output_probe_table(reports: &[ProbeReport]) {
    let mut table = Table::new();
    table.add_row(row!["Probe", "Outcome"]);
    for report in reports {
        table.add_row(row![report.probe, report.outcome]);
    }
    table.printstd();
}

/// Format a byte count with a binary unit
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock_catalog;

    #[test]
    fn test_output_models_json_empty_array() {
        assert!(output_models_json(&[]).is_ok());
    }

    #[test]
    fn test_models_serialize_with_wire_fields() {
        let models = mock_catalog();
        let value = serde_json::to_value(&models).unwrap();
        assert_eq!(value[0]["name"], "mistral");
        assert_eq!(value[0]["size"], 4_113_301_824u64);
        assert!(value[1]["modified_at"].is_string());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(4_113_301_824), "3.8 GiB");
    }

    #[test]
    fn test_output_models_table_does_not_panic() {
        output_models_table(&mock_catalog(), "http://localhost:3001/api/ollama", true);
    }
}
