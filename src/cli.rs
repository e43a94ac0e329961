//! Command line driver: run one provider operation and print the state.

use crate::config::{Config, Settings};
use crate::output::{render_diagnostics, render_state};
use crate::provider::{Provider, State};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Manage OpenStack Networking routers, trunks and subnet pools", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Provider settings as JSON; defaults to the OS_* environment.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Print state as JSON instead of aligned attributes.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the schema of one or every data source and resource.
    Schema { name: Option<String> },
    /// Read a data source.
    Read {
        name: String,
        /// JSON object of attributes.
        #[arg(long)]
        config: PathBuf,
    },
    /// Create a resource, or update it when --state is given.
    Apply {
        name: String,
        #[arg(long)]
        config: PathBuf,
        /// State written by an earlier apply.
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Refresh the state of a resource.
    Refresh {
        name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Delete a resource.
    Destroy {
        name: String,
        #[arg(long)]
        state: PathBuf,
    },
    /// Read an existing resource by id.
    Import { name: String, id: String },
}

fn read_object(path: &Path) -> Result<Map<String, Value>, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{} must contain a JSON object", path.display()).into()),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn Error>> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Ok(Settings::from_env()),
    }
}

fn print_state(name: &str, state: &State, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
    } else {
        print!("{}", render_state(name, state));
    }
    Ok(())
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let provider = Provider::new();

    if let Commands::Schema { name } = &cli.command {
        let schema = match name {
            Some(name) => provider
                .schema(name)
                .map(|s| s.describe())
                .ok_or_else(|| format!("Unknown data source or resource \"{name}\""))?,
            None => provider.schemas(),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = Config::new(load_settings(cli.settings.as_deref())?)?;

    let result = match &cli.command {
        Commands::Schema { .. } => return Ok(()),
        Commands::Read { name, config: path } => {
            let attrs = read_object(path)?;
            provider
                .read_data_source(name, &config, attrs)
                .await
                .map(|state| Some((name, state)))
        }
        Commands::Apply {
            name,
            config: path,
            state,
        } => {
            let attrs = read_object(path)?;
            let prior = state.as_deref().map(read_object).transpose()?;
            provider
                .apply(name, &config, attrs, prior)
                .await
                .map(|state| Some((name, state)))
        }
        Commands::Refresh { name, state } => {
            let state = read_object(state)?;
            provider
                .read_resource(name, &config, state)
                .await
                .map(|state| state.map(|s| (name, s)))
        }
        Commands::Destroy { name, state } => {
            let state = read_object(state)?;
            provider.destroy(name, &config, state).await.map(|_| None)
        }
        Commands::Import { name, id } => provider
            .import(name, &config, id)
            .await
            .map(|state| Some((name, state))),
    };

    match result {
        Ok(Some((name, state))) => print_state(name, &state, cli.json),
        Ok(None) => {
            log::info!("Resource is gone");
            Ok(())
        }
        Err(diags) => {
            eprintln!("{}", render_diagnostics(&diags));
            Err(format!("{} error(s)", diags.len()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "openstack-networking-provider",
            "apply",
            "openstack_networking_subnetpool_v2",
            "--config",
            "pool.json",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Apply { name, state, .. } => {
                assert_eq!(name, "openstack_networking_subnetpool_v2");
                assert!(state.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_read_object_rejects_array() {
        let path = std::env::temp_dir().join("openstack-networking-provider-array.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(read_object(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
