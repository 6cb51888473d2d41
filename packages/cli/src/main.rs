#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the anomaly atlas dashboard.
//!
//! Every subcommand drives the same view model the map dashboard uses,
//! then prints the rendered effects. Without a subcommand an interactive
//! menu is shown.
//!
//! Uses `indicatif-log-bridge` (via [`progress::init_logger`]) so log
//! lines and download spinners never fight for the terminal.

mod app;
mod interactive;
mod progress;
mod render;

use std::path::PathBuf;

use anomaly_atlas_client::config::ClientConfig;
use anomaly_atlas_client::{ClientError, DashboardClient};
use anomaly_atlas_dashboard_models::analysis::RiskLevel;
use anomaly_atlas_dashboard_models::prediction::{ExamplePreset, PredictionRequest};
use clap::{Args, Parser, Subcommand};

use crate::app::App;

#[derive(Parser)]
#[command(name = "anomaly_atlas", about = "Enrolment anomaly dashboard in the terminal")]
struct Cli {
    /// Client configuration file (TOML). Defaults to the built-in configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Dashboard API base URL (overrides the config file and `ANOMALY_ATLAS_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// National summary and most-affected states
    Summary,
    /// Statistics and severity for every state
    States,
    /// Detail panel for one state
    State {
        /// State name (case-insensitive)
        name: String,
    },
    /// District breakdown for one state
    Districts {
        /// State name (case-insensitive)
        name: String,
    },
    /// State boundaries coloured by severity
    Map {
        /// Longitude of a point to select the state under
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Latitude of a point to select the state under
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
    },
    /// Analysis report
    Analysis,
    /// Risk prediction for a state's figures
    Predict(PredictArgs),
    /// Policy recommendations
    Policies {
        /// Only show policies of this severity (critical, high, medium, low)
        #[arg(long)]
        severity: Option<RiskLevel>,
    },
    /// One policy in full
    Policy {
        /// Policy id
        id: u64,
        /// Also create a task implementing the policy
        #[arg(long)]
        create_task: bool,
    },
}

/// Prediction form. Fields given alongside `--example` override the
/// preset's values.
#[derive(Args, Debug)]
struct PredictArgs {
    /// Start from a preset (low, medium, high)
    #[arg(long)]
    example: Option<ExamplePreset>,
    #[arg(long, required_unless_present = "example")]
    state: Option<String>,
    /// Total records
    #[arg(long, required_unless_present = "example")]
    records: Option<u64>,
    /// Anomalous records
    #[arg(long, required_unless_present = "example")]
    anomalies: Option<u64>,
    /// Fraction of records with an invalid PIN code (0-1)
    #[arg(long)]
    invalid_pin_rate: Option<f64>,
    /// Fraction of duplicate records (0-1)
    #[arg(long)]
    duplicate_rate: Option<f64>,
    /// Fraction of records missing a date of birth (0-1)
    #[arg(long)]
    missing_dob_rate: Option<f64>,
}

impl PredictArgs {
    fn request(&self) -> PredictionRequest {
        let base = self.example.map_or_else(
            || PredictionRequest {
                state: String::new(),
                records: 0,
                anomalies: 0,
                invalid_pin_rate: 0.0,
                duplicate_rate: 0.0,
                missing_dob_rate: 0.0,
            },
            ExamplePreset::request,
        );
        PredictionRequest {
            state: self.state.clone().unwrap_or(base.state),
            records: self.records.unwrap_or(base.records),
            anomalies: self.anomalies.unwrap_or(base.anomalies),
            invalid_pin_rate: self.invalid_pin_rate.unwrap_or(base.invalid_pin_rate),
            duplicate_rate: self.duplicate_rate.unwrap_or(base.duplicate_rate),
            missing_dob_rate: self.missing_dob_rate.unwrap_or(base.missing_dob_rate),
        }
    }
}

/// Loads the configuration, then applies command-line overrides.
fn load_config(cli: &Cli) -> Result<ClientConfig, ClientError> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        log::debug!("--api-url overrides base_url: {url}");
        config.base_url.clone_from(url);
        config.validate()?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    let client = DashboardClient::new(load_config(&cli)?)?;
    log::info!(
        "Using dashboard API at {} ({} retries)",
        client.config().base_url,
        client.config().retry.max_retries
    );
    let mut app = App::new(client, multi);

    let Some(command) = cli.command else {
        return interactive::run(&mut app).await;
    };

    match command {
        Commands::Summary => app.summary().await,
        Commands::States => app.states().await,
        Commands::State { name } => app.state(&name).await,
        Commands::Districts { name } => app.districts(&name).await,
        Commands::Map { lng, lat } => app.map(lng.zip(lat)).await,
        Commands::Analysis => app.analysis().await,
        Commands::Predict(args) => app.predict(&args.request()).await,
        Commands::Policies { severity } => {
            app.policies(severity).await;
        }
        Commands::Policy { id, create_task } => {
            if app.policy(id).await && create_task {
                app.create_task(id).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_map_point_with_negative_values() {
        let cli = Cli::parse_from(["anomaly_atlas", "map", "--lng", "-73.9", "--lat", "40.7"]);
        match cli.command {
            Some(Commands::Map { lng, lat }) => assert_eq!(lng.zip(lat), Some((-73.9, 40.7))),
            _ => panic!("expected map command"),
        }
    }

    #[test]
    fn predict_flags_override_preset() {
        let cli = Cli::parse_from([
            "anomaly_atlas",
            "predict",
            "--example",
            "HIGH",
            "--records",
            "90000",
        ]);
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        let request = args.request();
        assert_eq!(request.state, "Bihar");
        assert_eq!(request.records, 90_000);
        assert_eq!(request.anomalies, 12_000);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn predict_without_preset_needs_figures() {
        assert!(Cli::try_parse_from(["anomaly_atlas", "predict", "--state", "Goa"]).is_err());

        let cli = Cli::parse_from([
            "anomaly_atlas",
            "predict",
            "--state",
            "Goa",
            "--records",
            "1000",
            "--anomalies",
            "10",
        ]);
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict command");
        };
        let request = args.request();
        assert_eq!(request.state, "Goa");
        assert!(request.duplicate_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn parses_policy_commands() {
        let cli = Cli::parse_from(["anomaly_atlas", "policies", "--severity", "critical"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Policies {
                severity: Some(RiskLevel::Critical)
            })
        ));

        let cli = Cli::parse_from(["anomaly_atlas", "policy", "3", "--create-task"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Policy {
                id: 3,
                create_task: true
            })
        ));
    }

    #[test]
    fn api_url_flag_overrides_base_url() {
        let cli = Cli::parse_from(["anomaly_atlas", "--api-url", "https://dash.example.org", "states"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.base_url, "https://dash.example.org");
    }

    #[test]
    fn rejects_relative_api_url() {
        let cli = Cli::parse_from(["anomaly_atlas", "--api-url", "dash.local", "summary"]);
        assert!(matches!(load_config(&cli), Err(ClientError::Config { .. })));
    }
}
