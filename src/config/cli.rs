//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! pronostico train
//! pronostico train --config titanic_config.yaml --epochs 20
//! pronostico serve --model-dir titanic_model
//! pronostico runs --experiment Titanic_Survival_Prediction
//! pronostico validate titanic_config.yaml
//! pronostico deck
//! ```

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

use super::schema::ModelConfig;

/// Default location of the remote Titanic CSV
pub const DEFAULT_DATASET_URL: &str =
    "https://web.stanford.edu/class/archive/cs/cs109/cs109.1166/stuff/titanic.csv";

/// Default experiment name
pub const DEFAULT_EXPERIMENT: &str = "Titanic_Survival_Prediction";

/// Default run name
pub const DEFAULT_RUN_NAME: &str = "Titanic_Run";

/// Default root directory of the file-backed experiment store
pub const DEFAULT_TRACKING_DIR: &str = "/tmp/pronostico/mlruns";

/// Pronostico: train, track and serve a survival classifier
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "pronostico")]
#[command(version)]
#[command(about = "Train, track and serve a tabular binary classifier")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download the dataset, train a model and record the run
    Train(TrainArgs),

    /// Serve predictions from a saved model
    Serve(ServeArgs),

    /// List the runs recorded for an experiment
    Runs(RunsArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Display information about a configuration
    Info(InfoArgs),

    /// Write the default configuration to a YAML file
    Config(ConfigArgs),

    /// Generate the bundled slide deck
    Deck(DeckArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Load the model configuration from this YAML file instead of the built-in one
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Where the effective configuration is written and logged from
    #[arg(long, default_value = "titanic_config.yaml")]
    pub config_out: PathBuf,

    /// Remote CSV to download
    #[arg(long, default_value = DEFAULT_DATASET_URL)]
    pub dataset_url: String,

    /// Read the raw CSV from a local file instead of downloading it
    #[arg(long, conflicts_with = "dataset_url")]
    pub dataset_file: Option<PathBuf>,

    /// Where the renamed dataset is persisted
    #[arg(long, default_value = "titanic.csv")]
    pub dataset_path: PathBuf,

    /// Where the trained model directory is saved
    #[arg(long, default_value = "titanic_model")]
    pub model_dir: PathBuf,

    /// Root of the experiment store
    #[arg(long, default_value = DEFAULT_TRACKING_DIR)]
    pub tracking_dir: PathBuf,

    /// Experiment name
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Run name
    #[arg(long, default_value = DEFAULT_RUN_NAME)]
    pub run_name: String,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f64>,

    /// Random seed for the data split and shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the serve command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ServeArgs {
    /// Saved model directory
    #[arg(long, default_value = "titanic_model")]
    pub model_dir: PathBuf,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port of the prediction service
    #[arg(short, long, default_value_t = 5050)]
    pub port: u16,

    /// Port of the metrics endpoint
    #[arg(long, default_value_t = 8000)]
    pub metrics_port: u16,
}

/// Arguments for the runs command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunsArgs {
    /// Root of the experiment store
    #[arg(long, default_value = DEFAULT_TRACKING_DIR)]
    pub tracking_dir: PathBuf,

    /// Experiment name
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ConfigArgs {
    /// Output path
    #[arg(short, long, default_value = "titanic_config.yaml")]
    pub output: PathBuf,
}

/// Arguments for the deck command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DeckArgs {
    /// Output path of the Markdown deck
    #[arg(short, long, default_value = "VLIW_DSP_Conference_Presentation.md")]
    pub output: PathBuf,
}

/// Output format for info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Unknown output format: {s}. Valid formats: text, json, yaml"
            )),
        }
    }
}

/// Parse CLI arguments from an iterator (testable)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a model configuration
pub fn apply_overrides(config: &mut ModelConfig, args: &TrainArgs) {
    if let Some(epochs) = args.epochs {
        config.trainer.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.trainer.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        config.trainer.learning_rate = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builder::titanic_config;

    #[test]
    fn test_parse_train_defaults() {
        let cli = parse_args(["pronostico", "train"]).unwrap();
        match cli.command {
            Command::Train(args) => {
                assert!(args.config.is_none());
                assert_eq!(args.dataset_url, DEFAULT_DATASET_URL);
                assert_eq!(args.dataset_path, PathBuf::from("titanic.csv"));
                assert_eq!(args.model_dir, PathBuf::from("titanic_model"));
                assert_eq!(args.experiment, DEFAULT_EXPERIMENT);
                assert_eq!(args.seed, 42);
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = parse_args([
            "pronostico",
            "train",
            "--epochs",
            "20",
            "--batch-size",
            "16",
            "--lr",
            "0.01",
        ])
        .unwrap();

        match cli.command {
            Command::Train(args) => {
                let mut config = titanic_config();
                apply_overrides(&mut config, &args);
                assert_eq!(config.trainer.epochs, 20);
                assert_eq!(config.trainer.batch_size, 16);
                assert!((config.trainer.learning_rate - 0.01).abs() < 1e-12);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = parse_args(["pronostico", "train"]).unwrap();
        let Command::Train(args) = cli.command else {
            panic!("Expected Train command");
        };
        let mut config = titanic_config();
        apply_overrides(&mut config, &args);
        assert_eq!(config, titanic_config());
    }

    #[test]
    fn test_dataset_file_conflicts_with_url() {
        let result = parse_args([
            "pronostico",
            "train",
            "--dataset-url",
            "http://example.com/a.csv",
            "--dataset-file",
            "raw.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = parse_args(["pronostico", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, 5050);
                assert_eq!(args.metrics_port, 8000);
                assert_eq!(args.host.to_string(), "0.0.0.0");
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_runs_command() {
        let cli = parse_args(["pronostico", "runs", "--experiment", "other"]).unwrap();
        match cli.command {
            Command::Runs(args) => {
                assert_eq!(args.experiment, "other");
                assert_eq!(args.tracking_dir, PathBuf::from(DEFAULT_TRACKING_DIR));
            }
            _ => panic!("Expected Runs command"),
        }
    }

    #[test]
    fn test_parse_info_json() {
        let cli = parse_args(["pronostico", "info", "c.yaml", "--format", "json"]).unwrap();
        match cli.command {
            Command::Info(args) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = parse_args(["pronostico", "-v", "deck"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("invalid".parse::<OutputFormat>().is_err());
    }
}
