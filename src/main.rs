//! Pronostico CLI
//!
//! Train, track and serve the Titanic survival classifier.
//!
//! # Usage
//!
//! ```bash
//! # Download the dataset, train and record a run
//! pronostico train
//!
//! # Train with overrides from a local CSV
//! pronostico train --dataset-file raw.csv --epochs 20 --lr 0.01
//!
//! # Serve predictions on :5050 and metrics on :8000
//! pronostico serve --model-dir titanic_model
//!
//! # List recorded runs
//! pronostico runs
//!
//! # Write the Markdown slide deck
//! pronostico deck
//! ```

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use pronostico::config::{
    apply_overrides, load_config, parse_args, save_config, titanic_config, validate_config, Cli,
    Command, ConfigArgs, DeckArgs, InfoArgs, OutputFormat, RunsArgs, ServeArgs, TrainArgs,
    ValidateArgs,
};
use pronostico::data::DatasetSource;
use pronostico::deck::vliw_dsp_deck;
use pronostico::engine::{LogisticEngineFactory, LogisticModel};
use pronostico::server::{PredictionServer, ServerConfig};
use pronostico::storage::{ExperimentStorage, FileStorage};
use pronostico::train::{train_and_track, TrainSettings};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    init_tracing(&cli);

    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Serve(args) => run_serve(args),
        Command::Runs(args) => run_runs(args),
        Command::Validate(args) => run_validate(args),
        Command::Info(args) => run_info(args),
        Command::Config(args) => run_config(args),
        Command::Deck(args) => run_deck(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_train(args: TrainArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(|e| format!("Config error: {e}"))?,
        None => titanic_config(),
    };
    apply_overrides(&mut config, &args);
    validate_config(&config).map_err(|e| format!("Validation failed: {e}"))?;

    if args.dry_run {
        info!("Dry run - config validated successfully");
        info!(
            "Optimizer: {} (lr={})",
            config.trainer.optimizer.kind, config.trainer.learning_rate
        );
        info!("Epochs: {}", config.trainer.epochs);
        info!("Batch size: {}", config.trainer.batch_size);
        return Ok(());
    }

    let source = match args.dataset_file {
        Some(path) => DatasetSource::File(path),
        None => DatasetSource::Url(args.dataset_url),
    };
    let settings = TrainSettings {
        config,
        config_path: args.config_out,
        source,
        dataset_path: args.dataset_path,
        model_dir: args.model_dir,
        experiment: args.experiment,
        run_name: args.run_name,
    };

    let storage = FileStorage::open(&args.tracking_dir)
        .map_err(|e| format!("Tracking store error: {e}"))?;
    let factory = LogisticEngineFactory { seed: args.seed };

    let summary = train_and_track(&settings, Arc::new(Mutex::new(storage)), &factory)
        .map_err(|e| format!("Training error: {e}"))?;

    println!("Run ID: {}", summary.run_id);
    for (name, value) in summary.metrics.entries() {
        println!("  {name}: {value:.4}");
    }
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<(), String> {
    let model = LogisticModel::load(&args.model_dir).map_err(|e| format!("Model error: {e}"))?;
    info!("Loaded model from {}", args.model_dir.display());

    let config = ServerConfig::new(args.host, args.port, args.metrics_port);
    let server =
        PredictionServer::new(config, Arc::new(model)).map_err(|e| format!("Server error: {e}"))?;

    let runtime = tokio::runtime::Runtime::new().map_err(|e| format!("Runtime error: {e}"))?;
    runtime
        .block_on(server.run())
        .map_err(|e| format!("Server error: {e}"))
}

fn run_runs(args: RunsArgs) -> Result<(), String> {
    let storage = FileStorage::open(&args.tracking_dir)
        .map_err(|e| format!("Tracking store error: {e}"))?;

    let Some(experiment_id) = storage
        .get_experiment_by_name(&args.experiment)
        .map_err(|e| format!("Tracking store error: {e}"))?
    else {
        return Err(format!("Experiment not found: {}", args.experiment));
    };

    let runs = storage
        .list_runs(&experiment_id)
        .map_err(|e| format!("Tracking store error: {e}"))?;
    for run in runs {
        println!("Run ID: {} ({}, {})", run.run_id, run.run_name, run.status);
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    info!("Validating config: {}", args.config.display());

    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_config(&config).map_err(|e| format!("Validation failed: {e}"))?;

    info!("Configuration is valid");

    if args.detailed {
        println!("Configuration Summary:");
        println!("  Input features:");
        for feature in &config.input_features {
            println!("    {} ({})", feature.name, feature.kind);
        }
        println!("  Output feature: {}", config.target_name());
        println!();
        println!("  Optimizer: {}", config.trainer.optimizer.kind);
        println!("  Learning rate: {}", config.trainer.learning_rate);
        println!("  Epochs: {}", config.trainer.epochs);
        println!("  Batch size: {}", config.trainer.batch_size);
    }

    Ok(())
}

fn run_info(args: InfoArgs) -> Result<(), String> {
    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    match args.format {
        OutputFormat::Text => {
            println!("Configuration Info:");
            println!();
            println!("Inputs: {}", config.input_features.len());
            println!("Output: {}", config.target_name());
            println!(
                "Optimizer: {} (lr={})",
                config.trainer.optimizer.kind, config.trainer.learning_rate
            );
            println!("Epochs: {}", config.trainer.epochs);
            println!("Batch size: {}", config.trainer.batch_size);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<(), String> {
    save_config(&titanic_config(), &args.output).map_err(|e| format!("Config error: {e}"))?;
    info!("Configuration saved to {}", args.output.display());
    Ok(())
}

fn run_deck(args: DeckArgs) -> Result<(), String> {
    vliw_dsp_deck()
        .save(&args.output)
        .map_err(|e| format!("Deck error: {e}"))
}
