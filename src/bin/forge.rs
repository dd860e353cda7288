//! forge - baseline classification CLI
//!
//! Profile a CSV dataset, suggest columns to drop, estimate training time
//! and write the train/test matrices for a run.

use clap::{Parser, Subcommand, ValueEnum};
use forge_baselines::config::Settings;
use forge_baselines::data::{ColumnConfig, ConfigSource, Table};
use forge_baselines::error::Result;
use forge_baselines::estimate::estimate_runtime;
use forge_baselines::experiment::{prepare_experiment, write_experiment, ExperimentRunRequest};
use forge_baselines::models::ModelKind;
use forge_baselines::profile::{profile_dataset, suggest_column_config};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Baseline classification toolkit
#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile a CSV dataset
    Profile {
        /// Path to dataset CSV
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Suggest columns to ignore for a target
    Suggest {
        /// Path to dataset CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Target column
        #[arg(short, long)]
        target: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Estimate training runtime for a set of models
    Estimate {
        /// Path to dataset CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Comma-separated model names (default: all registered models)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Preprocess a dataset and write train/test artifacts
    Prepare {
        /// Path to dataset CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Target column
        #[arg(short, long)]
        target: String,

        /// Comma-separated model names (default: all registered models)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        /// Fraction of rows held out for testing (default from settings)
        #[arg(long)]
        test_size: Option<f64>,

        /// Columns to ignore
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,

        /// Columns to keep as features (default: all remaining)
        #[arg(long, value_delimiter = ',')]
        features: Vec<String>,

        /// Apply the suggested column config when none is given
        #[arg(long)]
        auto_config: bool,

        /// Output directory (default: <data_path>/experiments/<dataset>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write an example settings file
    ExampleConfig {
        /// Output path for the settings YAML
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(&settings);

    let result = match cli.command {
        Commands::Profile { data, format } => cmd_profile(&data, format),
        Commands::Suggest {
            data,
            target,
            format,
        } => cmd_suggest(&data, &target, format),
        Commands::Estimate {
            data,
            models,
            format,
        } => cmd_estimate(&data, &models, format),
        Commands::Prepare {
            data,
            target,
            models,
            test_size,
            ignore,
            features,
            auto_config,
            output,
        } => cmd_prepare(
            &settings,
            &data,
            &target,
            &models,
            test_size,
            &ignore,
            &features,
            auto_config,
            output.as_deref(),
        ),
        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn emit<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}

fn model_names_or_all(models: &[String]) -> Vec<String> {
    if models.is_empty() {
        ModelKind::ALL.iter().map(|m| m.name().to_string()).collect()
    } else {
        models.to_vec()
    }
}

fn load_table(path: &Path) -> Result<Table> {
    eprintln!("Loading {}...", path.display());
    Table::from_csv(path)
}

fn cmd_profile(data: &Path, format: OutputFormat) -> Result<()> {
    let table = load_table(data)?;
    emit(&profile_dataset(&table), format)
}

fn cmd_suggest(data: &Path, target: &str, format: OutputFormat) -> Result<()> {
    let table = load_table(data)?;
    table.column(target)?;
    let profile = profile_dataset(&table);
    emit(&suggest_column_config(&profile, target), format)
}

fn cmd_estimate(data: &Path, models: &[String], format: OutputFormat) -> Result<()> {
    let models = model_names_or_all(models);
    for name in &models {
        name.parse::<ModelKind>()?;
    }
    let table = load_table(data)?;
    let profile = profile_dataset(&table);
    emit(&estimate_runtime(&profile, &models), format)
}

#[allow(clippy::too_many_arguments)]
fn cmd_prepare(
    settings: &Settings,
    data: &Path,
    target: &str,
    models: &[String],
    test_size: Option<f64>,
    ignore: &[String],
    features: &[String],
    auto_config: bool,
    output: Option<&Path>,
) -> Result<()> {
    let table = load_table(data)?;
    let dataset_id = data
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    let column_config = if !ignore.is_empty() || !features.is_empty() {
        Some(ColumnConfig::new(
            ignore.to_vec(),
            features.to_vec(),
            ConfigSource::User,
        )?)
    } else if auto_config {
        table.column(target)?;
        let suggestion = suggest_column_config(&profile_dataset(&table), target);
        eprint!("{}", suggestion);
        Some(suggestion.column_config)
    } else {
        None
    };

    let mut request = ExperimentRunRequest::new(&dataset_id, target, &model_names_or_all(models))
        .with_test_size(test_size.unwrap_or(settings.default_test_size));
    if let Some(config) = column_config {
        request = request.with_column_config(config);
    }

    let prepared = prepare_experiment(&table, &request, settings.split_seed)?;
    let out_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| settings.data_path.join("experiments").join(&dataset_id));
    let paths = write_experiment(&out_dir, &prepared)?;

    print!("{}", prepared.estimate);
    let matrices = &prepared.data.matrices;
    println!();
    println!("Train rows:  {}", matrices.x_train.nrows());
    println!("Test rows:   {}", matrices.x_test.nrows());
    println!("Features:    {}", matrices.n_features());
    println!("Classes:     {}", matrices.label_classes.join(", "));
    println!("Artifacts:   {}", paths.dir.display());
    Ok(())
}

fn cmd_example_config(output: &Path) -> Result<()> {
    let yaml = Settings::default().to_yaml()?;
    std::fs::write(output, &yaml)?;
    eprintln!("Wrote example settings to {}", output.display());
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);
    Ok(())
}
