//! Train a sales forecast model from a CSV history and store it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use salescast::config;
use salescast::dataset::{Column, load_features};
use salescast::forecast::{ModelStore, Trainer, TrainingJob};
use salescast::logging;

fn main() {
    if let Err(err) = logging::init_cli() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let data_path = options.data.unwrap_or_else(|| settings.data_path.clone());
    let models_dir = match options.models_dir {
        Some(dir) => dir,
        None => settings.resolved_models_dir().map_err(|err| err.to_string())?,
    };

    let mut hyperparameters = settings.default_hyperparameters();
    for (key, value) in &options.overrides {
        hyperparameters.set(key, *value);
    }
    let job = TrainingJob {
        selected_features: options.features,
        algorithm: Default::default(),
        hyperparameters,
    };

    let rows = load_features(&data_path).map_err(|err| err.to_string())?;
    let trainer = Trainer::new(ModelStore::new(models_dir));
    let result = trainer
        .train(&rows, Column::Sales, &job.features(), &job.hyperparameters)
        .map_err(|err| err.to_string())?;

    println!("model id:      {}", result.model_id);
    println!("holdout rmse:  {:.4}", result.rmse);
    println!(
        "rows:          {} train / {} holdout",
        result.train_rows, result.holdout_rows
    );
    let features: Vec<&str> = result.features_used.iter().map(|c| c.as_str()).collect();
    println!("features:      {}", features.join(", "));
    println!("saved to:      {}", result.model_path.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    data: Option<PathBuf>,
    models_dir: Option<PathBuf>,
    features: BTreeSet<Column>,
    overrides: Vec<(String, f64)>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--data" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--data requires a value".to_string())?;
                options.data = Some(PathBuf::from(value));
            }
            "--models" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--models requires a value".to_string())?;
                options.models_dir = Some(PathBuf::from(value));
            }
            "--features" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--features requires a value".to_string())?;
                for name in value.split(',').filter(|name| !name.trim().is_empty()) {
                    let column = name.parse::<Column>().map_err(|err| err.to_string())?;
                    options.features.insert(column);
                }
            }
            flag @ ("--n-estimators" | "--learning-rate" | "--bins" | "--subsample") => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{flag} requires a value"))?;
                let parsed = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid {flag} value: {value}"))?;
                let key = flag.trim_start_matches("--").replace('-', "_");
                options.overrides.push((key, parsed));
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "salescast-train",
        "",
        "Train a gradient-boosted sales model and store it as sales_model_<timestamp>.model.",
        "",
        "Usage:",
        "  salescast-train [--data <csv>] [--models <dir>] [--features <a,b,...>]",
        "                  [--n-estimators <n>] [--learning-rate <f>] [--bins <n>] [--subsample <f>]",
        "",
        "Defaults come from config.toml; an empty feature list uses the default features.",
    ]
    .join("\n")
}
