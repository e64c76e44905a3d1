//! Render a forecast report PDF from the latest stored model.

use std::path::PathBuf;

use salescast::config;
use salescast::forecast::{ModelStore, Predictor, local_now};
use salescast::logging;
use salescast::report::{build_report, report_name_at, report_path};

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
    let out_dir = match options.out_dir {
        Some(dir) => dir,
        None => settings.resolved_reports_dir().map_err(|err| err.to_string())?,
    };
    let name = match options.name {
        Some(name) => name,
        None => report_name_at(local_now()).map_err(|err| err.to_string())?,
    };

    let predictor = Predictor::new(ModelStore::new(models_dir), data_path);
    let output_path = report_path(&out_dir, &name);
    build_report(&output_path, &name, &predictor).map_err(|err| err.to_string())?;
    println!("{}", output_path.display());
    Ok(())
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    data: Option<PathBuf>,
    models_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    name: Option<String>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        if matches!(flag, "-h" | "--help") {
            return Err(help_text());
        }
        let slot = match flag {
            "--data" | "--models" | "--out-dir" | "--name" => flag,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        };
        idx += 1;
        let value = args
            .get(idx)
            .ok_or_else(|| format!("{slot} requires a value"))?
            .clone();
        match slot {
            "--data" => options.data = Some(PathBuf::from(value)),
            "--models" => options.models_dir = Some(PathBuf::from(value)),
            "--out-dir" => options.out_dir = Some(PathBuf::from(value)),
            _ => {
                if value.contains(['/', '\\']) {
                    return Err(format!("Invalid --name value: {value}"));
                }
                options.name = Some(value);
            }
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "salescast-report",
        "",
        "Write a forecast report PDF using the newest stored model.",
        "",
        "Usage:",
        "  salescast-report [--data <csv>] [--models <dir>] [--out-dir <dir>] [--name <name>]",
        "",
        "The default name is Quarterly_Sales_Forecast_<timestamp>.",
    ]
    .join("\n")
}
