//! logo-eval CLI: score logo detections and prepare ground truth.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use log::error;
use logo_eval::convert::{convert_labels, write_label_table};
use logo_eval::detector::{Detector, EmptyDetector, PredictionTableDetector};
use logo_eval::evaluator::{evaluate_from_paths, EvaluationConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "logo-eval")]
#[command(about = "Evaluate logo detections against ground-truth boxes (precision, recall, F1 at an IoU threshold)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score detections against a ground-truth table.
    Evaluate(CliEvaluateArgs),

    /// Convert YOLO label files into a ground-truth table.
    Convert(CliConvertArgs),
}

#[derive(Debug, Clone, Args)]
struct CliEvaluateArgs {
    /// Directory with the validation images.
    #[arg(long, default_value = "data/validation/images")]
    images_dir: PathBuf,

    /// Ground-truth CSV table (filename,x_min,y_min,x_max,y_max).
    #[arg(long, default_value = "data/validation/labels.csv")]
    labels_path: PathBuf,

    /// Precomputed detections in the same CSV layout. Without it every image
    /// is scored with no predictions.
    #[arg(long)]
    predictions_path: Option<PathBuf>,

    /// Minimum IoU for a prediction to count as a true positive.
    #[arg(long, default_value_t = 0.5)]
    iou_threshold: f64,

    /// Save images with ground truth (green) and predictions (red) drawn on.
    #[arg(long)]
    draw_results: bool,

    /// Directory for rendered overlays.
    #[arg(long, default_value = "validation_results")]
    output_dir: PathBuf,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct CliConvertArgs {
    /// Directory with YOLO `.txt` label files.
    #[arg(long, default_value = "data/validation/labels")]
    labels_dir: PathBuf,

    /// Directory with the images the labels describe.
    #[arg(long, default_value = "data/validation/images")]
    images_dir: PathBuf,

    /// Output CSV table.
    #[arg(long, default_value = "data/validation/labels.csv")]
    output: PathBuf,
}

impl CliEvaluateArgs {
    fn to_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            images_dir: self.images_dir.clone(),
            labels_path: self.labels_path.clone(),
            iou_threshold: self.iou_threshold,
            draw_results: self.draw_results,
            output_dir: self.output_dir.clone(),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Evaluate(args) => run_evaluate(&args),
        Commands::Convert(args) => run_convert(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_evaluate(args: &CliEvaluateArgs) -> CliResult<()> {
    let config = args.to_config();
    config.validate()?;

    match &args.predictions_path {
        Some(path) => {
            let detector = PredictionTableDetector::load(path)?;
            report(config, detector, args.json)
        }
        None => report(config, EmptyDetector, args.json),
    }
}

fn report<D: Detector>(config: EvaluationConfig, detector: D, json: bool) -> CliResult<()> {
    let report = evaluate_from_paths(config, detector)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn run_convert(args: &CliConvertArgs) -> CliResult<()> {
    let rows = convert_labels(&args.labels_dir, &args.images_dir)?;
    write_label_table(&rows, &args.output)?;
    println!("Wrote {} boxes to {}", rows.len(), args.output.display());
    Ok(())
}
