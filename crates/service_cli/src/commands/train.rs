//! Train command implementation
//!
//! Runs the PINN training loop on a blocking worker thread, relays its
//! progress over a channel, then compares the trained surface with the
//! closed-form price at t = 0.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use pricer_models::analytical::{linspace, BlackScholes};
use pricer_models::instruments::OptionType;
use pricer_pinn::optimiser::OptimiserKind;
use pricer_pinn::training::{CancellationToken, PinnTrainer, TrainingConfig, TrainingHistory, TrainingRecord};
use pricer_pinn::{compare_with_analytic, ComparisonReport, PinnGreeks, PinnProblem, TrainedPinn};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{fmt_num, open_output, render_table, OptionArgs};
use crate::config::{CliConfig, TrainingOverrides};
use crate::Result;

/// Arguments of `bs-pinn train`.
///
/// `--spot` selects the point reported after training.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub option: OptionArgs,

    /// Number of training epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Optimiser step size
    #[arg(short, long)]
    pub learning_rate: Option<f64>,

    /// Layer widths, comma separated (e.g. 2,50,50,50,1)
    #[arg(long, value_delimiter = ',')]
    pub layers: Option<Vec<usize>>,

    /// Seed for initialisation and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optimiser (adam or gradient_descent)
    #[arg(long)]
    pub optimiser: Option<OptimiserKind>,

    /// Interior collocation points
    #[arg(long)]
    pub n_collocation: Option<usize>,

    /// Points in each terminal and boundary set
    #[arg(long)]
    pub n_boundary: Option<usize>,

    /// Spot points in the t = 0 comparison with the analytic price
    #[arg(long, default_value_t = 41)]
    pub compare_points: usize,

    /// Training history CSV file
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Result JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl TrainArgs {
    /// Training settings given on the command line.
    pub fn overrides(&self) -> TrainingOverrides {
        TrainingOverrides {
            layers: self.layers.clone(),
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            seed: self.seed,
            optimiser: self.optimiser,
            n_collocation: self.n_collocation,
            n_boundary: self.n_boundary,
        }
    }
}

/// One progress update from the training thread.
#[derive(Debug, Clone, PartialEq)]
struct Progress {
    fraction: f64,
    message: String,
}

/// Everything written to the result JSON.
#[derive(Debug, Serialize)]
struct TrainingReport<'a> {
    problem: &'a PinnProblem,
    config: &'a TrainingConfig,
    training_seconds: f64,
    final_loss: Option<&'a TrainingRecord>,
    spot: f64,
    pinn: PinnGreeks,
    analytic_price: f64,
    analytic_delta: f64,
    comparison: &'a ComparisonReport,
}

/// Writes one CSV row per history record.
pub fn write_history_csv<W: Write>(history: &TrainingHistory, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in history.records() {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Explicit path, else `file_name` under the configured output directory.
fn output_path(explicit: Option<&Path>, directory: Option<&Path>, file_name: &str) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| directory.map(|dir| dir.join(file_name)))
}

/// Trains on a blocking thread, printing progress as it arrives.
///
/// Ctrl-C requests cancellation, which takes effect before the next epoch.
async fn train_with_progress(trainer: PinnTrainer) -> Result<TrainedPinn> {
    let token = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();

    let worker_token = token.clone();
    let worker = tokio::task::spawn_blocking(move || {
        let mut sink = worker_token.attach(move |fraction: f64, message: &str| {
            // A closed receiver only means nobody is listening any more.
            let _ = tx.send(Progress {
                fraction,
                message: message.to_string(),
            });
        });
        trainer.train(&mut sink)
    });

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Some(progress) => println!("[{:>5.1}%] {}", progress.fraction * 100.0, progress.message),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !token.is_cancelled() => {
                warn!("interrupt received, stopping after the current epoch");
                token.cancel();
            }
        }
    }

    Ok(worker.await??)
}

fn summary_rows(model: &TrainedPinn, report: &TrainingReport<'_>) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["PINN price".to_string(), fmt_num(report.pinn.value)],
        vec!["Analytic price".to_string(), fmt_num(report.analytic_price)],
        vec![
            "Absolute error".to_string(),
            fmt_num((report.pinn.value - report.analytic_price).abs()),
        ],
        vec!["PINN delta".to_string(), fmt_num(report.pinn.delta)],
        vec!["Analytic delta".to_string(), fmt_num(report.analytic_delta)],
        vec!["PINN gamma".to_string(), fmt_num(report.pinn.gamma)],
        vec!["Max abs error (t=0)".to_string(), fmt_num(report.comparison.max_abs_error)],
        vec!["Mean abs error (t=0)".to_string(), fmt_num(report.comparison.mean_abs_error)],
        vec!["RMSE (t=0)".to_string(), fmt_num(report.comparison.rmse)],
        vec![
            "Training time (s)".to_string(),
            format!("{:.2}", model.training_time().as_secs_f64()),
        ],
    ];
    if let Some(last) = report.final_loss {
        rows.push(vec![format!("Loss (epoch {})", last.epoch), format!("{:.6e}", last.total)]);
    }
    rows
}

/// Run the train command
pub async fn run(args: TrainArgs, config: &CliConfig) -> Result<()> {
    let training = config.training_config(&args.overrides())?;
    let params = args.option.to_params()?;

    info!(
        layers = ?training.architecture().layers(),
        epochs = training.epochs(),
        learning_rate = training.learning_rate(),
        optimiser = %training.optimiser(),
        seed = training.seed(),
        "starting PINN training"
    );

    let trainer = PinnTrainer::new(
        params.strike(),
        params.expiry(),
        params.rate(),
        params.volatility(),
        training,
    )?;
    let model = train_with_progress(trainer).await?;

    let problem = *model.problem();
    let spots = linspace(0.5 * problem.strike(), 1.5 * problem.strike(), args.compare_points)?;
    let comparison = compare_with_analytic(&model, &spots, 0.0)?;

    let analytic = BlackScholes::from_params(&params)?;
    let report = TrainingReport {
        problem: &problem,
        config: model.config(),
        training_seconds: model.training_time().as_secs_f64(),
        final_loss: model.history().last(),
        spot: params.spot(),
        pinn: model.point_greeks(params.spot(), 0.0),
        analytic_price: analytic.price(OptionType::Call)?,
        analytic_delta: analytic.delta(OptionType::Call),
        comparison: &comparison,
    };

    let mut stdout = open_output(None)?;
    write!(stdout, "{}", render_table(&["Metric", "Value"], &summary_rows(&model, &report)))?;
    stdout.flush()?;

    let directory = config.output.directory.as_deref();
    if let Some(path) = output_path(args.history.as_deref(), directory, "history.csv") {
        write_history_csv(model.history(), open_output(Some(path.as_path()))?)?;
        info!(path = %path.display(), records = model.history().len(), "history written");
    }
    if let Some(path) = output_path(args.output.as_deref(), directory, "training.json") {
        let mut out = open_output(Some(path.as_path()))?;
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
        out.flush()?;
        info!(path = %path.display(), "result written");
    }

    Ok(())
}
