//! Greeks command implementation

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use pricer_models::analytical::{greek_profile, linspace, price_surface};
use pricer_models::instruments::OptionType;
use serde::Serialize;
use tracing::info;

use super::{fmt_num, open_output, render_table, OptionArgs, OutputFormat};
use crate::Result;

/// Arguments of `bs-pinn greeks`.
///
/// `--spot` is ignored; the spot grid comes from `--spot-min`, `--spot-max`
/// and `--points`.
#[derive(Args, Debug)]
pub struct GreeksArgs {
    #[command(flatten)]
    pub option: OptionArgs,

    /// Option type (call or put)
    #[arg(long = "type", default_value = "call")]
    pub option_type: OptionType,

    /// Lowest spot on the grid
    #[arg(long, default_value_t = 50.0)]
    pub spot_min: f64,

    /// Highest spot on the grid
    #[arg(long, default_value_t = 150.0)]
    pub spot_max: f64,

    /// Number of spot points
    #[arg(short = 'n', long, default_value_t = 11)]
    pub points: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// One spot of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GreekRow {
    pub spot: f64,
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

/// Prices and greeks of `kind` at each spot.
pub fn profile_rows(args: &GreeksArgs) -> Result<Vec<GreekRow>> {
    let params = args.option.to_params()?;
    let spots = linspace(args.spot_min, args.spot_max, args.points)?;

    let greeks = greek_profile(&params, &spots, args.option_type)?;
    let prices = price_surface(&params, &spots, &[params.expiry()], args.option_type)?;

    Ok(spots
        .iter()
        .zip(&prices.values[0])
        .zip(&greeks)
        .map(|((&spot, &price), g)| GreekRow {
            spot,
            price,
            delta: g.delta,
            gamma: g.gamma,
            vega: g.vega,
            theta: g.theta,
            rho: g.rho,
        })
        .collect())
}

/// Run the greeks command
pub fn run(args: &GreeksArgs) -> Result<()> {
    info!(kind = %args.option_type, points = args.points, "computing greek profile");
    let rows = profile_rows(args)?;
    let mut out = open_output(args.output.as_deref())?;

    match args.format {
        OutputFormat::Table => {
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    [r.spot, r.price, r.delta, r.gamma, r.vega, r.theta, r.rho]
                        .into_iter()
                        .map(fmt_num)
                        .collect()
                })
                .collect();
            let headers = ["Spot", "Price", "Delta", "Gamma", "Vega", "Theta", "Rho"];
            write!(out, "{}", render_table(&headers, &cells))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
