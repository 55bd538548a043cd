//! Surface command implementation
//!
//! Writes a Black-Scholes price surface as CSV: one row per maturity, one
//! column per spot.

use std::path::PathBuf;

use clap::Args;
use pricer_models::analytical::{linspace, price_surface, PriceSurface};
use pricer_models::instruments::{OptionParameters, OptionType};
use tracing::info;

use super::{open_output, MarketArgs};
use crate::Result;

/// Arguments of `bs-pinn surface`.
#[derive(Args, Debug)]
pub struct SurfaceArgs {
    #[command(flatten)]
    pub market: MarketArgs,

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
    #[arg(long, default_value_t = 21)]
    pub spot_points: usize,

    /// Shortest maturity in years
    #[arg(long, default_value_t = 0.1)]
    pub maturity_min: f64,

    /// Longest maturity in years
    #[arg(long, default_value_t = 2.0)]
    pub maturity_max: f64,

    /// Number of maturity points
    #[arg(long, default_value_t = 20)]
    pub maturity_points: usize,

    /// Output CSV file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Writes `surface` as CSV with a `maturity` column followed by one column
/// per spot.
pub fn write_surface_csv<W: std::io::Write>(surface: &PriceSurface, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["maturity".to_string()];
    header.extend(surface.spots.iter().map(|s| s.to_string()));
    csv.write_record(&header)?;

    for (maturity, row) in surface.maturities.iter().zip(&surface.values) {
        let mut record = vec![maturity.to_string()];
        record.extend(row.iter().map(|v| format!("{:.8}", v)));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Run the surface command
pub fn run(args: &SurfaceArgs) -> Result<()> {
    let spots = linspace(args.spot_min, args.spot_max, args.spot_points)?;
    let maturities = linspace(args.maturity_min, args.maturity_max, args.maturity_points)?;

    // Spot and expiry are placeholders, replaced per cell.
    let params = OptionParameters::new(
        args.spot_min,
        args.market.strike,
        args.maturity_min,
        args.market.rate,
        args.market.volatility,
    )?;

    info!(
        kind = %args.option_type,
        spots = spots.len(),
        maturities = maturities.len(),
        "computing price surface"
    );
    let surface = price_surface(&params, &spots, &maturities, args.option_type)?;

    write_surface_csv(&surface, open_output(args.output.as_deref())?)?;
    if let Some(path) = &args.output {
        info!(path = %path.display(), "surface written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_csv_layout() {
        let params = OptionParameters::default();
        let surface = price_surface(&params, &[90.0, 100.0, 110.0], &[0.5, 1.0], OptionType::Call).unwrap();

        let mut buffer = Vec::new();
        write_surface_csv(&surface, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "maturity,90,100,110");
        assert!(lines[1].starts_with("0.5,"));
        assert!(lines[2].starts_with("1,"));
        assert_eq!(lines[2].split(',').count(), 4);
        assert!(lines[2].contains("10.45058"));
    }
}
