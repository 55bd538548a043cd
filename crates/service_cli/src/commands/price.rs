//! Price command implementation
//!
//! Prices a European call and put with the closed-form Black-Scholes model.

use clap::Args;
use pricer_models::analytical::{BlackScholes, PricingResult};
use pricer_models::instruments::OptionType;
use std::io::Write;
use tracing::info;

use super::{fmt_num, open_output, render_table, OptionArgs, OutputFormat};
use crate::Result;

/// Arguments of `bs-pinn price`.
#[derive(Args, Debug)]
pub struct PriceArgs {
    #[command(flatten)]
    pub option: OptionArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

const HEADERS: [&str; 7] = ["Option", "Price", "Delta", "Gamma", "Vega", "Theta", "Rho"];

fn summary_rows(summary: &PricingResult<f64>) -> Vec<Vec<String>> {
    [OptionType::Call, OptionType::Put]
        .into_iter()
        .map(|kind| {
            let mut row = vec![kind.to_string(), fmt_num(summary.price(kind))];
            row.extend(summary.greeks(kind).values().into_iter().map(fmt_num));
            row
        })
        .collect()
}

/// Run the price command
pub fn run(args: &PriceArgs) -> Result<()> {
    let params = args.option.to_params()?;
    info!(
        spot = params.spot(),
        strike = params.strike(),
        expiry = params.expiry(),
        rate = params.rate(),
        volatility = params.volatility(),
        "pricing European options"
    );

    let summary = BlackScholes::from_params(&params)?.summary()?;
    let mut out = open_output(None)?;

    match args.format {
        OutputFormat::Table => {
            write!(out, "{}", render_table(&HEADERS, &summary_rows(&summary)))?;
            writeln!(out, "Put-call parity residual: {:.3e}", summary.parity_residual)?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &summary)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(HEADERS.iter().map(|h| h.to_lowercase()))?;
            for row in summary_rows(&summary) {
                writer.write_record(&row)?;
            }
            writer.flush()?;
            return Ok(());
        }
    }

    out.flush()?;
    info!(
        call = summary.call_price,
        put = summary.put_price,
        delta_call = summary.call_greeks.delta,
        "pricing complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_models::analytical::Greeks;

    #[test]
    fn test_summary_rows_reference_scenario() {
        let summary = BlackScholes::new(100.0, 100.0, 1.0, 0.05, 0.2)
            .unwrap()
            .summary()
            .unwrap();
        let rows = summary_rows(&summary);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "call");
        assert_eq!(rows[1][0], "put");
        assert!(rows[0][1].starts_with("10.450"));
        assert!(rows[1][1].starts_with("5.573"));
        assert!(rows.iter().all(|r| r.len() == HEADERS.len()));
    }

    #[test]
    fn test_header_order_matches_greeks() {
        let names: Vec<String> = HEADERS[2..].iter().map(|h| h.to_lowercase()).collect();
        assert_eq!(names, Greeks::<f64>::NAMES);
    }
}
