//! CLI command implementations
//!
//! Shared option arguments and output helpers live here; each command has
//! its own module.

pub mod greeks;
pub mod price;
pub mod surface;
pub mod train;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::{Args, ValueEnum};
use pricer_models::instruments::OptionParameters;

use crate::Result;

/// Strike, rate and volatility shared by every command.
#[derive(Args, Debug, Clone)]
pub struct MarketArgs {
    /// Strike price K
    #[arg(short = 'k', long, default_value_t = 100.0)]
    pub strike: f64,

    /// Continuously compounded risk-free rate r
    #[arg(short = 'r', long, default_value_t = 0.05, allow_negative_numbers = true)]
    pub rate: f64,

    /// Volatility σ
    #[arg(short = 's', long, visible_alias = "vol", default_value_t = 0.2)]
    pub volatility: f64,
}

/// A single option: market inputs plus spot and expiry.
#[derive(Args, Debug, Clone)]
pub struct OptionArgs {
    /// Spot price S
    #[arg(long, default_value_t = 100.0)]
    pub spot: f64,

    /// Time to expiry T in years
    #[arg(short = 't', long, default_value_t = 1.0)]
    pub expiry: f64,

    #[command(flatten)]
    pub market: MarketArgs,
}

impl OptionArgs {
    /// Validated option parameters.
    pub fn to_params(&self) -> Result<OptionParameters<f64>> {
        Ok(OptionParameters::new(
            self.spot,
            self.market.strike,
            self.expiry,
            self.market.rate,
            self.market.volatility,
        )?)
    }
}

/// Output format for tabular results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

/// Buffered writer to `path`, or to stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Renders rows as a box-drawn table, right-aligning every column but the
/// first.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}\n", left, segments.join(mid), right)
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                if i == 0 {
                    format!(" {:<w$} ", cell, w = w)
                } else {
                    format!(" {:>w$} ", cell, w = w)
                }
            })
            .collect();
        format!("│{}│\n", padded.join("│"))
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = rule("┌", "┬", "┐");
    out.push_str(&line(&header_cells));
    out.push_str(&rule("├", "┼", "┤"));
    for row in rows {
        out.push_str(&line(row));
    }
    out.push_str(&rule("└", "┴", "┘"));
    out
}

/// Fixed-precision number formatting for tables.
pub fn fmt_num(value: f64) -> String {
    format!("{:.6}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_alignment() {
        let table = render_table(
            &["Name", "Value"],
            &[
                vec!["call".to_string(), "10.450584".to_string()],
                vec!["put".to_string(), "5.573526".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "│ Name │     Value │");
        assert_eq!(lines[4], "│ put  │  5.573526 │");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_option_args_validation() {
        let args = OptionArgs {
            spot: -1.0,
            expiry: 1.0,
            market: MarketArgs {
                strike: 100.0,
                rate: 0.05,
                volatility: 0.2,
            },
        };
        assert!(args.to_params().is_err());
    }
}
