use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use enpap_core::calculations::RegimeParameters;
use enpap_data::{ParameterLoader, ParameterTable};

/// Validate an ENPAP parameters CSV file and print a per-year summary.
///
/// The CSV file should have the following columns:
/// - year: the regime year (e.g. 2025)
/// - integrative_rate_private: surcharge rate on private invoices (e.g. 0.02)
/// - integrative_rate_public: surcharge rate on PA invoices (e.g. 0.04)
/// - min_integrative: annual floor for the integrative contribution
/// - min_subjective: annual floor for the subjective contribution
/// - maternity_fee: fixed annual fee (empty for years without one)
/// - montante_integrative_share: pension-accrual share of the private surcharge
#[derive(Parser, Debug)]
#[command(name = "enpap-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing ENPAP parameter sets
    #[arg(short, long)]
    file: PathBuf,

    /// Only check that this regime year is present
    #[arg(short, long)]
    year: Option<i32>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = ParameterLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let table = ParameterTable::from_records(records)
        .with_context(|| format!("Invalid parameter data in: {}", args.file.display()))?;

    if let Some(year) = args.year {
        let Some(params) = table.get(year) else {
            bail!("No parameter set for year {year}");
        };
        print_summary(params);
        return Ok(());
    }

    for params in table.iter() {
        print_summary(params);
    }

    println!("All {} parameter sets are valid.", table.len());

    Ok(())
}

fn print_summary(params: &RegimeParameters) {
    let maternity = params
        .maternity_fee
        .map(|fee| fee.to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{}: integrative {}/{} (min {}), subjective min {}, maternity {}, montante share {}",
        params.year,
        params.integrative_rate_private,
        params.integrative_rate_public,
        params.min_integrative,
        params.min_subjective,
        maternity,
        params.montante_integrative_share,
    );
}
