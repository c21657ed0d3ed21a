//! Integration tests wiring loaded parameter sets into the calculation engine.

use enpap_core::IncomeStreams;
use enpap_core::calculations::{NetIncomeWorksheet, NetIncomeWorksheetInput};
use enpap_data::{ParameterLoader, ParameterTable};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const PARAMETERS_CSV: &str = include_str!("../test-data/enpap_parameters.csv");

fn load_table() -> ParameterTable {
    let records =
        ParameterLoader::parse(PARAMETERS_CSV.as_bytes()).expect("Failed to parse CSV");
    ParameterTable::from_records(records).expect("Failed to build table")
}

#[test]
fn test_load_all_parameter_sets() {
    let table = load_table();

    assert_eq!(table.len(), 3);
    let years: Vec<_> = table.years().collect();
    assert_eq!(years, vec![2023, 2024, 2025]);
}

#[test]
fn test_pre_maternity_year_has_no_fee() {
    let table = load_table();

    let params = table.get(2023).expect("2023 should be loaded");

    assert_eq!(params.maternity_fee, None);
    assert_eq!(params.integrative_rate_private, dec!(0.02));
    assert_eq!(params.integrative_rate_public, dec!(0.04));
    assert_eq!(params.min_integrative, dec!(66));
    assert_eq!(params.min_subjective, dec!(856));
}

#[test]
fn test_loaded_parameters_drive_single_stream_worksheet() {
    let table = load_table();
    let params = table.get(2023).expect("2023 should be loaded");

    let worksheet = NetIncomeWorksheet::new(params.clone());
    let result = worksheet
        .calculate(&NetIncomeWorksheetInput {
            streams: IncomeStreams::Single {
                gross_receipts: dec!(52000.00),
            },
            fixed_expenses: dec!(0.00),
            subjective_rate_pct: dec!(10),
            substitute_tax_rate: dec!(0.15),
            profitability_coefficient: dec!(0.78),
        })
        .expect("Calculation should succeed");

    assert_eq!(result.base_compensation, dec!(50980.39));
    assert_eq!(result.integrative_contribution, dec!(1019.61));
    assert_eq!(result.subjective_contribution, dec!(3976.47));
    assert_eq!(result.maternity_fee, dec!(0.00));
    assert_eq!(result.total_contributions, dec!(4996.08));
    assert_eq!(result.substitute_tax, dec!(5368.23));
    assert_eq!(result.net_annual_before_expenses, dec!(41635.69));
    assert_eq!(result.net_monthly_before_expenses, dec!(3469.64));
}

#[test]
fn test_loaded_parameters_drive_split_stream_worksheet() {
    let table = load_table();
    let params = table.get(2025).expect("2025 should be loaded");

    let worksheet = NetIncomeWorksheet::new(params.clone());
    let result = worksheet
        .calculate(&NetIncomeWorksheetInput {
            streams: IncomeStreams::Split {
                private_receipts: dec!(30600.00),
                public_receipts: dec!(20800.00),
            },
            fixed_expenses: dec!(0.00),
            subjective_rate_pct: dec!(10),
            substitute_tax_rate: dec!(0.15),
            profitability_coefficient: dec!(0.78),
        })
        .expect("Calculation should succeed");

    assert_eq!(result.base_compensation, dec!(50000.00));
    assert_eq!(result.integrative_contribution, dec!(1400.00));
    assert_eq!(result.maternity_fee, dec!(91.00));
    assert_eq!(result.total_contributions, dec!(5391.00));
    assert_eq!(result.pension_accrual_contribution, Some(dec!(4200.00)));
}

#[test]
fn test_loaded_years_produce_different_totals_when_fee_changes() {
    let table = load_table();
    let input = NetIncomeWorksheetInput {
        streams: IncomeStreams::Single {
            gross_receipts: dec!(52000.00),
        },
        fixed_expenses: dec!(0.00),
        subjective_rate_pct: dec!(10),
        substitute_tax_rate: dec!(0.15),
        profitability_coefficient: dec!(0.78),
    };

    let without_fee = NetIncomeWorksheet::new(table.get(2023).unwrap().clone())
        .calculate(&input)
        .unwrap();
    let with_fee = NetIncomeWorksheet::new(table.get(2024).unwrap().clone())
        .calculate(&input)
        .unwrap();

    assert_eq!(
        with_fee.total_contributions - without_fee.total_contributions,
        dec!(91.00)
    );
}
