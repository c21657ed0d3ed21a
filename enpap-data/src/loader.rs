use std::collections::BTreeMap;
use std::io::Read;

use enpap_core::calculations::{INTEGRATIVE_DEDUCTIBLE, NetIncomeWorksheetError, RegimeParameters};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading ENPAP parameter data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("invalid parameters for year {year}: {source}")]
    InvalidParameters {
        year: i32,
        #[source]
        source: NetIncomeWorksheetError,
    },

    #[error("duplicate parameter set for year {0}")]
    DuplicateYear(i32),
}

impl From<csv::Error> for ParameterLoaderError {
    fn from(err: csv::Error) -> Self {
        ParameterLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the ENPAP parameters CSV file.
///
/// The CSV format carries one row per regime year:
/// - `year`: the regime year the values apply to (e.g. 2025)
/// - `integrative_rate_private`: surcharge rate on private invoices (e.g. 0.02)
/// - `integrative_rate_public`: surcharge rate on PA invoices (e.g. 0.04)
/// - `min_integrative`: annual floor for the integrative contribution
/// - `min_subjective`: annual floor for the subjective contribution
/// - `maternity_fee`: fixed annual fee (empty for years without one)
/// - `montante_integrative_share`: fraction of the private integrative
///   contribution credited to the pension accrual (e.g. 0.50)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegimeParameterRecord {
    pub year: i32,
    pub integrative_rate_private: Decimal,
    pub integrative_rate_public: Decimal,
    pub min_integrative: Decimal,
    pub min_subjective: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub maternity_fee: Option<Decimal>,
    pub montante_integrative_share: Decimal,
}

impl RegimeParameterRecord {
    /// Converts the record into a [`RegimeParameters`] set.
    ///
    /// The deductible-integrative flag is not a CSV column: fund policy fixes
    /// it, so every loaded set carries [`INTEGRATIVE_DEDUCTIBLE`].
    pub fn into_parameters(self) -> RegimeParameters {
        RegimeParameters {
            year: self.year,
            integrative_rate_private: self.integrative_rate_private,
            integrative_rate_public: self.integrative_rate_public,
            min_integrative: self.min_integrative,
            min_subjective: self.min_subjective,
            maternity_fee: self.maternity_fee,
            integrative_deductible: INTEGRATIVE_DEDUCTIBLE,
            montante_integrative_share: self.montante_integrative_share,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for ENPAP parameter data from CSV files.
///
/// The loader reads year-versioned parameter rows; [`ParameterTable`] turns
/// them into validated, per-year [`RegimeParameters`] sets.
pub struct ParameterLoader;

impl ParameterLoader {
    /// Parse parameter records from a CSV reader.
    ///
    /// Returns the parsed records in file order. The reader can be any type
    /// that implements `Read`, such as a file or a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<RegimeParameterRecord>, ParameterLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: RegimeParameterRecord = result?;
            records.push(record);
        }

        Ok(records)
    }
}

/// In-memory table of validated parameter sets, keyed by regime year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterTable {
    by_year: BTreeMap<i32, RegimeParameters>,
}

impl ParameterTable {
    /// Builds a table from parsed records.
    ///
    /// Every record is validated as a [`RegimeParameters`] set before it is
    /// admitted, and each year may appear at most once.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterLoaderError::InvalidParameters`] for a record whose
    /// values fail validation, or [`ParameterLoaderError::DuplicateYear`]
    /// when two records carry the same year.
    pub fn from_records(
        records: Vec<RegimeParameterRecord>,
    ) -> Result<Self, ParameterLoaderError> {
        let mut by_year = BTreeMap::new();

        for record in records {
            let year = record.year;
            let params = record.into_parameters();

            params
                .validate()
                .map_err(|source| ParameterLoaderError::InvalidParameters { year, source })?;

            if by_year.insert(year, params).is_some() {
                return Err(ParameterLoaderError::DuplicateYear(year));
            }
        }

        Ok(Self { by_year })
    }

    /// Returns the parameter set for the given regime year, if loaded.
    pub fn get(&self, year: i32) -> Option<&RegimeParameters> {
        self.by_year.get(&year)
    }

    /// Returns the loaded years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    /// Returns all loaded parameter sets in year order.
    pub fn iter(&self) -> impl Iterator<Item = &RegimeParameters> {
        self.by_year.values()
    }

    pub fn len(&self) -> usize {
        self.by_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share
2023,0.02,0.04,66,856,,0.50
2024,0.02,0.04,66,856,91,0.50
2025,0.02,0.04,66,856,91,0.50
"#;

    #[test]
    fn test_parse_csv_single_record() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2025,0.02,0.04,66,856,91,0.50";

        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            RegimeParameterRecord {
                year: 2025,
                integrative_rate_private: dec!(0.02),
                integrative_rate_public: dec!(0.04),
                min_integrative: dec!(66),
                min_subjective: dec!(856),
                maternity_fee: Some(dec!(91)),
                montante_integrative_share: dec!(0.50),
            }
        );
    }

    #[test]
    fn test_parse_csv_empty_maternity_fee() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2023,0.02,0.04,66,856,,0.50";

        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].maternity_fee, None);
    }

    #[test]
    fn test_parse_csv_all_years() {
        let records = ParameterLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 3);
        let years: Vec<_> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2023, 2024, 2025]);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "year,integrative_rate_private\n2025,0.02";

        let result = ParameterLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let ParameterLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2025,abc,0.04,66,856,91,0.50";

        let result = ParameterLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for invalid decimal");
        assert!(matches!(err, ParameterLoaderError::CsvParse(_)));
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n";

        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }

    #[test]
    fn test_into_parameters_applies_deductible_policy() {
        let records = ParameterLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let params = records[0].clone().into_parameters();

        assert_eq!(params.integrative_deductible, INTEGRATIVE_DEDUCTIBLE);
        assert!(!params.integrative_deductible);
    }

    #[test]
    fn test_table_lookup_by_year() {
        let records = ParameterLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let table = ParameterTable::from_records(records).expect("Failed to build table");

        assert_eq!(table.len(), 3);
        let params_2023 = table.get(2023).expect("2023 should be loaded");
        assert_eq!(params_2023.maternity_fee, None);
        let params_2025 = table.get(2025).expect("2025 should be loaded");
        assert_eq!(params_2025.maternity_fee, Some(dec!(91)));
        assert_eq!(table.get(2020), None);
    }

    #[test]
    fn test_table_years_are_sorted() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2025,0.02,0.04,66,856,91,0.50\n2023,0.02,0.04,66,856,,0.50";
        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let table = ParameterTable::from_records(records).expect("Failed to build table");

        let years: Vec<_> = table.years().collect();
        assert_eq!(years, vec![2023, 2025]);
    }

    #[test]
    fn test_table_rejects_duplicate_year() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2025,0.02,0.04,66,856,91,0.50\n2025,0.02,0.04,66,856,91,0.50";
        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = ParameterTable::from_records(records);

        assert_eq!(result, Err(ParameterLoaderError::DuplicateYear(2025)));
    }

    #[test]
    fn test_table_rejects_invalid_parameter_values() {
        let csv = "year,integrative_rate_private,integrative_rate_public,min_integrative,min_subjective,maternity_fee,montante_integrative_share\n2025,1.5,0.04,66,856,91,0.50";
        let records = ParameterLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = ParameterTable::from_records(records);

        assert_eq!(
            result,
            Err(ParameterLoaderError::InvalidParameters {
                year: 2025,
                source: NetIncomeWorksheetError::InvalidPrivateIntegrativeRate(dec!(1.5)),
            })
        );
    }
}
