//! Reference table loading functionality.
//!
//! This module provides the [`TableLoader`] type for loading a yearly BAH /
//! fair market rent snapshot from a dataset directory.

use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;

use csv::StringRecord;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{CountyFips, DependentStatus, Grade, MhaCode, ZipCode};

use super::types::{DatasetManifest, GradeRates, RateTables, RentSchedule};

const ZIP_HEADERS: &[&str] = &["zipcode", "zip", "postalcode"];
const COUNTY_HEADERS: &[&str] = &["county", "fips", "countyfips", "stcountyfp"];

/// Loads reference tables from a dataset directory.
///
/// # Directory Structure
///
/// ```text
/// data/2023/
/// ├── dataset.yaml               # Metadata and optional overrides
/// ├── zip_mha.txt                # "ZIP MHA", space separated
/// ├── mha_names.txt              # "MHA;Name"
/// ├── bah_with_dependents.txt    # MHA followed by 27 grade rates
/// ├── bah_without_dependents.txt
/// ├── safmr_zip.csv              # ZIP + 1BR..4BR columns
/// ├── zip_county.csv             # zip, county
/// └── fmr_county.csv             # fips + fmr_1..fmr_4 columns
/// ```
///
/// File names can be overridden under `files:` in `dataset.yaml`.
///
/// # Example
///
/// ```no_run
/// use livability_engine::config::TableLoader;
///
/// let tables = TableLoader::load("./data/sample")?;
/// println!("Loaded {} rate year", tables.metadata().year);
/// # Ok::<(), livability_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TableLoader;

impl TableLoader {
    /// Loads every table of the dataset in `path`.
    ///
    /// # Returns
    ///
    /// Returns the tables on success, or an error if:
    /// - `dataset.yaml` or any table file is missing (`ConfigNotFound`)
    /// - the manifest is invalid (`ConfigParseError`)
    /// - a table row has an invalid key or amount (`TableParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<RateTables> {
        let path = path.as_ref();

        let manifest_path = path.join("dataset.yaml");
        let manifest = Self::load_yaml::<DatasetManifest>(&manifest_path)?;
        Self::validate_manifest(&manifest, &manifest_path)?;

        let files = &manifest.files;
        let mut builder = RateTables::builder(manifest.metadata.clone())
            .national_average_rents(manifest.national_average_rents)
            .allowance_proxy_factor(manifest.allowance_proxy_factor);

        for (zip, mha) in Self::read_housing_areas(&path.join(&files.zip_mha))? {
            builder = builder.housing_area(zip, mha);
        }

        for (mha, name) in Self::read_housing_area_names(&path.join(&files.mha_names))? {
            builder = builder.housing_area_name(mha, name);
        }

        let allowance_files = [
            (&files.bah_with_dependents, DependentStatus::WithDependents),
            (&files.bah_without_dependents, DependentStatus::WithoutDependents),
        ];
        for (file, status) in allowance_files {
            for (mha, rates) in Self::read_allowance_rates(&path.join(file))? {
                builder = builder.allowance_rates(mha, status, rates);
            }
        }

        let zip_rents = Self::read_rent_table(&path.join(&files.zip_rents), ZIP_HEADERS, ZipCode::new)?;
        for (zip, rents) in zip_rents {
            builder = builder.zip_rents(zip, rents);
        }

        for (zip, fips) in Self::read_zip_counties(&path.join(&files.zip_county))? {
            builder = builder.zip_county(zip, fips);
        }

        let county_rents =
            Self::read_rent_table(&path.join(&files.county_rents), COUNTY_HEADERS, CountyFips::new)?;
        for (fips, rents) in county_rents {
            builder = builder.county_rents(fips, rents);
        }

        let tables = builder.build();
        let summary = tables.summary();
        info!(
            dataset = %tables.metadata().name,
            year = tables.metadata().year,
            zip_housing_areas = summary.zip_housing_areas,
            housing_areas = summary.housing_areas,
            zip_rents = summary.zip_rents,
            county_rents = summary.county_rents,
            "Reference tables loaded"
        );

        Ok(tables)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_manifest(manifest: &DatasetManifest, path: &Path) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if !manifest.national_average_rents.is_valid() {
            return Err(invalid("national_average_rents must all be positive"));
        }
        if manifest.allowance_proxy_factor <= Decimal::ZERO {
            return Err(invalid("allowance_proxy_factor must be positive"));
        }
        Ok(())
    }

    fn open(path: &Path, delimiter: u8, has_headers: bool) -> EngineResult<csv::Reader<File>> {
        let file = File::open(path).map_err(|_| EngineError::ConfigNotFound {
            path: path.display().to_string(),
        })?;

        Ok(csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(file))
    }

    /// Iterates the records of a reader, converting csv errors into
    /// `TableParseError`s and passing the 1-based line number along.
    fn for_each_record(
        reader: &mut csv::Reader<File>,
        path: &Path,
        mut f: impl FnMut(&StringRecord, u64) -> Result<(), String>,
    ) -> EngineResult<usize> {
        let mut rows = 0;
        for result in reader.records() {
            let record = result.map_err(|e| EngineError::TableParseError {
                path: path.display().to_string(),
                line: e.position().map_or(0, |p| p.line()),
                message: e.to_string(),
            })?;
            let line = record.position().map_or(0, |p| p.line());

            if record.iter().all(str::is_empty) {
                continue;
            }

            f(&record, line).map_err(|message| EngineError::TableParseError {
                path: path.display().to_string(),
                line,
                message,
            })?;
            rows += 1;
        }

        debug!(path = %path.display(), rows, "Table read");
        Ok(rows)
    }

    fn read_housing_areas(path: &Path) -> EngineResult<Vec<(ZipCode, MhaCode)>> {
        let mut reader = Self::open(path, b' ', false)?;
        let mut rows = Vec::new();

        Self::for_each_record(&mut reader, path, |record, _| {
            // Runs of spaces produce empty fields.
            let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            let [zip, mha, ..] = fields.as_slice() else {
                return Err("expected 'ZIP MHA'".to_string());
            };
            let zip = ZipCode::new(zip).map_err(|e| e.to_string())?;
            rows.push((zip, MhaCode::new(mha)));
            Ok(())
        })?;

        Ok(rows)
    }

    fn read_housing_area_names(path: &Path) -> EngineResult<Vec<(MhaCode, String)>> {
        let mut reader = Self::open(path, b';', false)?;
        let mut rows = Vec::new();

        Self::for_each_record(&mut reader, path, |record, _| {
            match (record.get(0), record.get(1)) {
                (Some(mha), Some(name)) if !mha.is_empty() => {
                    rows.push((MhaCode::new(mha), name.to_string()));
                    Ok(())
                }
                _ => Err("expected 'MHA;Name'".to_string()),
            }
        })?;

        Ok(rows)
    }

    fn read_allowance_rates(path: &Path) -> EngineResult<Vec<(MhaCode, GradeRates)>> {
        let mut reader = Self::open(path, b',', false)?;
        let mut rows = Vec::new();

        Self::for_each_record(&mut reader, path, |record, _| {
            if record.len() < Grade::ALL.len() + 1 {
                return Err(format!(
                    "expected MHA and {} grade rates, found {} fields",
                    Grade::ALL.len(),
                    record.len()
                ));
            }

            let mha = record.get(0).unwrap_or_default();
            if mha.is_empty() {
                return Err("missing MHA code".to_string());
            }

            let rates = record
                .iter()
                .skip(1)
                .take(Grade::ALL.len())
                .map(parse_amount)
                .collect::<Result<Vec<_>, _>>()?;

            rows.push((MhaCode::new(mha), GradeRates::from_row(&rates)));
            Ok(())
        })?;

        Ok(rows)
    }

    fn read_zip_counties(path: &Path) -> EngineResult<Vec<(ZipCode, CountyFips)>> {
        let mut reader = Self::open(path, b',', true)?;
        let headers = Self::headers(&mut reader, path)?;
        let zip_col = Self::require_column(&headers, ZIP_HEADERS, path)?;
        let county_col = Self::require_column(&headers, COUNTY_HEADERS, path)?;
        let mut rows = Vec::new();

        Self::for_each_record(&mut reader, path, |record, _| {
            let zip = ZipCode::new(record.get(zip_col).unwrap_or_default())
                .map_err(|e| e.to_string())?;
            let fips = CountyFips::new(record.get(county_col).unwrap_or_default())
                .map_err(|e| e.to_string())?;
            rows.push((zip, fips));
            Ok(())
        })?;

        Ok(rows)
    }

    fn read_rent_table<K>(
        path: &Path,
        key_headers: &[&str],
        parse_key: impl Fn(&str) -> EngineResult<K>,
    ) -> EngineResult<Vec<(K, RentSchedule)>> {
        let mut reader = Self::open(path, b',', true)?;
        let headers = Self::headers(&mut reader, path)?;
        let key_col = Self::require_column(&headers, key_headers, path)?;
        let bedroom_cols = bedroom_columns(&headers).ok_or_else(|| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: "missing one of the 1BR-4BR rent columns".to_string(),
        })?;
        let mut rows = Vec::new();

        Self::for_each_record(&mut reader, path, |record, _| {
            let key = parse_key(record.get(key_col).unwrap_or_default()).map_err(|e| e.to_string())?;

            let mut rents = [None; 4];
            for (slot, col) in rents.iter_mut().zip(bedroom_cols) {
                *slot = parse_amount(record.get(col).unwrap_or_default())?;
            }

            rows.push((key, RentSchedule::new(rents)));
            Ok(())
        })?;

        Ok(rows)
    }

    fn headers(reader: &mut csv::Reader<File>, path: &Path) -> EngineResult<StringRecord> {
        reader
            .headers()
            .cloned()
            .map_err(|e| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: format!("failed to read headers: {e}"),
            })
    }

    fn require_column(headers: &StringRecord, names: &[&str], path: &Path) -> EngineResult<usize> {
        headers
            .iter()
            .position(|h| names.contains(&normalize_header_name(h).as_str()))
            .ok_or_else(|| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: format!("missing column (expected one of: {})", names.join(", ")),
            })
    }
}

/// Lower-cases a header and strips everything but letters and digits, so
/// `"SAFMR\n2BR"`, `"SAFMR 2BR"` and `"safmr_2br"` all compare equal.
fn normalize_header_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Finds the 1BR..4BR columns, accepting `*{n}br` and `fmr{n}` names.
fn bedroom_columns(headers: &StringRecord) -> Option<[usize; 4]> {
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();
    let mut columns = [0; 4];

    for (n, column) in (1..=4).zip(columns.iter_mut()) {
        let suffix = format!("{n}br");
        let fmr_name = format!("fmr{n}");
        *column = names
            .iter()
            .position(|name| name.ends_with(&suffix) || *name == fmr_name)?;
    }

    Some(columns)
}

/// Parses a currency cell. Blank and `N/A` cells are unpublished, as are
/// non-positive amounts.
fn parse_amount(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty()
        || cleaned == "-"
        || cleaned.eq_ignore_ascii_case("n/a")
        || cleaned.eq_ignore_ascii_case("na")
    {
        return Ok(None);
    }

    let amount = Decimal::from_str(cleaned).map_err(|_| format!("invalid amount '{raw}'"))?;
    Ok(Some(amount).filter(|a| *a > Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BedroomStandard;
    use std::path::PathBuf;

    fn sample_path() -> &'static str {
        "./data/sample"
    }

    fn dollars(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    fn zip(code: &str) -> ZipCode {
        ZipCode::new(code).unwrap()
    }

    /// Copies the sample dataset into a fresh temp directory so a test can
    /// corrupt one file.
    fn scratch_copy(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "livability-engine-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        for entry in fs::read_dir(sample_path()).unwrap() {
            let entry = entry.unwrap();
            fs::copy(entry.path(), dir.join(entry.file_name())).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_sample_dataset() {
        let result = TableLoader::load(sample_path());
        assert!(result.is_ok(), "Failed to load tables: {:?}", result.err());

        let tables = result.unwrap();
        assert_eq!(tables.metadata().year, 2023);
        assert_eq!(tables.summary().housing_areas, 3);
    }

    #[test]
    fn test_housing_area_and_name() {
        let tables = TableLoader::load(sample_path()).unwrap();

        let mha = tables.housing_area(&zip("20001")).unwrap();
        assert_eq!(mha.as_str(), "DC053");
        assert_eq!(
            tables.housing_area_name(mha),
            Some("WASHINGTON, DC METRO AREA")
        );
    }

    #[test]
    fn test_allowance_columns_follow_grade_order() {
        let tables = TableLoader::load(sample_path()).unwrap();
        let mha = MhaCode::new("DC053");

        let with = tables
            .allowance_rates(&mha, DependentStatus::WithDependents)
            .unwrap();
        assert_eq!(with.get(Grade::E1), Some(dollars(2000)));
        assert_eq!(with.get(Grade::O4), Some(dollars(2500)));
        assert_eq!(with.get(Grade::O10), Some(dollars(3050)));

        let without = tables
            .allowance_rates(&mha, DependentStatus::WithoutDependents)
            .unwrap();
        assert_eq!(without.get(Grade::O4), Some(dollars(2400)));
    }

    #[test]
    fn test_zip_rents_with_currency_formatting_and_blank_cells() {
        let tables = TableLoader::load(sample_path()).unwrap();

        let baltimore = tables.zip_rents(&zip("21201")).unwrap();
        assert_eq!(baltimore.get(BedroomStandard::Two), Some(dollars(1350)));

        let arlington = tables.zip_rents(&zip("22202")).unwrap();
        assert_eq!(arlington.get(BedroomStandard::Three), None);
        assert_eq!(arlington.get(BedroomStandard::Four), Some(dollars(2950)));
    }

    #[test]
    fn test_zip_without_leading_zero_is_padded() {
        let tables = TableLoader::load(sample_path()).unwrap();
        assert!(tables.zip_rents(&zip("02134")).is_some());
    }

    #[test]
    fn test_county_tables_use_five_digit_fips() {
        let tables = TableLoader::load(sample_path()).unwrap();

        let county = tables.county_for_zip(&zip("21202")).unwrap();
        assert_eq!(county.as_str(), "24510");
        let rents = tables.county_rents(county).unwrap();
        assert_eq!(rents.get(BedroomStandard::Three), Some(dollars(1650)));
    }

    #[test]
    fn test_manifest_defaults_apply() {
        let tables = TableLoader::load(sample_path()).unwrap();
        assert_eq!(tables.allowance_proxy_factor(), Decimal::new(9, 1));
        assert_eq!(
            tables.national_average_rents().get(BedroomStandard::Two),
            dollars(1096)
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = TableLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("dataset.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_rent_reports_line() {
        let dir = scratch_copy("bad-rent");
        fs::write(
            dir.join("safmr_zip.csv"),
            "ZIP Code,SAFMR 1BR,SAFMR 2BR,SAFMR 3BR,SAFMR 4BR\n20001,1800,2100,2600,3100\n20002,1700,lots,2500,3000\n",
        )
        .unwrap();

        match TableLoader::load(&dir) {
            Err(EngineError::TableParseError { path, line, message }) => {
                assert!(path.ends_with("safmr_zip.csv"));
                assert_eq!(line, 3);
                assert!(message.contains("lots"));
            }
            other => panic!("Expected TableParseError, got {:?}", other),
        }

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_rent_columns_is_config_error() {
        let dir = scratch_copy("no-columns");
        fs::write(dir.join("fmr_county.csv"), "fips,countyname\n5101399999,Arlington\n").unwrap();

        match TableLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, message }) => {
                assert!(path.ends_with("fmr_county.csv"));
                assert!(message.contains("1BR-4BR"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_non_positive_national_rent_is_rejected() {
        let dir = scratch_copy("bad-national");
        let manifest = fs::read_to_string(dir.join("dataset.yaml")).unwrap();
        fs::write(
            dir.join("dataset.yaml"),
            format!(
                "{manifest}national_average_rents:\n  one_bedroom: \"0\"\n  two_bedroom: \"1096\"\n  three_bedroom: \"1416\"\n  four_bedroom: \"1624\"\n"
            ),
        )
        .unwrap();

        match TableLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("national_average_rents"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1250").unwrap(), Some(dollars(1250)));
        assert_eq!(parse_amount("$1,250").unwrap(), Some(dollars(1250)));
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount("N/A").unwrap(), None);
        assert_eq!(parse_amount("0").unwrap(), None);
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_bedroom_columns_accept_hud_header_styles() {
        let safmr = StringRecord::from(vec![
            "ZIP\nCode",
            "SAFMR\n0BR",
            "SAFMR\n1BR",
            "SAFMR\n2BR",
            "SAFMR\n3BR",
            "SAFMR\n4BR",
        ]);
        assert_eq!(bedroom_columns(&safmr), Some([2, 3, 4, 5]));

        let county = StringRecord::from(vec!["fips", "fmr_0", "fmr_1", "fmr_2", "fmr_3", "fmr_4"]);
        assert_eq!(bedroom_columns(&county), Some([2, 3, 4, 5]));
    }
}
