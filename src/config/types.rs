//! Reference data types.
//!
//! This module contains the dataset manifest read from `dataset.yaml` and the
//! immutable [`RateTables`] context every lookup reads from.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{BedroomStandard, CountyFips, DependentStatus, Grade, MhaCode, ZipCode};

/// Dataset metadata from `dataset.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Human-readable dataset name.
    pub name: String,
    /// The rate year of the snapshot.
    pub year: i32,
    /// The date the rates took effect.
    pub effective_date: NaiveDate,
    /// Where the allowance tables were published.
    pub allowance_source: String,
    /// Where the fair market rent tables were published.
    pub rent_source: String,
}

/// File names of the tables making up a dataset, relative to its directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    /// `ZIP MHA` pairs, space separated.
    pub zip_mha: String,
    /// `MHA;Name` pairs.
    pub mha_names: String,
    /// BAH rates with dependents, one row per MHA.
    pub bah_with_dependents: String,
    /// BAH rates without dependents, one row per MHA.
    pub bah_without_dependents: String,
    /// Small Area FMR by ZIP.
    pub zip_rents: String,
    /// ZIP to county crosswalk.
    pub zip_county: String,
    /// FMR by county.
    pub county_rents: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            zip_mha: "zip_mha.txt".to_string(),
            mha_names: "mha_names.txt".to_string(),
            bah_with_dependents: "bah_with_dependents.txt".to_string(),
            bah_without_dependents: "bah_without_dependents.txt".to_string(),
            zip_rents: "safmr_zip.csv".to_string(),
            zip_county: "zip_county.csv".to_string(),
            county_rents: "fmr_county.csv".to_string(),
        }
    }
}

/// National average fair market rents, the last tier of the rent lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalAverageRents {
    /// One-bedroom rent.
    pub one_bedroom: Decimal,
    /// Two-bedroom rent.
    pub two_bedroom: Decimal,
    /// Three-bedroom rent.
    pub three_bedroom: Decimal,
    /// Four-bedroom rent.
    pub four_bedroom: Decimal,
}

impl NationalAverageRents {
    /// Returns the rent for a bedroom standard.
    pub fn get(&self, bedrooms: BedroomStandard) -> Decimal {
        match bedrooms {
            BedroomStandard::One => self.one_bedroom,
            BedroomStandard::Two => self.two_bedroom,
            BedroomStandard::Three => self.three_bedroom,
            BedroomStandard::Four => self.four_bedroom,
        }
    }

    /// Returns true if every rent is positive.
    pub fn is_valid(&self) -> bool {
        BedroomStandard::ALL
            .iter()
            .all(|b| self.get(*b) > Decimal::ZERO)
    }
}

impl Default for NationalAverageRents {
    /// Published national averages (ushousingdata.com, FY2023).
    fn default() -> Self {
        Self {
            one_bedroom: Decimal::new(880, 0),
            two_bedroom: Decimal::new(1096, 0),
            three_bedroom: Decimal::new(1416, 0),
            four_bedroom: Decimal::new(1624, 0),
        }
    }
}

/// The multiplier applied to rent when a ZIP has no published allowance.
///
/// BAH and FMR surveys are published within ±10% of each other.
pub fn default_allowance_proxy_factor() -> Decimal {
    Decimal::new(9, 1)
}

/// The `dataset.yaml` manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetManifest {
    /// Dataset metadata.
    #[serde(flatten)]
    pub metadata: DatasetMetadata,
    /// Table file names.
    #[serde(default)]
    pub files: DataFiles,
    /// National average rents for this snapshot.
    #[serde(default)]
    pub national_average_rents: NationalAverageRents,
    /// Multiplier for the allowance rent proxy.
    #[serde(default = "default_allowance_proxy_factor")]
    pub allowance_proxy_factor: Decimal,
}

/// BAH rates for one housing area and dependent status, indexed by grade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradeRates([Option<Decimal>; 27]);

impl GradeRates {
    /// Builds rates from a row in [`Grade::ALL`] order; missing trailing
    /// values are treated as unpublished.
    pub fn from_row(values: &[Option<Decimal>]) -> Self {
        let mut rates = [None; 27];
        for (slot, value) in rates.iter_mut().zip(values) {
            *slot = *value;
        }
        Self(rates)
    }

    /// Returns the rate for a grade, if published.
    pub fn get(&self, grade: Grade) -> Option<Decimal> {
        self.0[grade.column_index()]
    }

    /// Sets the rate for a grade.
    pub fn set(&mut self, grade: Grade, rate: Decimal) {
        self.0[grade.column_index()] = Some(rate);
    }
}

/// Fair market rents for 1-4 bedrooms; non-positive values are unpublished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentSchedule([Option<Decimal>; 4]);

impl RentSchedule {
    /// Creates a schedule from per-bedroom values.
    pub fn new(values: [Option<Decimal>; 4]) -> Self {
        Self(values.map(|v| v.filter(|rent| *rent > Decimal::ZERO)))
    }

    /// Creates a fully populated schedule from whole-dollar rents.
    pub fn from_dollars(one: i64, two: i64, three: i64, four: i64) -> Self {
        Self::new([one, two, three, four].map(|d| Some(Decimal::new(d, 0))))
    }

    /// Returns the rent for a bedroom standard, if published.
    pub fn get(&self, bedrooms: BedroomStandard) -> Option<Decimal> {
        self.0[bedrooms.index()]
    }
}

/// Row counts of the loaded tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// ZIPs assigned to a housing area.
    pub zip_housing_areas: usize,
    /// Housing areas with allowance rates.
    pub housing_areas: usize,
    /// ZIPs with a Small Area FMR row.
    pub zip_rents: usize,
    /// ZIPs in the county crosswalk.
    pub zip_counties: usize,
    /// Counties with an FMR row.
    pub county_rents: usize,
}

/// Immutable reference tables for one rate year.
///
/// Built once by [`crate::config::TableLoader`] (or [`RateTables::builder`]
/// for synthetic data) and shared read-only by every lookup.
#[derive(Debug, Clone)]
pub struct RateTables {
    metadata: DatasetMetadata,
    zip_to_mha: HashMap<ZipCode, MhaCode>,
    mha_names: HashMap<MhaCode, String>,
    allowance_rates: HashMap<(MhaCode, DependentStatus), GradeRates>,
    zip_rents: HashMap<ZipCode, RentSchedule>,
    zip_to_county: HashMap<ZipCode, CountyFips>,
    county_rents: HashMap<CountyFips, RentSchedule>,
    national_average_rents: NationalAverageRents,
    allowance_proxy_factor: Decimal,
}

impl RateTables {
    /// Starts building a set of tables.
    pub fn builder(metadata: DatasetMetadata) -> RateTablesBuilder {
        RateTablesBuilder {
            tables: RateTables {
                metadata,
                zip_to_mha: HashMap::new(),
                mha_names: HashMap::new(),
                allowance_rates: HashMap::new(),
                zip_rents: HashMap::new(),
                zip_to_county: HashMap::new(),
                county_rents: HashMap::new(),
                national_average_rents: NationalAverageRents::default(),
                allowance_proxy_factor: default_allowance_proxy_factor(),
            },
        }
    }

    /// Returns the dataset metadata.
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Returns the housing area a ZIP is assigned to.
    pub fn housing_area(&self, zip: &ZipCode) -> Option<&MhaCode> {
        self.zip_to_mha.get(zip)
    }

    /// Returns the display name of a housing area.
    pub fn housing_area_name(&self, mha: &MhaCode) -> Option<&str> {
        self.mha_names.get(mha).map(String::as_str)
    }

    /// Returns the allowance rates of a housing area for a dependent status.
    pub fn allowance_rates(&self, mha: &MhaCode, status: DependentStatus) -> Option<&GradeRates> {
        self.allowance_rates.get(&(mha.clone(), status))
    }

    /// Returns the Small Area FMR row of a ZIP.
    pub fn zip_rents(&self, zip: &ZipCode) -> Option<&RentSchedule> {
        self.zip_rents.get(zip)
    }

    /// Returns the county a ZIP lies in.
    pub fn county_for_zip(&self, zip: &ZipCode) -> Option<&CountyFips> {
        self.zip_to_county.get(zip)
    }

    /// Returns the FMR row of a county.
    pub fn county_rents(&self, fips: &CountyFips) -> Option<&RentSchedule> {
        self.county_rents.get(fips)
    }

    /// Returns the national average rents.
    pub fn national_average_rents(&self) -> &NationalAverageRents {
        &self.national_average_rents
    }

    /// Returns the allowance rent proxy multiplier.
    pub fn allowance_proxy_factor(&self) -> Decimal {
        self.allowance_proxy_factor
    }

    /// Returns row counts of the loaded tables.
    pub fn summary(&self) -> TableSummary {
        let mut housing_areas: Vec<&MhaCode> =
            self.allowance_rates.keys().map(|(mha, _)| mha).collect();
        housing_areas.sort();
        housing_areas.dedup();

        TableSummary {
            zip_housing_areas: self.zip_to_mha.len(),
            housing_areas: housing_areas.len(),
            zip_rents: self.zip_rents.len(),
            zip_counties: self.zip_to_county.len(),
            county_rents: self.county_rents.len(),
        }
    }
}

/// Builder for [`RateTables`].
///
/// Keyed inserts keep the first value seen for a key, matching how the
/// loaders treat duplicate rows.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use livability_engine::config::{DatasetMetadata, RateTables, RentSchedule};
/// use livability_engine::models::{BedroomStandard, ZipCode};
/// use rust_decimal::Decimal;
///
/// let metadata = DatasetMetadata {
///     name: "synthetic".to_string(),
///     year: 2023,
///     effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
///     allowance_source: "test".to_string(),
///     rent_source: "test".to_string(),
/// };
/// let zip = ZipCode::new("22201").unwrap();
/// let tables = RateTables::builder(metadata)
///     .zip_rents(zip.clone(), RentSchedule::from_dollars(1750, 1950, 2000, 2900))
///     .build();
///
/// let rents = tables.zip_rents(&zip).unwrap();
/// assert_eq!(rents.get(BedroomStandard::Three), Some(Decimal::new(2000, 0)));
/// ```
#[derive(Debug, Clone)]
pub struct RateTablesBuilder {
    tables: RateTables,
}

impl RateTablesBuilder {
    /// Assigns a ZIP to a housing area.
    pub fn housing_area(mut self, zip: ZipCode, mha: MhaCode) -> Self {
        self.tables.zip_to_mha.entry(zip).or_insert(mha);
        self
    }

    /// Names a housing area.
    pub fn housing_area_name(mut self, mha: MhaCode, name: impl Into<String>) -> Self {
        self.tables.mha_names.entry(mha).or_insert_with(|| name.into());
        self
    }

    /// Sets the full allowance row of a housing area and dependent status.
    pub fn allowance_rates(
        mut self,
        mha: MhaCode,
        status: DependentStatus,
        rates: GradeRates,
    ) -> Self {
        self.tables
            .allowance_rates
            .entry((mha, status))
            .or_insert(rates);
        self
    }

    /// Sets a single allowance rate.
    pub fn allowance_rate(
        mut self,
        mha: MhaCode,
        status: DependentStatus,
        grade: Grade,
        rate: Decimal,
    ) -> Self {
        self.tables
            .allowance_rates
            .entry((mha, status))
            .or_default()
            .set(grade, rate);
        self
    }

    /// Sets the Small Area FMR row of a ZIP.
    pub fn zip_rents(mut self, zip: ZipCode, rents: RentSchedule) -> Self {
        self.tables.zip_rents.entry(zip).or_insert(rents);
        self
    }

    /// Maps a ZIP to a county.
    pub fn zip_county(mut self, zip: ZipCode, fips: CountyFips) -> Self {
        self.tables.zip_to_county.entry(zip).or_insert(fips);
        self
    }

    /// Sets the FMR row of a county.
    pub fn county_rents(mut self, fips: CountyFips, rents: RentSchedule) -> Self {
        self.tables.county_rents.entry(fips).or_insert(rents);
        self
    }

    /// Overrides the national average rents.
    pub fn national_average_rents(mut self, rents: NationalAverageRents) -> Self {
        self.tables.national_average_rents = rents;
        self
    }

    /// Overrides the allowance rent proxy multiplier.
    pub fn allowance_proxy_factor(mut self, factor: Decimal) -> Self {
        self.tables.allowance_proxy_factor = factor;
        self
    }

    /// Finishes building.
    pub fn build(self) -> RateTables {
        self.tables
    }
}
