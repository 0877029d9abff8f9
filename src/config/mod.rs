//! Reference data loading for the livability engine.
//!
//! This module provides types and functions for loading BAH and fair market
//! rent reference tables from a dataset directory.

mod loader;
mod types;

pub use loader::TableLoader;
pub use types::{
    DataFiles, DatasetManifest, DatasetMetadata, GradeRates, NationalAverageRents, RateTables,
    RateTablesBuilder, RentSchedule, TableSummary, default_allowance_proxy_factor,
};

/// Synthetic tables shared by unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{DatasetMetadata, RateTables, RentSchedule};
    use crate::models::{CountyFips, DependentStatus, Grade, MhaCode, ZipCode};

    pub fn metadata() -> DatasetMetadata {
        DatasetMetadata {
            name: "synthetic".to_string(),
            year: 2023,
            effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            allowance_source: "test".to_string(),
            rent_source: "test".to_string(),
        }
    }

    pub fn zip(code: &str) -> ZipCode {
        ZipCode::new(code).unwrap()
    }

    pub fn fips(code: &str) -> CountyFips {
        CountyFips::new(code).unwrap()
    }

    pub fn dollars(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    /// DC053 covers 20001 and 22201; 22202 lacks a 3BR ZIP rent; 21202 is
    /// known only at county level; 55555 maps to a county with no rents.
    pub fn synthetic_tables() -> RateTables {
        let dc = MhaCode::new("DC053");
        RateTables::builder(metadata())
            .housing_area(zip("20001"), dc.clone())
            .housing_area(zip("22201"), dc.clone())
            .housing_area(zip("22203"), MhaCode::new("ZZ999"))
            .housing_area_name(dc.clone(), "WASHINGTON, DC METRO AREA")
            .allowance_rate(dc.clone(), DependentStatus::WithDependents, Grade::O4, dollars(2500))
            .allowance_rate(dc.clone(), DependentStatus::WithDependents, Grade::E5, dollars(2250))
            .allowance_rate(dc, DependentStatus::WithoutDependents, Grade::O4, dollars(2400))
            .zip_rents(zip("20001"), RentSchedule::from_dollars(1800, 2100, 2600, 3100))
            .zip_rents(zip("22201"), RentSchedule::from_dollars(1750, 1950, 2000, 2900))
            .zip_rents(
                zip("22202"),
                RentSchedule::new([Some(dollars(1760)), Some(dollars(1960)), None, Some(dollars(2950))]),
            )
            .zip_county(zip("22202"), fips("51013"))
            .zip_county(zip("21202"), fips("24510"))
            .zip_county(zip("55555"), fips("99999"))
            .county_rents(fips("5101399999"), RentSchedule::from_dollars(1600, 1850, 2350, 2800))
            .county_rents(fips("2451099999"), RentSchedule::from_dollars(1100, 1300, 1650, 1900))
            .build()
    }
}
