//! Housing affordability and neighborhood livability engine.
//!
//! This crate rates how affordable a ZIP code is for a service member, by
//! comparing the Basic Allowance for Housing at their duty location with the
//! HUD fair market rent at the candidate ZIP, and combines that rating with
//! crime, school, walkability, recreation and distance metrics into a
//! weighted livability score per neighborhood.
//!
//! Reference tables are loaded once into [`config::RateTables`] and shared
//! read-only by every lookup.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
