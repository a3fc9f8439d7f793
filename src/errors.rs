/*
    GNSS Arcs, observed versus predicted tracking arcs
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::io::{ConfigError, InputOutputError};
use serde_derive::Serialize;
use snafu::prelude::*;
use std::fmt;

/// Errors which abort the processing of a whole run, or of one satellite's arc computation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArcError {
    #[snafu(display("no observation epochs for {satellite}"))]
    EmptySeries { satellite: String },
    #[snafu(display("malformed input when {action}: {source}"))]
    MalformedInput {
        source: InputOutputError,
        action: &'static str,
    },
    #[snafu(display("visibility events of {satellite} are malformed: {details}"))]
    MalformedEvents { satellite: String, details: String },
    #[snafu(display("run configuration is invalid: {source}"))]
    Config { source: ConfigError },
    #[snafu(display("could not export the run report: {source}"))]
    Export { source: InputOutputError },
    #[snafu(display("no satellite could be reconciled ({} failures)", failures.len()))]
    NothingReconciled {
        failures: Vec<(String, SatelliteFailure)>,
    },
}

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TleError {
    #[snafu(display("no TLE available for catalog id {catalog_id}"))]
    NoTleAvailable { catalog_id: String },
    #[snafu(display("TLE of {catalog_id} is invalid: {details}"))]
    InvalidElements { catalog_id: String, details: String },
    #[snafu(display("could not propagate {catalog_id}: {details}"))]
    Propagation { catalog_id: String, details: String },
}

/// Errors in the text representation of two-line elements and days of year.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    #[snafu(display("TLE line 1 is too short ({length} chars)"))]
    LineTooShort { length: usize },
    #[snafu(display("`{line}` is not a TLE line {expected}"))]
    UnexpectedLine { line: String, expected: u8 },
    #[snafu(display("catalog numbers of line 1 and line 2 differ"))]
    CatalogMismatch,
    #[snafu(display("invalid TLE epoch `{field}`"))]
    TleEpoch { field: String },
    #[snafu(display("TLE epoch day {doy} is out of range"))]
    TleEpochDay { doy: f64 },
    #[snafu(display("`{input}` is neither YYYY:DOY nor YYDOY"))]
    DayFormat { input: String },
    #[snafu(display("day of year {doy} is out of range for {year}"))]
    DayRange { year: i32, doy: u16 },
}

/// Reason why a satellite did not make it through the full pipeline.
///
/// These are collected per satellite and reported in the run summary, they never abort a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason")]
pub enum SatelliteFailure {
    /// Satellite was requested but has no observation epoch
    EmptySeries,
    /// Satellite identifier does not map to exactly one catalog entry (holds the number of matches)
    CatalogUnresolved { matches: usize },
    /// Catalog identifier resolved but no orbital elements were found
    NoTleAvailable { catalog_id: String },
    /// Orbital elements were found but could not be turned into visibility events
    PropagationFailed { catalog_id: String, details: String },
}

impl SatelliteFailure {
    /// Returns true if the satellite has observations but could not be compared to a prediction
    pub fn is_prediction_gap(&self) -> bool {
        !matches!(self, Self::EmptySeries)
    }
}

impl fmt::Display for SatelliteFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptySeries => write!(f, "no data"),
            Self::CatalogUnresolved { matches } => {
                write!(f, "no catalog entry ({matches} matches)")
            }
            Self::NoTleAvailable { catalog_id } => write!(f, "no TLE for {catalog_id}"),
            Self::PropagationFailed {
                catalog_id,
                details,
            } => write!(f, "propagation of {catalog_id} failed: {details}"),
        }
    }
}

impl From<TleError> for SatelliteFailure {
    fn from(e: TleError) -> Self {
        match e {
            TleError::NoTleAvailable { catalog_id } => Self::NoTleAvailable { catalog_id },
            TleError::InvalidElements {
                catalog_id,
                details,
            }
            | TleError::Propagation {
                catalog_id,
                details,
            } => Self::PropagationFailed {
                catalog_id,
                details,
            },
        }
    }
}
