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

use crate::errors::{
    CatalogMismatchSnafu, FormatError, LineTooShortSnafu, NoTleAvailableSnafu, TleEpochDaySnafu,
    TleEpochSnafu, TleError, UnexpectedLineSnafu,
};
use crate::time::{Duration, Epoch, Unit};
use crate::visibility::DayOfYear;
use serde_derive::Serialize;
use snafu::{ensure, OptionExt};
use std::fmt;

/// Epoch of a two-line element set, as a year and a fractional day of year (1.0 is January first at midnight).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct TleEpoch {
    pub year: i32,
    pub doy: f64,
}

impl TleEpoch {
    /// Parses the epoch field of the first line of a TLE, columns 19 to 32, e.g. `20122.54166667`.
    pub fn from_line1(line1: &str) -> Result<Self, FormatError> {
        let field = line1
            .get(18..32)
            .context(LineTooShortSnafu {
                length: line1.len(),
            })?
            .trim();
        let parsed = match (field.get(..2), field.get(2..)) {
            (Some(yy), Some(doy)) => yy.parse::<i32>().ok().zip(doy.parse::<f64>().ok()),
            _ => None,
        };
        let (yy, doy) = parsed.context(TleEpochSnafu { field })?;
        ensure!((1.0..367.0).contains(&doy), TleEpochDaySnafu { doy });
        // NORAD convention: two-digit years 57 through 99 are in the twentieth century
        let year = if yy >= 57 { 1900 + yy } else { 2000 + yy };
        Ok(Self { year, doy })
    }

    pub fn to_epoch(&self) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(self.year, 1, 1) + Unit::Day * (self.doy - 1.0)
    }

    /// Absolute distance between this epoch and the start of the provided day
    pub fn distance_to(&self, day: &DayOfYear) -> Duration {
        (self.to_epoch() - day.start()).abs()
    }
}

impl fmt::Display for TleEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}:{:012.8}", self.year, self.doy)
    }
}

/// One dated two-line element set, as found in the TLE file of a catalog identifier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TleEntry {
    pub epoch: TleEpoch,
    pub line1: String,
    pub line2: String,
}

impl TleEntry {
    pub fn new(line1: &str, line2: &str) -> Result<Self, FormatError> {
        let line1 = line1.trim_end();
        let line2 = line2.trim_end();
        ensure!(
            line1.starts_with("1 "),
            UnexpectedLineSnafu {
                line: line1,
                expected: 1u8
            }
        );
        ensure!(
            line2.starts_with("2 "),
            UnexpectedLineSnafu {
                line: line2,
                expected: 2u8
            }
        );
        ensure!(line1.get(2..7) == line2.get(2..7), CatalogMismatchSnafu);
        Ok(Self {
            epoch: TleEpoch::from_line1(line1)?,
            line1: line1.to_string(),
            line2: line2.to_string(),
        })
    }
}

/// The orbital elements retained for one satellite for this run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TleRecord {
    pub satellite: String,
    pub catalog_id: String,
    pub epoch: TleEpoch,
    pub line1: String,
    pub line2: String,
}

impl TleRecord {
    pub fn from_entry(satellite: &str, catalog_id: &str, entry: &TleEntry) -> Self {
        Self {
            satellite: satellite.to_string(),
            catalog_id: catalog_id.to_string(),
            epoch: entry.epoch,
            line1: entry.line1.clone(),
            line2: entry.line2.clone(),
        }
    }
}

/// Selects the TLE whose epoch is closest to the start of the requested day.
///
/// Ties go to the entry listed first.
pub fn select_tle<'a>(
    catalog_id: &str,
    day: &DayOfYear,
    entries: &'a [TleEntry],
) -> Result<&'a TleEntry, TleError> {
    ensure!(!entries.is_empty(), NoTleAvailableSnafu { catalog_id });

    let mut best = &entries[0];
    let mut best_dist = best.epoch.distance_to(day);
    for entry in &entries[1..] {
        let dist = entry.epoch.distance_to(day);
        if dist < best_dist {
            best = entry;
            best_dist = dist;
        }
    }

    debug!("{catalog_id}: TLE at {} is {best_dist} from {day}", best.epoch);
    debug!("{catalog_id}: found TLE1: {}", best.line1);
    debug!("{catalog_id}: found TLE2: {}", best.line2);

    Ok(best)
}
