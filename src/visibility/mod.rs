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

use crate::catalog::TleRecord;
use crate::errors::{DayFormatSnafu, DayRangeSnafu, FormatError, TleError};
use crate::time::{Epoch, TimeUnits, Unit};
use serde_derive::{Deserialize, Serialize};
use snafu::{ensure, OptionExt};
use std::fmt;
use std::str::FromStr;

mod sgp4_source;
pub use sgp4_source::Sgp4Visibility;

/// Kind of a visibility event of a satellite above the elevation mask of a site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Satellite rises above the elevation mask
    Rise,
    /// Satellite reaches its highest elevation of the pass
    Culminate,
    /// Satellite sets below the elevation mask
    Set,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibilityEvent {
    pub epoch: Epoch,
    pub kind: EventKind,
}

impl VisibilityEvent {
    pub fn new(epoch: Epoch, kind: EventKind) -> Self {
        Self { epoch, kind }
    }
}

impl fmt::Display for VisibilityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {:?}", self.epoch, self.kind)
    }
}

/// A fixed observing site on the WGS-84 ellipsoid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundSite {
    pub name: String,
    /// in degrees
    pub latitude_deg: f64,
    /// in degrees
    pub longitude_deg: f64,
    /// in km
    #[serde(default)]
    pub height_km: f64,
    /// in degrees
    pub elevation_mask_deg: f64,
}

impl GroundSite {
    pub fn from_point(
        name: String,
        latitude_deg: f64,
        longitude_deg: f64,
        height_km: f64,
        elevation_mask_deg: f64,
    ) -> Self {
        Self {
            name,
            latitude_deg,
            longitude_deg,
            height_km,
            elevation_mask_deg,
        }
    }
}

impl Default for GroundSite {
    /// Royal Military Academy, Brussels, with a 5 degree elevation mask
    fn default() -> Self {
        Self::from_point("RMA".to_string(), 50.8438, 4.3928, 0.0, 5.0)
    }
}

impl fmt::Display for GroundSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (lat.: {:.4} deg, long.: {:.4} deg, alt.: {:.3} km, mask: {:.1} deg)",
            self.name,
            self.latitude_deg,
            self.longitude_deg,
            self.height_km,
            self.elevation_mask_deg
        )
    }
}

/// A calendar day identified by its year and its day of year (1 is January first).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DayOfYear {
    pub year: i32,
    pub doy: u16,
}

impl DayOfYear {
    pub fn new(year: i32, doy: u16) -> Self {
        Self { year, doy }
    }

    /// UTC midnight at the start of this day
    pub fn start(&self) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(self.year, 1, 1)
            + Unit::Day * (i64::from(self.doy) - 1)
    }

    pub fn window(&self) -> DayWindow {
        DayWindow::new(self.start())
    }
}

impl fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}:{:03}", self.year, self.doy)
    }
}

impl FromStr for DayOfYear {
    type Err = FormatError;

    /// Parses `YYYY:DOY`, `YYYY-DOY` or the compact `YYDOY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.split_once([':', '-']) {
            Some((year, doy)) => year.parse::<i32>().ok().zip(doy.parse::<u16>().ok()),
            None if s.len() == 5 && s.chars().all(|c| c.is_ascii_digit()) => s[..2]
                .parse::<i32>()
                .ok()
                .map(|yy| 2000 + yy)
                .zip(s[2..].parse::<u16>().ok()),
            None => None,
        };
        let (year, doy) = parsed.context(DayFormatSnafu { input: s })?;
        let max_doy = if is_leap_year(year) { 366 } else { 365 };
        ensure!((1..=max_doy).contains(&doy), DayRangeSnafu { year, doy });
        Ok(Self { year, doy })
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// A UTC day window, `[start, start + 1 day)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DayWindow {
    pub start: Epoch,
    pub end: Epoch,
}

impl DayWindow {
    pub fn new(start: Epoch) -> Self {
        Self {
            start,
            end: start + 1.days(),
        }
    }

    pub fn contains(&self, epoch: Epoch) -> bool {
        self.start <= epoch && epoch < self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Anything which turns orbital elements into rise, culmination and set events over a site.
///
/// Implementations must return the events of the window in chronological order.
pub trait VisibilityEventSource: Sync {
    fn events(
        &self,
        tle: &TleRecord,
        site: &GroundSite,
        window: &DayWindow,
    ) -> Result<Vec<VisibilityEvent>, TleError>;
}
