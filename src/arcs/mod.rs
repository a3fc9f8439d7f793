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

use crate::time::{Duration, Epoch, Unit};
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

mod predicted;
mod segmenter;

pub use predicted::{to_predicted_arcs, PredictedArc};
pub use segmenter::{segment, ArcSegmenter, ObservedArc, Segmentation};

/// Offset from the UTC midnight starting the processed day.
///
/// Observed and predicted arcs are compared on this scale only, since a run covers a single day.
/// The end of the day window is `24:00:00`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay(Duration);

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self(Duration::ZERO);

    pub fn from_duration(offset: Duration) -> Self {
        Self(offset)
    }

    pub fn from_hms(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self(
            Unit::Hour * i64::from(hours)
                + Unit::Minute * i64::from(minutes)
                + Unit::Second * i64::from(seconds),
        )
    }

    /// Time of day of this epoch, counted from the provided start of day
    pub fn since(day_start: Epoch, epoch: Epoch) -> Self {
        Self(epoch - day_start)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Sub for TimeOfDay {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0 - rhs.0
    }
}

impl Add<Duration> for TimeOfDay {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for TimeOfDay {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self {
        Self(self.0 - rhs)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = (self.0.to_seconds() * 1e3).round() as i64;
        let sign = if millis < 0 { "-" } else { "" };
        let millis = millis.abs();
        let (hours, minutes) = (millis / 3_600_000, (millis / 60_000) % 60);
        let (seconds, millis) = ((millis / 1_000) % 60, millis % 1_000);
        if millis == 0 {
            write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
        }
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{self}"))
    }
}
