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

use super::TimeOfDay;
use crate::errors::{ArcError, EmptySeriesSnafu};
use crate::time::{Duration, Epoch};
use crate::visibility::DayWindow;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// A contiguous run of observations of one satellite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObservedArc {
    pub satellite: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// Number of epochs in this arc, always at least one
    pub observation_count: usize,
    /// Index of the first epoch of this arc in the sorted epochs of the satellite
    pub first_index: usize,
    /// Index of the last epoch of this arc in the sorted epochs of the satellite
    pub last_index: usize,
}

impl ObservedArc {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for ObservedArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} -> {} ({} obs)",
            self.satellite, self.start, self.end, self.observation_count
        )
    }
}

/// Outcome of the segmentation of the epochs of one satellite.
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    pub satellite: String,
    /// Median of the gaps between successive epochs, undefined with a single epoch
    pub nominal_interval: Option<Duration>,
    /// Gap to the previous epoch, for each sorted epoch (the first one has none)
    pub gaps: Vec<Option<Duration>>,
    pub arcs: Vec<ObservedArc>,
}

impl Segmentation {
    /// Nominal interval in seconds, NaN if undefined.
    pub fn nominal_interval_s(&self) -> f64 {
        self.nominal_interval
            .map(|interval| interval.to_seconds())
            .unwrap_or(f64::NAN)
    }
}

/// Splits the epochs of a satellite into arcs wherever the gap between two epochs exceeds
/// `multiplier` times the nominal interval of that satellite.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct ArcSegmenter {
    #[builder(default = 5)]
    pub multiplier: u32,
}

impl Default for ArcSegmenter {
    fn default() -> Self {
        Self { multiplier: 5 }
    }
}

impl ArcSegmenter {
    pub fn new(multiplier: u32) -> Self {
        Self { multiplier }
    }

    /// Segments the epochs of the provided satellite into observed arcs.
    ///
    /// Arc bounds are counted from the start of `window`, like predicted arcs, so an arc running past
    /// midnight ends after `24:00:00` instead of wrapping around.
    /// The input is not modified: if it is not sorted, the segmentation works on a sorted copy.
    pub fn segment(
        &self,
        satellite: &str,
        epochs: &[Epoch],
        window: &DayWindow,
    ) -> Result<Segmentation, ArcError> {
        ensure!(!epochs.is_empty(), EmptySeriesSnafu { satellite });

        let sorted = if epochs.windows(2).all(|w| w[0] <= w[1]) {
            epochs.to_vec()
        } else {
            debug!("{satellite}: sorting {} epochs", epochs.len());
            let mut sorted = epochs.to_vec();
            sorted.sort();
            sorted
        };

        let gaps = std::iter::once(None)
            .chain(sorted.windows(2).map(|w| Some(w[1] - w[0])))
            .collect::<Vec<Option<Duration>>>();

        let nominal_interval = median(gaps.iter().flatten().copied().collect());

        // Arc starts are the first epoch and every epoch following a large gap.
        let mut starts = vec![0];
        if let Some(nominal) = nominal_interval {
            let threshold = nominal * f64::from(self.multiplier);
            starts.extend(
                gaps.iter()
                    .enumerate()
                    .filter(|(_, gap)| matches!(gap, Some(gap) if *gap > threshold))
                    .map(|(i, _)| i),
            );
        }

        let arcs = starts
            .iter()
            .enumerate()
            .map(|(k, &first)| {
                let last = starts.get(k + 1).map_or(sorted.len() - 1, |next| next - 1);
                ObservedArc {
                    satellite: satellite.to_string(),
                    start: TimeOfDay::since(window.start, sorted[first]),
                    end: TimeOfDay::since(window.start, sorted[last]),
                    observation_count: last - first + 1,
                    first_index: first,
                    last_index: last,
                }
            })
            .collect::<Vec<ObservedArc>>();

        match nominal_interval {
            Some(nominal) => info!("nominal observation interval for {satellite} = {nominal}"),
            None => warn!("{satellite} has a single epoch, nominal interval is undefined"),
        }
        for (i, arc) in arcs.iter().enumerate() {
            info!(
                "   arc[{i}]: {} -> {} ({} obs)",
                arc.start, arc.end, arc.observation_count
            );
        }

        Ok(Segmentation {
            satellite: satellite.to_string(),
            nominal_interval,
            gaps,
            arcs,
        })
    }
}

/// Segments the epochs of one satellite with the provided gap multiplier.
pub fn segment(
    satellite: &str,
    epochs: &[Epoch],
    window: &DayWindow,
    multiplier: u32,
) -> Result<Segmentation, ArcError> {
    ArcSegmenter::new(multiplier).segment(satellite, epochs, window)
}

/// Median of the provided durations, averaging the two middle values for an even count.
fn median(mut values: Vec<Duration>) -> Option<Duration> {
    if values.is_empty() {
        return None;
    }
    values.sort();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        let (lo, hi) = (values[mid - 1], values[mid]);
        Some(lo + (hi - lo) * 0.5)
    }
}
