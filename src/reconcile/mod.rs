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

use crate::arcs::{ObservedArc, PredictedArc};
use crate::io::{duration_from_str, duration_to_str};
use crate::time::{Duration, TimeUnits};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Classification of a predicted visibility window against the observed arcs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    FullyTracked,
    PartiallyTracked,
    Missed,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullyTracked => write!(f, "fully-tracked"),
            Self::PartiallyTracked => write!(f, "partially-tracked"),
            Self::Missed => write!(f, "missed"),
        }
    }
}

/// Determines when a single overlapping observed arc counts as a full track of a predicted arc.
#[derive(Copy, Clone, Deserialize, PartialEq, Serialize)]
pub enum Coverage {
    /// The observed arc must span the predicted arc, each end being allowed to fall short by the tolerance
    FullSpan {
        #[serde(
            serialize_with = "duration_to_str",
            deserialize_with = "duration_from_str"
        )]
        tolerance: Duration,
    },
    /// The observed arc, clipped to the predicted arc, must cover at least this fraction of it
    Fraction(f64),
}

impl Default for Coverage {
    fn default() -> Self {
        Self::FullSpan {
            tolerance: 90.seconds(),
        }
    }
}

impl fmt::Debug for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullSpan { tolerance } => f
                .debug_struct("FullSpan")
                .field("tolerance", &format!("{tolerance}"))
                .finish(),
            Self::Fraction(fraction) => write!(f, "Fraction({fraction})"),
        }
    }
}

impl Coverage {
    /// Returns whether this observed arc alone is a full track of the predicted arc
    pub fn is_full(&self, observed: &ObservedArc, predicted: &PredictedArc) -> bool {
        match *self {
            Self::FullSpan { tolerance } => {
                observed.start <= predicted.start + tolerance
                    && observed.end >= predicted.end - tolerance
            }
            Self::Fraction(fraction) => {
                coverage_fraction(covered_by(observed, predicted), predicted) >= fraction
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ReconcileConfig {
    #[builder(default)]
    #[serde(default)]
    pub coverage: Coverage,
}

/// Outcome of the reconciliation of one predicted arc.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub satellite: String,
    pub predicted: PredictedArc,
    pub classification: Classification,
    /// Observed arcs overlapping the predicted arc, in chronological order
    pub overlapping: Vec<ObservedArc>,
    /// Total time of the predicted arc covered by the overlapping arcs
    #[serde(serialize_with = "duration_to_str")]
    pub covered: Duration,
}

impl ReconciliationResult {
    pub fn coverage_fraction(&self) -> f64 {
        coverage_fraction(self.covered, &self.predicted)
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- {} by {} arc(s), {:.1} %",
            self.predicted,
            self.classification,
            self.overlapping.len(),
            self.coverage_fraction() * 100.0
        )
    }
}

fn overlaps(observed: &ObservedArc, predicted: &PredictedArc) -> bool {
    observed.start < predicted.end && observed.end > predicted.start
}

/// Duration of the observed arc clipped to the predicted arc
fn covered_by(observed: &ObservedArc, predicted: &PredictedArc) -> Duration {
    let start = observed.start.max(predicted.start);
    let end = observed.end.min(predicted.end);
    if end > start {
        end - start
    } else {
        Duration::ZERO
    }
}

fn coverage_fraction(covered: Duration, predicted: &PredictedArc) -> f64 {
    let span = predicted.duration();
    if span > Duration::ZERO {
        covered.to_seconds() / span.to_seconds()
    } else if covered > Duration::ZERO {
        1.0
    } else {
        0.0
    }
}

/// Classifies each predicted arc of the satellite against its observed arcs.
///
/// Arcs of other satellites are ignored. The results are in chronological order of the predicted arcs.
pub fn reconcile(
    observed: &[ObservedArc],
    predicted: &[PredictedArc],
    satellite: &str,
    cfg: &ReconcileConfig,
) -> Vec<ReconciliationResult> {
    let mut observed = observed
        .iter()
        .filter(|o| o.satellite == satellite)
        .collect::<Vec<&ObservedArc>>();
    observed.sort_by_key(|o| (o.start, o.end));

    let mut predicted = predicted
        .iter()
        .filter(|p| p.satellite == satellite)
        .collect::<Vec<&PredictedArc>>();
    predicted.sort_by_key(|p| (p.start, p.end));

    predicted
        .into_iter()
        .map(|p| {
            let overlapping = observed
                .iter()
                .filter(|o| overlaps(o, p))
                .map(|&o| o.clone())
                .collect::<Vec<ObservedArc>>();

            let covered = overlapping
                .iter()
                .fold(Duration::ZERO, |acc, o| acc + covered_by(o, p));

            let classification = match overlapping.as_slice() {
                [] => Classification::Missed,
                [single] if cfg.coverage.is_full(single, p) => Classification::FullyTracked,
                _ => Classification::PartiallyTracked,
            };

            let result = ReconciliationResult {
                satellite: satellite.to_string(),
                predicted: p.clone(),
                classification,
                overlapping,
                covered,
            };
            match classification {
                Classification::Missed => warn!("{result}"),
                _ => info!("{result}"),
            }
            result
        })
        .collect()
}
