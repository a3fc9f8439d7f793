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
use crate::errors::{ArcError, MalformedEventsSnafu};
use crate::time::{Duration, Epoch};
use crate::visibility::{DayWindow, EventKind, VisibilityEvent};
use serde_derive::Serialize;
use snafu::ensure;
use std::fmt;

/// A window during which the satellite is predicted above the elevation mask of the site.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictedArc {
    pub satellite: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    /// Set if the satellite was already up at the start of the day window
    pub truncated_start: bool,
    /// Set if the satellite was still up at the end of the day window
    pub truncated_end: bool,
    /// Culminations within this arc, informational only
    pub culminations: Vec<TimeOfDay>,
}

impl PredictedArc {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated_start || self.truncated_end
    }
}

impl fmt::Display for PredictedArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{} -> {}{} (lasts {})",
            self.satellite,
            if self.truncated_start { "<" } else { "" },
            self.start,
            self.end,
            if self.truncated_end { ">" } else { "" },
            self.duration()
        )
    }
}

/// An arc which has risen but not yet set.
struct OpenArc {
    start: Epoch,
    truncated_start: bool,
    culminations: Vec<TimeOfDay>,
}

impl OpenArc {
    fn close(self, satellite: &str, window: &DayWindow, end: Epoch, truncated_end: bool) -> PredictedArc {
        PredictedArc {
            satellite: satellite.to_string(),
            start: TimeOfDay::since(window.start, self.start),
            end: TimeOfDay::since(window.start, end),
            truncated_start: self.truncated_start,
            truncated_end,
            culminations: self.culminations,
        }
    }
}

/// Pairs each rise with the next set to build the predicted arcs of a satellite over the day window.
///
/// Culminations do not delimit arcs. A set without a preceding rise starts at the beginning of the window,
/// and a rise without a following set ends at the end of the window: both are flagged as truncated.
/// Events must be in chronological order, events outside of the window are ignored.
pub fn to_predicted_arcs(
    satellite: &str,
    events: &[VisibilityEvent],
    window: &DayWindow,
) -> Result<Vec<PredictedArc>, ArcError> {
    if let Some(pair) = events.windows(2).find(|w| w[1].epoch < w[0].epoch) {
        return MalformedEventsSnafu {
            satellite,
            details: format!("{} precedes {}", pair[1], pair[0]),
        }
        .fail();
    }

    let mut arcs = Vec::new();
    let mut open: Option<OpenArc> = None;

    for event in events {
        if !window.contains(event.epoch) {
            warn!("{satellite}: ignoring {event} outside of {window}");
            continue;
        }
        debug!("{satellite}: {event}");

        match event.kind {
            EventKind::Rise => {
                if open.is_some() {
                    warn!("{satellite}: ignoring {event}, the satellite has not set yet");
                } else {
                    open = Some(OpenArc {
                        start: event.epoch,
                        truncated_start: false,
                        culminations: Vec::new(),
                    });
                }
            }
            EventKind::Culminate => {
                // A culmination before any rise means the satellite was up when the window opened.
                open.get_or_insert_with(|| OpenArc {
                    start: window.start,
                    truncated_start: true,
                    culminations: Vec::new(),
                })
                .culminations
                .push(TimeOfDay::since(window.start, event.epoch));
            }
            EventKind::Set => {
                let arc = open.take().unwrap_or(OpenArc {
                    start: window.start,
                    truncated_start: true,
                    culminations: Vec::new(),
                });
                arcs.push(arc.close(satellite, window, event.epoch, false));
            }
        }
    }

    if let Some(arc) = open.take() {
        arcs.push(arc.close(satellite, window, window.end, true));
    }

    let (arcs, empty): (Vec<PredictedArc>, Vec<PredictedArc>) =
        arcs.into_iter().partition(|arc| arc.start < arc.end);
    for arc in &empty {
        warn!("{satellite}: dropping zero-length arc at {}", arc.start);
    }

    ensure!(
        arcs.windows(2).all(|w| w[0].end <= w[1].start),
        MalformedEventsSnafu {
            satellite,
            details: "predicted arcs overlap".to_string(),
        }
    );

    Ok(arcs)
}
