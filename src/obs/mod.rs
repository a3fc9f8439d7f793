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

use crate::time::Epoch;
use std::fmt;
use std::collections::BTreeSet;

/// One observation of one satellite at one epoch, as read from the receiver log.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochRecord {
    pub epoch: Epoch,
    /// Satellite identifier, e.g. `G01` or `E24`
    pub satellite: String,
    /// Remaining columns of the row, untouched
    pub payload: Vec<String>,
}

impl EpochRecord {
    pub fn new(epoch: Epoch, satellite: &str) -> Self {
        Self {
            epoch,
            satellite: satellite.to_string(),
            payload: Vec::new(),
        }
    }
}

/// All of the observation records of a run, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationTable {
    pub records: Vec<EpochRecord>,
    /// Source file if loaded from a file.
    pub source: Option<String>,
}

impl ObservationTable {
    pub fn from_records(records: Vec<EpochRecord>) -> Self {
        Self {
            records,
            source: None,
        }
    }

    /// Returns the sorted set of satellites present in this table
    pub fn satellites(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.satellite.clone()).collect()
    }

    /// Returns the epochs of the provided satellite sorted in ascending order.
    ///
    /// The sort is stable, so epochs with equal time tags keep their file order. The table itself is not reordered.
    pub fn epochs_of(&self, satellite: &str) -> Vec<Epoch> {
        let mut epochs = self
            .records
            .iter()
            .filter(|r| r.satellite == satellite)
            .map(|r| r.epoch)
            .collect::<Vec<Epoch>>();
        epochs.sort();
        epochs
    }

    /// Returns the start epoch of this table
    pub fn start_epoch(&self) -> Option<Epoch> {
        self.records.iter().map(|r| r.epoch).min()
    }

    /// Returns the end epoch of this table
    pub fn end_epoch(&self) -> Option<Epoch> {
        self.records.iter().map(|r| r.epoch).max()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for ObservationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start_epoch(), self.end_epoch()) {
            (Some(start), Some(end)) => {
                let src = match &self.source {
                    Some(src) => format!(" (source: {src})"),
                    None => String::new(),
                };
                write!(
                    f,
                    "Observation table with {} records of {} satellites over {} (from {start} to {end}){src}",
                    self.len(),
                    self.satellites().len(),
                    end - start,
                )
            }
            _ => write!(f, "Empty observation table"),
        }
    }
}
