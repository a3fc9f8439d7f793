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

/*! # gnss-arcs

Post-processing of GNSS receiver observation logs against orbital predictions.

For every satellite, the observation epochs are segmented into contiguous tracking arcs using a gap
threshold derived from the nominal sampling interval of that satellite. The TLE closest to the processed day
is propagated to find the rise, culmination and set of the satellite above a ground site, and each predicted
visibility window is then reconciled against the observed arcs as fully tracked, partially tracked or missed.
*/

/// Observed and predicted arcs, and the segmentation of observation epochs into arcs.
pub mod arcs;

/// Satellite catalog resolution and selection of the two-line elements closest to the processed day.
pub mod catalog;

mod errors;
/// Functions which may fail return one of these errors, per-satellite failures are collected instead of raised.
pub use self::errors::{ArcError, FormatError, SatelliteFailure, TleError};

/// All the input/output needs: observation tables, catalogs, TLE files, configuration and report export.
pub mod io;

/// Observation epochs as loaded from a receiver log.
pub mod obs;

/// The batch driver tying segmentation, catalog resolution, propagation and reconciliation together.
pub mod pipeline;

/// Classification of predicted visibility windows against observed tracking arcs.
pub mod reconcile;

/// Rise, culmination and set events of a satellite above a ground site.
pub mod visibility;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

#[allow(unused_imports)]
pub mod prelude {
    pub use crate::arcs::*;
    pub use crate::catalog::*;
    pub use crate::io::{ConfigRepr, ExportCfg};
    pub use crate::obs::*;
    pub use crate::pipeline::*;
    pub use crate::reconcile::*;
    pub use crate::visibility::*;
    pub use crate::{ArcError, FormatError, SatelliteFailure, TleError};

    pub use crate::time::{Duration, Epoch, TimeUnits, Unit};
}
