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

use super::{DayWindow, EventKind, GroundSite, VisibilityEvent, VisibilityEventSource};
use crate::catalog::TleRecord;
use crate::errors::{InvalidElementsSnafu, PropagationSnafu, TleError};
use crate::io::{duration_from_str, duration_to_str};
use crate::time::{Duration, Epoch, TimeUnits, Unit};
use na::{Matrix3, Vector3};
use serde_derive::{Deserialize, Serialize};
use sgp4::{Constants, Elements, MinutesSinceEpoch};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// WGS-84 semi major axis in km
const WGS84_A_KM: f64 = 6378.137;
/// WGS-84 flattening
const WGS84_F: f64 = 1.0 / 298.257223563;
/// Julian date of J2000, 2000-01-01 12:00:00 UTC
const J2000_JDE: f64 = 2_451_545.0;

/// Computes the visibility events by propagating the TLE with SGP4.
///
/// The elevation of the satellite is sampled every `step` over the window. Sign changes of the elevation above
/// the mask are then refined by bisection down to `precision`, as are the local maxima (culminations).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct Sgp4Visibility {
    /// Sampling step of the elevation, must be shorter than the shortest pass to be found
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = 60.seconds())]
    pub step: Duration,
    /// Precision of the rise, set and culmination epochs
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = 1.seconds())]
    pub precision: Duration,
}

impl Default for Sgp4Visibility {
    fn default() -> Self {
        Self {
            step: 60.seconds(),
            precision: 1.seconds(),
        }
    }
}

impl fmt::Display for Sgp4Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SGP4 (step: {}, precision: {})", self.step, self.precision)
    }
}

/// Elevation of one satellite as seen from one site.
struct Tracker<'a> {
    catalog_id: &'a str,
    constants: Constants,
    tle_epoch: Epoch,
    site_ecef_km: Vector3<f64>,
    /// Rotation from ECEF to the site's East-North-Up frame
    ecef_to_enu: Matrix3<f64>,
    mask_deg: f64,
}

impl<'a> Tracker<'a> {
    fn new(tle: &'a TleRecord, site: &GroundSite) -> Result<Self, TleError> {
        let catalog_id = tle.catalog_id.as_str();
        let elements = Elements::from_tle(
            Some(tle.satellite.clone()),
            tle.line1.as_bytes(),
            tle.line2.as_bytes(),
        )
        .map_err(|e| TleError::InvalidElements {
            catalog_id: catalog_id.to_string(),
            details: e.to_string(),
        })?;

        let constants =
            Constants::from_elements(&elements).map_err(|e| TleError::InvalidElements {
                catalog_id: catalog_id.to_string(),
                details: e.to_string(),
            })?;

        let lat = site.latitude_deg.to_radians();
        let long = site.longitude_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_long, cos_long) = long.sin_cos();

        let e2 = WGS84_F * (2.0 - WGS84_F);
        let n = WGS84_A_KM / (1.0 - e2 * sin_lat.powi(2)).sqrt();
        let site_ecef_km = Vector3::new(
            (n + site.height_km) * cos_lat * cos_long,
            (n + site.height_km) * cos_lat * sin_long,
            (n * (1.0 - e2) + site.height_km) * sin_lat,
        );

        #[rustfmt::skip]
        let ecef_to_enu = Matrix3::new(
            -sin_long,           cos_long,            0.0,
            -sin_lat * cos_long, -sin_lat * sin_long, cos_lat,
            cos_lat * cos_long,  cos_lat * sin_long,  sin_lat,
        );

        Ok(Self {
            catalog_id,
            constants,
            tle_epoch: tle.epoch.to_epoch(),
            site_ecef_km,
            ecef_to_enu,
            mask_deg: site.elevation_mask_deg,
        })
    }

    /// Elevation in degrees of the satellite above the site at the provided epoch
    fn elevation_deg(&self, epoch: Epoch) -> Result<f64, TleError> {
        let minutes = (epoch - self.tle_epoch).to_unit(Unit::Minute);
        let prediction = self
            .constants
            .propagate(MinutesSinceEpoch(minutes))
            .map_err(|e| TleError::Propagation {
                catalog_id: self.catalog_id.to_string(),
                details: format!("at {epoch}: {e}"),
            })?;

        let r_teme = Vector3::from(prediction.position);
        let theta = gmst_deg(epoch).to_radians();
        let (sin_t, cos_t) = theta.sin_cos();
        #[rustfmt::skip]
        let teme_to_ecef = Matrix3::new(
            cos_t,  sin_t, 0.0,
            -sin_t, cos_t, 0.0,
            0.0,    0.0,   1.0,
        );

        let rho_enu = self.ecef_to_enu * (teme_to_ecef * r_teme - self.site_ecef_km);
        let range = rho_enu.norm();
        ensure!(
            range > f64::EPSILON,
            PropagationSnafu {
                catalog_id: self.catalog_id,
                details: format!("null range at {epoch}")
            }
        );

        Ok((rho_enu.z / range).asin().to_degrees())
    }

    /// Elevation above the mask, positive when visible
    fn above_mask(&self, epoch: Epoch) -> Result<f64, TleError> {
        Ok(self.elevation_deg(epoch)? - self.mask_deg)
    }
}

/// Greenwich mean sidereal time in degrees, in [0, 360)
fn gmst_deg(epoch: Epoch) -> f64 {
    let days = epoch.to_jde_utc_days() - J2000_JDE;
    (280.460_618_37 + 360.985_647_366_29 * days).rem_euclid(360.0)
}

impl Sgp4Visibility {
    /// Finds the epoch where the elevation crosses the mask between `a` and `b`, by bisection.
    fn crossing(
        &self,
        tracker: &Tracker,
        a: Epoch,
        ya: f64,
        b: Epoch,
    ) -> Result<Epoch, TleError> {
        let max_iter = 64;
        let precision_s = self.precision.to_seconds();
        let (mut xa, mut xb) = (0.0, (b - a).to_seconds());
        let mut ya = ya;
        for _ in 0..max_iter {
            if (xb - xa).abs() <= precision_s {
                break;
            }
            let xm = 0.5 * (xa + xb);
            let ym = tracker.above_mask(a + xm.seconds())?;
            if (ym >= 0.0) == (ya >= 0.0) {
                xa = xm;
                ya = ym;
            } else {
                xb = xm;
            }
        }
        Ok(a + xb.seconds())
    }

    /// Finds the highest elevation between `a` and `b`, by golden section search.
    fn culmination(&self, tracker: &Tracker, a: Epoch, b: Epoch) -> Result<(Epoch, f64), TleError> {
        let inv_phi = (5.0_f64.sqrt() - 1.0) / 2.0;
        let precision_s = self.precision.to_seconds();
        let (mut xa, mut xb) = (0.0, (b - a).to_seconds());
        let mut xc = xb - inv_phi * (xb - xa);
        let mut xd = xa + inv_phi * (xb - xa);
        let mut yc = tracker.above_mask(a + xc.seconds())?;
        let mut yd = tracker.above_mask(a + xd.seconds())?;
        while (xb - xa).abs() > precision_s {
            if yc > yd {
                xb = xd;
                xd = xc;
                yd = yc;
                xc = xb - inv_phi * (xb - xa);
                yc = tracker.above_mask(a + xc.seconds())?;
            } else {
                xa = xc;
                xc = xd;
                yc = yd;
                xd = xa + inv_phi * (xb - xa);
                yd = tracker.above_mask(a + xd.seconds())?;
            }
        }
        let x = 0.5 * (xa + xb);
        Ok((a + x.seconds(), tracker.above_mask(a + x.seconds())?))
    }
}

impl VisibilityEventSource for Sgp4Visibility {
    fn events(
        &self,
        tle: &TleRecord,
        site: &GroundSite,
        window: &DayWindow,
    ) -> Result<Vec<VisibilityEvent>, TleError> {
        ensure!(
            self.step > self.precision && self.precision > Duration::ZERO,
            InvalidElementsSnafu {
                catalog_id: &tle.catalog_id,
                details: format!("cannot search with {self}")
            }
        );

        let tracker = Tracker::new(tle, site)?;

        let mut samples = Vec::new();
        let mut epoch = window.start;
        while epoch < window.end {
            samples.push((epoch, tracker.above_mask(epoch)?));
            epoch += self.step;
        }
        // Last sample just before the end of the window, which is excluded
        let last = window.end - self.precision;
        if samples.last().map_or(true, |(e, _)| *e < last) {
            samples.push((last, tracker.above_mask(last)?));
        }

        let mut events = Vec::new();
        for pair in samples.windows(2) {
            let ((a, ya), (b, yb)) = (pair[0], pair[1]);
            if ya < 0.0 && yb >= 0.0 {
                let rise = self.crossing(&tracker, a, ya, b)?;
                events.push(VisibilityEvent::new(rise, EventKind::Rise));
            } else if ya >= 0.0 && yb < 0.0 {
                let set = self.crossing(&tracker, a, ya, b)?;
                events.push(VisibilityEvent::new(set, EventKind::Set));
            }
        }

        for triplet in samples.windows(3) {
            let ((a, ya), (_, yb), (c, yc)) = (triplet[0], triplet[1], triplet[2]);
            if yb >= ya && yb > yc && yb > 0.0 {
                let (epoch, above) = self.culmination(&tracker, a, c)?;
                if above >= 0.0 && window.contains(epoch) {
                    events.push(VisibilityEvent::new(epoch, EventKind::Culminate));
                }
            }
        }

        if events.is_empty() && samples.iter().all(|(_, y)| *y >= 0.0) {
            warn!(
                "{} ({}) is above {} all of {window}",
                tle.satellite, tle.catalog_id, site.name
            );
        }

        events.sort_by(|a, b| a.epoch.cmp(&b.epoch));
        debug!(
            "{} ({}): {} visibility events over {}",
            tle.satellite,
            tle.catalog_id,
            events.len(),
            site.name
        );
        Ok(events)
    }
}
