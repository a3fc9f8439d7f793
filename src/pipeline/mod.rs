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

use crate::arcs::{ArcSegmenter, ObservedArc, PredictedArc};
use crate::catalog::{select_tle, Catalog, CatalogResolution, TleRecord};
use crate::errors::{ArcError, ConfigSnafu, MalformedInputSnafu, NothingReconciledSnafu};
use crate::io::catalog::load_catalog;
use crate::io::obstab::load_obstab;
use crate::io::tle::TleStore;
use crate::io::{maybe_duration_to_str, ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::obs::ObservationTable;
use crate::reconcile::{reconcile, Classification, Coverage, ReconcileConfig, ReconciliationResult};
use crate::time::Duration;
use crate::visibility::{DayOfYear, GroundSite, Sgp4Visibility, VisibilityEventSource};
use crate::SatelliteFailure;
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::path::PathBuf;
use typed_builder::TypedBuilder;

/// Optional outputs of a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct OutputCfg {
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub yaml: Option<PathBuf>,
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub parquet: Option<PathBuf>,
}

/// Configuration of one run, i.e. the processing of one day of observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct RunConfig {
    /// Observation table of the receiver
    #[builder(setter(into))]
    pub obstab: PathBuf,
    /// Satellite catalog CSV file
    #[builder(setter(into))]
    pub catalog: PathBuf,
    /// Directory of the `sat<NORAD>.txt` TLE files
    #[builder(setter(into))]
    pub tle_dir: PathBuf,
    pub day: DayOfYear,
    #[serde(default)]
    #[builder(default)]
    pub station: GroundSite,
    #[serde(default)]
    #[builder(default)]
    pub segmentation: ArcSegmenter,
    #[serde(default)]
    #[builder(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    #[builder(default)]
    pub search: Sgp4Visibility,
    /// Satellites to process, defaults to all of the satellites of the observation table
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub satellites: Option<Vec<String>>,
    #[serde(default)]
    #[builder(default)]
    pub output: OutputCfg,
}

impl ConfigRepr for RunConfig {}

impl RunConfig {
    /// Checks the values which the deserialization cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.segmentation.multiplier >= 1,
            InvalidConfigSnafu {
                msg: "segmentation multiplier must be at least 1"
            }
        );
        match self.reconcile.coverage {
            Coverage::Fraction(fraction) => ensure!(
                fraction > 0.0 && fraction <= 1.0,
                InvalidConfigSnafu {
                    msg: format!("coverage fraction {fraction} not in (0, 1]")
                }
            ),
            Coverage::FullSpan { tolerance } => ensure!(
                tolerance >= Duration::ZERO,
                InvalidConfigSnafu {
                    msg: format!("coverage tolerance {tolerance} is negative")
                }
            ),
        }
        ensure!(
            self.search.precision > Duration::ZERO && self.search.step > self.search.precision,
            InvalidConfigSnafu {
                msg: format!("search step must exceed its precision: {}", self.search)
            }
        );
        ensure!(
            self.station.latitude_deg.abs() <= 90.0
                && self.station.elevation_mask_deg.abs() <= 90.0,
            InvalidConfigSnafu {
                msg: format!("invalid station {}", self.station)
            }
        );
        Ok(())
    }
}

/// Everything a run needs, loaded once and shared read-only by all of the satellites.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub observations: ObservationTable,
    pub catalog: Catalog,
    pub tle_store: TleStore,
    pub day: DayOfYear,
    pub site: GroundSite,
    pub segmenter: ArcSegmenter,
    pub reconcile: ReconcileConfig,
    pub satellites: Option<Vec<String>>,
}

impl PipelineContext {
    /// Validates the configuration and loads the observation table and the catalog.
    pub fn from_config(cfg: &RunConfig) -> Result<Self, ArcError> {
        cfg.validate().context(ConfigSnafu)?;

        let observations = load_obstab(&cfg.obstab).context(MalformedInputSnafu {
            action: "loading observation table",
        })?;
        let catalog = load_catalog(&cfg.catalog).context(MalformedInputSnafu {
            action: "loading satellite catalog",
        })?;

        Ok(Self {
            observations,
            catalog,
            tle_store: TleStore::new(&cfg.tle_dir),
            day: cfg.day,
            site: cfg.station.clone(),
            segmenter: cfg.segmentation,
            reconcile: cfg.reconcile,
            satellites: cfg.satellites.clone(),
        })
    }

    /// Satellites of this run, sorted and without duplicates
    pub fn satellites(&self) -> Vec<String> {
        match &self.satellites {
            Some(requested) => {
                let mut satellites = requested.clone();
                satellites.sort();
                satellites.dedup();
                satellites
            }
            None => self.observations.satellites().into_iter().collect(),
        }
    }
}

/// Outcome of the processing of one satellite.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SatelliteStatus {
    Reconciled(Vec<ReconciliationResult>),
    Failed(SatelliteFailure),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SatelliteReport {
    pub satellite: String,
    pub catalog_id: Option<String>,
    #[serde(serialize_with = "maybe_duration_to_str")]
    pub nominal_interval: Option<Duration>,
    pub observed: Vec<ObservedArc>,
    pub predicted: Vec<PredictedArc>,
    pub status: SatelliteStatus,
}

impl SatelliteReport {
    fn failed(satellite: &str, failure: SatelliteFailure) -> Self {
        Self {
            satellite: satellite.to_string(),
            catalog_id: None,
            nominal_interval: None,
            observed: Vec::new(),
            predicted: Vec::new(),
            status: SatelliteStatus::Failed(failure),
        }
    }

    pub fn failure(&self) -> Option<&SatelliteFailure> {
        match &self.status {
            SatelliteStatus::Failed(failure) => Some(failure),
            SatelliteStatus::Reconciled(_) => None,
        }
    }

    pub fn results(&self) -> &[ReconciliationResult] {
        match &self.status {
            SatelliteStatus::Reconciled(results) => results,
            SatelliteStatus::Failed(_) => &[],
        }
    }
}

impl fmt::Display for SatelliteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            SatelliteStatus::Failed(failure) => write!(f, "{}: {failure}", self.satellite),
            SatelliteStatus::Reconciled(results) => {
                let count = |which: Classification| {
                    results
                        .iter()
                        .filter(|r| r.classification == which)
                        .count()
                };
                write!(
                    f,
                    "{}: {} observed arc(s), {} predicted arc(s): {} fully tracked, {} partially tracked, {} missed",
                    self.satellite,
                    self.observed.len(),
                    self.predicted.len(),
                    count(Classification::FullyTracked),
                    count(Classification::PartiallyTracked),
                    count(Classification::Missed)
                )
            }
        }
    }
}

/// Result of a run, with one report per satellite ordered by satellite identifier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub day: DayOfYear,
    pub site: GroundSite,
    pub satellites: Vec<SatelliteReport>,
}

impl RunReport {
    /// Satellites which could not be reconciled, with the reason why
    pub fn failures(&self) -> Vec<(&str, &SatelliteFailure)> {
        self.satellites
            .iter()
            .filter_map(|s| s.failure().map(|f| (s.satellite.as_str(), f)))
            .collect()
    }

    pub fn reconciled(&self) -> impl Iterator<Item = &SatelliteReport> {
        self.satellites.iter().filter(|s| s.failure().is_none())
    }

    /// All of the reconciliation results, by satellite then by predicted arc start
    pub fn results(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.satellites.iter().flat_map(|s| s.results().iter())
    }

    pub fn report_of(&self, satellite: &str) -> Option<&SatelliteReport> {
        self.satellites.iter().find(|s| s.satellite == satellite)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run of {} over {}: {} satellites, {} reconciled",
            self.day,
            self.site,
            self.satellites.len(),
            self.reconciled().count()
        )?;
        for report in &self.satellites {
            writeln!(f, "  {report}")?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline with the SGP4 visibility source configured in `cfg`.
pub fn run_config(cfg: &RunConfig) -> Result<RunReport, ArcError> {
    let ctx = PipelineContext::from_config(cfg)?;
    run(&ctx, &cfg.search)
}

/// Segments, predicts and reconciles every satellite of the context.
///
/// Satellites are processed in parallel and reported in the order of their identifiers. Satellites which
/// cannot be reconciled are reported with the reason why, and the run only fails if none is reconciled
/// or if an input is malformed.
pub fn run<S: VisibilityEventSource>(
    ctx: &PipelineContext,
    source: &S,
) -> Result<RunReport, ArcError> {
    let window = ctx.day.window();
    match (ctx.observations.start_epoch(), ctx.observations.end_epoch()) {
        (Some(start), Some(end)) if !window.contains(start) || !window.contains(end) => {
            warn!("observations from {start} to {end} exceed the day window {window}")
        }
        _ => {}
    }

    let satellites = ctx.satellites();
    info!("processing {} satellites for {}", satellites.len(), ctx.day);
    let resolution = ctx.catalog.resolve(satellites.iter().map(|s| s.as_str()));

    let reports = satellites
        .par_iter()
        .map(|satellite| process_satellite(ctx, &resolution, satellite, source))
        .collect::<Result<Vec<SatelliteReport>, ArcError>>()?;

    let report = RunReport {
        day: ctx.day,
        site: ctx.site.clone(),
        satellites: reports,
    };

    for (satellite, failure) in report.failures() {
        warn!("{satellite} not reconciled: {failure}");
    }

    ensure!(
        report.reconciled().count() > 0,
        NothingReconciledSnafu {
            failures: report
                .failures()
                .into_iter()
                .map(|(s, f)| (s.to_string(), f.clone()))
                .collect::<Vec<(String, SatelliteFailure)>>()
        }
    );

    info!("{report}");
    Ok(report)
}

fn process_satellite<S: VisibilityEventSource>(
    ctx: &PipelineContext,
    resolution: &CatalogResolution,
    satellite: &str,
    source: &S,
) -> Result<SatelliteReport, ArcError> {
    let epochs = ctx.observations.epochs_of(satellite);
    let segmentation = match ctx.segmenter.segment(satellite, &epochs, &ctx.day.window()) {
        Ok(segmentation) => segmentation,
        Err(ArcError::EmptySeries { .. }) => {
            warn!("{satellite} has no observation epochs");
            return Ok(SatelliteReport::failed(
                satellite,
                SatelliteFailure::EmptySeries,
            ));
        }
        Err(e) => return Err(e),
    };

    let mut report = SatelliteReport {
        satellite: satellite.to_string(),
        catalog_id: None,
        nominal_interval: segmentation.nominal_interval,
        observed: segmentation.arcs,
        predicted: Vec::new(),
        status: SatelliteStatus::Failed(SatelliteFailure::CatalogUnresolved { matches: 0 }),
    };

    let Some(catalog_id) = resolution.catalog_id(satellite) else {
        let matches = resolution.unresolved.get(satellite).copied().unwrap_or(0);
        report.status = SatelliteStatus::Failed(SatelliteFailure::CatalogUnresolved { matches });
        return Ok(report);
    };
    report.catalog_id = Some(catalog_id.to_string());

    let entries = ctx
        .tle_store
        .load(catalog_id)
        .context(MalformedInputSnafu {
            action: "loading TLE file",
        })?;

    let events = select_tle(catalog_id, &ctx.day, &entries)
        .map(|entry| TleRecord::from_entry(satellite, catalog_id, entry))
        .and_then(|tle| source.events(&tle, &ctx.site, &ctx.day.window()));

    let events = match events {
        Ok(events) => events,
        Err(e) => {
            warn!("{satellite}: {e}");
            report.status = SatelliteStatus::Failed(e.into());
            return Ok(report);
        }
    };

    report.predicted = crate::arcs::to_predicted_arcs(satellite, &events, &ctx.day.window())?;
    for (i, arc) in report.predicted.iter().enumerate() {
        info!("   predicted[{i}]: {arc}");
    }

    report.status = SatelliteStatus::Reconciled(reconcile(
        &report.observed,
        &report.predicted,
        satellite,
        &ctx.reconcile,
    ));

    Ok(report)
}
