use crate::{may_2nd, test_data};
use gnss_arcs::io::ConfigRepr;
use gnss_arcs::prelude::*;
use rstest::*;
use std::collections::BTreeMap;

mod end_to_end;
mod export;

/// Visibility events known in advance for each satellite, in place of an orbital propagator.
pub struct FixtureEvents {
    pub events: BTreeMap<String, Vec<VisibilityEvent>>,
    /// Catalog identifiers whose propagation fails
    pub failing: Vec<String>,
}

impl VisibilityEventSource for FixtureEvents {
    fn events(
        &self,
        tle: &TleRecord,
        _site: &GroundSite,
        window: &DayWindow,
    ) -> Result<Vec<VisibilityEvent>, TleError> {
        if self.failing.contains(&tle.catalog_id) {
            return Err(TleError::Propagation {
                catalog_id: tle.catalog_id.clone(),
                details: "fixture failure".to_string(),
            });
        }
        Ok(self
            .events
            .get(&tle.satellite)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| window.contains(e.epoch))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[fixture]
pub fn config() -> RunConfig {
    let mut cfg = RunConfig::load(test_data(&["config", "rma_20123.yaml"])).unwrap();
    // Paths in the configuration are relative to the crate root
    let root = test_data(&[]).join("..").join("..");
    cfg.obstab = root.join(&cfg.obstab);
    cfg.catalog = root.join(&cfg.catalog);
    cfg.tle_dir = root.join(&cfg.tle_dir);
    cfg
}

#[fixture]
pub fn g01_pass() -> FixtureEvents {
    let mut events = BTreeMap::new();
    events.insert(
        "G01".to_string(),
        vec![
            VisibilityEvent::new(may_2nd(7, 55, 0), EventKind::Rise),
            VisibilityEvent::new(may_2nd(8, 15, 0), EventKind::Culminate),
            VisibilityEvent::new(may_2nd(8, 35, 0), EventKind::Set),
        ],
    );
    FixtureEvents {
        events,
        failing: Vec::new(),
    }
}

#[rstest]
fn config_file(config: RunConfig) {
    assert_eq!(config.day, DayOfYear::new(2020, 123));
    assert_eq!(config.station.name, "RMA");
    assert_eq!(config.station.height_km, 0.1);
    assert_eq!(config.segmentation, ArcSegmenter::new(5));
    assert_eq!(config.reconcile, ReconcileConfig::default());
    assert_eq!(config.search, Sgp4Visibility::default());
    assert!(config.output.parquet.is_some());
    assert!(config.validate().is_ok());
}

#[rstest]
fn failures_are_reported_per_satellite(config: RunConfig, g01_pass: FixtureEvents) {
    let _ = pretty_env_logger::try_init();

    let mut cfg = config;
    cfg.satellites = Some(vec![
        "R07".to_string(),
        "G01".to_string(),
        "E24".to_string(),
        "G02".to_string(),
        "E11".to_string(),
        "C19".to_string(),
    ]);
    let ctx = PipelineContext::from_config(&cfg).unwrap();

    let source = FixtureEvents {
        failing: vec!["37846U".to_string()],
        ..g01_pass
    };
    let report = run(&ctx, &source).unwrap();

    let order = report
        .satellites
        .iter()
        .map(|s| s.satellite.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(order, vec!["C19", "E11", "E24", "G01", "G02", "R07"]);

    let failures = report.failures().into_iter().collect::<BTreeMap<_, _>>();
    assert_eq!(failures.len(), 5);
    // No data, no catalog, no TLE and propagation failures are all distinct
    assert_eq!(failures["C19"], &SatelliteFailure::EmptySeries);
    assert_eq!(
        failures["R07"],
        &SatelliteFailure::CatalogUnresolved { matches: 0 }
    );
    assert_eq!(
        failures["G02"],
        &SatelliteFailure::CatalogUnresolved { matches: 2 }
    );
    assert_eq!(
        failures["E24"],
        &SatelliteFailure::NoTleAvailable {
            catalog_id: "40545U".to_string()
        }
    );
    assert!(matches!(
        failures["E11"],
        SatelliteFailure::PropagationFailed { .. }
    ));
    assert!(!failures["C19"].is_prediction_gap());
    assert!(failures["R07"].is_prediction_gap());

    // Satellites without predictions keep their observed arcs
    let r07 = report.report_of("R07").unwrap();
    assert_eq!(r07.observed.len(), 1);
    assert_eq!(r07.nominal_interval, Some(30.seconds()));
    assert!(report.report_of("C19").unwrap().observed.is_empty());

    assert_eq!(report.reconciled().count(), 1);
    let summary = format!("{report}");
    assert!(summary.contains("C19: no data"), "{summary}");
    assert!(summary.contains("R07: no catalog entry"), "{summary}");
}

#[rstest]
fn nothing_reconciled(config: RunConfig, g01_pass: FixtureEvents) {
    let mut cfg = config;
    cfg.satellites = Some(vec!["R07".to_string(), "C19".to_string()]);
    let ctx = PipelineContext::from_config(&cfg).unwrap();

    match run(&ctx, &g01_pass) {
        Err(ArcError::NothingReconciled { failures }) => {
            assert_eq!(
                failures,
                vec![
                    ("C19".to_string(), SatelliteFailure::EmptySeries),
                    (
                        "R07".to_string(),
                        SatelliteFailure::CatalogUnresolved { matches: 0 }
                    )
                ]
            );
        }
        other => panic!("expected no reconciliation, got {other:?}"),
    }
}

#[rstest]
fn malformed_inputs_are_fatal(config: RunConfig) {
    let mut cfg = config.clone();
    cfg.obstab = test_data(&["gnss-norad-prn.csv"]);
    let err = PipelineContext::from_config(&cfg).unwrap_err();
    assert!(matches!(err, ArcError::MalformedInput { .. }), "{err}");

    let mut cfg = config;
    cfg.segmentation.multiplier = 0;
    let err = PipelineContext::from_config(&cfg).unwrap_err();
    assert!(matches!(err, ArcError::Config { .. }), "{err}");
}
