use super::{config, g01_pass, FixtureEvents};
use gnss_arcs::prelude::*;
use rstest::*;

#[rstest]
fn g01_dropout_is_partially_tracked(config: RunConfig, g01_pass: FixtureEvents) {
    let _ = pretty_env_logger::try_init();

    let ctx = PipelineContext::from_config(&config).unwrap();
    let report = run(&ctx, &g01_pass).unwrap();

    let g01 = report.report_of("G01").unwrap();
    assert_eq!(g01.catalog_id.as_deref(), Some("37753U"));
    assert_eq!(g01.nominal_interval, Some(30.seconds()));

    assert_eq!(g01.observed.len(), 2);
    assert_eq!(g01.observed[0].start, TimeOfDay::from_hms(8, 0, 0));
    assert_eq!(g01.observed[0].end, TimeOfDay::from_hms(8, 9, 30));
    assert_eq!(g01.observed[0].observation_count, 20);
    assert_eq!(g01.observed[1].start, TimeOfDay::from_hms(8, 20, 0));
    assert_eq!(g01.observed[1].end, TimeOfDay::from_hms(8, 30, 0));
    assert_eq!(g01.observed[1].observation_count, 21);

    assert_eq!(g01.predicted.len(), 1);
    assert_eq!(g01.predicted[0].start, TimeOfDay::from_hms(7, 55, 0));
    assert_eq!(g01.predicted[0].end, TimeOfDay::from_hms(8, 35, 0));

    let results = g01.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].classification, Classification::PartiallyTracked);
    assert_eq!(results[0].overlapping, g01.observed);

    // E11 has a TLE but no predicted pass in the fixture
    let e11 = report.report_of("E11").unwrap();
    assert!(e11.failure().is_none());
    assert!(e11.predicted.is_empty());
    assert_eq!(e11.observed.len(), 1);

    // Results are ordered by satellite then by predicted arc
    assert_eq!(report.results().count(), 1);
    let order = report
        .satellites
        .iter()
        .map(|s| s.satellite.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(order, vec!["E11", "E24", "G01", "G02", "R07"]);
}

#[rstest]
fn runs_are_deterministic(config: RunConfig, g01_pass: FixtureEvents) {
    let ctx = PipelineContext::from_config(&config).unwrap();
    let first = run(&ctx, &g01_pass).unwrap();
    let second = run(&ctx, &g01_pass).unwrap();
    assert_eq!(first, second);
}

#[rstest]
fn sgp4_propagation(config: RunConfig) {
    let _ = pretty_env_logger::try_init();

    let mut cfg = config;
    cfg.satellites = Some(vec!["G01".to_string(), "E11".to_string()]);
    let report = run_config(&cfg).unwrap();

    for satellite in ["E11", "G01"] {
        let sat = report.report_of(satellite).unwrap();
        assert!(sat.failure().is_none(), "{sat}");
        assert!(!sat.predicted.is_empty(), "{sat}");
        for pair in sat.predicted.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert_eq!(sat.results().len(), sat.predicted.len());
    }
}
