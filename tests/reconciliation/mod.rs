use approx::assert_relative_eq;
use gnss_arcs::prelude::*;
use rstest::*;

fn observed(satellite: &str, start: (u8, u8), end: (u8, u8)) -> ObservedArc {
    ObservedArc {
        satellite: satellite.to_string(),
        start: TimeOfDay::from_hms(start.0, start.1, 0),
        end: TimeOfDay::from_hms(end.0, end.1, 0),
        observation_count: 1 + usize::from(end.1.abs_diff(start.1)) * 2,
        first_index: 0,
        last_index: usize::from(end.1.abs_diff(start.1)) * 2,
    }
}

#[fixture]
fn ten_minute_pass() -> Vec<PredictedArc> {
    vec![PredictedArc {
        satellite: "G01".to_string(),
        start: TimeOfDay::from_hms(10, 0, 0),
        end: TimeOfDay::from_hms(10, 10, 0),
        truncated_start: false,
        truncated_end: false,
        culminations: vec![TimeOfDay::from_hms(10, 5, 0)],
    }]
}

#[rstest]
#[case::full_span(Coverage::default(), Classification::PartiallyTracked)]
#[case::wide_tolerance(Coverage::FullSpan { tolerance: 3.minutes() }, Classification::FullyTracked)]
#[case::half(Coverage::Fraction(0.5), Classification::FullyTracked)]
#[case::most(Coverage::Fraction(0.75), Classification::PartiallyTracked)]
fn inner_arc(
    ten_minute_pass: Vec<PredictedArc>,
    #[case] coverage: Coverage,
    #[case] expected: Classification,
) {
    let _ = pretty_env_logger::try_init();

    let obs = vec![observed("G01", (10, 2), (10, 8))];
    let cfg = ReconcileConfig::builder().coverage(coverage).build();
    let results = reconcile(&obs, &ten_minute_pass, "G01", &cfg);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].classification, expected);
    assert_eq!(results[0].overlapping, obs);
    assert_eq!(results[0].covered, 6.minutes());
}

#[rstest]
fn missed(ten_minute_pass: Vec<PredictedArc>) {
    let obs = vec![
        observed("G02", (10, 0), (10, 10)),
        observed("G01", (11, 0), (11, 10)),
    ];
    let results = reconcile(&obs, &ten_minute_pass, "G01", &ReconcileConfig::default());
    assert_eq!(results[0].classification, Classification::Missed);
    assert!(results[0].overlapping.is_empty());
}

#[rstest]
fn two_disjoint_arcs(
    ten_minute_pass: Vec<PredictedArc>,
    #[values(Coverage::default(), Coverage::Fraction(0.1))] coverage: Coverage,
) {
    let obs = vec![
        observed("G01", (10, 0), (10, 3)),
        observed("G01", (10, 7), (10, 10)),
    ];
    let cfg = ReconcileConfig::builder().coverage(coverage).build();
    let results = reconcile(&obs, &ten_minute_pass, "G01", &cfg);
    assert_eq!(results[0].classification, Classification::PartiallyTracked);
    assert_eq!(results[0].overlapping, obs);
    assert_relative_eq!(results[0].coverage_fraction(), 0.6, epsilon = 1e-12);
}
