use crate::{day_123, may_2nd};
use gnss_arcs::prelude::*;
use rstest::*;

fn epochs_at(offsets_s: &[i64]) -> Vec<Epoch> {
    let t0 = may_2nd(10, 0, 0);
    offsets_s.iter().map(|&s| t0 + s.seconds()).collect()
}

#[rstest]
#[case::regular(vec![0, 30, 60, 90, 120])]
#[case::one_gap(vec![0, 30, 60, 900, 930, 960])]
#[case::many_gaps(vec![0, 1, 2, 100, 101, 300, 301, 302, 303, 1000])]
#[case::duplicate_epochs(vec![0, 0, 30, 30, 60, 600, 600])]
#[case::single(vec![42])]
fn arcs_partition_the_epochs(#[case] offsets: Vec<i64>, #[values(1, 2, 5)] multiplier: u32) {
    let _ = pretty_env_logger::try_init();

    let epochs = epochs_at(&offsets);
    let seg = segment("G01", &epochs, &day_123(), multiplier).unwrap();

    assert!(!seg.arcs.is_empty());
    assert_eq!(seg.arcs[0].first_index, 0);
    assert_eq!(seg.arcs.last().unwrap().last_index, epochs.len() - 1);
    for pair in seg.arcs.windows(2) {
        assert_eq!(pair[0].last_index + 1, pair[1].first_index);
    }
    for arc in &seg.arcs {
        assert!(arc.first_index <= arc.last_index);
        assert_eq!(arc.observation_count, arc.last_index - arc.first_index + 1);
        assert_eq!(arc.start, TimeOfDay::since(day_123().start, epochs[arc.first_index]));
        assert_eq!(arc.end, TimeOfDay::since(day_123().start, epochs[arc.last_index]));
    }
    assert_eq!(
        seg.arcs.iter().map(|a| a.observation_count).sum::<usize>(),
        epochs.len()
    );
    assert_eq!(seg.gaps.len(), epochs.len());
}

#[test]
fn split_at_the_long_gap() {
    let _ = pretty_env_logger::try_init();

    // Gaps of 1, 1, 1, 30, 1, 1 seconds: the median is one second
    let epochs = epochs_at(&[0, 1, 2, 3, 33, 34, 35]);
    let seg = ArcSegmenter::builder()
        .build()
        .segment("G01", &epochs, &day_123())
        .unwrap();

    assert_eq!(seg.nominal_interval, Some(1.seconds()));
    assert_eq!(seg.arcs.len(), 2);
    assert_eq!((seg.arcs[0].first_index, seg.arcs[0].last_index), (0, 3));
    assert_eq!((seg.arcs[1].first_index, seg.arcs[1].last_index), (4, 6));
    assert_eq!(seg.arcs[0].end, TimeOfDay::from_hms(10, 0, 3));
    assert_eq!(seg.arcs[1].start, TimeOfDay::from_hms(10, 0, 33));

    // A threshold above the gap keeps a single arc
    let seg = segment("G01", &epochs, &day_123(), 30).unwrap();
    assert_eq!(seg.arcs.len(), 1);
}

#[test]
fn even_number_of_gaps() {
    // Gaps of 10, 20, 30, 40 seconds: the median is 25 seconds
    let epochs = epochs_at(&[0, 10, 30, 60, 100]);
    let seg = segment("E11", &epochs, &day_123(), 1).unwrap();
    assert_eq!(seg.nominal_interval, Some(25.seconds()));
    assert_eq!(seg.arcs.len(), 3);
}

#[test]
fn single_epoch_is_a_degenerate_arc() {
    let seg = segment("R07", &epochs_at(&[0]), &day_123(), 5).unwrap();
    assert!(seg.nominal_interval.is_none());
    assert!(seg.nominal_interval_s().is_nan());
    assert_eq!(seg.arcs.len(), 1);
    assert_eq!(seg.arcs[0].observation_count, 1);
    assert_eq!(seg.arcs[0].start, seg.arcs[0].end);
    assert_eq!(seg.arcs[0].duration(), Duration::ZERO);
}

#[test]
fn no_epoch_is_an_error() {
    let err = segment("R07", &[], &day_123(), 5).unwrap_err();
    assert!(matches!(err, ArcError::EmptySeries { .. }), "{err}");
}

#[test]
fn segmentation_is_idempotent() {
    let epochs = epochs_at(&[300, 0, 30, 60, 90, 1200, 1230, 1260, 330]);
    let before = epochs.clone();
    let segmenter = ArcSegmenter::new(3);

    let first = segmenter.segment("G01", &epochs, &day_123()).unwrap();
    let second = segmenter.segment("G01", &epochs, &day_123()).unwrap();
    assert_eq!(first, second);
    assert_eq!(epochs, before, "input must not be reordered");
    assert_eq!(first.arcs.len(), 3);
}

/// Every 30 seconds from `first` to `last`, both counted in seconds from the start of day 123
fn every_30s(first: i64, last: i64) -> Vec<Epoch> {
    (first..=last)
        .step_by(30)
        .map(|s| day_123().start + s.seconds())
        .collect()
}

fn pass_until_window_end(rise: TimeOfDay) -> PredictedArc {
    PredictedArc {
        satellite: "G01".to_string(),
        start: rise,
        end: TimeOfDay::MIDNIGHT + 1.days(),
        truncated_start: false,
        truncated_end: true,
        culminations: Vec::new(),
    }
}

#[test]
fn arc_running_past_midnight() {
    let _ = pretty_env_logger::try_init();

    // 23:59:00 to 00:01:00 of the next day
    let epochs = every_30s(86_340, 86_460);
    let seg = segment("G01", &epochs, &day_123(), 5).unwrap();

    assert_eq!(seg.arcs.len(), 1);
    let arc = &seg.arcs[0];
    assert!(arc.start <= arc.end, "{arc}");
    assert_eq!(arc.start, TimeOfDay::from_hms(23, 59, 0));
    assert_eq!(arc.end, TimeOfDay::MIDNIGHT + 1.days() + 1.minutes());
    assert_eq!(arc.observation_count, 5);

    // The satellite rose at 23:29 and is still up at the end of the window
    let predicted = vec![pass_until_window_end(TimeOfDay::from_hms(23, 29, 0))];
    let results = reconcile(&seg.arcs, &predicted, "G01", &ReconcileConfig::default());
    assert_eq!(results[0].classification, Classification::PartiallyTracked);
    assert_eq!(results[0].overlapping.len(), 1);
    assert_eq!(results[0].covered, 1.minutes());
}

#[test]
fn pass_truncated_at_window_end_is_tracked() {
    // From the rise at 23:29:00 until 00:01:00 of the next day
    let epochs = every_30s(84_540, 86_460);
    let seg = segment("G01", &epochs, &day_123(), 5).unwrap();
    assert_eq!(seg.arcs.len(), 1);

    let predicted = vec![pass_until_window_end(TimeOfDay::from_hms(23, 29, 0))];
    let results = reconcile(&seg.arcs, &predicted, "G01", &ReconcileConfig::default());
    assert_eq!(results[0].classification, Classification::FullyTracked);
    assert_eq!(results[0].covered, 31.minutes());
}
