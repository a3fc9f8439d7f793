mod arcs;
mod catalog;
mod pipeline;
mod reconciliation;

use gnss_arcs::time::Epoch;
use gnss_arcs::visibility::{DayOfYear, DayWindow};
use std::path::PathBuf;

/// Path to a test data file, relative to the `data/tests` directory of this crate
pub fn test_data(parts: &[&str]) -> PathBuf {
    let manifest_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()));

    parts
        .iter()
        .fold(manifest_dir.join("data").join("tests"), |path, part| {
            path.join(part)
        })
}

/// An epoch on the second of May 2020, day 123 of the test data
pub fn may_2nd(hours: u8, minutes: u8, seconds: u8) -> Epoch {
    Epoch::from_gregorian_utc_hms(2020, 5, 2, hours, minutes, seconds)
}

/// The day window of the test data, 2020 day 123
pub fn day_123() -> DayWindow {
    DayOfYear::new(2020, 123).window()
}
