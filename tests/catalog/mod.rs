use crate::test_data;
use gnss_arcs::io::catalog::load_catalog;
use gnss_arcs::io::tle::TleStore;
use gnss_arcs::prelude::*;
use rstest::*;

#[fixture]
fn catalog() -> Catalog {
    load_catalog(test_data(&["gnss-norad-prn.csv"])).unwrap()
}

#[fixture]
fn store() -> TleStore {
    TleStore::new(test_data(&["tle"]))
}

#[rstest]
fn resolution(catalog: Catalog) {
    let _ = pretty_env_logger::try_init();

    let resolution = catalog.resolve(["G01", "G02", "E11", "R07"]);
    assert_eq!(resolution.catalog_id("G01"), Some("37753U"));
    assert_eq!(resolution.catalog_id("E11"), Some("37846U"));
    // Ambiguous and missing identifiers are kept, with an empty catalog identifier
    assert_eq!(resolution.unresolved.get("G02"), Some(&2));
    assert_eq!(resolution.unresolved.get("R07"), Some(&0));

    let map = resolution.as_map();
    assert_eq!(map.len(), 4);
    assert_eq!(map["G02"], "");
    assert_eq!(map["R07"], "");

    assert_eq!(resolve(["R07", "G01", "E11", "G02"], &catalog), resolution);
}

#[rstest]
fn equidistant_tles_pick_the_first(store: TleStore) {
    let _ = pretty_env_logger::try_init();

    let entries = store.load("37753U").unwrap();
    assert_eq!(entries.len(), 3);

    // Epochs 122.5 and 123.5 are both half a day from the start of day 123
    let selected = select_tle("37753U", &DayOfYear::new(2020, 123), &entries).unwrap();
    assert_eq!(selected, &entries[1]);
    assert_eq!(selected.epoch.doy, 122.5);

    let selected = select_tle("37753U", &DayOfYear::new(2020, 125), &entries).unwrap();
    assert_eq!(selected, &entries[2]);

    let selected = select_tle("37753U", &DayOfYear::new(2019, 300), &entries).unwrap();
    assert_eq!(selected, &entries[0]);
}

#[rstest]
fn no_tle_file(store: TleStore) {
    let entries = store.load("40545U").unwrap();
    assert!(entries.is_empty());
    assert_eq!(
        select_tle("40545U", &DayOfYear::new(2020, 123), &entries),
        Err(TleError::NoTleAvailable {
            catalog_id: "40545U".to_string()
        })
    );
}
