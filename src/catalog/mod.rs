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

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod tle;
pub use tle::{select_tle, TleEntry, TleEpoch, TleRecord};

/// One row of the satellite catalog, linking a satellite identifier (PRN) to its NORAD catalog number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Constellation, e.g. `GPS` or `GALILEO`
    pub constellation: String,
    /// Space vehicle identifier, e.g. `SVN63`
    pub sv_id: String,
    /// Satellite identifier as found in the observation files, e.g. `G01`
    pub satellite: String,
    /// Opaque catalog identifier, e.g. `37753U`
    pub catalog_id: String,
    pub launch: String,
}

/// The satellite catalog, loaded once per run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    /// Source file if loaded from a file.
    pub source: Option<String>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            source: None,
        }
    }

    /// Returns all of the catalog identifiers of this satellite, in catalog order
    pub fn catalog_ids_of(&self, satellite: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.satellite == satellite)
            .map(|e| e.catalog_id.as_str())
            .collect()
    }

    /// Resolves each satellite to its unique catalog identifier.
    pub fn resolve<'a, I>(&self, satellites: I) -> CatalogResolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolution = CatalogResolution::default();
        for satellite in satellites {
            match self.catalog_ids_of(satellite).as_slice() {
                [catalog_id] => {
                    resolution
                        .resolved
                        .insert(satellite.to_string(), catalog_id.to_string());
                }
                matches => {
                    warn!(
                        "{satellite} has {} corresponding catalog entries, its predictions are skipped",
                        matches.len()
                    );
                    resolution
                        .unresolved
                        .insert(satellite.to_string(), matches.len());
                }
            }
        }
        info!(
            "resolved {} satellites, {} unresolved",
            resolution.resolved.len(),
            resolution.unresolved.len()
        );
        resolution
    }
}

/// Resolves the satellites against the catalog, see [`Catalog::resolve`].
pub fn resolve<'a, I>(satellites: I, catalog: &Catalog) -> CatalogResolution
where
    I: IntoIterator<Item = &'a str>,
{
    catalog.resolve(satellites)
}

/// Mapping of satellite identifiers to catalog identifiers.
///
/// A satellite without a unique catalog entry is kept in `unresolved` with the number of entries found.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogResolution {
    pub resolved: BTreeMap<String, String>,
    pub unresolved: BTreeMap<String, usize>,
}

impl CatalogResolution {
    pub fn catalog_id(&self, satellite: &str) -> Option<&str> {
        self.resolved.get(satellite).map(|id| id.as_str())
    }

    /// Catalog identifier of each satellite, unresolved ones mapping to an empty string.
    pub fn as_map(&self) -> BTreeMap<String, String> {
        let mut map = self.resolved.clone();
        for satellite in self.unresolved.keys() {
            map.insert(satellite.clone(), String::new());
        }
        map
    }
}
