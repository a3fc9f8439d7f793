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

use super::{CsvSnafu, InputOutputError, StdIOSnafu};
use crate::catalog::{Catalog, CatalogEntry};
use csv::{ReaderBuilder, Trim};
use snafu::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads the satellite catalog from a CSV file without header, whose columns are
/// `GNSS, SV-ID, PRN, NORAD, launch`. Lines starting with `#` are ignored.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, InputOutputError> {
    let path = path.as_ref();
    let file = File::open(path).context(StdIOSnafu {
        action: "opening satellite catalog",
    })?;

    let mut catalog = parse_catalog(file)?;
    catalog.source = Some(path.display().to_string());
    info!(
        "loaded {} catalog entries from {}",
        catalog.entries.len(),
        path.display()
    );
    Ok(catalog)
}

/// Parses the satellite catalog from any reader, see [`load_catalog`].
pub fn parse_catalog<R: Read>(reader: R) -> Result<Catalog, InputOutputError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let entries = rdr
        .deserialize::<CatalogEntry>()
        .collect::<Result<Vec<CatalogEntry>, csv::Error>>()
        .context(CsvSnafu {
            action: "parsing satellite catalog",
        })?;

    for entry in &entries {
        debug!(
            "{} ({} {}) -> {}",
            entry.satellite, entry.constellation, entry.sv_id, entry.catalog_id
        );
    }

    Ok(Catalog::new(entries))
}
