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

use super::{InputOutputError, ParseLineSnafu, StdIOSnafu, TleFormatSnafu};
use crate::catalog::TleEntry;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Directory of TLE files, one `sat<NORAD>.txt` file per catalog identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TleStore {
    pub dir: PathBuf,
}

impl TleStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path to the TLE file of this catalog identifier, whose classification letter is dropped (`37753U` is in `sat37753.txt`).
    pub fn path_for(&self, catalog_id: &str) -> PathBuf {
        let digits = match catalog_id.chars().last() {
            Some(c) if c.is_ascii_alphabetic() => &catalog_id[..catalog_id.len() - 1],
            _ => catalog_id,
        };
        self.dir.join(format!("sat{digits}.txt"))
    }

    /// Loads all of the TLEs of this catalog identifier, in file order.
    ///
    /// A missing file is not an error: there is simply no TLE available for that catalog identifier.
    pub fn load(&self, catalog_id: &str) -> Result<Vec<TleEntry>, InputOutputError> {
        let path = self.path_for(catalog_id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("no TLE file {} for {catalog_id}", path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(InputOutputError::StdIO {
                    source,
                    action: "opening TLE file",
                })
            }
        };

        info!("reading TLE file {} for {catalog_id}", path.display());
        parse_tle(BufReader::new(file))
    }
}

/// Parses the successive line 1 and line 2 pairs of a TLE file. Other lines, such as satellite names, are skipped.
pub fn parse_tle<R: BufRead>(reader: R) -> Result<Vec<TleEntry>, InputOutputError> {
    let mut entries = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (lno, line) in reader.lines().enumerate() {
        let line = line.context(StdIOSnafu {
            action: "reading TLE file",
        })?;

        if line.starts_with("1 ") {
            if let Some((orphan, _)) = pending {
                return ParseLineSnafu {
                    line: orphan + 1,
                    details: "TLE line 1 without line 2",
                }
                .fail();
            }
            pending = Some((lno, line));
        } else if line.starts_with("2 ") {
            let Some((_, line1)) = pending.take() else {
                return ParseLineSnafu {
                    line: lno + 1,
                    details: "TLE line 2 without line 1",
                }
                .fail();
            };
            let entry = TleEntry::new(&line1, &line).context(TleFormatSnafu { line: lno + 1 })?;
            entries.push(entry);
        }
    }

    if let Some((orphan, _)) = pending {
        return ParseLineSnafu {
            line: orphan + 1,
            details: "TLE line 1 without line 2",
        }
        .fail();
    }

    Ok(entries)
}
