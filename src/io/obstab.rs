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

use super::{InputOutputError, MissingColumnSnafu, ParseLineSnafu, StdIOSnafu};
use crate::obs::{EpochRecord, ObservationTable};
use crate::time::Epoch;
use snafu::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Loads an observation table from a whitespace delimited file.
///
/// The first line which is neither empty nor a `#` comment is the header, and must name the `DATE`, `TIME` and `PRN`
/// columns. All other columns are kept verbatim in the payload of each record.
pub fn load_obstab<P: AsRef<Path>>(path: P) -> Result<ObservationTable, InputOutputError> {
    let path = path.as_ref();
    let file = File::open(path).context(StdIOSnafu {
        action: "opening observation table",
    })?;

    let mut table = parse_obstab(BufReader::new(file))?;
    table.source = Some(path.display().to_string());
    info!("loaded {table}");
    Ok(table)
}

/// Column indexes of the header
struct Header {
    date: usize,
    time: usize,
    prn: usize,
}

impl Header {
    fn parse(line: &str) -> Result<Self, InputOutputError> {
        let columns = line.split_whitespace().collect::<Vec<&str>>();
        let find = |which: &str| {
            columns
                .iter()
                .position(|c| *c == which)
                .context(MissingColumnSnafu { which })
        };
        Ok(Self {
            date: find("DATE")?,
            time: find("TIME")?,
            prn: find("PRN")?,
        })
    }
}

/// Parses an observation table from any buffered reader, see [`load_obstab`].
pub fn parse_obstab<R: BufRead>(reader: R) -> Result<ObservationTable, InputOutputError> {
    let mut header: Option<Header> = None;
    let mut records = Vec::new();

    for (lno, line) in reader.lines().enumerate() {
        let line = line.context(StdIOSnafu {
            action: "reading observation table",
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some(hdr) = &header else {
            header = Some(Header::parse(line)?);
            continue;
        };

        let fields = line.split_whitespace().collect::<Vec<&str>>();
        let get = |idx: usize, which: &str| {
            fields.get(idx).copied().context(ParseLineSnafu {
                line: lno + 1,
                details: format!("no {which} field"),
            })
        };

        let epoch = parse_epoch(get(hdr.date, "DATE")?, get(hdr.time, "TIME")?)
            .map_err(|details| InputOutputError::ParseLine {
                line: lno + 1,
                details,
            })?;

        let payload = fields
            .iter()
            .enumerate()
            .filter(|(i, _)| ![hdr.date, hdr.time, hdr.prn].contains(i))
            .map(|(_, f)| f.to_string())
            .collect();

        records.push(EpochRecord {
            epoch,
            satellite: get(hdr.prn, "PRN")?.to_string(),
            payload,
        });
    }

    ensure!(
        header.is_some(),
        MissingColumnSnafu {
            which: "DATE TIME PRN header"
        }
    );

    Ok(ObservationTable::from_records(records))
}

/// Parses a UTC epoch from a `YYYY-MM-DD` (or `YYYY/MM/DD`) date and a `HH:MM:SS[.fff]` time.
fn parse_epoch(date: &str, time: &str) -> Result<Epoch, String> {
    let repr = format!("{}T{time} UTC", date.replace('/', "-"));
    Epoch::from_str(&repr).map_err(|e| format!("`{date} {time}`: {e}"))
}
