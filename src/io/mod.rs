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

use crate::errors::FormatError;
use crate::time::Epoch;
use hifitime::prelude::{Format, Formatter};
use hifitime::Duration;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use snafu::prelude::*;
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use typed_builder::TypedBuilder;

/// Satellite catalog (PRN to NORAD) loading
pub mod catalog;
/// Export of run reports to YAML and parquet
pub mod export;
/// Observation tabular files as written by RINEX-to-table converters
pub mod obstab;
/// Two-line element files, one per catalog identifier
pub mod tle;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InputOutputError {
    #[snafu(display("{action} encountered {source}"))]
    StdIO {
        source: std::io::Error,
        action: &'static str,
    },
    #[snafu(display("missing required column `{which}`"))]
    MissingColumn { which: String },
    #[snafu(display("line {line}: {details}"))]
    ParseLine { line: usize, details: String },
    #[snafu(display("line {line}: {source}"))]
    TleFormat { line: usize, source: FormatError },
    #[snafu(display("{action} encountered CSV error {source}"))]
    Csv {
        source: csv::Error,
        action: &'static str,
    },
    #[snafu(display("{action} encountered Arrow error {source}"))]
    Arrow {
        source: arrow::error::ArrowError,
        action: &'static str,
    },
    #[snafu(display("{action} encountered Parquet error {source}"))]
    Parquet {
        source: parquet::errors::ParquetError,
        action: &'static str,
    },
    #[snafu(display("{action} encountered YAML error {source}"))]
    Yaml {
        source: serde_yaml::Error,
        action: &'static str,
    },
    #[snafu(display("nothing to export when {action}"))]
    EmptyDataset { action: &'static str },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file: {source}"))]
    ReadError { source: std::io::Error },
    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },
    #[snafu(display("invalid configuration: {msg}"))]
    InvalidConfig { msg: String },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds "Self" from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }
}

/// Configuration for exporting a run report to parquet.
#[derive(Clone, Debug, Default, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct ExportCfg {
    /// Additional metadata to store in the Parquet metadata
    #[builder(default, setter(strip_option))]
    pub metadata: Option<HashMap<String, String>>,
    /// Set to true to append the timestamp to the filename
    #[builder(default)]
    pub timestamp: bool,
}

impl ExportCfg {
    /// Initialize a new configuration with the given metadata entries.
    pub fn from_metadata(metadata: Vec<(String, String)>) -> Self {
        Self {
            metadata: Some(metadata.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Initialize a new default configuration but timestamp the filename.
    pub fn timestamped() -> Self {
        Self {
            timestamp: true,
            ..Default::default()
        }
    }

    /// Modifies the provided path to include the timestamp if required.
    pub(crate) fn actual_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        let mut path_buf = path.as_ref().to_path_buf();
        if !self.timestamp {
            return path_buf;
        }
        let (Ok(now), Ok(fmt)) = (Epoch::now(), Format::from_str("%Y-%m-%dT%H-%M-%S")) else {
            warn!("could not timestamp {}", path_buf.display());
            return path_buf;
        };
        if let (Some(stem), Some(ext)) = (
            path_buf.file_stem().and_then(|s| s.to_str()),
            path_buf.extension().and_then(|s| s.to_str()),
        ) {
            let stamp = Formatter::new(now, fmt);
            let new_file_name = format!("{stem}-{stamp}.{ext}");
            path_buf.set_file_name(new_file_name);
        }
        path_buf
    }
}

/// Parquet writer properties, with the provenance of the file stored in the key/value metadata.
pub(crate) fn pq_writer(metadata: Option<HashMap<String, String>>) -> Option<WriterProperties> {
    let mut file_metadata = vec![
        KeyValue::new(
            "Generated by".to_string(),
            format!("gnss-arcs v{}", env!("CARGO_PKG_VERSION")),
        ),
        KeyValue::new("Created by".to_string(), whoami::realname()),
    ];

    if let Ok(now) = Epoch::now() {
        file_metadata.push(KeyValue::new(
            "Created on (UTC)".to_string(),
            format!("{now}"),
        ));
    }

    if let Some(metadata) = metadata {
        for (key, value) in metadata {
            file_metadata.push(KeyValue::new(key, value));
        }
    }

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .set_key_value_metadata(Some(file_metadata))
        .build();

    Some(props)
}

pub(crate) fn duration_to_str<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{duration}"))
}

/// A deserializer from Duration string
pub(crate) fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Duration::from_str(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn maybe_duration_to_str<S>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if let Some(duration) = duration {
        duration_to_str(duration, serializer)
    } else {
        serializer.serialize_none()
    }
}
