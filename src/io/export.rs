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

use super::{pq_writer, ArrowSnafu, EmptyDatasetSnafu, ExportCfg, InputOutputError};
use super::{ParquetSnafu, StdIOSnafu, YamlSnafu};
use crate::pipeline::{RunReport, SatelliteStatus};
use arrow::array::{Array, BooleanBuilder, Float64Builder, StringBuilder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use snafu::{ensure, ResultExt};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn create_parent(path: &Path) -> Result<(), InputOutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(StdIOSnafu {
            action: "creating output directory",
        })?;
    }
    Ok(())
}

impl RunReport {
    /// Writes the full report, including every observed and predicted arc, as YAML.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, InputOutputError> {
        let path_buf = path.as_ref().to_path_buf();
        create_parent(&path_buf)?;

        let file = File::create(&path_buf).context(StdIOSnafu {
            action: "creating YAML report",
        })?;
        serde_yaml::to_writer(file, self).context(YamlSnafu {
            action: "serializing run report",
        })?;

        info!("Serialized run of {} to {}", self.day, path_buf.display());
        Ok(path_buf)
    }

    /// Writes one row per predicted arc, and one row per satellite which could not be reconciled or had no pass.
    pub fn to_parquet<P: AsRef<Path>>(
        &self,
        path: P,
        cfg: ExportCfg,
    ) -> Result<PathBuf, InputOutputError> {
        ensure!(
            !self.satellites.is_empty(),
            EmptyDatasetSnafu {
                action: "exporting run report"
            }
        );

        let path_buf = cfg.actual_path(path);
        create_parent(&path_buf)?;

        let hdrs = vec![
            Field::new("Satellite", DataType::Utf8, false),
            Field::new("Catalog ID", DataType::Utf8, true),
            Field::new("Nominal interval (s)", DataType::Float64, true),
            Field::new("Status", DataType::Utf8, false),
            Field::new("Predicted start (UTC)", DataType::Utf8, true),
            Field::new("Predicted end (UTC)", DataType::Utf8, true),
            Field::new("Truncated start", DataType::Boolean, true),
            Field::new("Truncated end", DataType::Boolean, true),
            Field::new("Observed arcs", DataType::UInt64, true),
            Field::new("Covered (s)", DataType::Float64, true),
        ];
        let schema = Arc::new(Schema::new(hdrs));

        let mut satellite = StringBuilder::new();
        let mut catalog_id = StringBuilder::new();
        let mut nominal = Float64Builder::new();
        let mut status = StringBuilder::new();
        let mut start = StringBuilder::new();
        let mut end = StringBuilder::new();
        let mut trunc_start = BooleanBuilder::new();
        let mut trunc_end = BooleanBuilder::new();
        let mut observed = UInt64Builder::new();
        let mut covered = Float64Builder::new();

        for report in &self.satellites {
            let rows = match &report.status {
                SatelliteStatus::Reconciled(results) if results.is_empty() => {
                    vec![("no pass".to_string(), None)]
                }
                SatelliteStatus::Reconciled(results) => results
                    .iter()
                    .map(|r| (r.classification.to_string(), Some(r)))
                    .collect::<Vec<_>>(),
                SatelliteStatus::Failed(failure) => vec![(failure.to_string(), None)],
            };

            for (state, result) in rows {
                satellite.append_value(&report.satellite);
                catalog_id.append_option(report.catalog_id.as_deref());
                nominal.append_option(report.nominal_interval.map(|d| d.to_seconds()));
                status.append_value(state);
                match result {
                    Some(r) => {
                        start.append_value(r.predicted.start.to_string());
                        end.append_value(r.predicted.end.to_string());
                        trunc_start.append_value(r.predicted.truncated_start);
                        trunc_end.append_value(r.predicted.truncated_end);
                        observed.append_value(r.overlapping.len() as u64);
                        covered.append_value(r.covered.to_seconds());
                    }
                    None => {
                        start.append_null();
                        end.append_null();
                        trunc_start.append_null();
                        trunc_end.append_null();
                        observed.append_null();
                        covered.append_null();
                    }
                }
            }
        }

        let record: Vec<Arc<dyn Array>> = vec![
            Arc::new(satellite.finish()),
            Arc::new(catalog_id.finish()),
            Arc::new(nominal.finish()),
            Arc::new(status.finish()),
            Arc::new(start.finish()),
            Arc::new(end.finish()),
            Arc::new(trunc_start.finish()),
            Arc::new(trunc_end.finish()),
            Arc::new(observed.finish()),
            Arc::new(covered.finish()),
        ];

        let mut metadata = HashMap::new();
        metadata.insert("Purpose".to_string(), "Tracking arc reconciliation".to_string());
        metadata.insert("Day".to_string(), self.day.to_string());
        metadata.insert("Site".to_string(), self.site.to_string());
        if let Some(add_meta) = cfg.metadata {
            for (k, v) in add_meta {
                metadata.insert(k, v);
            }
        }

        let props = pq_writer(Some(metadata));

        let file = File::create(&path_buf).context(StdIOSnafu {
            action: "creating parquet report",
        })?;

        let mut writer = ArrowWriter::try_new(file, schema.clone(), props).context(ParquetSnafu {
            action: "creating parquet writer",
        })?;

        let batch = RecordBatch::try_new(schema, record).context(ArrowSnafu {
            action: "building record batch",
        })?;
        writer.write(&batch).context(ParquetSnafu {
            action: "writing run report",
        })?;
        writer.close().context(ParquetSnafu {
            action: "closing parquet file",
        })?;

        info!("Serialized run of {} to {}", self.day, path_buf.display());

        Ok(path_buf)
    }
}
