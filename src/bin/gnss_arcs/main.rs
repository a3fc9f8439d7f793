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

extern crate gnss_arcs;
extern crate log;
extern crate pretty_env_logger;

use clap::Parser;
use gnss_arcs::io::{ConfigRepr, ExportCfg};
use gnss_arcs::pipeline::{run_config, RunConfig};
use gnss_arcs::visibility::DayOfYear;
use gnss_arcs::ArcError;
use log::{error, info};
use std::env::{set_var, var};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_VAR: &str = "GNSS_ARCS_LOG";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Segments GNSS observation logs into tracking arcs and reconciles them with the TLE visibility windows"
)]
struct Args {
    /// Run configuration (YAML)
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Day to process, as YYYY:DOY or YYDOY, overrides the configuration
    #[arg(short, long, value_name = "DAY")]
    doy: Option<DayOfYear>,

    /// Gap multiplier of the nominal observation interval, overrides the configuration
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    multiplier: Option<u32>,

    /// Write the full report to this YAML file
    #[arg(long, value_name = "FILE")]
    yaml: Option<PathBuf>,

    /// Write the reconciled arcs to this parquet file
    #[arg(long, value_name = "FILE")]
    parquet: Option<PathBuf>,

    /// Append a timestamp to the parquet file name
    #[arg(long)]
    timestamp: bool,
}

fn run(args: Args) -> Result<(), ArcError> {
    let mut cfg = RunConfig::load(&args.config).map_err(|source| ArcError::Config { source })?;
    info!("Loaded run configuration `{}`", args.config.display());

    if let Some(day) = args.doy {
        cfg.day = day;
    }
    if let Some(multiplier) = args.multiplier {
        cfg.segmentation.multiplier = multiplier;
    }
    if args.yaml.is_some() {
        cfg.output.yaml = args.yaml;
    }
    if args.parquet.is_some() {
        cfg.output.parquet = args.parquet;
    }

    let report = run_config(&cfg)?;
    println!("{report}");

    if let Some(path) = &cfg.output.yaml {
        report
            .to_yaml(path)
            .map_err(|source| ArcError::Export { source })?;
    }
    if let Some(path) = &cfg.output.parquet {
        let export = ExportCfg::builder()
            .metadata(
                [("Configuration".to_string(), args.config.display().to_string())]
                    .into_iter()
                    .collect(),
            )
            .timestamp(args.timestamp)
            .build();
        report
            .to_parquet(path, export)
            .map_err(|source| ArcError::Export { source })?;
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ArcError::NothingReconciled { failures }) => {
            error!("no satellite could be reconciled");
            for (satellite, failure) in failures {
                error!("  {satellite}: {failure}");
            }
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
