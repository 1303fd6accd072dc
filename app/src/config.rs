use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dashflow::data::TableFormat;

use crate::input::{Assignment, InputFormat, parse_assignment};

pub const DATA_ENV: &str = "DASHFLOW_DATA";
pub const LOG_FILE_ENV: &str = "DASHFLOW_LOG_FILE";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DashboardKind {
    /// Treemap of population by continent and country, filtered by year and GDP band.
    Gapminder,
    /// Scatter matrix of the iris measurements.
    Iris,
}

#[derive(Parser, Debug)]
#[command(name = "dashflow")]
pub struct Args {
    /// Dashboard to run.
    #[arg(value_enum, default_value_t = DashboardKind::Gapminder)]
    pub dashboard: DashboardKind,

    /// CSV or Parquet table backing the dashboard. Defaults to $DASHFLOW_DATA,
    /// then to a built-in sample.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Explicitly set the table format. If omitted, inferred from extension.
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Widget change to apply at startup, as widget=value. Repeatable.
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Exit after the startup changes instead of reading commands from stdin.
    #[arg(long)]
    pub no_interactive: bool,

    /// Print each redrawn figure as JSON.
    #[arg(long)]
    pub json: bool,

    /// Write logs to this file instead of stderr. Defaults to $DASHFLOW_LOG_FILE.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub dashboard: DashboardKind,
    pub data: Option<PathBuf>,
    pub format: Option<TableFormat>,
    pub events: Vec<Assignment>,
    pub interactive: bool,
    pub json: bool,
    pub log_file: Option<PathBuf>,
}

impl SessionConfig {
    pub fn from_args(args: Args) -> Self {
        Self::resolve(args, |key| std::env::var(key).ok())
    }

    fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Self {
        let from_env = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        Self {
            dashboard: args.dashboard,
            data: args.data.or_else(|| from_env(DATA_ENV)),
            format: args.format.map(Into::into),
            events: args.set,
            interactive: !args.no_interactive,
            json: args.json,
            log_file: args.log_file.or_else(|| from_env(LOG_FILE_ENV)),
        }
    }
}
