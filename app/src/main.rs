use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use dashflow::{ChannelPresenter, Figure, data};
use polars::prelude::DataFrame;

mod config;
mod dashboards;
mod input;
mod logging;
mod present;
mod samples;
mod session;

use config::{Args, DashboardKind, SessionConfig};
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SessionConfig::from_args(Args::parse());
    logging::init(config.log_file.as_deref())?;
    logging::route_panics();

    let (presenter, updates) = ChannelPresenter::<Figure>::new();
    let printer = tokio::spawn(present::run(updates, config.json));

    // The dispatcher is single-threaded; it lives entirely on the blocking thread
    // and the presenter channel carries artifacts back out.
    let session = tokio::task::spawn_blocking(move || run_session(config, presenter));
    session.await??;
    printer.await?;
    Ok(())
}

fn run_session(config: SessionConfig, presenter: ChannelPresenter<Figure>) -> Result<()> {
    let df = load(&config)?;
    let mut builder = dashboards::build(config.dashboard, &df)?;
    builder.presenter(presenter);

    let mut session = Session::new(builder.build());
    let report = session.initialize();
    for failure in &report.failures {
        tracing::warn!(output = %failure.output, error = %failure.cause, "initial render failed");
    }

    for event in &config.events {
        if let Err(err) = session.apply(&event.widget, &event.raw) {
            eprintln!("--set {}={}: {err:#}", event.widget, event.raw);
        }
    }

    if config.interactive {
        println!("dashflow: type 'help' for commands");
        session.run_interactive(BufReader::new(io::stdin()), io::stdout())?;
    }
    Ok(())
}

fn load(config: &SessionConfig) -> Result<DataFrame> {
    match &config.data {
        Some(path) => {
            let df = data::load_table(path, config.format)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = df.height(), "table loaded");
            Ok(df)
        }
        None => {
            tracing::info!(dashboard = ?config.dashboard, "using built-in sample table");
            let df = match config.dashboard {
                DashboardKind::Gapminder => samples::gapminder()?,
                DashboardKind::Iris => samples::iris()?,
            };
            Ok(df)
        }
    }
}
