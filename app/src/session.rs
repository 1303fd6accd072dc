use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};
use dashflow::{Control, DispatchReport, Dispatcher, Figure, OutputStatus};

use crate::input::parse_value;
use crate::present::summary;

const HELP: &str = "\
commands:
  set <widget> <value>   change a widget (alias: <widget>=<value>)
  get <widget>           print a widget's current value
  show <output>          print the latest artifact for an output
  widgets                list widgets and their values
  outputs                list outputs and their status
  help                   this text
  quit                   leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { widget: String, raw: String },
    Get(String),
    Show(String),
    Widgets,
    Outputs,
    Help,
    Quit,
}

/// Blank lines and `#` comments parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let command = match head {
        "set" => {
            let (widget, raw) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: set <widget> <value>".to_string())?;
            Command::Set {
                widget: widget.to_string(),
                raw: raw.trim().to_string(),
            }
        }
        "get" | "show" if rest.is_empty() => return Err(format!("usage: {head} <name>")),
        "get" => Command::Get(rest.to_string()),
        "show" => Command::Show(rest.to_string()),
        "widgets" => Command::Widgets,
        "outputs" => Command::Outputs,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => match line.split_once('=') {
            Some((widget, raw)) if !widget.trim().is_empty() => Command::Set {
                widget: widget.trim().to_string(),
                raw: raw.trim().to_string(),
            },
            _ => return Err(format!("unknown command '{head}' (try 'help')")),
        },
    };
    Ok(Some(command))
}

pub struct Session {
    dispatcher: Dispatcher<Figure>,
}

impl Session {
    pub fn new(dispatcher: Dispatcher<Figure>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<Figure> {
        &self.dispatcher
    }

    pub fn initialize(&mut self) -> DispatchReport {
        let report = self.dispatcher.initialize();
        tracing::info!(
            outputs = report.updated.len(),
            failures = report.failures.len(),
            "dashboard initialized"
        );
        report
    }

    /// Parses `raw` against the widget's control and dispatches the change.
    pub fn apply(&mut self, widget: &str, raw: &str) -> Result<DispatchReport> {
        let control = &self.dispatcher.registry().widget(widget)?.control;
        let value = parse_value(control, raw).map_err(|e| anyhow!("{widget}: {e}"))?;
        let report = self.dispatcher.set_input(widget, value)?;
        for failure in &report.failures {
            tracing::debug!(
                output = %failure.output,
                error = %failure.cause,
                "output kept previous artifact"
            );
        }
        Ok(report)
    }

    /// Returns `false` once the session should end.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<bool> {
        match command {
            Command::Set { widget, raw } => match self.apply(&widget, &raw) {
                Ok(report) => writeln!(
                    out,
                    "{widget} updated: {} redrawn, {} failed",
                    report.updated.len(),
                    report.failures.len()
                )?,
                Err(err) => writeln!(out, "rejected: {err}")?,
            },
            Command::Get(widget) => match self.dispatcher.registry().get(&widget) {
                Ok(value) => writeln!(out, "{widget} = {value}")?,
                Err(err) => writeln!(out, "{err}")?,
            },
            Command::Show(output) => match self.dispatcher.sink().get(&output) {
                Ok(artifact) => writeln!(out, "{}", summary(artifact))?,
                Err(err) => writeln!(out, "{err}")?,
            },
            Command::Widgets => {
                for widget in self.dispatcher.registry().iter() {
                    writeln!(
                        out,
                        "{} = {}  ({})",
                        widget.id,
                        widget.value,
                        describe_control(&widget.control)
                    )?;
                }
            }
            Command::Outputs => {
                for binding in self.dispatcher.graph().iter() {
                    let status = match self.dispatcher.sink().status(binding.output().as_str()) {
                        OutputStatus::Pending => "pending".to_string(),
                        OutputStatus::Ready => "ready".to_string(),
                        OutputStatus::Failed(message) => format!("failed: {message}"),
                    };
                    let inputs: Vec<&str> =
                        binding.inputs().iter().map(|id| id.as_str()).collect();
                    writeln!(
                        out,
                        "{} <- [{}]  {status}",
                        binding.output(),
                        inputs.join(", ")
                    )?;
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    pub fn run_interactive(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if !self.execute(command, &mut out)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => writeln!(out, "{err}")?,
            }
            out.flush()?;
        }
        Ok(())
    }
}

fn describe_control(control: &Control) -> String {
    let join = |options: &[dashflow::Scalar]| {
        options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    match control {
        Control::Dropdown { options } => format!("one of {}", join(options)),
        Control::MultiDropdown { options } => format!("any of {}", join(options)),
        Control::Slider { min, max } => format!("{min}..{max}"),
        Control::RangeSlider { min, max } => format!("range within {min}..{max}"),
        Control::Text => "text".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::{self, GAP_THRESHOLD, GAP_YEAR, GRAPH_GAP};
    use crate::samples;
    use std::io::Cursor;

    fn session() -> Session {
        let df = samples::gapminder().unwrap();
        let mut session = Session::new(dashboards::gapminder(&df).unwrap().build());
        session.initialize();
        session
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(parse_command("# note"), Ok(None));
        assert_eq!(
            parse_command("set gap-year 2007"),
            Ok(Some(Command::Set {
                widget: "gap-year".into(),
                raw: "2007".into()
            }))
        );
        assert_eq!(
            parse_command("gap-threshold = 2000..9000"),
            Ok(Some(Command::Set {
                widget: "gap-threshold".into(),
                raw: "2000..9000".into()
            }))
        );
        assert_eq!(
            parse_command("show graph-gap"),
            Ok(Some(Command::Show("graph-gap".into())))
        );
        assert_eq!(parse_command("exit"), Ok(Some(Command::Quit)));
        assert!(parse_command("get").is_err());
        assert!(parse_command("set gap-year").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn apply_parses_against_the_control() {
        let mut session = session();
        let report = session.apply(GAP_YEAR, "2007").unwrap();
        assert_eq!(report.updated.len(), 1);
        assert_eq!(
            session
                .dispatcher()
                .sink()
                .get(GRAPH_GAP)
                .unwrap()
                .payload
                .title
                .as_deref(),
            Some("Population sizes, GDP highlight (2007)")
        );

        assert!(session.apply(GAP_YEAR, "1990").is_err());
        assert!(session.apply(GAP_THRESHOLD, "abc").is_err());
        assert!(session.apply("gap-continent", "Asia").is_err());
    }

    #[test]
    fn interactive_loop_reports_and_stops_at_quit() {
        let mut session = session();
        let script =
            "set gap-year 2007\nget gap-year\ngap-threshold=9000..2000\nquit\nget gap-year\n";
        let mut out = Vec::new();
        session
            .run_interactive(Cursor::new(script), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "gap-year updated: 1 redrawn, 0 failed");
        assert_eq!(lines[1], "gap-year = 2007");
        assert!(lines[2].starts_with("rejected: "));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn lists_widgets_and_outputs() {
        let mut session = session();
        let mut out = Vec::new();
        session.execute(Command::Widgets, &mut out).unwrap();
        session.execute(Command::Outputs, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("gap-year = 1952  (one of 1952, 2007)"));
        assert!(out.contains("graph-gap <- [gap-threshold, gap-year]  ready"));
    }
}
