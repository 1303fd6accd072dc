use dashflow::{Artifact, Figure, FigureSpec, Update};
use time::macros::format_description;
use tokio::sync::mpsc::UnboundedReceiver;

/// Drains presentation updates until every sender is gone.
pub async fn run(mut rx: UnboundedReceiver<Update<Figure>>, json: bool) {
    while let Some(update) = rx.recv().await {
        println!("{}", describe(&update));
        if let (true, Update::Redraw(artifact)) = (json, &update) {
            match artifact.payload.to_json() {
                Ok(text) => println!("{text}"),
                Err(err) => tracing::warn!(
                    output = %artifact.output,
                    error = %err,
                    "figure serialization failed"
                ),
            }
        }
    }
}

pub fn describe(update: &Update<Figure>) -> String {
    match update {
        Update::Redraw(artifact) => format!("[redraw] {}", summary(artifact)),
        Update::Failed {
            output,
            message,
            last_good,
        } => match last_good {
            Some(artifact) => format!(
                "[error] {output}: {message} (still showing rev {})",
                artifact.revision
            ),
            None => format!("[error] {output}: {message} (nothing to show)"),
        },
    }
}

pub fn summary(artifact: &Artifact<Figure>) -> String {
    let clock = format_description!("[hour]:[minute]:[second]");
    let at = artifact
        .computed_at
        .format(&clock)
        .unwrap_or_else(|_| "--:--:--".into());
    let figure = &artifact.payload;
    let kind = match &figure.spec {
        FigureSpec::Treemap { .. } => "treemap",
        FigureSpec::ScatterMatrix { .. } => "scatter matrix",
    };
    let title = figure
        .title
        .as_deref()
        .map(|t| format!(" \"{t}\""))
        .unwrap_or_default();
    format!(
        "{} rev {} @ {at}: {kind}{title}, {} rows",
        artifact.output, artifact.revision, figure.rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::datetime;

    fn artifact() -> Arc<Artifact<Figure>> {
        Arc::new(Artifact {
            output: "splom".into(),
            payload: Figure {
                spec: FigureSpec::ScatterMatrix {
                    dimensions: vec!["sepal_length".into()],
                    color: None,
                },
                title: None,
                rows: 6,
                data: Vec::new(),
            },
            revision: 3,
            computed_at: datetime!(2024-01-01 12:30:05 UTC),
        })
    }

    #[test]
    fn redraw_line() {
        assert_eq!(
            describe(&Update::Redraw(artifact())),
            "[redraw] splom rev 3 @ 12:30:05: scatter matrix, 6 rows"
        );
    }

    #[test]
    fn failure_lines() {
        let with_previous = Update::Failed {
            output: "splom".into(),
            message: "no dimensions".into(),
            last_good: Some(artifact()),
        };
        assert_eq!(
            describe(&with_previous),
            "[error] splom: no dimensions (still showing rev 3)"
        );

        let without = Update::<Figure>::Failed {
            output: "splom".into(),
            message: "no dimensions".into(),
            last_good: None,
        };
        assert_eq!(
            describe(&without),
            "[error] splom: no dimensions (nothing to show)"
        );
    }
}
