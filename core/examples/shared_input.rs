//! Two outputs reading one slider, plus a failing transform that keeps the
//! last good value on screen.

use dashflow::{ChannelPresenter, Control, Dispatcher, Inputs, TransformError, Update, Value};

fn main() -> anyhow::Result<()> {
    let (presenter, mut updates) = ChannelPresenter::<f64>::new();

    let mut builder = Dispatcher::<f64>::builder();
    builder
        .widget("scale", Control::Slider { min: 0.0, max: 10.0 }, 2.0)?
        .widget("offset", Control::Slider { min: -5.0, max: 5.0 }, 0.0)?
        .bind("scaled", ["scale"], |inputs: &Inputs| {
            Ok(inputs.scalar(0)?.as_f64().unwrap_or_default() * 100.0)
        })?
        .bind("ratio", ["offset", "scale"], |inputs: &Inputs| {
            let offset = inputs.scalar(0)?.as_f64().unwrap_or_default();
            let scale = inputs.scalar(1)?.as_f64().unwrap_or_default();
            if scale == 0.0 {
                return Err(TransformError::msg("scale must be non-zero"));
            }
            Ok(offset / scale)
        })?;
    builder.presenter(presenter);

    let mut dispatcher = builder.build();
    dispatcher.initialize();
    dispatcher.set_input("offset", 3.0)?;
    let report = dispatcher.set_input("scale", 0.0)?;
    println!(
        "scale=0: {} updated, {} failed",
        report.updated.len(),
        report.failures.len()
    );
    if let Err(err) = dispatcher.set_input("scale", Value::from(42.0)) {
        println!("rejected: {err}");
    }
    drop(dispatcher);

    while let Ok(update) = updates.try_recv() {
        match update {
            Update::Redraw(artifact) => {
                println!("{} rev {} = {}", artifact.output, artifact.revision, artifact.payload)
            }
            Update::Failed { output, message, .. } => println!("{output} failed: {message}"),
        }
    }
    Ok(())
}
