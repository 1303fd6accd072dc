//! Turns committed widget changes into recomputed output artifacts.
//!
//! Dispatch is synchronous and single-threaded: one change event is fully
//! processed (every affected transform run, every artifact committed) before
//! the caller can submit the next one, so all bindings triggered by an event
//! observe the same registry state. When several bindings depend on the
//! changed widget they run in registration order; that order is a
//! deterministic tie-break only, bindings are expected not to depend on each
//! other's side effects.
//!
//! A slow transform blocks the caller for its whole duration. There is no
//! timeout, cancellation or superseded-event check.
//!
//! Transform panics are caught and reported as failures. The process panic
//! hook still runs first, so a binary that shares stderr with its users
//! should install its own hook.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::{
    Binding, BindingError, BindingGraph, ChangeEvent, Control, Inputs, NullPresenter, OutputId,
    OutputSink, Presenter, TransformError, TransformFailure, Value, WidgetError, WidgetId,
    WidgetRegistry,
};

/// What triggered a dispatch pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Initial,
    Change(ChangeEvent),
}

#[derive(Debug)]
pub struct DispatchReport {
    pub trigger: Trigger,
    pub updated: Vec<OutputId>,
    pub failures: Vec<TransformFailure>,
}

impl DispatchReport {
    fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            updated: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn invocations(&self) -> usize {
        self.updated.len() + self.failures.len()
    }
}

/// Declares widgets and bindings, then freezes them into a [`Dispatcher`].
pub struct DashboardBuilder<A> {
    registry: WidgetRegistry,
    graph: BindingGraph<A>,
    presenter: Option<Box<dyn Presenter<A>>>,
}

impl<A: 'static> Default for DashboardBuilder<A> {
    fn default() -> Self {
        Self {
            registry: WidgetRegistry::new(),
            graph: BindingGraph::new(),
            presenter: None,
        }
    }
}

impl<A: 'static> DashboardBuilder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget(
        &mut self,
        id: impl Into<WidgetId>,
        control: Control,
        initial: impl Into<Value>,
    ) -> Result<&mut Self, WidgetError> {
        self.registry.declare(id, control, initial)?;
        Ok(self)
    }

    pub fn bind<I, W, F>(
        &mut self,
        output: impl Into<OutputId>,
        inputs: I,
        transform: F,
    ) -> Result<&mut Self, BindingError>
    where
        I: IntoIterator<Item = W>,
        W: Into<WidgetId>,
        F: Fn(&Inputs) -> Result<A, TransformError> + 'static,
    {
        self.graph
            .register(&self.registry, output, inputs, transform)?;
        Ok(self)
    }

    pub fn presenter(&mut self, presenter: impl Presenter<A> + 'static) -> &mut Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn build(self) -> Dispatcher<A> {
        let presenter = self
            .presenter
            .unwrap_or_else(|| Box::new(NullPresenter) as Box<dyn Presenter<A>>);
        tracing::debug!(
            widgets = self.registry.len(),
            bindings = self.graph.len(),
            "dashboard built"
        );
        Dispatcher {
            registry: self.registry,
            graph: self.graph,
            sink: OutputSink::new(presenter),
        }
    }
}

pub struct Dispatcher<A> {
    registry: WidgetRegistry,
    graph: BindingGraph<A>,
    sink: OutputSink<A>,
}

impl<A: 'static> Dispatcher<A> {
    pub fn builder() -> DashboardBuilder<A> {
        DashboardBuilder::new()
    }
}

impl<A> Dispatcher<A> {
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &BindingGraph<A> {
        &self.graph
    }

    pub fn sink(&self) -> &OutputSink<A> {
        &self.sink
    }

    pub fn set_input(
        &mut self,
        widget: impl Into<WidgetId>,
        value: impl Into<Value>,
    ) -> Result<DispatchReport, WidgetError> {
        self.handle_change_event(ChangeEvent::new(widget, value))
    }

    /// Commits the event's value, then recomputes every binding that reads the
    /// widget. Registry rejections are returned before any transform runs;
    /// transform failures are collected in the report.
    pub fn handle_change_event(
        &mut self,
        event: ChangeEvent,
    ) -> Result<DispatchReport, WidgetError> {
        let committed = self.registry.set(event.widget.as_str(), event.value)?;
        let mut report = DispatchReport::new(Trigger::Change(committed.clone()));

        let affected: Vec<&Binding<A>> =
            self.graph.triggered_by(committed.widget.as_str()).collect();
        tracing::debug!(
            widget = %committed.widget,
            value = %committed.value,
            bindings = affected.len(),
            "dispatching change event"
        );

        for binding in affected {
            run_binding(&self.registry, &mut self.sink, binding, &mut report);
        }
        Ok(report)
    }

    /// Computes every output once from the current widget values.
    pub fn initialize(&mut self) -> DispatchReport {
        let mut report = DispatchReport::new(Trigger::Initial);
        for binding in self.graph.iter() {
            run_binding(&self.registry, &mut self.sink, binding, &mut report);
        }
        report
    }
}

fn run_binding<A>(
    registry: &WidgetRegistry,
    sink: &mut OutputSink<A>,
    binding: &Binding<A>,
    report: &mut DispatchReport,
) {
    let output = binding.output().clone();
    match invoke(registry, binding) {
        Ok(payload) => {
            let revision = sink.put(output.clone(), payload).revision;
            tracing::debug!(%output, revision, "output updated");
            report.updated.push(output);
        }
        Err(cause) => {
            tracing::warn!(%output, error = %cause, "transform failed, keeping previous artifact");
            sink.record_failure(output.clone(), cause.to_string());
            report.failures.push(TransformFailure { output, cause });
        }
    }
}

fn invoke<A>(registry: &WidgetRegistry, binding: &Binding<A>) -> Result<A, TransformError> {
    let inputs = registry.snapshot(binding.inputs()).map_err(|err| match err {
        WidgetError::UnknownWidget(id) => TransformError::UnknownInput(id),
        other => TransformError::msg(other),
    })?;

    panic::catch_unwind(AssertUnwindSafe(|| binding.apply(&inputs)))
        .unwrap_or_else(|payload| Err(TransformError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutputStatus, Scalar, SinkError, Update};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn push(&self, entry: String) {
            self.0.borrow_mut().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    impl Presenter<String> for Log {
        fn present(&self, update: Update<String>) {
            self.push(format!("present:{}", update.output()));
        }
    }

    fn continents() -> Control {
        Control::dropdown(["Africa", "Asia", "Europe"])
    }

    #[test]
    fn every_dependency_is_reread() {
        let mut builder = Dispatcher::builder();
        builder
            .widget("a", Control::Slider { min: 0.0, max: 10.0 }, 1_i64)
            .unwrap()
            .widget("b", Control::Slider { min: 0.0, max: 10.0 }, 2_i64)
            .unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        builder
            .bind("sum", ["a", "b"], move |inputs: &Inputs| {
                counter.set(counter.get() + 1);
                let a = inputs.scalar(0)?.as_f64().unwrap_or_default();
                let b = inputs.scalar(1)?.as_f64().unwrap_or_default();
                Ok(format!("{}", a + b))
            })
            .unwrap();
        let mut dispatcher = builder.build();

        let report = dispatcher.set_input("b", 5_i64).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(report.updated, vec![OutputId::from("sum")]);
        assert_eq!(dispatcher.sink().get("sum").unwrap().payload, "6");

        dispatcher.set_input("a", 4_i64).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(dispatcher.sink().get("sum").unwrap().payload, "9");
    }

    #[test]
    fn disjoint_bindings_stay_untouched() {
        let log = Log::default();
        let mut builder = Dispatcher::builder();
        builder
            .widget("left", Control::Text, "l")
            .unwrap()
            .widget("right", Control::Text, "r")
            .unwrap();
        let l = log.clone();
        builder
            .bind("chart-left", ["left"], move |_: &Inputs| {
                l.push("left".into());
                Ok("L".to_string())
            })
            .unwrap();
        let r = log.clone();
        builder
            .bind("chart-right", ["right"], move |_: &Inputs| {
                r.push("right".into());
                Ok("R".to_string())
            })
            .unwrap();
        let mut dispatcher = builder.build();

        dispatcher.set_input("left", "l2").unwrap();
        assert_eq!(log.entries(), vec!["left".to_string()]);
        assert!(matches!(
            dispatcher.sink().get("chart-right"),
            Err(SinkError::NoArtifactYet(_))
        ));
    }

    #[test]
    fn shared_input_runs_in_registration_order() {
        let log = Log::default();
        let mut builder = Dispatcher::builder();
        builder
            .widget("continent-filter", continents(), "Asia")
            .unwrap();
        for output in ["chart-a", "chart-b"] {
            let log = log.clone();
            builder
                .bind(output, ["continent-filter"], move |inputs: &Inputs| {
                    let continent = inputs.scalar(0)?.to_string();
                    log.push(format!("transform:{output}:{continent}"));
                    Ok(format!("{output}/{continent}"))
                })
                .unwrap();
        }
        builder.presenter(log.clone());
        let mut dispatcher = builder.build();

        let report = dispatcher
            .set_input("continent-filter", "Europe")
            .unwrap();
        assert_eq!(report.invocations(), 2);
        assert_eq!(
            report.updated,
            vec![OutputId::from("chart-a"), OutputId::from("chart-b")]
        );
        assert_eq!(
            log.entries(),
            vec![
                "transform:chart-a:Europe",
                "present:chart-a",
                "transform:chart-b:Europe",
                "present:chart-b",
            ]
        );
        assert_eq!(
            dispatcher.sink().get("chart-b").unwrap().payload,
            "chart-b/Europe"
        );
    }

    #[test]
    fn failing_transform_leaves_previous_artifact_and_siblings_run() {
        let mut builder = Dispatcher::builder();
        builder.widget("continent", continents(), "Asia").unwrap();
        builder
            .bind("fragile", ["continent"], |inputs: &Inputs| {
                match inputs.scalar(0)? {
                    Scalar::Text(c) if c == "Africa" => Err(TransformError::msg("no rows")),
                    other => Ok(format!("fragile/{other}")),
                }
            })
            .unwrap()
            .bind("sturdy", ["continent"], |inputs: &Inputs| {
                Ok(format!("sturdy/{}", inputs.scalar(0)?))
            })
            .unwrap();
        let mut dispatcher = builder.build();
        assert!(dispatcher.initialize().is_clean());

        let report = dispatcher.set_input("continent", "Africa").unwrap();
        assert_eq!(report.updated, vec![OutputId::from("sturdy")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].output.as_str(), "fragile");

        assert_eq!(dispatcher.sink().get("fragile").unwrap().payload, "fragile/Asia");
        assert_eq!(dispatcher.sink().get("sturdy").unwrap().payload, "sturdy/Africa");
        assert_eq!(
            dispatcher.sink().status("fragile"),
            OutputStatus::Failed("no rows".into())
        );
    }

    #[test]
    fn panicking_transform_is_contained() {
        let mut builder = Dispatcher::builder();
        builder.widget("continent", continents(), "Asia").unwrap();
        builder
            .bind("explodes", ["continent"], |_: &Inputs| -> Result<String, TransformError> {
                panic!("renderer crashed")
            })
            .unwrap()
            .bind("fine", ["continent"], |_: &Inputs| Ok("ok".to_string()))
            .unwrap();
        let mut dispatcher = builder.build();

        let report = dispatcher.set_input("continent", "Europe").unwrap();
        assert_eq!(report.updated, vec![OutputId::from("fine")]);
        assert!(matches!(
            &report.failures[0].cause,
            TransformError::Panicked(msg) if msg == "renderer crashed"
        ));
    }

    #[test]
    fn rejected_event_runs_nothing() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut builder = Dispatcher::builder();
        builder
            .widget(
                "threshold",
                Control::RangeSlider {
                    min: -10.0,
                    max: 100.0,
                },
                Value::pair(0.0, 50.0),
            )
            .unwrap();
        builder
            .bind("chart", ["threshold"], move |inputs: &Inputs| {
                counter.set(counter.get() + 1);
                Ok(format!("{:?}", inputs.pair(0)?))
            })
            .unwrap();
        let mut dispatcher = builder.build();

        let err = dispatcher
            .set_input("threshold", Value::pair(10.0, -5.0))
            .unwrap_err();
        assert!(matches!(err, WidgetError::InvalidValue { .. }));
        assert_eq!(
            dispatcher.registry().get("threshold").unwrap(),
            &Value::pair(0.0, 50.0)
        );
        assert_eq!(calls.get(), 0);

        let err = dispatcher.set_input("ghost", 1_i64).unwrap_err();
        assert_eq!(err, WidgetError::UnknownWidget("ghost".into()));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn startup_errors_surface_from_builder() {
        let mut builder: DashboardBuilder<String> = Dispatcher::builder();
        builder.widget("year", Control::dropdown([2007_i64]), 2007_i64).unwrap();
        builder
            .bind("graph", ["year"], |_: &Inputs| Ok(String::new()))
            .unwrap();

        assert_eq!(
            builder
                .bind("graph", ["year"], |_: &Inputs| Ok(String::new()))
                .err(),
            Some(BindingError::DuplicateOutput("graph".into()))
        );
        assert!(matches!(
            builder
                .bind("other", ["month"], |_: &Inputs| Ok(String::new()))
                .err(),
            Some(BindingError::UnknownWidget { .. })
        ));
        assert_eq!(builder.build().graph().len(), 1);
    }
}
