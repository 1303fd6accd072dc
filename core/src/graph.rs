use std::collections::HashMap;

use crate::{BindingError, Inputs, OutputId, TransformError, WidgetId, WidgetRegistry};

pub type TransformFn<A> = Box<dyn Fn(&Inputs) -> Result<A, TransformError>>;

/// Links an ordered set of widgets to one output through a transform.
pub struct Binding<A> {
    output: OutputId,
    inputs: Vec<WidgetId>,
    transform: TransformFn<A>,
}

impl<A> Binding<A> {
    pub fn output(&self) -> &OutputId {
        &self.output
    }

    pub fn inputs(&self) -> &[WidgetId] {
        &self.inputs
    }

    pub fn apply(&self, inputs: &Inputs) -> Result<A, TransformError> {
        (self.transform)(inputs)
    }
}

impl<A> std::fmt::Debug for Binding<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Declared bindings plus a reverse index from widget to dependent bindings.
pub struct BindingGraph<A> {
    bindings: Vec<Binding<A>>,
    by_output: HashMap<OutputId, usize>,
    dependents: HashMap<WidgetId, Vec<usize>>,
}

impl<A> Default for BindingGraph<A> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            by_output: HashMap::new(),
            dependents: HashMap::new(),
        }
    }
}

impl<A> BindingGraph<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a binding. Nothing is installed when an error is returned.
    pub fn register<I, W, F>(
        &mut self,
        registry: &WidgetRegistry,
        output: impl Into<OutputId>,
        inputs: I,
        transform: F,
    ) -> Result<(), BindingError>
    where
        I: IntoIterator<Item = W>,
        W: Into<WidgetId>,
        F: Fn(&Inputs) -> Result<A, TransformError> + 'static,
    {
        let output = output.into();
        if self.by_output.contains_key(&output) {
            return Err(BindingError::DuplicateOutput(output));
        }

        let inputs: Vec<WidgetId> = inputs.into_iter().map(Into::into).collect();
        if inputs.is_empty() {
            return Err(BindingError::NoInputs(output));
        }
        if let Some(widget) = inputs.iter().find(|w| !registry.contains(w.as_str())) {
            return Err(BindingError::UnknownWidget {
                output,
                widget: widget.clone(),
            });
        }

        let index = self.bindings.len();
        for widget in &inputs {
            let slot = self.dependents.entry(widget.clone()).or_default();
            if slot.last() != Some(&index) {
                slot.push(index);
            }
        }
        self.by_output.insert(output.clone(), index);
        self.bindings.push(Binding {
            output,
            inputs,
            transform: Box::new(transform),
        });
        Ok(())
    }

    /// Bindings that read `widget`, in registration order.
    pub fn triggered_by(&self, widget: &str) -> impl Iterator<Item = &Binding<A>> {
        self.dependents
            .get(widget)
            .into_iter()
            .flatten()
            .map(|&idx| &self.bindings[idx])
    }

    pub fn get(&self, output: &str) -> Option<&Binding<A>> {
        self.by_output.get(output).map(|&idx| &self.bindings[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding<A>> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Control, Value};

    fn registry() -> WidgetRegistry {
        let mut registry = WidgetRegistry::new();
        for id in ["a", "b", "c"] {
            registry.declare(id, Control::Text, "").unwrap();
        }
        registry
    }

    fn constant(label: &'static str) -> impl Fn(&Inputs) -> Result<String, TransformError> {
        move |_: &Inputs| Ok(label.to_string())
    }

    fn outputs<'a>(graph: &'a BindingGraph<String>, widget: &str) -> Vec<&'a str> {
        graph
            .triggered_by(widget)
            .map(|b| b.output().as_str())
            .collect()
    }

    #[test]
    fn reverse_index_in_registration_order() {
        let registry = registry();
        let mut graph = BindingGraph::new();
        graph.register(&registry, "x", ["a", "b"], constant("x")).unwrap();
        graph.register(&registry, "y", ["b"], constant("y")).unwrap();
        graph.register(&registry, "z", ["c"], constant("z")).unwrap();

        assert_eq!(outputs(&graph, "a"), vec!["x"]);
        assert_eq!(outputs(&graph, "b"), vec!["x", "y"]);
        assert_eq!(outputs(&graph, "c"), vec!["z"]);
        assert!(outputs(&graph, "unbound").is_empty());
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn duplicate_output_is_not_installed() {
        let registry = registry();
        let mut graph = BindingGraph::new();
        graph.register(&registry, "x", ["a"], constant("first")).unwrap();

        let err = graph
            .register(&registry, "x", ["b"], constant("second"))
            .unwrap_err();
        assert_eq!(err, BindingError::DuplicateOutput("x".into()));
        assert_eq!(graph.len(), 1);
        assert!(outputs(&graph, "b").is_empty());

        let installed = graph.get("x").unwrap();
        let inputs = registry.snapshot(installed.inputs()).unwrap();
        assert_eq!(installed.apply(&inputs).unwrap(), "first");
    }

    #[test]
    fn unknown_or_missing_inputs_are_rejected() {
        let registry = registry();
        let mut graph: BindingGraph<String> = BindingGraph::new();

        let err = graph
            .register(&registry, "x", ["a", "nope"], constant("x"))
            .unwrap_err();
        assert_eq!(
            err,
            BindingError::UnknownWidget {
                output: "x".into(),
                widget: "nope".into(),
            }
        );
        assert!(outputs(&graph, "a").is_empty());

        let err = graph
            .register(&registry, "x", Vec::<&str>::new(), constant("x"))
            .unwrap_err();
        assert_eq!(err, BindingError::NoInputs("x".into()));
        assert!(graph.is_empty());
    }

    #[test]
    fn repeated_input_triggers_once() {
        let registry = registry();
        let mut graph = BindingGraph::new();
        graph
            .register(&registry, "x", ["a", "a"], |inputs: &Inputs| {
                Ok(format!("{}", inputs.len()))
            })
            .unwrap();
        assert_eq!(outputs(&graph, "a"), vec!["x"]);
        assert_eq!(
            registry.snapshot(graph.get("x").unwrap().inputs()).unwrap().get(1),
            Some(&Value::from(""))
        );
    }
}
