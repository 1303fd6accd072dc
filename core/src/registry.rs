use std::collections::HashMap;

use crate::{ChangeEvent, Control, Inputs, Rejection, Value, Widget, WidgetError, WidgetId};

/// Current values of every declared input control.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<WidgetId, Widget>,
    order: Vec<WidgetId>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        id: impl Into<WidgetId>,
        control: Control,
        initial: impl Into<Value>,
    ) -> Result<(), WidgetError> {
        let id = id.into();
        if self.widgets.contains_key(&id) {
            return Err(WidgetError::DuplicateWidget(id));
        }
        let initial = initial.into();
        control
            .validate(&initial)
            .map_err(|rejection| reject(&id, rejection))?;

        self.order.push(id.clone());
        self.widgets.insert(
            id.clone(),
            Widget {
                id,
                control,
                value: initial,
            },
        );
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn widget(&self, id: &str) -> Result<&Widget, WidgetError> {
        self.widgets
            .get(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.into()))
    }

    pub fn get(&self, id: &str) -> Result<&Value, WidgetError> {
        self.widget(id).map(|w| &w.value)
    }

    /// Commits `value` and returns the resulting change event. A rejected
    /// value leaves the previous one in place.
    pub fn set(&mut self, id: &str, value: Value) -> Result<ChangeEvent, WidgetError> {
        let widget = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.into()))?;
        widget
            .control
            .validate(&value)
            .map_err(|rejection| reject(&widget.id, rejection))?;

        widget.value = value;
        Ok(ChangeEvent {
            widget: widget.id.clone(),
            value: widget.value.clone(),
        })
    }

    pub fn snapshot(&self, ids: &[WidgetId]) -> Result<Inputs, WidgetError> {
        let entries = ids
            .iter()
            .map(|id| self.get(id.as_str()).map(|v| (id.clone(), v.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Inputs::new(entries))
    }

    /// Widgets in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.order.iter().filter_map(|id| self.widgets.get(id))
    }
}

fn reject(id: &WidgetId, rejection: Rejection) -> WidgetError {
    match rejection {
        Rejection::Kind { expected, found } => WidgetError::TypeMismatch {
            widget: id.clone(),
            expected,
            found,
        },
        Rejection::Domain(reason) => WidgetError::InvalidValue {
            widget: id.clone(),
            reason,
        },
    }
}
