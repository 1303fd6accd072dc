mod dispatcher;
mod error;
mod graph;
mod inputs;
mod present;
mod registry;
mod sink;
mod types;

pub mod data;
pub mod figure;

pub use dispatcher::{DashboardBuilder, DispatchReport, Dispatcher, Trigger};
pub use error::{BindingError, DataError, SinkError, TransformError, TransformFailure, WidgetError};
pub use figure::{Figure, FigureSpec, render};
pub use graph::{Binding, BindingGraph, TransformFn};
pub use inputs::Inputs;
pub use present::{ChannelPresenter, NullPresenter, Presenter, Update};
pub use registry::WidgetRegistry;
pub use sink::{Artifact, OutputSink, OutputStatus};
pub use types::{
    ChangeEvent, Control, OutputId, Rejection, Scalar, Value, ValueKind, Widget, WidgetId,
};
