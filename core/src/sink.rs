use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::{NullPresenter, OutputId, Presenter, SinkError, Update};

/// Latest computed result for one output.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact<A> {
    pub output: OutputId,
    pub payload: A,
    pub revision: u64,
    pub computed_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputStatus {
    Pending,
    Ready,
    Failed(String),
}

struct Slot<A> {
    artifact: Option<Arc<Artifact<A>>>,
    error: Option<String>,
}

impl<A> Default for Slot<A> {
    fn default() -> Self {
        Self {
            artifact: None,
            error: None,
        }
    }
}

pub struct OutputSink<A> {
    slots: HashMap<OutputId, Slot<A>>,
    presenter: Box<dyn Presenter<A>>,
    next_revision: u64,
}

impl<A: 'static> Default for OutputSink<A> {
    fn default() -> Self {
        Self::new(Box::new(NullPresenter))
    }
}

impl<A> OutputSink<A> {
    pub fn new(presenter: Box<dyn Presenter<A>>) -> Self {
        Self {
            slots: HashMap::new(),
            presenter,
            next_revision: 1,
        }
    }

    /// Replaces the artifact for `output` and clears its error placeholder.
    pub fn put(&mut self, output: OutputId, payload: A) -> &Artifact<A> {
        let artifact = Arc::new(Artifact {
            output: output.clone(),
            payload,
            revision: self.next_revision,
            computed_at: OffsetDateTime::now_utc(),
        });
        self.next_revision += 1;

        let slot = self.slots.entry(output).or_default();
        slot.error = None;
        let stored = slot.artifact.insert(Arc::clone(&artifact));
        self.presenter.present(Update::Redraw(artifact));
        stored
    }

    /// Marks `output` as failed while keeping its last good artifact.
    pub fn record_failure(&mut self, output: OutputId, message: impl Into<String>) {
        let message = message.into();
        let slot = self.slots.entry(output.clone()).or_default();
        slot.error = Some(message.clone());
        let last_good = slot.artifact.clone();

        self.presenter.present(Update::Failed {
            output,
            message,
            last_good,
        });
    }

    pub fn get(&self, output: &str) -> Result<&Artifact<A>, SinkError> {
        self.slots
            .get(output)
            .and_then(|slot| slot.artifact.as_deref())
            .ok_or_else(|| SinkError::NoArtifactYet(output.into()))
    }

    pub fn status(&self, output: &str) -> OutputStatus {
        match self.slots.get(output) {
            Some(Slot {
                error: Some(message),
                ..
            }) => OutputStatus::Failed(message.clone()),
            Some(Slot {
                artifact: Some(_), ..
            }) => OutputStatus::Ready,
            _ => OutputStatus::Pending,
        }
    }
}
