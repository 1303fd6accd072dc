use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{Artifact, OutputId};

#[derive(Debug)]
pub enum Update<A> {
    Redraw(Arc<Artifact<A>>),
    /// Error placeholder for one output. `last_good` is what the output kept
    /// showing before the failure, if anything.
    Failed {
        output: OutputId,
        message: String,
        last_good: Option<Arc<Artifact<A>>>,
    },
}

impl<A> Update<A> {
    pub fn output(&self) -> &OutputId {
        match self {
            Update::Redraw(artifact) => &artifact.output,
            Update::Failed { output, .. } => output,
        }
    }
}

impl<A> Clone for Update<A> {
    fn clone(&self) -> Self {
        match self {
            Update::Redraw(artifact) => Update::Redraw(Arc::clone(artifact)),
            Update::Failed {
                output,
                message,
                last_good,
            } => Update::Failed {
                output: output.clone(),
                message: message.clone(),
                last_good: last_good.clone(),
            },
        }
    }
}

/// Receives output updates. Implementations must not block the caller.
pub trait Presenter<A> {
    fn present(&self, update: Update<A>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl<A> Presenter<A> for NullPresenter {
    fn present(&self, _update: Update<A>) {}
}

/// Forwards updates over an unbounded tokio channel.
#[derive(Debug)]
pub struct ChannelPresenter<A> {
    tx: UnboundedSender<Update<A>>,
}

impl<A> ChannelPresenter<A> {
    pub fn new() -> (Self, UnboundedReceiver<Update<A>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl<A> Presenter<A> for ChannelPresenter<A> {
    fn present(&self, update: Update<A>) {
        let output = update.output().clone();
        if self.tx.send(update).is_err() {
            tracing::trace!(%output, "presentation channel closed, update dropped");
        }
    }
}
