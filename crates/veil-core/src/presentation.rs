//! Output side of the engine: batched visibility writes to the host's view layer.
//!
//! The engine never addresses the view message by message. Each pass produces at most
//! one hide batch and one show batch, and a failed write is logged and dropped; the
//! log flags stay authoritative and the next full pass repairs the view.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::error::VeilError;

/// The host's rendering layer.
pub trait ViewSink {
    /// Set the hidden attribute of every rendered message in `indices` to `hidden`.
    fn set_hidden(&mut self, indices: &BTreeSet<usize>, hidden: bool) -> Result<(), VeilError>;
}

pub struct PresentationAdapter {
    sink: Box<dyn ViewSink>,
}

impl PresentationAdapter {
    pub fn new(sink: Box<dyn ViewSink>) -> Self {
        Self { sink }
    }

    /// Apply one batch. Empty batches are not sent. Returns false if the write failed.
    pub fn apply(&mut self, indices: &BTreeSet<usize>, hidden: bool) -> bool {
        if indices.is_empty() {
            return true;
        }
        match self.sink.set_hidden(indices, hidden) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(count = indices.len(), hidden, "Error updating view: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct RecordedView {
    attributes: BTreeMap<usize, bool>,
    batches: Vec<(Vec<usize>, bool)>,
    failing: bool,
}

/// Tracks the last attribute written per index. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    state: Rc<RefCell<RecordedView>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hidden_indices(&self) -> Vec<usize> {
        self.state
            .borrow()
            .attributes
            .iter()
            .filter(|(_, hidden)| **hidden)
            .map(|(index, _)| *index)
            .collect()
    }

    /// Every batch written so far, in order.
    pub fn batches(&self) -> Vec<(Vec<usize>, bool)> {
        self.state.borrow().batches.clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }
}

impl ViewSink for RecordingView {
    fn set_hidden(&mut self, indices: &BTreeSet<usize>, hidden: bool) -> Result<(), VeilError> {
        let mut state = self.state.borrow_mut();
        if state.failing {
            return Err(VeilError::View {
                message: "view detached".to_string(),
            });
        }
        for index in indices {
            state.attributes.insert(*index, hidden);
        }
        state.batches.push((indices.iter().copied().collect(), hidden));
        Ok(())
    }
}
