//! Lifecycle Notifications
//!
//! Observers are invoked synchronously from inside `step()`. They only ever
//! see plain data, so they cannot call back into the controller.

use opinion_events::{CompletionReport, InteractionResult, ProgressReport};
use std::cell::RefCell;
use std::rc::Rc;

/// Receiver of push notifications from a running simulation.
///
/// All methods default to doing nothing.
pub trait SimulationObserver {
    /// Called after every interaction.
    fn on_interaction(&mut self, _result: &InteractionResult) {}

    /// Called every `progress_interval` interactions.
    fn on_progress(&mut self, _report: &ProgressReport) {}

    /// Called once when the run becomes complete.
    fn on_complete(&mut self, _report: &CompletionReport) {}
}

/// Shared observers, so a driver can keep a handle to one it registered.
impl<T: SimulationObserver> SimulationObserver for Rc<RefCell<T>> {
    fn on_interaction(&mut self, result: &InteractionResult) {
        self.borrow_mut().on_interaction(result);
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        self.borrow_mut().on_progress(report);
    }

    fn on_complete(&mut self, report: &CompletionReport) {
        self.borrow_mut().on_complete(report);
    }
}

/// Everything a [`RecordingObserver`] has seen.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub interactions: Vec<InteractionResult>,
    pub progress: Vec<ProgressReport>,
    pub completions: Vec<CompletionReport>,
}

/// Observer that keeps every notification in memory.
///
/// The recording is shared with the driver through [`RecordingObserver::handle`].
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recording, readable after the observer has been
    /// handed to a controller.
    pub fn handle(&self) -> Rc<RefCell<Recording>> {
        Rc::clone(&self.recording)
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_interaction(&mut self, result: &InteractionResult) {
        self.recording.borrow_mut().interactions.push(result.clone());
    }

    fn on_progress(&mut self, report: &ProgressReport) {
        self.recording.borrow_mut().progress.push(*report);
    }

    fn on_complete(&mut self, report: &CompletionReport) {
        self.recording.borrow_mut().completions.push(*report);
    }
}
