use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::actions::{FileAction, SimulatedAction};
use crate::error::{FileProcessingError, FileProcessingResult};
use crate::models::{FileProcessingMessage, ProcessType};

/// Routes a message to the action registered for its `process_type`.
#[derive(Clone, Default)]
pub struct ActionDispatcher {
    actions: HashMap<ProcessType, Arc<dyn FileAction>>,
}

impl ActionDispatcher {
    /// Empty dispatcher; every message is rejected until actions are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with a [`SimulatedAction`] for every process type.
    pub fn simulated() -> Self {
        ProcessType::iter().fold(Self::new(), |dispatcher, kind| {
            dispatcher.with_action(SimulatedAction::new(kind))
        })
    }

    /// Register an action, replacing any previous one for the same kind.
    pub fn with_action(mut self, action: impl FileAction + 'static) -> Self {
        self.actions.insert(action.kind(), Arc::new(action));
        self
    }

    pub fn supports(&self, kind: ProcessType) -> bool {
        self.actions.contains_key(&kind)
    }

    /// Run the action for `message`.
    ///
    /// Unknown or unregistered kinds fail with
    /// [`FileProcessingError::UnknownActionKind`] whatever the other fields hold.
    pub async fn dispatch(&self, message: &FileProcessingMessage) -> FileProcessingResult<()> {
        let action = message
            .process_kind()
            .and_then(|kind| self.actions.get(&kind))
            .ok_or_else(|| FileProcessingError::UnknownActionKind(message.process_type.clone()))?;

        action.run(message).await
    }
}
