use crate::resource::{Lister, PropertyError, ResourceInstance};

/// The state an [`Item`] occupies in the queue. `Filtered` and `Finished`
/// are terminal: once entered, `state` never leaves them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    New,
    Pending,
    Waiting,
    Failed,
    Filtered,
    Finished,
}

impl ItemState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Filtered | ItemState::Finished)
    }
}

/// A single resource instance discovered during a scan, tracked through
/// the run loop's state machine.
pub struct Item {
    pub kind: String,
    pub region: String,
    pub resource: Box<dyn ResourceInstance>,
    pub state: ItemState,
    pub reason: String,
}

impl Item {
    pub fn new(kind: impl Into<String>, region: impl Into<String>, resource: Box<dyn ResourceInstance>) -> Self {
        Self {
            kind: kind.into(),
            region: region.into(),
            resource,
            state: ItemState::New,
            reason: String::new(),
        }
    }

    pub fn new_filtered(
        kind: impl Into<String>,
        region: impl Into<String>,
        resource: Box<dyn ResourceInstance>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            region: region.into(),
            resource,
            state: ItemState::Filtered,
            reason: reason.into(),
        }
    }

    /// Transition to a new state. Panics in debug builds if called on an
    /// item already in a terminal state — `filtered`/`finished` must never
    /// be re-entered.
    pub fn set_state(&mut self, state: ItemState, reason: impl Into<String>) {
        debug_assert!(
            !self.state.is_terminal(),
            "attempted to transition item {} out of terminal state {:?}",
            self.resource.identity(),
            self.state
        );
        self.state = state;
        self.reason = reason.into();
    }

    /// Render a single summary line: region, kind, identity, state, reason.
    pub fn print(&self) -> String {
        if self.reason.is_empty() {
            format!("[{}] {} {} — {:?}", self.region, self.kind, self.resource.identity(), self.state)
        } else {
            format!(
                "[{}] {} {} — {:?} ({})",
                self.region,
                self.kind,
                self.resource.identity(),
                self.state,
                self.reason
            )
        }
    }

    /// Delegate to the resource's properties capability.
    pub fn get_property(&self, name: &str) -> Result<serde_json::Value, PropertyError> {
        self.resource.get_property(name)
    }

    /// Delegate to the resource's equality.
    pub fn equals_resource(&self, other: &dyn ResourceInstance) -> bool {
        self.resource.equals(other)
    }

    /// Delegate to the kind's lister in this item's region.
    pub async fn list(&self, lister: &dyn Lister) -> Result<Vec<Box<dyn ResourceInstance>>, crate::error::ReaperError> {
        lister.list(&self.region).await
    }
}
