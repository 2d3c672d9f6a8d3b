use crate::Registry;

/// Leaves its state when dropped.
///
/// If the same id was re-entered by someone else in the meantime, dropping
/// the guard still removes it, exactly like calling [`Registry::leave`].
#[must_use = "dropping the guard immediately leaves the state"]
pub struct StateGuard<'a> {
    registry: &'a Registry,
    id: Option<String>,
}

impl<'a> StateGuard<'a> {
    pub(crate) fn new(registry: &'a Registry, id: String) -> Self {
        Self {
            registry,
            id: Some(id),
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Consumes the guard and keeps the state active.
    pub fn forget(mut self) {
        self.id = None;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.registry.leave(&id);
        }
    }
}
