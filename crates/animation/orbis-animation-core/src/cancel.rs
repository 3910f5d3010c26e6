//! Cancel-once tokens returned by long-running operations.

use std::fmt;

/// Runs its action at most once, on the first `cancel()`. Dropping without
/// cancelling does nothing.
#[derive(Default)]
pub struct Cancelable {
    action: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Cancelable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancelable")
            .field("armed", &self.action.is_some())
            .finish()
    }
}

impl Cancelable {
    pub fn new(action: impl FnOnce() + 'static) -> Self {
        Self {
            action: Some(Box::new(action)),
        }
    }

    /// Token with nothing to cancel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Combine several tokens; cancelling the result cancels each in order.
    pub fn from_many(items: Vec<Cancelable>) -> Self {
        Self::new(move || {
            for mut c in items {
                c.cancel();
            }
        })
    }

    pub fn is_armed(&self) -> bool {
        self.action.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(action) = self.action.take() {
            action();
        }
    }
}
