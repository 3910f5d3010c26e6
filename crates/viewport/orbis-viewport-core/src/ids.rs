//! Identity of registered viewport states and transitions.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Identity of a state registered with a [`ViewportController`](crate::ViewportController).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// Identity of a transition registered with a [`ViewportController`](crate::ViewportController).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TransitionId(pub u32);

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.0)
    }
}

static NEXT_STATE: AtomicU32 = AtomicU32::new(0);
static NEXT_TRANSITION: AtomicU32 = AtomicU32::new(0);

impl StateId {
    /// Fresh id, unique across every controller in the process. Two
    /// registrations of identically configured states still differ.
    pub fn next() -> Self {
        Self(NEXT_STATE.fetch_add(1, Ordering::Relaxed))
    }
}

impl TransitionId {
    /// Fresh id, unique across every controller in the process.
    pub fn next() -> Self {
        Self(NEXT_TRANSITION.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_handed_out_twice() {
        let a = StateId::next();
        let b = StateId::next();
        assert!(b > a);
        let t = TransitionId::next();
        assert!(TransitionId::next() > t);
        assert_eq!(StateId(4).to_string(), "state#4");
    }
}
