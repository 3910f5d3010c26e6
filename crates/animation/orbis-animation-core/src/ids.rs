//! Identifiers and simple allocators for runner-owned entities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle of an animator slot inside an [`AnimatorRunner`](crate::AnimatorRunner).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct AnimatorId(pub u64);

impl fmt::Display for AnimatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "animator#{}", self.0)
    }
}

/// Handle of a registered status listener.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// Monotonic allocator for AnimatorId and ListenerId.
/// Ids are never reused within one runner, so a stale id can never alias a new animator.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_animator: u64,
    next_listener: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_animator(&mut self) -> AnimatorId {
        let id = AnimatorId(self.next_animator);
        self.next_animator = self.next_animator.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
