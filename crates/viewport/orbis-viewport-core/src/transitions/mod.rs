//! Built-in viewport transitions.

pub mod default;
pub mod immediate;
pub mod plan;
