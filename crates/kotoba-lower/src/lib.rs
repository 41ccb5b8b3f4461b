pub mod classify;
pub mod transform;

pub use classify::{classify, Rule};
pub use transform::{flatten, lower, transform, Lowered};
