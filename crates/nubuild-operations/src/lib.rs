pub mod context;
pub mod types;

pub mod pack;
pub mod plan;
pub mod report;
pub mod restore;

#[cfg(test)]
pub(crate) mod test_utils;

pub use context::StepContext;
pub use types::*;
