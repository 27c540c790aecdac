pub mod types;
pub mod error;
pub mod graph;
pub mod solver;

pub use error::{LinkageError, LinkageResult};
pub use graph::Linkage;
pub use solver::{LinkageSolver, Snapshot};
pub use types::*;

#[cfg(test)]
mod tests_graph;
