//! Circuit representation, net model and validation.
//!
//! The [`Circuit`] struct holds all components in insertion order together
//! with the [`NetTable`] that records which ports share an electrical node.

mod graph;
mod nets;
mod types;
mod validate;

pub use graph::Circuit;
pub use nets::NetTable;
pub use types::*;
pub use validate::{floating_nodes, validate_circuit};
