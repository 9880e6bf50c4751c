//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for circuit simulation.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (resistors, lamps, capacitor companions)
//! - B, C connect voltage sources to nodes
//! - D is 0 (ideal voltage sources only)
//! - v is the vector of node voltages
//! - j is the vector of voltage source currents
//! - i is the sum of current sources into each node
//! - e is the vector of voltage source values
//!
//! The system is rebuilt from the current topology on every step and solved
//! densely; circuits are tens of elements.

mod elimination;
mod mna;
mod propagate;
mod simulator;

pub use elimination::solve_dense;
pub use mna::{assemble, MnaLayout, MnaMatrix};
pub use simulator::{
    simulate_step, simulate_step_with_tolerance, SimulatorConfig, Simulator, SolveStatus,
    StepResult,
};

/// Pivot magnitude below which the system is declared singular.
pub const PIVOT_TOLERANCE: f64 = 1e-12;

/// Default step length in seconds.
pub const DEFAULT_DT: f64 = 0.02;
