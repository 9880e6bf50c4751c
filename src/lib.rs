//! # Ohmlab Core
//!
//! A lumped circuit simulator for interactive circuit puzzles.
//!
//! This library provides:
//! - A circuit model of components joined through merging nets
//! - Modified Nodal Analysis (MNA) based time-stepped simulation
//! - Resistors, capacitors, ideal sources, lamps, wires and voltage probes
//! - A text netlist format and a catalog of built-in puzzle levels
//!
//! ## Architecture
//!
//! - [`circuit`] - Component list, net table and topology checks
//! - [`components`] - Component models and the kind registry
//! - [`solver`] - MNA assembly, dense elimination and the step driver
//! - [`netlist`] - Parser for the netlist format
//! - [`levels`] - Built-in puzzles and their goals
//!
//! ## Usage
//!
//! ```
//! use ohmlab_core::{Circuit, Simulator};
//!
//! let mut circuit = Circuit::new();
//! let vs = circuit.add_voltage_source(10.0);
//! let r = circuit.add_resistor(1000.0);
//! let (vp, vn) = (circuit.port(vs, 0)?, circuit.port(vs, 1)?);
//! let (rp, rn) = (circuit.port(r, 0)?, circuit.port(r, 1)?);
//! circuit.connect(vp, rp)?;
//! circuit.ground(vn)?;
//! circuit.ground(rn)?;
//!
//! let mut sim = Simulator::new(circuit);
//! sim.step();
//! assert!((sim.port_voltage(rp)? - 10.0).abs() < 1e-9);
//! # Ok::<(), ohmlab_core::OhmlabError>(())
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! ohmlab run circuit.net --steps 500
//! ohmlab level cap-01 --steps 600
//! ```
//!
//! ## Simulation Method
//!
//! Each step of length dt:
//!
//! 1. Number the distinct non-ground nodes and the voltage sources
//! 2. Stamp every component into the system matrix A and source vector z
//! 3. Solve Ax = z by Gaussian elimination with partial pivoting
//! 4. Update capacitor, lamp and probe state from the solved voltages
//!
//! Capacitors use the backward-Euler companion model. A singular system
//! yields an all-zero result and leaves component state untouched.

pub mod circuit;
pub mod components;
pub mod error;
pub mod levels;
pub mod netlist;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use error::{OhmlabError, Result};
pub use solver::{simulate_step, Simulator, StepResult};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuitSim;

pub use solver::DEFAULT_DT;
