//! Error types for the Ohmlab circuit engine.
//!
//! This module provides a unified error type [`OhmlabError`] that covers
//! netlist parsing, circuit editing, simulation setup, and the level catalog.
//!
//! A singular linear system is reported through [`OhmlabError::SingularMatrix`]
//! by the solver, but [`crate::solver::simulate_step`] never surfaces it: the
//! step turns it into [`crate::solver::SolveStatus::Singular`] instead.

use thiserror::Error;

use crate::circuit::{ComponentId, NodeId, PortId};

/// Result type alias using [`OhmlabError`].
pub type Result<T> = std::result::Result<T, OhmlabError>;

/// Unified error type for all Ohmlab operations.
#[derive(Error, Debug)]
pub enum OhmlabError {
    // ============ Netlist Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    // ============ Circuit Errors ============
    /// Port id does not belong to the circuit
    #[error("Port {port} not found in circuit")]
    PortNotFound { port: PortId },

    /// Component id does not belong to the circuit
    #[error("Component {id} not found in circuit")]
    ComponentNotFound { id: ComponentId },

    /// Component exists but has no port at that index
    #[error("Component {id} has no port {index}")]
    PortIndexOutOfRange { id: ComponentId, index: usize },

    /// Floating node (not connected to ground path)
    #[error("Floating node '{node}' detected - no path to ground")]
    FloatingNode { node: NodeId },

    // ============ Simulation Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - circuit may have a short circuit or floating node")]
    SingularMatrix,

    /// Time step is not a finite positive number
    #[error("Invalid time step {dt}: must be finite and positive")]
    InvalidTimeStep { dt: f64 },

    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    // ============ Level Errors ============
    /// No level with the given id
    #[error("Unknown level '{id}'")]
    UnknownLevel { id: String },

    // ============ I/O Errors ============
    /// Error reading netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl OhmlabError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }
}
