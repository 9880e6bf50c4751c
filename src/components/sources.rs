//! Independent voltage and current sources.

use crate::circuit::{ComponentId, PortId};

/// An ideal voltage source.
///
/// Voltage sources require an extra row/column in the MNA matrix for the
/// branch current. The source enforces: V+ - V- = voltage
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2], // [+, -]
    pub voltage: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], voltage: f64) -> Self {
        Self {
            id,
            name,
            ports,
            voltage,
        }
    }
}

/// An ideal current source.
///
/// Current sources add directly to the RHS vector: `current` is injected into
/// the node of port `p` and drawn from the node of port `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSource {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2], // [p, n]
    pub current: f64,
}

impl CurrentSource {
    /// Create a new current source.
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], current: f64) -> Self {
        Self {
            id,
            name,
            ports,
            current,
        }
    }
}
