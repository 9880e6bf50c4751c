//! Components that never enter the MNA matrix: ground references, wires and
//! voltmeter probes.

use std::fmt;

use crate::circuit::{ComponentId, PortId};

/// A ground symbol. Its single port sits on the ground node.
#[derive(Debug, Clone, PartialEq)]
pub struct Ground {
    pub id: ComponentId,
    pub name: String,
    pub port: PortId,
}

impl Ground {
    pub fn new(id: ComponentId, name: String, port: PortId) -> Self {
        Self { id, name, port }
    }
}

/// A zero-resistance wire.
///
/// Both ports share one node from the moment the wire is created, so the short
/// is expressed by node identity and needs no matrix row.
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2], // [a, b]
}

impl Wire {
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2]) -> Self {
        Self { id, name, ports }
    }
}

/// Which of the two voltmeter probes a [`Probe`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeChannel {
    A,
    B,
}

impl fmt::Display for ProbeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeChannel::A => write!(f, "A"),
            ProbeChannel::B => write!(f, "B"),
        }
    }
}

/// An ideal voltmeter.
///
/// Infinite input impedance: nothing is stamped. After a successful solve the
/// probe reads V(+) - V(-).
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2], // [+, -]
    pub channel: ProbeChannel,

    /// Voltage measured on the last solved step
    pub reading: f64,
}

impl Probe {
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], channel: ProbeChannel) -> Self {
        Self {
            id,
            name,
            ports,
            channel,
            reading: 0.0,
        }
    }

    pub fn update_state(&mut self, v: f64) {
        self.reading = v;
    }
}
