//! Component models for circuit simulation.
//!
//! This module provides models for all supported circuit components:
//! - Linear: Resistor, Capacitor, Lamp
//! - Sources: Voltage Source, Current Source
//! - Unstamped: Ground, Wire, Probe (A and B)
//!
//! [`Component`] is a closed tagged variant, so matrix stamping and state
//! propagation are exhaustive matches over the kinds listed in
//! [`ComponentKind`].

mod linear;
mod probes;
mod registry;
mod sources;

pub use linear::{Capacitor, Lamp, Resistor, MIN_RESISTANCE};
pub use probes::{Ground, Probe, ProbeChannel, Wire};
pub use registry::ComponentKind;
pub use sources::{CurrentSource, VoltageSource};

use crate::circuit::{ComponentId, PortId};

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Ground(Ground),
    Lamp(Lamp),
    Probe(Probe),
    Wire(Wire),
}

impl Component {
    /// Get the component ID.
    pub fn id(&self) -> ComponentId {
        match self {
            Component::Resistor(r) => r.id,
            Component::Capacitor(c) => c.id,
            Component::VoltageSource(v) => v.id,
            Component::CurrentSource(i) => i.id,
            Component::Ground(g) => g.id,
            Component::Lamp(l) => l.id,
            Component::Probe(p) => p.id,
            Component::Wire(w) => w.id,
        }
    }

    /// Get the component name.
    pub fn name(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.name,
            Component::Capacitor(c) => &c.name,
            Component::VoltageSource(v) => &v.name,
            Component::CurrentSource(i) => &i.name,
            Component::Ground(g) => &g.name,
            Component::Lamp(l) => &l.name,
            Component::Probe(p) => &p.name,
            Component::Wire(w) => &w.name,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::Capacitor(_) => ComponentKind::Capacitor,
            Component::VoltageSource(_) => ComponentKind::VoltageSource,
            Component::CurrentSource(_) => ComponentKind::CurrentSource,
            Component::Ground(_) => ComponentKind::Ground,
            Component::Lamp(_) => ComponentKind::Lamp,
            Component::Probe(p) => match p.channel {
                ProbeChannel::A => ComponentKind::ProbeA,
                ProbeChannel::B => ComponentKind::ProbeB,
            },
            Component::Wire(_) => ComponentKind::Wire,
        }
    }

    /// Ports in declaration order.
    pub fn ports(&self) -> &[PortId] {
        match self {
            Component::Resistor(r) => &r.ports,
            Component::Capacitor(c) => &c.ports,
            Component::VoltageSource(v) => &v.ports,
            Component::CurrentSource(i) => &i.ports,
            Component::Ground(g) => std::slice::from_ref(&g.port),
            Component::Lamp(l) => &l.ports,
            Component::Probe(p) => &p.ports,
            Component::Wire(w) => &w.ports,
        }
    }

    /// Primary parameter: resistance, capacitance, voltage or current.
    pub fn value(&self) -> Option<f64> {
        match self {
            Component::Resistor(r) => Some(r.resistance),
            Component::Capacitor(c) => Some(c.capacitance),
            Component::VoltageSource(v) => Some(v.voltage),
            Component::CurrentSource(i) => Some(i.current),
            Component::Lamp(l) => Some(l.resistance),
            Component::Ground(_) | Component::Probe(_) | Component::Wire(_) => None,
        }
    }

    /// Set the primary parameter. Returns false for kinds without one.
    pub fn set_value(&mut self, value: f64) -> bool {
        match self {
            Component::Resistor(r) => r.resistance = value,
            Component::Capacitor(c) => c.capacitance = value,
            Component::VoltageSource(v) => v.voltage = value,
            Component::CurrentSource(i) => i.current = value,
            Component::Lamp(l) => l.resistance = value,
            Component::Ground(_) | Component::Probe(_) | Component::Wire(_) => return false,
        }
        true
    }

    /// Derived state from the last solved step: capacitor voltage, lamp power
    /// or probe reading.
    pub fn reading(&self) -> Option<f64> {
        match self {
            Component::Capacitor(c) => Some(c.v_prev),
            Component::Lamp(l) => Some(l.power),
            Component::Probe(p) => Some(p.reading),
            _ => None,
        }
    }
}
