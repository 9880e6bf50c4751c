//! Component registry: the closed set of component kinds, their port layouts
//! and default parameters.

use std::fmt;
use std::str::FromStr;

use super::{
    Capacitor, Component, CurrentSource, Ground, Lamp, Probe, ProbeChannel, Resistor,
    VoltageSource, Wire,
};
use crate::circuit::{ComponentId, PortId};

/// Every kind of component the engine knows how to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    VoltageSource,
    CurrentSource,
    Ground,
    Lamp,
    ProbeA,
    ProbeB,
    Wire,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        Self::Resistor,
        Self::Capacitor,
        Self::VoltageSource,
        Self::CurrentSource,
        Self::Ground,
        Self::Lamp,
        Self::ProbeA,
        Self::ProbeB,
        Self::Wire,
    ];

    /// Prefix used for generated component names.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Resistor => "R",
            Self::Capacitor => "C",
            Self::VoltageSource => "VS",
            Self::CurrentSource => "IS",
            Self::Ground => "G",
            Self::Lamp => "L",
            Self::ProbeA => "PA",
            Self::ProbeB => "PB",
            Self::Wire => "W",
        }
    }

    /// Port names in declaration order.
    pub fn port_names(&self) -> &'static [&'static str] {
        match self {
            Self::Resistor | Self::Capacitor | Self::CurrentSource | Self::Lamp => &["p", "n"],
            Self::VoltageSource | Self::ProbeA | Self::ProbeB => &["+", "-"],
            Self::Wire => &["a", "b"],
            Self::Ground => &["g"],
        }
    }

    /// Get the number of ports for this kind.
    pub fn port_count(&self) -> usize {
        self.port_names().len()
    }

    /// Default value of the primary parameter, if the kind has one.
    pub fn default_value(&self) -> Option<f64> {
        match self {
            Self::Resistor => Some(1000.0),
            Self::Capacitor => Some(1e-3),
            Self::VoltageSource => Some(5.0),
            Self::CurrentSource => Some(0.01),
            Self::Lamp => Some(100.0),
            Self::Ground | Self::ProbeA | Self::ProbeB | Self::Wire => None,
        }
    }

    /// Stable lowercase name, accepted back by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::VoltageSource => "vsource",
            Self::CurrentSource => "isource",
            Self::Ground => "ground",
            Self::Lamp => "lamp",
            Self::ProbeA => "probeA",
            Self::ProbeB => "probeB",
            Self::Wire => "wire",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resistor" | "r" => Ok(Self::Resistor),
            "capacitor" | "c" => Ok(Self::Capacitor),
            "vsource" | "voltage_source" | "v" => Ok(Self::VoltageSource),
            "isource" | "current_source" | "i" => Ok(Self::CurrentSource),
            "ground" | "gnd" => Ok(Self::Ground),
            "lamp" => Ok(Self::Lamp),
            "probea" | "voltmetera" => Ok(Self::ProbeA),
            "probeb" | "voltmeterb" => Ok(Self::ProbeB),
            "wire" | "w" => Ok(Self::Wire),
            _ => Err(format!("unknown component kind '{}'", s)),
        }
    }
}

impl Component {
    /// Build a component record of `kind` on already-allocated ports.
    ///
    /// `value` overrides the kind's default primary parameter; it is ignored
    /// for kinds without one.
    pub(crate) fn build(
        kind: ComponentKind,
        id: ComponentId,
        name: String,
        ports: &[PortId],
        value: Option<f64>,
    ) -> Self {
        debug_assert_eq!(ports.len(), kind.port_count(), "wrong port count for {}", kind);
        let value = value.or(kind.default_value()).unwrap_or(0.0);
        let pair = || [ports[0], ports[1]];

        match kind {
            ComponentKind::Resistor => Component::Resistor(Resistor::new(id, name, pair(), value)),
            ComponentKind::Capacitor => {
                Component::Capacitor(Capacitor::new(id, name, pair(), value))
            }
            ComponentKind::VoltageSource => {
                Component::VoltageSource(VoltageSource::new(id, name, pair(), value))
            }
            ComponentKind::CurrentSource => {
                Component::CurrentSource(CurrentSource::new(id, name, pair(), value))
            }
            ComponentKind::Ground => Component::Ground(Ground::new(id, name, ports[0])),
            ComponentKind::Lamp => Component::Lamp(Lamp::new(id, name, pair(), value)),
            ComponentKind::ProbeA => {
                Component::Probe(Probe::new(id, name, pair(), ProbeChannel::A))
            }
            ComponentKind::ProbeB => {
                Component::Probe(Probe::new(id, name, pair(), ProbeChannel::B))
            }
            ComponentKind::Wire => Component::Wire(Wire::new(id, name, pair())),
        }
    }
}
