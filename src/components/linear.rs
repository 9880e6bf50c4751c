//! Linear passive components: Resistor, Capacitor, Lamp.

use crate::circuit::{ComponentId, PortId};

/// Resistance magnitude below which a part is treated as 1e-9 ohm. Caps
/// conductance at 1e9 S so a zero-ohm part never divides by zero.
pub const MIN_RESISTANCE: f64 = 1e-9;

/// Signed `1/R`; only magnitudes under [`MIN_RESISTANCE`] are replaced.
fn conductance_of(resistance: f64) -> f64 {
    if resistance.abs() < MIN_RESISTANCE {
        1.0 / MIN_RESISTANCE
    } else {
        1.0 / resistance
    }
}

/// A resistor component.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2], // [p, n]
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], resistance: f64) -> Self {
        Self {
            id,
            name,
            ports,
            resistance,
        }
    }

    /// Get the conductance (1/R), bounded in magnitude by the resistance floor.
    pub fn conductance(&self) -> f64 {
        conductance_of(self.resistance)
    }
}

/// A capacitor component.
///
/// Each step the capacitor is replaced by its backward-Euler companion model:
///   i(n) = (C/dt) * (v(n) - v(n-1))
///
/// which is an equivalent conductance G_eq = C/dt in parallel with a current
/// source I_eq = G_eq * v(n-1) injected into the positive terminal. `v_prev`
/// is the terminal voltage solved on the last successful step.
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2],
    pub capacitance: f64,

    /// Voltage across the capacitor after the last solved step
    pub v_prev: f64,
}

impl Capacitor {
    /// Create a new, uncharged capacitor.
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], capacitance: f64) -> Self {
        Self {
            id,
            name,
            ports,
            capacitance,
            v_prev: 0.0,
        }
    }

    /// Equivalent conductance of the companion model.
    pub fn conductance(&self, dt: f64) -> f64 {
        self.capacitance / dt
    }

    /// Equivalent history current of the companion model.
    pub fn current_source(&self, dt: f64) -> f64 {
        self.conductance(dt) * self.v_prev
    }

    /// Remember the solved terminal voltage for the next step.
    pub fn update_state(&mut self, v_new: f64) {
        self.v_prev = v_new;
    }
}

/// A lamp: a resistive load that reports the power it dissipates.
#[derive(Debug, Clone, PartialEq)]
pub struct Lamp {
    pub id: ComponentId,
    pub name: String,
    pub ports: [PortId; 2],
    pub resistance: f64,

    /// Power dissipated on the last solved step (watts)
    pub power: f64,
}

impl Lamp {
    /// Create a new, unlit lamp.
    pub fn new(id: ComponentId, name: String, ports: [PortId; 2], resistance: f64) -> Self {
        Self {
            id,
            name,
            ports,
            resistance,
            power: 0.0,
        }
    }

    pub fn conductance(&self) -> f64 {
        conductance_of(self.resistance)
    }

    /// Update dissipated power from the solved terminal voltage: P = V^2 / R.
    pub fn update_state(&mut self, v: f64) {
        self.power = v * v * self.conductance();
    }
}
