//! Circuit structure: the component list plus the net table that joins their
//! ports.

use std::collections::{HashMap, HashSet};

use super::nets::NetTable;
use super::types::{ComponentId, NodeId, PortId};
use crate::components::{Component, ComponentKind, Probe, ProbeChannel};
use crate::error::{OhmlabError, Result};

/// A circuit ready for simulation.
///
/// Components keep insertion order; that order fixes the node and
/// voltage-source numbering used by the solver, so results are reproducible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circuit {
    /// All components in insertion order
    pub(crate) components: Vec<Component>,

    /// Port-to-node assignment
    pub(crate) nets: NetTable,

    next_id: usize,
    name_counters: HashMap<ComponentKind, usize>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component of `kind` with fresh ports on fresh nodes.
    ///
    /// `value` overrides the kind's default parameter. Ground ports are placed
    /// on the ground node; both ports of a wire share one fresh node.
    pub fn add(&mut self, kind: ComponentKind, value: Option<f64>) -> ComponentId {
        let counter = self.name_counters.entry(kind).or_insert(0);
        *counter += 1;
        let name = format!("{}{}", kind.prefix(), counter);
        self.insert(kind, name, value)
    }

    /// Add a component with an explicit name. Names must be unique.
    pub fn add_named(
        &mut self,
        kind: ComponentKind,
        name: impl Into<String>,
        value: Option<f64>,
    ) -> Result<ComponentId> {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(OhmlabError::DuplicateComponent { name });
        }
        Ok(self.insert(kind, name, value))
    }

    fn insert(&mut self, kind: ComponentKind, name: String, value: Option<f64>) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;

        let ports: Vec<PortId> = match kind {
            ComponentKind::Ground => vec![self.nets.new_port(id, 0)],
            ComponentKind::Wire => {
                let net = self.nets.new_net();
                vec![self.nets.new_port(id, net), self.nets.new_port(id, net)]
            }
            _ => (0..kind.port_count())
                .map(|_| {
                    let net = self.nets.new_net();
                    self.nets.new_port(id, net)
                })
                .collect(),
        };

        self.components
            .push(Component::build(kind, id, name, &ports, value));
        id
    }

    pub fn add_resistor(&mut self, resistance: f64) -> ComponentId {
        self.add(ComponentKind::Resistor, Some(resistance))
    }

    pub fn add_capacitor(&mut self, capacitance: f64) -> ComponentId {
        self.add(ComponentKind::Capacitor, Some(capacitance))
    }

    pub fn add_voltage_source(&mut self, voltage: f64) -> ComponentId {
        self.add(ComponentKind::VoltageSource, Some(voltage))
    }

    pub fn add_current_source(&mut self, current: f64) -> ComponentId {
        self.add(ComponentKind::CurrentSource, Some(current))
    }

    pub fn add_lamp(&mut self, resistance: f64) -> ComponentId {
        self.add(ComponentKind::Lamp, Some(resistance))
    }

    pub fn add_ground(&mut self) -> ComponentId {
        self.add(ComponentKind::Ground, None)
    }

    pub fn add_probe(&mut self, channel: ProbeChannel) -> ComponentId {
        let kind = match channel {
            ProbeChannel::A => ComponentKind::ProbeA,
            ProbeChannel::B => ComponentKind::ProbeB,
        };
        self.add(kind, None)
    }

    pub fn add_wire(&mut self) -> ComponentId {
        self.add(ComponentKind::Wire, None)
    }

    /// Remove a component. Nodes it joined stay joined; its ports are no
    /// longer accepted by [`connect`](Self::connect), [`ground`](Self::ground)
    /// or [`node_of`](Self::node_of).
    pub fn remove(&mut self, id: ComponentId) -> Option<Component> {
        let idx = self.components.iter().position(|c| c.id() == id)?;
        Some(self.components.remove(idx))
    }

    /// Join the nodes of two ports and return the surviving node.
    ///
    /// Ground absorbs any group it touches. Joining ports that already share a
    /// node changes nothing.
    pub fn connect(&mut self, a: PortId, b: PortId) -> Result<NodeId> {
        self.live_port(a)?;
        self.live_port(b)?;
        self.nets.union(a, b)
    }

    /// Join a port's node to ground.
    pub fn ground(&mut self, port: PortId) -> Result<NodeId> {
        self.live_port(port)?;
        self.nets.ground(port)
    }

    /// Fails unless `port` belongs to a component still in the circuit.
    fn live_port(&self, port: PortId) -> Result<()> {
        match self.nets.owner(port) {
            Some(owner) if self.component(owner).is_some() => Ok(()),
            _ => Err(OhmlabError::PortNotFound { port }),
        }
    }

    /// Distinct non-ground nodes, in first-seen order over components and
    /// their ports. This order is the unknown numbering of the MNA system.
    pub fn list_nodes(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for component in &self.components {
            for port in component.ports() {
                if let Some(node) = self.nets.node_of(*port) {
                    if !node.is_ground() && seen.insert(node) {
                        nodes.push(node);
                    }
                }
            }
        }
        nodes
    }

    /// Node a port currently belongs to.
    pub fn node_of(&self, port: PortId) -> Result<NodeId> {
        self.live_port(port)?;
        self.nets
            .node_of(port)
            .ok_or(OhmlabError::PortNotFound { port })
    }

    /// Ports of a component in declaration order.
    pub fn ports(&self, id: ComponentId) -> Result<&[PortId]> {
        self.component(id)
            .map(Component::ports)
            .ok_or(OhmlabError::ComponentNotFound { id })
    }

    /// Port `index` of a component, e.g. `port(r, 1)` for a resistor's `n`.
    pub fn port(&self, id: ComponentId, index: usize) -> Result<PortId> {
        self.ports(id)?
            .get(index)
            .copied()
            .ok_or(OhmlabError::PortIndexOutOfRange { id, index })
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// Set the primary parameter of a component.
    pub fn set_value(&mut self, id: ComponentId, value: f64) -> Result<bool> {
        self.component_mut(id)
            .map(|c| c.set_value(value))
            .ok_or(OhmlabError::ComponentNotFound { id })
    }

    /// Find a component by name.
    pub fn find(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// First probe on the given channel.
    pub fn probe(&self, channel: ProbeChannel) -> Option<&Probe> {
        self.components.iter().find_map(|c| match c {
            Component::Probe(p) if p.channel == channel => Some(p),
            _ => None,
        })
    }

    /// First component of `kind`.
    pub fn first_of(&self, kind: ComponentKind) -> Option<&Component> {
        self.components.iter().find(|c| c.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn nets(&self) -> &NetTable {
        &self.nets
    }
}
