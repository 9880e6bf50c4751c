//! Net model: which ports share an electrical node.
//!
//! Nets live in an arena of slots addressed by index. Merging two nets is a
//! union-find operation with union-by-rank and path compression, so a chain of
//! `connect` calls costs near-constant amortized time per call instead of a
//! rescan of every port.
//!
//! Slot 0 is ground. Ground is always the root of its class: any net merged
//! with it becomes ground, including everything previously merged into that
//! net.

use super::types::{ComponentId, NodeId, PortId};
use crate::error::{OhmlabError, Result};

/// A component terminal and the net slot it was created on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PortSlot {
    owner: ComponentId,
    net: usize,
}

/// Arena of net slots and ports.
#[derive(Debug, Clone, PartialEq)]
pub struct NetTable {
    parent: Vec<usize>,
    rank: Vec<u8>,
    ports: Vec<PortSlot>,
}

impl NetTable {
    /// Create a table containing only the ground net.
    pub fn new() -> Self {
        Self {
            parent: vec![0],
            rank: vec![0],
            ports: Vec::new(),
        }
    }

    /// Allocate a fresh, unconnected net slot.
    pub fn new_net(&mut self) -> usize {
        let slot = self.parent.len();
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    /// Register a port owned by `owner` on net slot `net`.
    pub(crate) fn new_port(&mut self, owner: ComponentId, net: usize) -> PortId {
        debug_assert!(net < self.parent.len(), "port created on unknown net slot");
        let id = PortId(self.ports.len());
        self.ports.push(PortSlot { owner, net });
        id
    }

    /// Number of ports ever created.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// Number of net slots ever created, ground included.
    pub fn net_count(&self) -> usize {
        self.parent.len()
    }

    /// Component that owns `port`.
    pub fn owner(&self, port: PortId) -> Option<ComponentId> {
        self.ports.get(port.0).map(|slot| slot.owner)
    }

    /// Node a port currently belongs to.
    pub fn node_of(&self, port: PortId) -> Option<NodeId> {
        self.ports
            .get(port.0)
            .map(|slot| NodeId(self.root(slot.net)))
    }

    /// Check whether two ports are electrically joined.
    pub fn same_node(&self, a: PortId, b: PortId) -> bool {
        match (self.node_of(a), self.node_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Merge the nets of two ports and return the surviving node.
    pub fn union(&mut self, a: PortId, b: PortId) -> Result<NodeId> {
        let na = self.slot_of(a)?;
        let nb = self.slot_of(b)?;
        Ok(self.union_slots(na, nb))
    }

    /// Merge a port's net into ground.
    pub fn ground(&mut self, port: PortId) -> Result<NodeId> {
        let slot = self.slot_of(port)?;
        Ok(self.union_slots(slot, 0))
    }

    fn slot_of(&self, port: PortId) -> Result<usize> {
        self.ports
            .get(port.0)
            .map(|slot| slot.net)
            .ok_or(OhmlabError::PortNotFound { port })
    }

    fn union_slots(&mut self, a: usize, b: usize) -> NodeId {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return NodeId(ra);
        }

        let root = if ra == 0 || rb == 0 {
            0
        } else if self.rank[ra] < self.rank[rb] {
            rb
        } else {
            if self.rank[ra] == self.rank[rb] {
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
            ra
        };
        let child = if root == ra { rb } else { ra };
        self.parent[child] = root;
        NodeId(root)
    }

    /// Root lookup without compression, usable through `&self`.
    fn root(&self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            slot = self.parent[slot];
        }
        slot
    }

    fn find(&mut self, slot: usize) -> usize {
        let root = self.root(slot);
        let mut cur = slot;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }
}

impl Default for NetTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_ports(count: usize) -> (NetTable, Vec<PortId>) {
        let mut nets = NetTable::new();
        let ports = (0..count)
            .map(|i| {
                let net = nets.new_net();
                nets.new_port(ComponentId(i), net)
            })
            .collect();
        (nets, ports)
    }

    #[test]
    fn test_fresh_ports_are_distinct() {
        let (nets, p) = table_with_ports(3);
        assert_ne!(nets.node_of(p[0]), nets.node_of(p[1]));
        assert_ne!(nets.node_of(p[1]), nets.node_of(p[2]));
        assert_eq!(nets.owner(p[2]), Some(ComponentId(2)));
    }

    #[test]
    fn test_union_joins_ports() {
        let (mut nets, p) = table_with_ports(2);
        let node = nets.union(p[0], p[1]).unwrap();
        assert_eq!(nets.node_of(p[0]), Some(node));
        assert_eq!(nets.node_of(p[1]), Some(node));
        assert!(nets.same_node(p[0], p[1]));
    }

    #[test]
    fn test_ground_absorbs_transitively() {
        let (mut nets, p) = table_with_ports(4);
        nets.union(p[0], p[1]).unwrap();
        nets.ground(p[1]).unwrap();
        nets.union(p[2], p[0]).unwrap();
        for port in &p[..3] {
            assert_eq!(nets.node_of(*port), Some(NodeId::GROUND));
        }
        assert_ne!(nets.node_of(p[3]), Some(NodeId::GROUND));
    }

    #[test]
    fn test_ground_wins_regardless_of_rank() {
        let (mut nets, p) = table_with_ports(4);
        nets.union(p[0], p[1]).unwrap();
        nets.union(p[2], p[3]).unwrap();
        nets.union(p[0], p[2]).unwrap();
        let ground_port = nets.new_port(ComponentId(9), 0);
        nets.union(ground_port, p[3]).unwrap();
        assert!(p.iter().all(|port| nets.node_of(*port) == Some(NodeId::GROUND)));
    }

    #[test]
    fn test_repeated_union_is_noop() {
        let (mut nets, p) = table_with_ports(2);
        let first = nets.union(p[0], p[1]).unwrap();
        let snapshot = nets.clone();
        let second = nets.union(p[1], p[0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(nets, snapshot);
    }

    #[test]
    fn test_unknown_port_is_rejected() {
        let (mut nets, p) = table_with_ports(1);
        let err = nets.union(p[0], PortId(42)).unwrap_err();
        assert!(matches!(err, OhmlabError::PortNotFound { port: PortId(42) }));
    }

    #[test]
    fn test_path_compression_keeps_roots() {
        let (mut nets, p) = table_with_ports(6);
        for pair in p.windows(2) {
            nets.union(pair[0], pair[1]).unwrap();
        }
        let node = nets.node_of(p[0]).unwrap();
        assert!(p.iter().all(|port| nets.node_of(*port) == Some(node)));
    }
}
