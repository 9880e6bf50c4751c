//! Text netlist format for describing circuits.
//!
//! A line-oriented, SPICE-flavoured format. The component type is taken from
//! the name prefix, so `R1` is a resistor and `PA1` is probe A.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist    = { line }
//! line       = comment | directive | component | empty
//! comment    = ('#' | ';') { any_char }
//! directive  = ".dt" number | ".steps" number
//! component  = name node+ [value] { param '=' number }
//!
//! node       = identifier | number | "0" | "GND"
//! value      = number [unit_suffix]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! # Component Types
//!
//! | Prefix | Kind | Syntax |
//! |--------|------|--------|
//! | R | Resistor | `R<name> <p> <n> [ohms]` |
//! | C | Capacitor | `C<name> <p> <n> [farads] [ic=<volts>]` |
//! | V | Voltage source | `V<name> <+> <-> [volts]` |
//! | I | Current source | `I<name> <p> <n> [amps]` |
//! | LAMP | Lamp | `LAMP<name> <p> <n> [ohms]` |
//! | PA, PB | Probe A / B | `PA<name> <+> <->` |
//! | W | Wire | `W<name> <a> <b>` |
//! | G, GND | Ground marker | `G<name> <node>` |
//!
//! Node `0` (or `GND`) is ground. A missing value keeps the kind's default.
//!
//! # Example
//!
//! ```text
//! # RC charging
//! .dt 20m
//! .steps 500
//!
//! V1  in   0    5
//! R1  in   cap  10k
//! C1  cap  0    1m
//! PA1 cap  0
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use std::collections::HashMap;

use log::debug;

use crate::circuit::{Circuit, PortId};
use crate::components::Component;
use crate::error::Result;

/// Parse netlist text into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::OhmlabError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

/// A circuit built from a netlist, with the named nodes it declared.
#[derive(Debug, Clone)]
pub struct Netlist {
    pub circuit: Circuit,
    /// One representative port per named node, in first-use order
    pub node_ports: Vec<(String, PortId)>,
    pub dt: Option<f64>,
    pub steps: Option<usize>,
}

impl Netlist {
    /// Build a circuit from a parsed netlist.
    ///
    /// Every port named after the same node is connected to the first port
    /// seen on that node; ports on node `0` are grounded.
    pub fn from_ast(ast: &NetlistAst) -> Result<Self> {
        let mut circuit = Circuit::new();
        let mut node_ports: Vec<(String, PortId)> = Vec::new();
        let mut index: HashMap<&str, PortId> = HashMap::new();

        for def in &ast.components {
            let id = circuit.add_named(def.kind, def.name.clone(), def.value)?;

            if let Some(&ic) = def.params.get("ic") {
                if let Some(Component::Capacitor(cap)) = circuit.component_mut(id) {
                    cap.v_prev = ic;
                }
            }

            let ports = circuit.ports(id)?.to_vec();
            for (node, port) in def.nodes.iter().zip(ports) {
                if node == GROUND_NODE {
                    circuit.ground(port)?;
                    continue;
                }
                match index.get(node.as_str()) {
                    Some(&first) => {
                        circuit.connect(first, port)?;
                    }
                    None => {
                        index.insert(node.as_str(), port);
                        node_ports.push((node.clone(), port));
                    }
                }
            }
        }

        debug!(
            "built netlist: {} components, {} named nodes",
            circuit.len(),
            node_ports.len()
        );

        Ok(Self {
            circuit,
            node_ports,
            dt: ast.dt,
            steps: ast.steps,
        })
    }

    /// Representative port of a named node.
    pub fn node_port(&self, name: &str) -> Option<PortId> {
        self.node_ports
            .iter()
            .find(|(node, _)| node == name)
            .map(|&(_, port)| port)
    }
}

/// Parse netlist text and build the circuit in one go.
pub fn load(input: &str) -> Result<Netlist> {
    Netlist::from_ast(&parse(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ProbeChannel;
    use crate::error::OhmlabError;
    use crate::solver::simulate_step;
    use approx::assert_relative_eq;

    #[test]
    fn test_divider_netlist() {
        let mut netlist = load(
            "V1 in 0 10\n\
             R1 in mid 1k\n\
             R2 mid 0 4k\n\
             PA1 mid 0\n",
        )
        .unwrap();
        let mid = netlist.node_port("mid").unwrap();
        let result = simulate_step(&mut netlist.circuit, 0.02);
        assert!(result.is_solved());
        let node = netlist.circuit.node_of(mid).unwrap();
        assert_relative_eq!(result.voltage(node), 8.0, epsilon = 1e-9);
        let probe = netlist.circuit.probe(ProbeChannel::A).unwrap();
        assert_relative_eq!(probe.reading, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_initial_condition() {
        let netlist = load("C1 top 0 2m ic=3.5\nR1 top 0 1k").unwrap();
        match netlist.circuit.find("C1") {
            Some(Component::Capacitor(cap)) => {
                assert_relative_eq!(cap.v_prev, 3.5);
                assert_relative_eq!(cap.capacitance, 2e-3);
            }
            other => panic!("expected capacitor, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_and_directives() {
        let netlist = load(".dt 10m\n.steps 3\nR1 a 0\nV1 a 0").unwrap();
        assert_eq!(netlist.dt, Some(0.01));
        assert_eq!(netlist.steps, Some(3));
        assert_eq!(netlist.circuit.find("R1").unwrap().value(), Some(1000.0));
        assert_eq!(netlist.circuit.find("V1").unwrap().value(), Some(5.0));
        assert_eq!(netlist.circuit.list_nodes().len(), 1);
    }

    #[test]
    fn test_wire_and_ground_marker() {
        let netlist = load("R1 a b 1k\nW1 b c\nG1 c\n").unwrap();
        let c = &netlist.circuit;
        let b = c.node_of(netlist.node_port("b").unwrap()).unwrap();
        assert!(b.is_ground());
        assert_eq!(c.list_nodes().len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = load("R1 a 0 1k\nR1 a 0 2k").unwrap_err();
        assert!(matches!(err, OhmlabError::DuplicateComponent { .. }));
    }
}
