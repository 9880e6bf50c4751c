//! Syntax tree for the netlist format.

use std::collections::HashMap;

use crate::components::ComponentKind;

/// Node name that always means ground.
pub const GROUND_NODE: &str = "0";

/// Complete representation of a parsed netlist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetlistAst {
    /// All component lines, in file order
    pub components: Vec<ComponentDef>,
    /// Step length from `.dt`
    pub dt: Option<f64>,
    /// Step count from `.steps`
    pub steps: Option<usize>,
}

impl NetlistAst {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One component line.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub kind: ComponentKind,
    /// Unique component name
    pub name: String,
    /// Node names, one per port; ground is normalized to [`GROUND_NODE`]
    pub nodes: Vec<String>,
    /// Primary parameter; `None` keeps the registry default
    pub value: Option<f64>,
    /// `key=value` parameters
    pub params: HashMap<String, f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Component kind from a SPICE-style name prefix.
///
/// Multi-letter prefixes are checked first so `LAMP1` is not read as
/// something else and `PA1` / `PB1` pick their probe channel.
pub fn kind_from_name(name: &str) -> Option<ComponentKind> {
    let upper = name.to_ascii_uppercase();
    if upper.starts_with("LAMP") {
        return Some(ComponentKind::Lamp);
    }
    if upper.starts_with("PA") {
        return Some(ComponentKind::ProbeA);
    }
    if upper.starts_with("PB") {
        return Some(ComponentKind::ProbeB);
    }
    if upper.starts_with("GND") {
        return Some(ComponentKind::Ground);
    }
    match upper.chars().next()? {
        'R' => Some(ComponentKind::Resistor),
        'C' => Some(ComponentKind::Capacitor),
        'V' => Some(ComponentKind::VoltageSource),
        'I' => Some(ComponentKind::CurrentSource),
        'W' => Some(ComponentKind::Wire),
        'G' => Some(ComponentKind::Ground),
        _ => None,
    }
}

/// Whether a node name refers to ground.
pub fn is_ground_name(node: &str) -> bool {
    node == GROUND_NODE || node.eq_ignore_ascii_case("gnd")
}
