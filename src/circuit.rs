//! Digital-logic simulation over two-input NAND gates.
//!
//! A [`Circuit`] is an arena of components and ports. Leaf components are
//! NAND gates; composite components wrap subcomponents behind named
//! input/output ports and can be flattened back into their constituent
//! gates with [`unpack`][Circuit::unpack]. Values propagate lazily:
//! [`compute`][Circuit::compute] pulls through the wiring on demand, and
//! [`set_input_value`][Circuit::set_input_value] invalidates downstream
//! components only when a bit actually changed.
//!
//! Wiring comes in exactly three legal shapes:
//!
//! - an input fed by another component's output,
//! - an input fed by an input of its parent (boundary pass-through),
//! - a composite output fed by the output of one of its subcomponents.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use log::debug;

/// Maximum width of a port, in bits.
pub const MAX_BIT_WIDTH: u32 = 64;

/// Handle to a component in a [`Circuit`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CompId(u32);

/// Handle to a port in a [`Circuit`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PortId(u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PortDir {
    Input,
    Output,
}

#[derive(Debug)]
struct Port {
    name: String,
    width: u32,
    dir: PortDir,
    owner: CompId,
    /// Bit i of the value, little-endian.
    bits: u64,
}

#[derive(Debug)]
struct Component {
    kind: &'static str,
    ins: Vec<PortId>,
    outs: Vec<PortId>,
    parts: Vec<CompId>,
    parent: Option<CompId>,
    computed: bool,
    alive: bool,
}

/// The component arena and wiring graph.
#[derive(Debug, Default)]
pub struct Circuit {
    comps: Vec<Component>,
    ports: Vec<Port>,
    /// Input port -> the port driving it.
    input_src: HashMap<PortId, PortId>,
    /// Parent input -> subcomponent inputs it feeds.
    input_dest: HashMap<PortId, Vec<PortId>>,
    /// Composite output -> the inner output producing it.
    output_map: HashMap<PortId, PortId>,
    /// Output -> ports it feeds (peer inputs, or outputs of the parent).
    output_dest: HashMap<PortId, Vec<PortId>>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    fn comp(&self, c: CompId) -> &Component {
        &self.comps[c.0 as usize]
    }

    fn comp_mut(&mut self, c: CompId) -> &mut Component {
        &mut self.comps[c.0 as usize]
    }

    fn port(&self, p: PortId) -> &Port {
        &self.ports[p.0 as usize]
    }

    fn port_mut(&mut self, p: PortId) -> &mut Port {
        &mut self.ports[p.0 as usize]
    }

    pub(crate) fn new_component(&mut self, kind: &'static str) -> CompId {
        let id = CompId(self.comps.len() as u32);
        self.comps.push(Component {
            kind,
            ins: Vec::new(),
            outs: Vec::new(),
            parts: Vec::new(),
            parent: None,
            computed: false,
            alive: true,
        });
        id
    }

    pub(crate) fn add_in(&mut self, c: CompId, name: &str, width: u32) -> PortId {
        self.add_port(c, name, width, PortDir::Input)
    }

    pub(crate) fn add_out(&mut self, c: CompId, name: &str, width: u32) -> PortId {
        self.add_port(c, name, width, PortDir::Output)
    }

    fn add_port(&mut self, c: CompId, name: &str, width: u32, dir: PortDir) -> PortId {
        assert!(width >= 1 && width <= MAX_BIT_WIDTH);
        let id = PortId(self.ports.len() as u32);
        self.ports.push(Port {
            name: name.to_string(),
            width,
            dir,
            owner: c,
            bits: 0,
        });
        match dir {
            PortDir::Input => self.comp_mut(c).ins.push(id),
            PortDir::Output => self.comp_mut(c).outs.push(id),
        }
        id
    }

    /// Make `child` a subcomponent of `parent`.
    pub(crate) fn adopt(&mut self, parent: CompId, child: CompId) {
        self.comp_mut(child).parent = Some(parent);
        self.comp_mut(parent).parts.push(child);
    }

    // --- lookups -----------------------------------------------------------

    pub fn kind(&self, c: CompId) -> &'static str {
        self.comp(c).kind
    }

    pub fn parts(&self, c: CompId) -> &[CompId] {
        &self.comp(c).parts
    }

    /// Find a port of `c` by name, input or output.
    pub fn get(&self, c: CompId, name: &str) -> Option<PortId> {
        let comp = self.comp(c);
        comp.ins
            .iter()
            .chain(comp.outs.iter())
            .copied()
            .find(|&p| self.port(p).name == name)
    }

    pub fn in_port(&self, c: CompId, name: &str) -> Option<PortId> {
        self.get(c, name)
            .filter(|&p| self.port(p).dir == PortDir::Input)
    }

    pub fn out_port(&self, c: CompId, name: &str) -> Option<PortId> {
        self.get(c, name)
            .filter(|&p| self.port(p).dir == PortDir::Output)
    }

    pub fn port_name(&self, p: PortId) -> &str {
        &self.port(p).name
    }

    pub fn port_width(&self, p: PortId) -> u32 {
        self.port(p).width
    }

    pub fn port_dir(&self, p: PortId) -> PortDir {
        self.port(p).dir
    }

    /// The port's value as an unsigned integer (little-endian bits).
    pub fn value(&self, p: PortId) -> u64 {
        self.port(p).bits
    }

    pub fn bit(&self, p: PortId, i: u32) -> bool {
        debug_assert!(i < self.port(p).width);
        (self.port(p).bits >> i) & 1 == 1
    }

    fn width_mask(width: u32) -> u64 {
        if width >= 64 {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    // --- wiring ------------------------------------------------------------

    /// Connect `dst` to be driven by `src`. Returns `false` (and leaves the
    /// wiring untouched) when the shapes or widths do not line up.
    /// Reconnecting an already-driven port replaces the old wire.
    pub fn connect(&mut self, dst: PortId, src: PortId) -> bool {
        if self.port(dst).width != self.port(src).width {
            return false;
        }
        match self.port(dst).dir {
            PortDir::Input => {
                // Any output may drive an input; a boundary pass-through
                // requires the source to be an input of the parent (or of
                // the grandparent, mid-unpack).
                let legal = match self.port(src).dir {
                    PortDir::Output => true,
                    PortDir::Input => {
                        let dst_owner = self.port(dst).owner;
                        let src_owner = self.port(src).owner;
                        self.is_ancestor(src_owner, dst_owner, 2)
                    }
                };
                if !legal {
                    return false;
                }
                if let Some(&old) = self.input_src.get(&dst) {
                    if old == src {
                        return true;
                    }
                    self.disconnect(dst);
                }
                self.input_src.insert(dst, src);
                match self.port(src).dir {
                    PortDir::Output => self.output_dest.entry(src).or_default().push(dst),
                    PortDir::Input => self.input_dest.entry(src).or_default().push(dst),
                }
                true
            }
            PortDir::Output => {
                // Composite output: the source must be an output of a
                // subcomponent (or of a grandchild, mid-unpack).
                if self.port(src).dir != PortDir::Output {
                    return false;
                }
                let dst_owner = self.port(dst).owner;
                let src_owner = self.port(src).owner;
                if !self.is_ancestor(dst_owner, src_owner, 2) {
                    return false;
                }
                if let Some(&old) = self.output_map.get(&dst) {
                    if old == src {
                        return true;
                    }
                    self.disconnect(dst);
                }
                self.output_map.insert(dst, src);
                self.output_dest.entry(src).or_default().push(dst);
                true
            }
        }
    }

    fn is_ancestor(&self, ancestor: CompId, c: CompId, max_levels: u32) -> bool {
        let mut cur = self.comp(c).parent;
        for _ in 0..max_levels {
            match cur {
                Some(p) if p == ancestor => return true,
                Some(p) => cur = self.comp(p).parent,
                None => return false,
            }
        }
        false
    }

    /// Remove the wire driving `dst`, if any.
    pub fn disconnect(&mut self, dst: PortId) -> bool {
        match self.port(dst).dir {
            PortDir::Input => match self.input_src.remove(&dst) {
                Some(src) => {
                    let dests = match self.port(src).dir {
                        PortDir::Output => self.output_dest.get_mut(&src),
                        PortDir::Input => self.input_dest.get_mut(&src),
                    };
                    if let Some(dests) = dests {
                        dests.retain(|&d| d != dst);
                    }
                    true
                }
                None => false,
            },
            PortDir::Output => match self.output_map.remove(&dst) {
                Some(src) => {
                    if let Some(dests) = self.output_dest.get_mut(&src) {
                        dests.retain(|&d| d != dst);
                    }
                    true
                }
                None => false,
            },
        }
    }

    // --- evaluation --------------------------------------------------------

    /// Drive an input port. A changed value invalidates everything
    /// downstream; an unchanged value is a no-op.
    pub fn set_input_value(&mut self, p: PortId, value: u64) {
        debug_assert_eq!(self.port(p).dir, PortDir::Input);
        let masked = value & Self::width_mask(self.port(p).width);
        if self.port(p).bits != masked {
            self.port_mut(p).bits = masked;
            let owner = self.port(p).owner;
            self.make_out_of_date(owner);
        }
    }

    /// Clear the computed mark on `c` and everything fed by it.
    ///
    /// The mark is per component, not per output; recomputation is
    /// correspondingly coarse.
    // TODO: track freshness per output instead of per component.
    fn make_out_of_date(&mut self, c: CompId) {
        self.comp_mut(c).computed = false;
        let parent = self.comp(c).parent;
        let mut downstream = Vec::new();
        for &p in self.comp(c).ins.iter().chain(self.comp(c).outs.iter()) {
            if let Some(dests) = self.input_dest.get(&p) {
                downstream.extend(dests.iter().map(|&d| self.port(d).owner));
            }
            if let Some(dests) = self.output_dest.get(&p) {
                downstream.extend(
                    dests
                        .iter()
                        .map(|&d| self.port(d).owner)
                        .filter(|&o| Some(o) != parent),
                );
            }
        }
        for o in downstream {
            // Recursing only into still-computed components keeps the
            // cascade linear on diamond-shaped fan-out.
            if self.comp(o).computed {
                self.make_out_of_date(o);
            }
        }
    }

    /// Follow the pass-through chain from an input to its ultimate driver.
    /// Returns the port itself if nothing drives it.
    fn input_source(&self, p: PortId) -> PortId {
        let mut cur = p;
        while let Some(&src) = self.input_src.get(&cur) {
            cur = src;
        }
        cur
    }

    /// Evaluate the outputs of `c`, reusing any still-valid subcomputation.
    pub fn compute(&mut self, c: CompId) {
        if self.comp(c).computed {
            return;
        }
        debug!("compute({:?} {})", c, self.comp(c).kind);
        let outs = self.comp(c).outs.clone();
        for out in outs {
            if let Some(&inner) = self.output_map.get(&out) {
                // Composite: pull the value through the subcomponent.
                let inner_owner = self.port(inner).owner;
                self.compute(inner_owner);
                self.port_mut(out).bits = self.port(inner).bits;
            } else {
                // Leaf: a two-input NAND gate.
                let ins = self.comp(c).ins.clone();
                for &in_p in &ins {
                    let src = self.input_source(in_p);
                    if src != in_p && self.port(src).dir == PortDir::Output {
                        let src_owner = self.port(src).owner;
                        self.compute(src_owner);
                    }
                    if src != in_p {
                        self.port_mut(in_p).bits =
                            self.port(src).bits & Self::width_mask(self.port(in_p).width);
                    }
                }
                let a = self.bit(ins[0], 0);
                let b = self.bit(ins[1], 0);
                self.port_mut(out).bits = !(a && b) as u64;
            }
        }
        self.comp_mut(c).computed = true;
    }

    /// Count the NAND gates making up `c`. A component without
    /// subcomponents is itself a NAND gate.
    pub fn count_nand_gates(&self, c: CompId) -> u32 {
        let comp = self.comp(c);
        if comp.parts.is_empty() {
            1
        } else {
            comp.parts.iter().map(|&s| self.count_nand_gates(s)).sum()
        }
    }

    // --- flattening --------------------------------------------------------

    /// Flatten `levels` levels of hierarchy under `c`: each composite
    /// subcomponent is replaced by its own parts, rewired to the same
    /// sources and destinations.
    pub fn unpack(&mut self, c: CompId, levels: u32) {
        for _ in 0..levels {
            let children = self.comp(c).parts.clone();
            for child in children {
                if !self.comp(child).parts.is_empty() {
                    self.replace_with_parts(c, child);
                }
            }
        }
    }

    fn replace_with_parts(&mut self, parent: CompId, child: CompId) {
        debug!("unpack: splicing {:?} {} into {:?}", child, self.comp(child).kind, parent);

        // Reroute boundary pass-throughs: whatever fed an input of `child`
        // now feeds the grandchild inputs directly.
        for in_p in self.comp(child).ins.clone() {
            let source = self.input_source(in_p);
            let receivers = self.input_dest.get(&in_p).cloned().unwrap_or_default();
            for r in receivers {
                if source == in_p {
                    self.disconnect(r);
                } else {
                    self.connect(r, source);
                }
            }
        }

        // Reroute outputs: whatever `child`'s output fed is now fed by the
        // grandchild output that produced it.
        for out_p in self.comp(child).outs.clone() {
            if let Some(&inner) = self.output_map.get(&out_p) {
                let receivers = self.output_dest.get(&out_p).cloned().unwrap_or_default();
                for r in receivers {
                    self.connect(r, inner);
                }
            }
        }

        // Splice the grandchildren into the parent.
        let grandchildren = std::mem::take(&mut self.comp_mut(child).parts);
        for &g in &grandchildren {
            self.comp_mut(g).parent = Some(parent);
        }
        let parts = &mut self.comp_mut(parent).parts;
        parts.retain(|&s| s != child);
        parts.extend(grandchildren);

        self.comp_mut(child).alive = false;
        self.purge_dead_connections(child);
    }

    /// Drop every wire that still references a port of the dead component.
    fn purge_dead_connections(&mut self, dead: CompId) {
        let is_dead =
            |ports: &[Port], p: PortId| ports[p.0 as usize].owner == dead;
        let ports = std::mem::take(&mut self.ports);
        self.input_src
            .retain(|&k, &mut v| !is_dead(&ports, k) && !is_dead(&ports, v));
        self.output_map
            .retain(|&k, &mut v| !is_dead(&ports, k) && !is_dead(&ports, v));
        for map in [&mut self.input_dest, &mut self.output_dest] {
            map.retain(|&k, _| !is_dead(&ports, k));
            for dests in map.values_mut() {
                dests.retain(|&d| !is_dead(&ports, d));
            }
            map.retain(|_, dests| !dests.is_empty());
        }
        self.ports = ports;
    }

    // --- DOT export --------------------------------------------------------

    /// Render the wiring of `c` (one hierarchy level deep) in Graphviz DOT
    /// format: boundary ports as circles, subcomponents as record tables
    /// with one row per port pair.
    pub fn to_dot(&self, c: CompId) -> Result<String, std::fmt::Error> {
        let comp = self.comp(c);
        let mut dot = String::new();
        writeln!(dot, "digraph {} {{", comp.kind)?;
        writeln!(dot, "rankdir=LR")?;
        writeln!(dot, "node [shape=record;style=filled;fillcolor=gray95]")?;
        writeln!(dot, "graph [label=\"{}\"]", comp.kind)?;

        let mut serial = 0u32;
        let mut port_serial = HashMap::new();
        let mut comp_serial = HashMap::new();

        for &p in comp.ins.iter().chain(comp.outs.iter()) {
            port_serial.insert(p, serial);
            writeln!(dot, "n_{} [label=\"{}\"; shape=circle]", serial, self.port(p).name)?;
            serial += 1;
        }

        for &sub in &comp.parts {
            comp_serial.insert(sub, serial);
            writeln!(dot, "n_{} [shape=plain", serial)?;
            serial += 1;
            let sub_comp = self.comp(sub);
            let rows = sub_comp.ins.len().max(sub_comp.outs.len());
            write!(
                dot,
                "label=<<table border=\"0\" cellborder=\"1\" cellspacing=\"0\" cellpadding=\"1\">"
            )?;
            writeln!(dot, "<tr><td><b>{}</b></td></tr>", sub_comp.kind)?;
            writeln!(dot, "<tr><td>")?;
            writeln!(dot, "<table border=\"0\" cellborder=\"0\" cellspacing=\"0\">")?;
            for i in 0..rows {
                write!(dot, "<tr>")?;
                match sub_comp.ins.get(i) {
                    Some(&p) => write!(
                        dot,
                        "<td port=\"{0}\" align=\"left\">{0}</td>",
                        self.port(p).name
                    )?,
                    None => write!(dot, "<td></td>")?,
                }
                write!(dot, "<td> &nbsp;&nbsp;&nbsp;&nbsp; </td>")?;
                match sub_comp.outs.get(i) {
                    Some(&p) => write!(
                        dot,
                        "<td port=\"{0}\" align=\"right\">{0}</td>",
                        self.port(p).name
                    )?,
                    None => write!(dot, "<td></td>")?,
                }
                writeln!(dot, "</tr>")?;
            }
            writeln!(dot, "</table>")?;
            writeln!(dot, "</td></tr>")?;
            writeln!(dot, "</table>>]")?;
        }

        // Wires into subcomponent inputs.
        for &sub in &comp.parts {
            for &in_p in &self.comp(sub).ins {
                let Some(&src) = self.input_src.get(&in_p) else {
                    continue;
                };
                let src_owner = self.port(src).owner;
                if src_owner == c {
                    writeln!(
                        dot,
                        "n_{} -> n_{}:{}",
                        port_serial[&src],
                        comp_serial[&sub],
                        self.port(in_p).name
                    )?;
                } else if let Some(&cs) = comp_serial.get(&src_owner) {
                    writeln!(
                        dot,
                        "n_{}:{} -> n_{}:{}",
                        cs,
                        self.port(src).name,
                        comp_serial[&sub],
                        self.port(in_p).name
                    )?;
                }
            }
        }

        // Wires from subcomponent outputs to the boundary outputs.
        for &out in &comp.outs {
            if let Some(&src) = self.output_map.get(&out) {
                let src_owner = self.port(src).owner;
                if let Some(&cs) = comp_serial.get(&src_owner) {
                    writeln!(
                        dot,
                        "n_{}:{} -> n_{}",
                        cs,
                        self.port(src).name,
                        port_serial[&out]
                    )?;
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }

    /// Write the DOT rendering of `c` to a file.
    pub fn save_as_dot<P: AsRef<Path>>(&self, c: CompId, path: P) -> std::io::Result<()> {
        let dot = self
            .to_dot(c)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, dot)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// A bare NAND wired to nothing: inputs are driven directly.
    #[test]
    fn test_nand_leaf() {
        let mut circuit = Circuit::new();
        let gate = circuit.nand();
        let a = circuit.in_port(gate, "a").unwrap();
        let b = circuit.in_port(gate, "b").unwrap();
        let out = circuit.out_port(gate, "out").unwrap();
        let expected = [true, true, true, false];
        for i in 0..4u32 {
            circuit.set_input_value(a, (i >> 1) as u64 & 1);
            circuit.set_input_value(b, i as u64 & 1);
            circuit.compute(gate);
            assert_eq!(circuit.bit(out, 0), expected[i as usize], "row {}", i);
        }
    }

    #[test]
    fn test_connect_rejects_width_mismatch() {
        let mut circuit = Circuit::new();
        let c = circuit.new_component("Test");
        let wide = circuit.add_in(c, "wide", 2);
        let narrow = circuit.add_out(c, "narrow", 1);
        assert!(!circuit.connect(wide, narrow));
    }

    #[test]
    fn test_unchanged_input_keeps_computed_mark() {
        let mut circuit = Circuit::new();
        let gate = circuit.nand();
        let a = circuit.in_port(gate, "a").unwrap();
        let b = circuit.in_port(gate, "b").unwrap();
        circuit.set_input_value(a, 1);
        circuit.set_input_value(b, 1);
        circuit.compute(gate);
        assert!(circuit.comp(gate).computed);
        // Re-asserting the same value must not invalidate anything.
        circuit.set_input_value(a, 1);
        assert!(circuit.comp(gate).computed);
        circuit.set_input_value(a, 0);
        assert!(!circuit.comp(gate).computed);
    }

    #[test]
    fn test_reconnect_replaces_wire() {
        let mut circuit = Circuit::new();
        let parent = circuit.new_component("Test");
        let a = circuit.add_in(parent, "a", 1);
        let b = circuit.add_in(parent, "b", 1);
        let gate = circuit.nand();
        circuit.adopt(parent, gate);
        let ga = circuit.in_port(gate, "a").unwrap();
        assert!(circuit.connect(ga, a));
        assert!(circuit.connect(ga, b));
        assert_eq!(circuit.input_src[&ga], b);
        assert!(circuit.input_dest.get(&a).map(|d| d.is_empty()).unwrap_or(true));
    }

    #[test]
    fn test_to_dot_shape() {
        let mut circuit = Circuit::new();
        let and = circuit.and_gate();
        let dot = circuit.to_dot(and).unwrap();
        assert!(dot.starts_with("digraph And {"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.contains("<b>Nand</b>"));
        assert!(dot.contains("<b>Invert</b>"));
        assert!(dot.ends_with("}\n"));
    }
}
