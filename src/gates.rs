//! Standard gates and adders, composed from two-input NAND gates.
//!
//! Every builder returns a fresh component in the circuit arena. Composite
//! gates are wired hierarchically; [`Circuit::unpack`] flattens them back to
//! bare NAND gates.

use crate::circuit::{Circuit, CompId};

impl Circuit {
    /// The primitive two-input NAND gate.
    pub fn nand(&mut self) -> CompId {
        let c = self.new_component("Nand");
        self.add_in(c, "a", 1);
        self.add_in(c, "b", 1);
        self.add_out(c, "out", 1);
        c
    }

    /// Inverter: one NAND with both inputs tied together.
    pub fn invert(&mut self) -> CompId {
        let c = self.new_component("Invert");
        let a = self.add_in(c, "a", 1);
        let out = self.add_out(c, "out", 1);

        let nand = self.nand();
        self.adopt(c, nand);
        let na = self.in_port(nand, "a").expect("nand has input a");
        let nb = self.in_port(nand, "b").expect("nand has input b");
        let nout = self.out_port(nand, "out").expect("nand has output");
        self.connect(na, a);
        self.connect(nb, a);
        self.connect(out, nout);
        c
    }

    /// AND gate: NAND followed by an inverter (2 NAND gates).
    pub fn and_gate(&mut self) -> CompId {
        let c = self.new_component("And");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let out = self.add_out(c, "out", 1);

        let nand = self.nand();
        let inv = self.invert();
        self.adopt(c, nand);
        self.adopt(c, inv);
        let na = self.in_port(nand, "a").expect("nand has input a");
        let nb = self.in_port(nand, "b").expect("nand has input b");
        let nout = self.out_port(nand, "out").expect("nand has output");
        let ia = self.in_port(inv, "a").expect("invert has input a");
        let iout = self.out_port(inv, "out").expect("invert has output");
        self.connect(na, a);
        self.connect(nb, b);
        self.connect(ia, nout);
        self.connect(out, iout);
        c
    }

    /// OR gate: two inverters feeding a NAND (3 NAND gates).
    pub fn or_gate(&mut self) -> CompId {
        let c = self.new_component("Or");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let out = self.add_out(c, "out", 1);

        let inv_a = self.invert();
        let inv_b = self.invert();
        let nand = self.nand();
        self.adopt(c, inv_a);
        self.adopt(c, inv_b);
        self.adopt(c, nand);
        let iaa = self.in_port(inv_a, "a").expect("invert has input a");
        let iao = self.out_port(inv_a, "out").expect("invert has output");
        let iba = self.in_port(inv_b, "a").expect("invert has input a");
        let ibo = self.out_port(inv_b, "out").expect("invert has output");
        let na = self.in_port(nand, "a").expect("nand has input a");
        let nb = self.in_port(nand, "b").expect("nand has input b");
        let nout = self.out_port(nand, "out").expect("nand has output");
        self.connect(iaa, a);
        self.connect(iba, b);
        self.connect(na, iao);
        self.connect(nb, ibo);
        self.connect(out, nout);
        c
    }

    /// XOR gate in the canonical 4-NAND arrangement.
    pub fn xor_gate(&mut self) -> CompId {
        let c = self.new_component("Xor");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let out = self.add_out(c, "out", 1);

        let n: Vec<CompId> = (0..4).map(|_| self.nand()).collect();
        for &g in &n {
            self.adopt(c, g);
        }
        let pin = |circuit: &Circuit, g: CompId, name: &str| {
            circuit.get(g, name).expect("nand port")
        };
        let n0_out = pin(self, n[0], "out");
        self.connect(pin(self, n[0], "a"), a);
        self.connect(pin(self, n[0], "b"), b);
        self.connect(pin(self, n[1], "a"), a);
        self.connect(pin(self, n[1], "b"), n0_out);
        self.connect(pin(self, n[2], "a"), b);
        self.connect(pin(self, n[2], "b"), n0_out);
        self.connect(pin(self, n[3], "a"), pin(self, n[1], "out"));
        self.connect(pin(self, n[3], "b"), pin(self, n[2], "out"));
        self.connect(out, pin(self, n[3], "out"));
        c
    }

    /// Half adder from an AND and a XOR gate (6 NAND gates).
    pub fn half_adder(&mut self) -> CompId {
        let c = self.new_component("HalfAdder");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let sum = self.add_out(c, "sum", 1);
        let carry = self.add_out(c, "carry", 1);

        let and = self.and_gate();
        let xor = self.xor_gate();
        self.adopt(c, and);
        self.adopt(c, xor);
        self.connect(self.in_port(and, "a").expect("and input"), a);
        self.connect(self.in_port(and, "b").expect("and input"), b);
        self.connect(carry, self.out_port(and, "out").expect("and output"));
        self.connect(self.in_port(xor, "a").expect("xor input"), a);
        self.connect(self.in_port(xor, "b").expect("xor input"), b);
        self.connect(sum, self.out_port(xor, "out").expect("xor output"));
        c
    }

    /// Half adder built directly from 5 NAND gates.
    pub fn half_adder_nand(&mut self) -> CompId {
        let c = self.new_component("HalfAdder");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let sum = self.add_out(c, "sum", 1);
        let carry = self.add_out(c, "carry", 1);

        let n: Vec<CompId> = (0..5).map(|_| self.nand()).collect();
        for &g in &n {
            self.adopt(c, g);
        }
        let pin = |circuit: &Circuit, g: CompId, name: &str| {
            circuit.get(g, name).expect("nand port")
        };
        let n0_out = pin(self, n[0], "out");
        self.connect(pin(self, n[0], "a"), a);
        self.connect(pin(self, n[0], "b"), b);
        // carry = !(n0 . n0) = a & b
        self.connect(pin(self, n[1], "a"), n0_out);
        self.connect(pin(self, n[1], "b"), n0_out);
        self.connect(carry, pin(self, n[1], "out"));
        // sum = a ^ b
        self.connect(pin(self, n[2], "a"), a);
        self.connect(pin(self, n[2], "b"), n0_out);
        self.connect(pin(self, n[3], "a"), b);
        self.connect(pin(self, n[3], "b"), n0_out);
        self.connect(pin(self, n[4], "a"), pin(self, n[2], "out"));
        self.connect(pin(self, n[4], "b"), pin(self, n[3], "out"));
        self.connect(sum, pin(self, n[4], "out"));
        c
    }

    /// Full adder from two half adders and an OR gate.
    pub fn full_adder(&mut self) -> CompId {
        let c = self.new_component("FullAdder");
        let a = self.add_in(c, "a", 1);
        let b = self.add_in(c, "b", 1);
        let cin = self.add_in(c, "c", 1);
        let sum = self.add_out(c, "sum", 1);
        let carry = self.add_out(c, "carry", 1);

        let ha0 = self.half_adder();
        let ha1 = self.half_adder();
        let or = self.or_gate();
        self.adopt(c, ha0);
        self.adopt(c, ha1);
        self.adopt(c, or);
        self.connect(self.in_port(ha0, "a").expect("half-adder input"), a);
        self.connect(self.in_port(ha0, "b").expect("half-adder input"), b);
        self.connect(
            self.in_port(ha1, "a").expect("half-adder input"),
            self.out_port(ha0, "sum").expect("half-adder sum"),
        );
        self.connect(self.in_port(ha1, "b").expect("half-adder input"), cin);
        self.connect(
            self.in_port(or, "a").expect("or input"),
            self.out_port(ha0, "carry").expect("half-adder carry"),
        );
        self.connect(
            self.in_port(or, "b").expect("or input"),
            self.out_port(ha1, "carry").expect("half-adder carry"),
        );
        self.connect(carry, self.out_port(or, "out").expect("or output"));
        self.connect(sum, self.out_port(ha1, "sum").expect("half-adder sum"));
        c
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn check_two_input_gate(
        circuit: &mut Circuit,
        gate: CompId,
        expected: [bool; 4],
    ) {
        let a = circuit.in_port(gate, "a").unwrap();
        let b = circuit.in_port(gate, "b").unwrap();
        let out = circuit.out_port(gate, "out").unwrap();
        for i in 0..4u64 {
            circuit.set_input_value(a, (i >> 1) & 1);
            circuit.set_input_value(b, i & 1);
            circuit.compute(gate);
            assert_eq!(
                circuit.bit(out, 0),
                expected[i as usize],
                "{} row {:02b}",
                circuit.kind(gate),
                i
            );
        }
    }

    #[test]
    fn test_nand_truth_table() {
        let mut circuit = Circuit::new();
        let gate = circuit.nand();
        check_two_input_gate(&mut circuit, gate, [true, true, true, false]);
    }

    #[test]
    fn test_invert_truth_table() {
        let mut circuit = Circuit::new();
        let gate = circuit.invert();
        let a = circuit.in_port(gate, "a").unwrap();
        let out = circuit.out_port(gate, "out").unwrap();
        for bit in [false, true] {
            circuit.set_input_value(a, bit as u64);
            circuit.compute(gate);
            assert_eq!(circuit.bit(out, 0), !bit);
        }
    }

    #[test]
    fn test_and_truth_table() {
        let mut circuit = Circuit::new();
        let gate = circuit.and_gate();
        check_two_input_gate(&mut circuit, gate, [false, false, false, true]);
    }

    #[test]
    fn test_or_truth_table() {
        let mut circuit = Circuit::new();
        let gate = circuit.or_gate();
        check_two_input_gate(&mut circuit, gate, [false, true, true, true]);
    }

    #[test]
    fn test_xor_truth_table() {
        let mut circuit = Circuit::new();
        let gate = circuit.xor_gate();
        check_two_input_gate(&mut circuit, gate, [false, true, true, false]);
    }

    #[test]
    fn test_nand_gate_counts() {
        let mut circuit = Circuit::new();
        let and = circuit.and_gate();
        assert_eq!(circuit.count_nand_gates(and), 2);
        let or = circuit.or_gate();
        assert_eq!(circuit.count_nand_gates(or), 3);
        let xor = circuit.xor_gate();
        assert_eq!(circuit.count_nand_gates(xor), 4);
        let ha = circuit.half_adder();
        assert_eq!(circuit.count_nand_gates(ha), 6);
        let ha5 = circuit.half_adder_nand();
        assert_eq!(circuit.count_nand_gates(ha5), 5);
        let fa = circuit.full_adder();
        assert_eq!(circuit.count_nand_gates(fa), 15);
    }

    #[test]
    fn test_half_adder_sums() {
        let builders: [fn(&mut Circuit) -> CompId; 2] =
            [Circuit::half_adder, Circuit::half_adder_nand];
        for builder in builders {
            let mut circuit = Circuit::new();
            let ha = builder(&mut circuit);
            let a = circuit.in_port(ha, "a").unwrap();
            let b = circuit.in_port(ha, "b").unwrap();
            let sum = circuit.out_port(ha, "sum").unwrap();
            let carry = circuit.out_port(ha, "carry").unwrap();
            for i in 0..4u64 {
                let (x, y) = ((i >> 1) & 1, i & 1);
                circuit.set_input_value(a, x);
                circuit.set_input_value(b, y);
                circuit.compute(ha);
                let total = (circuit.bit(carry, 0) as u64) << 1 | circuit.bit(sum, 0) as u64;
                assert_eq!(total, x + y);
            }
        }
    }

    #[test]
    fn test_full_adder_sums() {
        let mut circuit = Circuit::new();
        let fa = circuit.full_adder();
        let a = circuit.in_port(fa, "a").unwrap();
        let b = circuit.in_port(fa, "b").unwrap();
        let cin = circuit.in_port(fa, "c").unwrap();
        let sum = circuit.out_port(fa, "sum").unwrap();
        let carry = circuit.out_port(fa, "carry").unwrap();
        for i in 0..8u64 {
            let (x, y, z) = ((i >> 2) & 1, (i >> 1) & 1, i & 1);
            circuit.set_input_value(a, x);
            circuit.set_input_value(b, y);
            circuit.set_input_value(cin, z);
            circuit.compute(fa);
            let total = (circuit.bit(carry, 0) as u64) << 1 | circuit.bit(sum, 0) as u64;
            assert_eq!(total, x + y + z, "a={} b={} c={}", x, y, z);
        }
    }

    #[test]
    fn test_unpack_and_gate() {
        let mut circuit = Circuit::new();
        let and = circuit.and_gate();
        assert_eq!(circuit.parts(and).len(), 2);
        circuit.unpack(and, 1);
        // The inverter dissolved into its NAND.
        assert_eq!(circuit.parts(and).len(), 2);
        for &part in circuit.parts(and) {
            assert_eq!(circuit.kind(part), "Nand");
        }
        assert_eq!(circuit.count_nand_gates(and), 2);
        check_two_input_gate(&mut circuit, and, [false, false, false, true]);
    }

    #[test]
    fn test_unpack_nand_only_half_adder_is_flat() {
        let mut circuit = Circuit::new();
        let ha = circuit.half_adder_nand();
        circuit.unpack(ha, 1);
        // Already flat: one unpack level leaves exactly the 5 NAND gates.
        assert_eq!(circuit.parts(ha).len(), 5);
        assert_eq!(circuit.count_nand_gates(ha), 5);
    }

    #[test]
    fn test_unpack_half_adder_two_levels() {
        let mut circuit = Circuit::new();
        let ha = circuit.half_adder();
        circuit.unpack(ha, 1);
        // And + Xor dissolved: nand+invert and four nands.
        assert_eq!(circuit.parts(ha).len(), 6);
        circuit.unpack(ha, 1);
        // The remaining Invert dissolves on the second level.
        assert_eq!(circuit.parts(ha).len(), 6);
        for &part in circuit.parts(ha) {
            assert_eq!(circuit.kind(part), "Nand");
        }

        // Still a working half adder.
        let a = circuit.in_port(ha, "a").unwrap();
        let b = circuit.in_port(ha, "b").unwrap();
        let sum = circuit.out_port(ha, "sum").unwrap();
        let carry = circuit.out_port(ha, "carry").unwrap();
        for i in 0..4u64 {
            let (x, y) = ((i >> 1) & 1, i & 1);
            circuit.set_input_value(a, x);
            circuit.set_input_value(b, y);
            circuit.compute(ha);
            let total = (circuit.bit(carry, 0) as u64) << 1 | circuit.bit(sum, 0) as u64;
            assert_eq!(total, x + y);
        }
    }
}
