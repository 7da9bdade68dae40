//! Synthetic circuit generators, used by this crate's own tests
//!
//! Mirrors the builder style of the teacher's `network::generators` module (`add_input`,
//! `add`, `add_output`) but emits a [`Model`] directly instead of going through the JSON
//! loader, since these circuits are built programmatically rather than parsed.

use super::gate::GateFamily;
use super::signal::Signal;
use super::{Gate, Model};

/// Incrementally builds a [`Model`] by adding inputs, gates, and outputs in order
///
/// Gates must be added in an order where every input signal they reference already
/// exists (inputs already declared, or earlier gates already added): this is a
/// programmatic builder, not a general loader, so it does not topologically sort.
pub struct ModelBuilder {
    inputs: Vec<String>,
    outputs: Vec<String>,
    gates: Vec<Gate>,
    output_producer: Vec<Option<u32>>,
}

impl ModelBuilder {
    /// An empty builder
    pub fn new() -> ModelBuilder {
        ModelBuilder {
            inputs: Vec::new(),
            outputs: Vec::new(),
            gates: Vec::new(),
            output_producer: Vec::new(),
        }
    }

    /// Declare a new primary input, returning the [`Signal`] referencing it
    pub fn add_input(&mut self, name: &str) -> Signal {
        let i = self.inputs.len() as u32;
        self.inputs.push(name.to_string());
        Signal::Input(i)
    }

    /// Add a gate of the given family over `inputs`, returning the [`Signal`] referencing
    /// its output
    pub fn add_gate(&mut self, name: &str, family: GateFamily, inputs: Vec<Signal>) -> Signal {
        let i = self.gates.len() as u32;
        self.gates.push(Gate {
            name: name.to_string(),
            family,
            inputs,
        });
        Signal::Gate(i)
    }

    /// Declare a new primary output driven by `producer`
    pub fn add_output(&mut self, name: &str, producer: Signal) {
        self.outputs.push(name.to_string());
        self.output_producer.push(producer.as_gate());
    }

    /// Finalize the builder into a [`Model`], checking its invariants before returning
    pub fn build(self) -> Model {
        let model = Model {
            inputs: self.inputs,
            outputs: self.outputs,
            gates: self.gates,
            output_producer: self.output_producer,
            dropped: Vec::new(),
        };
        model.check();
        model
    }
}

impl Default for ModelBuilder {
    fn default() -> ModelBuilder {
        ModelBuilder::new()
    }
}

/// A ripple-carry adder of `len` one-bit full adders, built from AND/OR/XOR primitives
///
/// Each stage takes two addend bits and the running carry, producing a sum bit; the final
/// carry is exposed as the last output. Mirrors the teacher's own `adder::ripple_carry`
/// generator, expressed in terms of this crate's gate family rather than a `Maj` primitive.
pub fn ripple_carry_adder(len: usize) -> Model {
    let mut b = ModelBuilder::new();
    let mut carry: Option<Signal> = None;
    for bit in 0..len {
        let a = b.add_input(&format!("i{}", 2 * bit + 1));
        let c = b.add_input(&format!("i{}", 2 * bit + 2));
        let axc = b.add_gate(&format!("xor_sum_{bit}"), GateFamily::Xor, vec![a, c]);
        let sum = match carry {
            None => axc,
            Some(cin) => b.add_gate(&format!("xor_carry_{bit}"), GateFamily::Xor, vec![axc, cin]),
        };
        b.add_output(&format!("o{}", bit + 1), sum);

        let and_ac = b.add_gate(&format!("and_ac_{bit}"), GateFamily::And, vec![a, c]);
        carry = Some(match carry {
            None => and_ac,
            Some(cin) => {
                let and_axc_cin =
                    b.add_gate(&format!("and_axc_cin_{bit}"), GateFamily::And, vec![axc, cin]);
                b.add_gate(
                    &format!("or_carry_{bit}"),
                    GateFamily::Or,
                    vec![and_ac, and_axc_cin],
                )
            }
        });
    }
    if let Some(cout) = carry {
        b.add_output(&format!("o{}", len + 1), cout);
    }
    b.build()
}

/// A chain of `len` inverters between a single input and a single output
///
/// Used to test parity-of-inversions reasoning: the output equals the input iff `len` is even.
pub fn inverter_chain(len: usize) -> Model {
    assert!(len > 0);
    let mut b = ModelBuilder::new();
    let mut s = b.add_input("i1");
    for stage in 0..len {
        s = b.add_gate(&format!("gate{}", stage + 1), GateFamily::Not, vec![s]);
    }
    b.add_output("o1", s);
    b.build()
}

/// A single input fanning out to `width` independent buffers, each with its own output
///
/// Used to test that a fault at the fan-out source is visible at every downstream observer.
pub fn fan_out(width: usize) -> Model {
    assert!(width > 0);
    let mut b = ModelBuilder::new();
    let src = b.add_input("i1");
    for i in 0..width {
        let buffered = b.add_gate(&format!("gate{}", i + 1), GateFamily::Buf, vec![src]);
        b.add_output(&format!("o{}", i + 1), buffered);
    }
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ripple_carry_adder_functional() {
        for len in [1, 2, 4, 8] {
            let model = ripple_carry_adder(len);
            assert_eq!(model.nb_inputs(), 2 * len);
            assert_eq!(model.nb_outputs(), len + 1);
            model.check();
        }
    }

    #[test]
    fn test_inverter_chain_parity() {
        use crate::simulate::Simulator;

        for len in [1, 2, 3, 4] {
            let model = inverter_chain(len);
            let mut sim = Simulator::new(&model);
            sim.set_input("i1", true);
            sim.run_comb();
            let expected = if len % 2 == 0 { true } else { false };
            assert_eq!(sim.get_output("o1"), Some(expected));
        }
    }

    #[test]
    fn test_fan_out_shape() {
        let model = fan_out(3);
        assert_eq!(model.nb_inputs(), 1);
        assert_eq!(model.nb_outputs(), 3);
        assert_eq!(model.nb_gates(), 3);
        for g in model.gates() {
            assert_eq!(g.inputs, vec![Signal::Input(0)]);
        }
    }
}
