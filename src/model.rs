//! Structural representation of a combinational logic network
//!
//! A [`Model`] is built once, from a structural description, by [`Model::load_str`] (or one
//! of its path/reader variants) and is immutable afterwards. It holds the sorted input and
//! output port lists and a topologically sorted gate list with fully resolved wiring, ready
//! for repeated simulation.

pub mod gate;
pub mod generators;
mod loader;
pub mod signal;

use std::fmt;

pub use gate::{classify_gate_type, Gate, GateFamily};
pub use signal::Signal;

/// In-memory, immutable structural model of a combinational circuit
///
/// Ports are accessed by index in their sorted order (stable across runs, matching §3 of the
/// specification this crate implements); gates are accessed by index in topological order.
#[derive(Debug, Clone)]
pub struct Model {
    inputs: Vec<String>,
    outputs: Vec<String>,
    gates: Vec<Gate>,
    /// For each output port (parallel to `outputs`), the gate that drives it, if any
    output_producer: Vec<Option<u32>>,
    /// Component names whose type was not a recognized gate family, port, or pin
    dropped: Vec<(String, String)>,
}

impl Model {
    /// Number of primary input ports
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Number of primary output ports
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Number of gates in the topologically sorted network
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Name of the `i`-th input port, in sorted order
    pub fn input_name(&self, i: usize) -> &str {
        &self.inputs[i]
    }

    /// Name of the `i`-th output port, in sorted order
    pub fn output_name(&self, i: usize) -> &str {
        &self.outputs[i]
    }

    /// All input port names, in sorted order
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// All output port names, in sorted order
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// The `i`-th gate, in topological (producer-before-consumer) order
    pub fn gate(&self, i: usize) -> &Gate {
        &self.gates[i]
    }

    /// All gates, in topological order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Index of the gate with the given name, if any
    pub fn gate_index(&self, name: &str) -> Option<u32> {
        self.gates
            .iter()
            .position(|g| g.name == name)
            .map(|i| i as u32)
    }

    /// Signal driving the `i`-th output port, if any gate resolves to it
    ///
    /// `None` means the output port is not driven by any gate in this model; per §4.E,
    /// such an output is simply ignored by the consistency checker rather than treated
    /// as an error.
    pub fn output_signal(&self, i: usize) -> Option<Signal> {
        self.output_producer[i].map(Signal::Gate)
    }

    /// Components whose `componentType` was not recognized as a gate family, along with
    /// the unrecognized type string; these were dropped from the model with a warning
    pub fn dropped_components(&self) -> &[(String, String)] {
        &self.dropped
    }

    /// Check structural invariants: disjoint ports, sorted names, and topological soundness
    ///
    /// Intended for tests and debug assertions; a model built by [`Model::load_str`] always
    /// satisfies these by construction.
    pub fn check(&self) {
        for i in 1..self.inputs.len() {
            assert!(sort_key(&self.inputs[i - 1]) <= sort_key(&self.inputs[i]));
        }
        for i in 1..self.outputs.len() {
            assert!(sort_key(&self.outputs[i - 1]) <= sort_key(&self.outputs[i]));
        }
        for inp in &self.inputs {
            assert!(!self.outputs.contains(inp), "port {inp} is both input and output");
        }
        for (idx, g) in self.gates.iter().enumerate() {
            for s in &g.inputs {
                if let Signal::Gate(producer) = s {
                    assert!(
                        (*producer as usize) < idx,
                        "gate {} depends on {} before it is computed",
                        g.name,
                        producer
                    );
                }
                if let Signal::Input(i) = s {
                    assert!((*i as usize) < self.inputs.len());
                }
            }
        }
    }
}

/// `(len, lex)` ordering used for port names throughout the specification
fn sort_key(s: &str) -> (usize, &str) {
    (s.len(), s)
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model with {} inputs, {} outputs, {} gates:",
            self.nb_inputs(),
            self.nb_outputs(),
            self.nb_gates()
        )?;
        for g in &self.gates {
            writeln!(f, "  {} = {}", g.name, g)?;
        }
        for o in &self.outputs {
            writeln!(f, "  output {o}")?;
        }
        if !self.dropped.is_empty() {
            writeln!(f, "  {} component(s) dropped (unknown type)", self.dropped.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_order() {
        let mut names = vec!["i10".to_string(), "i2".to_string(), "i1".to_string()];
        names.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        assert_eq!(names, vec!["i1", "i2", "i10"]);
    }
}
