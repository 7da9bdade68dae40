//! Combinational simulation over a loaded [`crate::model::Model`]
//!
//! Mirrors `SimpleSimulator` from the teacher's own simulation layer, but works over a single
//! boolean value per signal instead of a 64-bit simulation word, since the diagnoser only ever
//! needs one sample at a time.

pub mod fault;

use std::collections::HashMap;

use crate::model::{Model, Signal};

pub use fault::Fault;

/// One-shot combinational simulator bound to a [`Model`]
///
/// Built fresh (or [`Simulator::reset`]) for every observation: there is no persisted state
/// across calls, matching the "no shared mutable state" requirement of the concurrency model.
#[derive(Debug)]
pub struct Simulator<'a> {
    model: &'a Model,
    input_values: Vec<bool>,
    gate_values: Vec<bool>,
}

impl<'a> Simulator<'a> {
    /// Build a simulator over `model` with all inputs initially false
    pub fn new(model: &'a Model) -> Simulator<'a> {
        Simulator {
            model,
            input_values: vec![false; model.nb_inputs()],
            gate_values: vec![false; model.nb_gates()],
        }
    }

    /// Reset all signal values to false, keeping the bound model
    pub fn reset(&mut self) {
        self.input_values.iter_mut().for_each(|v| *v = false);
        self.gate_values.iter_mut().for_each(|v| *v = false);
    }

    /// Set the value driving the named input port; no-op if the name is not an input
    pub fn set_input(&mut self, name: &str, value: bool) {
        if let Some(i) = self.model.inputs().iter().position(|n| n == name) {
            self.input_values[i] = value;
        }
    }

    /// Drive every named input port from `values`, leaving unmentioned ports at their
    /// current value (false, unless [`Simulator::set_input`] was already called)
    pub fn set_inputs(&mut self, values: &HashMap<String, bool>) {
        for (name, value) in values {
            self.set_input(name, *value);
        }
    }

    /// Value currently held by a signal
    pub fn get_value(&self, signal: Signal) -> bool {
        match signal {
            Signal::Input(i) => self.input_values[i as usize],
            Signal::Gate(i) => self.gate_values[i as usize],
        }
    }

    /// Value currently held by the named output port, if it is driven by some gate
    pub fn get_output(&self, name: &str) -> Option<bool> {
        let i = self.model.outputs().iter().position(|n| n == name)?;
        self.model
            .output_signal(i)
            .map(|sig| self.get_value(sig))
    }

    /// Run the combinational network to a fixed point, with no fault injected
    pub fn run_comb(&mut self) {
        for i in 0..self.model.nb_gates() {
            let value = self.model.gate(i).eval(|s| self.get_value(s));
            self.gate_values[i] = value;
        }
    }

    /// Run the combinational network, forcing `fault`'s gate output to its stuck value
    ///
    /// Mirrors the teacher's `run_comb_with_faults`: every gate still gets a write, the
    /// fault only overrides what that write ends up being.
    pub fn run_comb_with_fault(&mut self, fault: &Fault) {
        for i in 0..self.model.nb_gates() {
            let value = if fault.gate() == i as u32 {
                fault.value()
            } else {
                self.model.gate(i).eval(|s| self.get_value(s))
            };
            self.gate_values[i] = value;
        }
    }

    /// Collect the full signal map (inputs and all defined outputs) as observed externally
    pub fn sample_outputs(&self) -> HashMap<String, bool> {
        let mut ret = HashMap::with_capacity(self.model.nb_outputs());
        for (i, name) in self.model.outputs().iter().enumerate() {
            if let Some(sig) = self.model.output_signal(i) {
                ret.insert(name.clone(), self.get_value(sig));
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    fn and2_model() -> Model {
        Model::load_str(
            r#"{
                "components": [
                    {"name": "i1", "componentType": "port"},
                    {"name": "i2", "componentType": "port"},
                    {"name": "o1", "componentType": "port"},
                    {"name": "gate1", "componentType": "and2"},
                    {"name": "gate1.i1", "componentType": "pin"},
                    {"name": "gate1.i2", "componentType": "pin"},
                    {"name": "gate1.o", "componentType": "pin"}
                ],
                "connections": [
                    {"c1": "gate1.i1", "c2": "i1"},
                    {"c1": "gate1.i2", "c2": "i2"},
                    {"c1": "gate1.o", "c2": "o1"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_nominal_and2() {
        let model = and2_model();
        let mut sim = Simulator::new(&model);
        sim.set_input("i1", true);
        sim.set_input("i2", true);
        sim.run_comb();
        assert_eq!(sim.get_output("o1"), Some(true));

        sim.reset();
        sim.set_input("i1", true);
        sim.set_input("i2", false);
        sim.run_comb();
        assert_eq!(sim.get_output("o1"), Some(false));
    }

    #[test]
    fn test_stuck_at_one() {
        let model = and2_model();
        let mut sim = Simulator::new(&model);
        sim.set_input("i1", false);
        sim.set_input("i2", false);
        sim.run_comb_with_fault(&Fault::output_stuck_at(0, true));
        assert_eq!(sim.get_output("o1"), Some(true));
    }
}
