//! Consistency-based single-fault diagnosis over a combinational [`crate::model::Model`]

mod baseline;
mod single_fault;

use std::collections::{BTreeSet, HashMap};

pub use baseline::{NullDiagnoser, RandomDiagnoser, WorstDiagnoser};
pub use single_fault::SingleFaultDiagnoser;

use crate::model::Model;

/// One observation: a partial snapshot of named signal values at a single timestamp
///
/// Input ports drive the nominal simulation; output ports (and any other named signal
/// present) are checked for consistency. Keys outside the model's ports are ignored.
pub type Observation = HashMap<String, bool>;

/// Set of single-gate diagnoses that would each individually explain an observation
///
/// A `BTreeSet<BTreeSet<String>>` rather than a flat set of gate names: this is the one
/// representation every [`Diagnoser`] implementation can produce, from [`NullDiagnoser`]'s
/// empty group, through [`SingleFaultDiagnoser`]'s set of singletons, to [`WorstDiagnoser`]'s
/// single group naming every gate.
pub type AmbiguityGroup = BTreeSet<BTreeSet<String>>;

/// Shared contract for every diagnosis strategy over a loaded [`Model`]
///
/// Mirrors the teacher's own practice of putting network-wide operations behind a narrow
/// trait (`Diagnoser::process` stands in for the `DiagnosisSystemClass` base methods
/// `LoadModel`/`Initialize`/`Input`), so tests can hold a `Vec<Box<dyn Diagnoser>>` and
/// drive every strategy through the same scenario stream.
pub trait Diagnoser {
    /// Bind (or rebind) the model this diagnoser evaluates observations against
    fn load_model(&mut self, model: Model);

    /// One-time warm-up hook; most implementations have nothing to do here
    fn initialize(&mut self) {}

    /// Process one observation, returning whether it was inconsistent with the nominal
    /// simulation and, if so, the candidate single-fault diagnoses
    fn process(&mut self, observation: &Observation) -> (bool, AmbiguityGroup);
}

fn singleton(gate: &str) -> BTreeSet<String> {
    let mut s = BTreeSet::new();
    s.insert(gate.to_string());
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    pub(crate) fn and2_model() -> Model {
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
    fn test_trait_object_vec() {
        let diagnosers: Vec<Box<dyn Diagnoser>> = vec![
            Box::new(NullDiagnoser::default()),
            Box::new(RandomDiagnoser::new(42)),
            Box::new(WorstDiagnoser::default()),
            Box::new(SingleFaultDiagnoser::default()),
        ];
        assert_eq!(diagnosers.len(), 4);
    }
}
