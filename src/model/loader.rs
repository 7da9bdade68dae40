//! Parsing a structural description into a [`Model`]
//!
//! The reference encoding is a small JSON document shaped after the `component`/`connection`
//! records described in the specification; see the crate-level docs for the schema. Wire
//! resolution and topological sort follow the model loader algorithm from §4.B: every gate
//! pin is resolved by a single hop across the undirected connection graph, and gates are
//! emitted by Kahn's algorithm in FIFO order as their dependencies are satisfied.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::ModelError;

use super::gate::{classify_gate_type, GateFamily};
use super::signal::Signal;
use super::{sort_key, Gate, Model};

#[derive(Debug, Deserialize)]
struct RawComponent {
    name: String,
    #[serde(rename = "componentType")]
    component_type: String,
}

#[derive(Debug, Deserialize)]
struct RawConnection {
    c1: String,
    c2: String,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    components: Vec<RawComponent>,
    connections: Vec<RawConnection>,
}

/// A gate candidate before wire resolution: its declared family and name, in file order
struct GateCandidate {
    name: String,
    family: GateFamily,
}

impl Model {
    /// Load a model from a JSON string
    pub fn load_str(text: &str) -> Result<Model, ModelError> {
        let raw: RawModel = serde_json::from_str(text)
            .map_err(|e| ModelError::MalformedDescription(e.to_string()))?;
        build_model(raw)
    }

    /// Load a model from any reader, e.g. an open file handle
    pub fn load_reader<R: Read>(mut r: R) -> Result<Model, ModelError> {
        let mut text = String::new();
        r.read_to_string(&mut text)
            .map_err(|e| ModelError::MalformedDescription(e.to_string()))?;
        Model::load_str(&text)
    }

    /// Load a model from a file path
    ///
    /// `load_model(path)` in the specification's external interface: idempotent,
    /// `O(gates + connections)`, and the only place the core touches the filesystem.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Model, ModelError> {
        let text = fs::read_to_string(path.as_ref())
            .map_err(|e| ModelError::MalformedDescription(e.to_string()))?;
        Model::load_str(&text)
    }
}

/// Find the first neighbor of `label` in the adjacency map that isn't `exclude`
///
/// Connection lists compose an undirected graph of endpoint labels; this is the single-hop
/// resolution the specification requires, in the insertion order of the original connection
/// list (the pin-resolution ambiguity the spec calls out explicitly).
fn resolve_neighbor<'a>(
    adjacency: &'a HashMap<String, Vec<String>>,
    label: &str,
    exclude: &str,
) -> Option<&'a str> {
    adjacency
        .get(label)?
        .iter()
        .find(|n| n.as_str() != exclude)
        .map(|n| n.as_str())
}

fn build_model(raw: RawModel) -> Result<Model, ModelError> {
    // Adjacency map over endpoint labels, preserving connection-list order per endpoint.
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    for conn in &raw.connections {
        adjacency
            .entry(conn.c1.clone())
            .or_default()
            .push(conn.c2.clone());
        adjacency
            .entry(conn.c2.clone())
            .or_default()
            .push(conn.c1.clone());
    }

    // Membership test for declared pin components (e.g. "gate5.i2"), used to find the
    // extent of a gate's wired arity.
    let declared: HashMap<&str, &str> = raw
        .components
        .iter()
        .map(|c| (c.name.as_str(), c.component_type.as_str()))
        .collect();

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    let mut candidates = Vec::new();
    let mut dropped = Vec::new();

    for c in &raw.components {
        if c.name.contains('.') {
            // Internal pin/wire intermediate: not a gate or a port on its own.
            continue;
        }
        if c.component_type == "port" {
            if c.name.starts_with('i') {
                inputs.push(c.name.clone());
            } else if c.name.starts_with('o') {
                outputs.push(c.name.clone());
            }
            continue;
        }
        match classify_gate_type(&c.component_type) {
            Some(family) => candidates.push(GateCandidate {
                name: c.name.clone(),
                family,
            }),
            None => {
                warn!(component = %c.name, component_type = %c.component_type, "dropping component with unrecognized type");
                dropped.push((c.name.clone(), c.component_type.clone()));
            }
        }
    }

    inputs.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    outputs.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    // Resolve each gate's pins to endpoint labels (still strings at this point).
    struct ResolvedGate {
        name: String,
        family: GateFamily,
        input_labels: Vec<String>,
        output_label: String,
    }

    let mut resolved = Vec::with_capacity(candidates.len());
    let mut output_to_gate: HashMap<String, String> = HashMap::new();
    for cand in candidates {
        let mut input_labels = Vec::new();
        let mut i = 1usize;
        loop {
            let pin = format!("{}.i{}", cand.name, i);
            if !declared.contains_key(pin.as_str()) {
                break;
            }
            let neighbor = resolve_neighbor(&adjacency, &pin, &cand.name).ok_or_else(|| {
                ModelError::UnresolvedPin {
                    component: cand.name.clone(),
                    pin: pin.clone(),
                }
            })?;
            input_labels.push(neighbor.to_string());
            i += 1;
        }

        let out_pin = format!("{}.o", cand.name);
        let output_label = resolve_neighbor(&adjacency, &out_pin, &cand.name)
            .ok_or_else(|| ModelError::UnresolvedPin {
                component: cand.name.clone(),
                pin: out_pin.clone(),
            })?
            .to_string();

        if let Some(prev) = output_to_gate.get(&output_label) {
            return Err(ModelError::MultiplyDrivenSignal {
                signal: output_label,
                first_driver: prev.clone(),
                second_driver: cand.name,
            });
        }
        output_to_gate.insert(output_label.clone(), cand.name.clone());

        resolved.push(ResolvedGate {
            name: cand.name,
            family: cand.family,
            input_labels,
            output_label,
        });
    }

    // Kahn's algorithm over gate names: an edge runs from a producer gate to every gate
    // that consumes one of its resolved output labels.
    let mut in_degree: HashMap<&str, u32> = resolved.iter().map(|g| (g.name.as_str(), 0)).collect();
    let mut consumers: HashMap<&str, Vec<&str>> = HashMap::new();
    for g in &resolved {
        for label in &g.input_labels {
            if let Some(producer) = output_to_gate.get(label) {
                consumers.entry(producer.as_str()).or_default().push(&g.name);
                *in_degree.get_mut(g.name.as_str()).unwrap() += 1;
            }
        }
    }

    let mut queue: std::collections::VecDeque<&str> = resolved
        .iter()
        .filter(|g| in_degree[g.name.as_str()] == 0)
        .map(|g| g.name.as_str())
        .collect();

    let mut order = Vec::with_capacity(resolved.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        if let Some(next) = consumers.get(name) {
            for &consumer in next {
                let d = in_degree.get_mut(consumer).unwrap();
                *d -= 1;
                if *d == 0 {
                    queue.push_back(consumer);
                }
            }
        }
    }

    if order.len() != resolved.len() {
        return Err(ModelError::Cycle {
            remaining_gates: resolved.len() - order.len(),
        });
    }

    let by_name: HashMap<&str, &ResolvedGate> =
        resolved.iter().map(|g| (g.name.as_str(), g)).collect();
    let gate_index: HashMap<&str, u32> = order
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i as u32))
        .collect();
    let input_index: HashMap<&str, u32> = inputs
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i as u32))
        .collect();

    let mut gates = Vec::with_capacity(order.len());
    for name in &order {
        let g = by_name[name.as_str()];
        let mut sigs = Vec::with_capacity(g.input_labels.len());
        for label in &g.input_labels {
            let sig = if let Some(&idx) = input_index.get(label.as_str()) {
                Signal::Input(idx)
            } else if let Some(producer) = output_to_gate.get(label) {
                Signal::Gate(gate_index[producer.as_str()])
            } else {
                return Err(ModelError::UnresolvedPin {
                    component: g.name.clone(),
                    pin: label.clone(),
                });
            };
            sigs.push(sig);
        }
        gates.push(Gate {
            name: g.name.clone(),
            family: g.family,
            inputs: sigs,
        });
    }

    let output_producer = outputs
        .iter()
        .map(|o| output_to_gate.get(o.as_str()).map(|n| gate_index[n.as_str()]))
        .collect();

    let model = Model {
        inputs,
        outputs,
        gates,
        output_producer,
        dropped,
    };
    model.check();
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and2_json() -> &'static str {
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
        }"#
    }

    #[test]
    fn test_load_and2() {
        let model = Model::load_str(and2_json()).unwrap();
        assert_eq!(model.nb_inputs(), 2);
        assert_eq!(model.nb_outputs(), 1);
        assert_eq!(model.nb_gates(), 1);
        assert_eq!(model.input_name(0), "i1");
        assert_eq!(model.input_name(1), "i2");
        assert_eq!(model.output_name(0), "o1");
        assert_eq!(model.gate(0).name, "gate1");
        assert_eq!(model.gate(0).family, GateFamily::And);
        assert_eq!(
            model.gate(0).inputs,
            vec![Signal::Input(0), Signal::Input(1)]
        );
        assert_eq!(model.output_signal(0), Some(Signal::Gate(0)));
    }

    #[test]
    fn test_port_sort_order() {
        let json = r#"{
            "components": [
                {"name": "i10", "componentType": "port"},
                {"name": "i2", "componentType": "port"},
                {"name": "i1", "componentType": "port"}
            ],
            "connections": []
        }"#;
        let model = Model::load_str(json).unwrap();
        assert_eq!(model.inputs(), &["i1".to_string(), "i2".to_string(), "i10".to_string()]);
    }

    #[test]
    fn test_unknown_gate_dropped() {
        let json = r#"{
            "components": [
                {"name": "gizmo1", "componentType": "quantum_tunnel"}
            ],
            "connections": []
        }"#;
        let model = Model::load_str(json).unwrap();
        assert_eq!(model.nb_gates(), 0);
        assert_eq!(
            model.dropped_components(),
            &[("gizmo1".to_string(), "quantum_tunnel".to_string())]
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let json = r#"{
            "components": [
                {"name": "gate1", "componentType": "buf1"},
                {"name": "gate1.i1", "componentType": "pin"},
                {"name": "gate1.o", "componentType": "pin"},
                {"name": "gate2", "componentType": "buf1"},
                {"name": "gate2.i1", "componentType": "pin"},
                {"name": "gate2.o", "componentType": "pin"}
            ],
            "connections": [
                {"c1": "gate1.i1", "c2": "gate2.o"},
                {"c1": "gate2.i1", "c2": "gate1.o"}
            ]
        }"#;
        let err = Model::load_str(json).unwrap_err();
        assert!(matches!(err, ModelError::Cycle { remaining_gates: 2 }));
    }

    #[test]
    fn test_multiply_driven_signal() {
        let json = r#"{
            "components": [
                {"name": "gate1", "componentType": "buf1"},
                {"name": "gate1.i1", "componentType": "pin"},
                {"name": "gate1.o", "componentType": "pin"},
                {"name": "gate2", "componentType": "buf1"},
                {"name": "gate2.i1", "componentType": "pin"},
                {"name": "gate2.o", "componentType": "pin"},
                {"name": "i1", "componentType": "port"}
            ],
            "connections": [
                {"c1": "gate1.i1", "c2": "i1"},
                {"c1": "gate1.o", "c2": "shared"},
                {"c1": "gate2.i1", "c2": "i1"},
                {"c1": "gate2.o", "c2": "shared"}
            ]
        }"#;
        let err = Model::load_str(json).unwrap_err();
        assert!(matches!(err, ModelError::MultiplyDrivenSignal { .. }));
    }

    #[test]
    fn test_chain_topo_order() {
        // gate1 = AND(i1, i2); gate2 = NOT(gate1)
        let json = r#"{
            "components": [
                {"name": "i1", "componentType": "port"},
                {"name": "i2", "componentType": "port"},
                {"name": "o1", "componentType": "port"},
                {"name": "gate2", "componentType": "not1"},
                {"name": "gate2.i1", "componentType": "pin"},
                {"name": "gate2.o", "componentType": "pin"},
                {"name": "gate1", "componentType": "and2"},
                {"name": "gate1.i1", "componentType": "pin"},
                {"name": "gate1.i2", "componentType": "pin"},
                {"name": "gate1.o", "componentType": "pin"}
            ],
            "connections": [
                {"c1": "gate1.i1", "c2": "i1"},
                {"c1": "gate1.i2", "c2": "i2"},
                {"c1": "gate1.o", "c2": "mid"},
                {"c1": "gate2.i1", "c2": "mid"},
                {"c1": "gate2.o", "c2": "o1"}
            ]
        }"#;
        let model = Model::load_str(json).unwrap();
        assert_eq!(model.nb_gates(), 2);
        // gate1 must come before gate2 regardless of declaration order
        assert_eq!(model.gate(0).name, "gate1");
        assert_eq!(model.gate(1).name, "gate2");
        assert_eq!(model.gate(1).inputs, vec![Signal::Gate(0)]);
    }
}
