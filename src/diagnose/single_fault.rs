//! Consistency-based single stuck-at fault detection and isolation

use std::time::{Duration, Instant};

use tracing::debug;

use crate::model::Model;
use crate::simulate::{Fault, Simulator};

use super::{singleton, AmbiguityGroup, Diagnoser, Observation};

/// How often (in gates scanned) the fault-enumeration loop checks the wall clock
const BUDGET_CHECK_INTERVAL: usize = 100;

/// Single-stuck-at-fault diagnoser: the reference algorithm of §4.F
///
/// Detection runs one nominal simulation. Isolation, only attempted when detection fires,
/// tries forcing each gate's output to each polarity in stored (topological) order and keeps
/// whichever gates reproduce the observation under some polarity. A soft wall-clock budget
/// is sampled every [`BUDGET_CHECK_INTERVAL`] gates so the loop always terminates in bounded
/// wall time even on a large model.
#[derive(Default)]
pub struct SingleFaultDiagnoser {
    model: Option<Model>,
    budget: Option<Duration>,
}

impl SingleFaultDiagnoser {
    /// A diagnoser with no soft deadline: the fault-enumeration loop always runs to completion
    pub fn new() -> SingleFaultDiagnoser {
        SingleFaultDiagnoser::default()
    }

    /// A diagnoser that aborts isolation early past `budget`, returning partial candidates
    pub fn with_budget(budget: Duration) -> SingleFaultDiagnoser {
        SingleFaultDiagnoser {
            model: None,
            budget: Some(budget),
        }
    }

    fn model(&self) -> &Model {
        self.model
            .as_ref()
            .expect("SingleFaultDiagnoser::process called before load_model")
    }

    fn consistent(sampled: &Observation, observed: &Observation) -> bool {
        sampled
            .iter()
            .all(|(k, v)| observed.get(k).map_or(true, |ov| ov == v))
    }
}

impl Diagnoser for SingleFaultDiagnoser {
    fn load_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    fn process(&mut self, observation: &Observation) -> (bool, AmbiguityGroup) {
        let model = self.model();
        let mut sim = Simulator::new(model);
        for (name, value) in observation {
            sim.set_input(name, *value);
        }
        sim.run_comb();
        let nominal = sim.sample_outputs();

        let detected = !Self::consistent(&nominal, observation);
        if !detected {
            debug!(detected = false, "observation consistent with nominal simulation");
            return (false, AmbiguityGroup::new());
        }

        let start = Instant::now();
        let mut candidates = AmbiguityGroup::new();
        let mut budget_exceeded = false;
        'gates: for i in 0..model.nb_gates() {
            if i > 0 && i % BUDGET_CHECK_INTERVAL == 0 {
                if let Some(budget) = self.budget {
                    if start.elapsed() > budget {
                        debug!(gate = i, "soft deadline exceeded during fault enumeration");
                        budget_exceeded = true;
                        break 'gates;
                    }
                }
            }
            for value in [true, false] {
                sim.reset();
                for (name, v) in observation {
                    sim.set_input(name, *v);
                }
                sim.run_comb_with_fault(&Fault::output_stuck_at(i as u32, value));
                let sampled = sim.sample_outputs();
                if Self::consistent(&sampled, observation) {
                    candidates.insert(singleton(model.gate(i).name.as_str()));
                    break;
                }
            }
        }

        debug!(
            detected = true,
            candidates = candidates.len(),
            budget_exceeded,
            "fault enumeration complete"
        );
        (true, candidates)
    }
}
