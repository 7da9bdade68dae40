//! Trivial fixture diagnosers used to exercise the [`super::Diagnoser`] trait boundary
//!
//! Mirrored from `RandomDiagnoser.py`'s three baseline classes: these are not a scoring
//! harness, just minimal implementations of the shared contract for this crate's own tests.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::model::Model;

use super::{singleton, AmbiguityGroup, Diagnoser, Observation};

/// Never detects a fault, regardless of the observation
#[derive(Default)]
pub struct NullDiagnoser {
    model: Option<Model>,
}

impl Diagnoser for NullDiagnoser {
    fn load_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    fn process(&mut self, _observation: &Observation) -> (bool, AmbiguityGroup) {
        (false, AmbiguityGroup::new())
    }
}

/// Always detects a fault and reports one pseudo-randomly chosen gate
pub struct RandomDiagnoser {
    model: Option<Model>,
    rng: SmallRng,
}

impl RandomDiagnoser {
    /// A random diagnoser seeded for reproducible test runs
    pub fn new(seed: u64) -> RandomDiagnoser {
        RandomDiagnoser {
            model: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Diagnoser for RandomDiagnoser {
    fn load_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    fn process(&mut self, _observation: &Observation) -> (bool, AmbiguityGroup) {
        let model = self
            .model
            .as_ref()
            .expect("RandomDiagnoser::process called before load_model");
        if model.nb_gates() == 0 {
            return (true, AmbiguityGroup::new());
        }
        let i = self.rng.gen_range(0..model.nb_gates());
        let mut candidates = AmbiguityGroup::new();
        candidates.insert(singleton(model.gate(i).name.as_str()));
        (true, candidates)
    }
}

/// Always detects a fault and reports a single diagnosis naming every gate in the model
///
/// Scores near zero under any reasonable ambiguity-group metric; useful only as a
/// maximum-false-positive fixture for exercising scoring-adjacent tests.
#[derive(Default)]
pub struct WorstDiagnoser {
    model: Option<Model>,
}

impl Diagnoser for WorstDiagnoser {
    fn load_model(&mut self, model: Model) {
        self.model = Some(model);
    }

    fn process(&mut self, _observation: &Observation) -> (bool, AmbiguityGroup) {
        let model = self
            .model
            .as_ref()
            .expect("WorstDiagnoser::process called before load_model");
        let all_gates: std::collections::BTreeSet<String> =
            model.gates().iter().map(|g| g.name.clone()).collect();
        let mut candidates = AmbiguityGroup::new();
        candidates.insert(all_gates);
        (true, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnose::tests::and2_model;

    #[test]
    fn test_null_never_detects() {
        let mut d = NullDiagnoser::default();
        d.load_model(and2_model());
        let (detected, candidates) = d.process(&Observation::new());
        assert!(!detected);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_random_reports_one_gate() {
        let mut d = RandomDiagnoser::new(7);
        d.load_model(and2_model());
        let (detected, candidates) = d.process(&Observation::new());
        assert!(detected);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates.iter().next().unwrap().len(), 1);
    }

    #[test]
    fn test_worst_reports_all_gates() {
        let mut d = WorstDiagnoser::default();
        d.load_model(and2_model());
        let (detected, candidates) = d.process(&Observation::new());
        assert!(detected);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates.iter().next().unwrap().len(), 1);
    }
}
