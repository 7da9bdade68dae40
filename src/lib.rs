//! Single-fault diagnoser for combinational logic networks.
//!
//! Given a structural description of a boolean logic network (gates, named input and
//! output ports, resolved wiring) and a stream of sensor observations, this crate decides
//! whether the circuit is behaving faultily and, if so, which single gate (forced to
//! stuck-at-0 or stuck-at-1) explains the observed outputs.
//!
//! The crate is organized leaf-first, matching how a [`model::Model`] flows through it:
//! [`model`] builds the structural representation from a structural description,
//! [`simulate`] evaluates it (nominally or under a single forced fault), [`diagnose`]
//! layers consistency-based isolation on top, and [`scenario`] decodes the line-oriented
//! observation stream that drives it all. [`error`] collects the typed failure modes of
//! the loader and the scenario adapter.
//!
//! This is a combinational, single-threaded, single-fault core: no sequential circuits,
//! no multi-fault diagnosis, no learning from scenarios. See each module's docs for the
//! algorithm it implements.

pub mod diagnose;
pub mod error;
pub mod model;
pub mod scenario;
pub mod simulate;

pub use diagnose::{AmbiguityGroup, Diagnoser, Observation, SingleFaultDiagnoser};
pub use error::{ModelError, ScenarioError};
pub use model::Model;
pub use simulate::{Fault, Simulator};
