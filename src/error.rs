//! Error taxonomy for model loading and scenario decoding

use thiserror::Error;

/// Fatal error encountered while building a [`crate::model::Model`] from a structural description
///
/// Model errors always abort the load: there is no partial model to recover from.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ModelError {
    /// The structural description could not be parsed at all
    #[error("malformed model description: {0}")]
    MalformedDescription(String),

    /// A gate declares an input or output pin that does not resolve to any signal
    #[error("component {component}: pin {pin} does not resolve to any signal")]
    UnresolvedPin {
        /// Name of the gate that owns the pin
        component: String,
        /// Pin label, e.g. `gate17.i2`
        pin: String,
    },

    /// Two different gates resolve to the same output signal
    #[error("signal {signal} is driven by both {first_driver} and {second_driver}")]
    MultiplyDrivenSignal {
        /// Name of the contested signal
        signal: String,
        /// Gate that was recorded as the driver first
        first_driver: String,
        /// Gate that attempted to drive the same signal again
        second_driver: String,
    },

    /// The gate dependency graph is not a DAG
    #[error("model has a combinational cycle among {remaining_gates} gate(s)")]
    Cycle {
        /// Number of gates left unresolved when Kahn's algorithm stalled
        remaining_gates: usize,
    },
}

/// Error encountered while decoding a scenario observation
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ScenarioError {
    /// A `key = value` pair did not use `true`/`false` for its value
    #[error("signal {key}: invalid boolean token {token:?}")]
    InvalidValue {
        /// Signal name the value was meant for
        key: String,
        /// The token that failed to parse as a boolean
        token: String,
    },

    /// A line did not match any recognized scenario record shape
    #[error("malformed scenario line: {line:?}")]
    MalformedLine {
        /// The offending line, verbatim
        line: String,
    },
}
