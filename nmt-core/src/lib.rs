//! Shared data model, configuration, and error taxonomy for the semantic
//! memory store. Every other crate in the workspace depends on this one
//! and nothing else upstream, so that `Neuron`/`Synapse`/`VectorClock`/error
//! types have exactly one definition.

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::NmtConfig;
pub use errors::{NmtError, NmtResult};
