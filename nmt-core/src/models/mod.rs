mod attractor;
mod change_entry;
mod ingestion_job;
mod neuron;
mod provenance;
mod synapse;
mod vector_clock;

pub use attractor::Attractor;
pub use change_entry::{ChangeEntry, ChangeOperation};
pub use ingestion_job::{IngestionJob, JobStatus};
pub use neuron::{Neuron, NeuronKind, NeuronMetadata};
pub use provenance::Provenance;
pub use synapse::{Synapse, SynapseMetadata, SynapseType};
pub use vector_clock::{ClockOrdering, VectorClock};
