use log::{debug, error, warn};

use super::codec::SpecimenId;

/// Something observable that happened to a candidate or to the whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// The candidate was persisted and joins the batch.
    Accepted { id: SpecimenId },
    /// The existence check reported the candidate as already issued.
    Collision { id: SpecimenId },
    /// The existence check passed but `save` lost to a concurrent writer.
    RaceLost { id: SpecimenId },
    /// The store failed for another reason; the candidate is discarded.
    StoreFailure { id: SpecimenId, cause: String },
    /// The attempt budget ran out before the batch was complete.
    Exhausted {
        requested: usize,
        accepted: usize,
        attempts: usize,
    },
}

/// Observer injected into the generator in place of a global logger.
pub trait GenerationListener {
    fn record(&self, event: &GenerationEvent);
}

/// Forwards events to the `log` facade.
#[derive(Default)]
pub struct LogListener {}

impl GenerationListener for LogListener {
    fn record(&self, event: &GenerationEvent) {
        match event {
            GenerationEvent::Accepted { id } => debug!("Accepted ID {}", id),
            GenerationEvent::Collision { id } => debug!("ID {} already exists, retrying", id),
            GenerationEvent::RaceLost { id } => {
                warn!("ID {} was saved concurrently by another writer, retrying", id)
            }
            GenerationEvent::StoreFailure { id, cause } => {
                error!("Failed to save ID {}: {}", id, cause)
            }
            GenerationEvent::Exhausted {
                requested,
                accepted,
                attempts,
            } => error!(
                "Attempts failing to create IDs: {}/{} accepted after {} attempts",
                accepted, requested, attempts
            ),
        }
    }
}
