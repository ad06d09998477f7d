use std::{
    collections::HashSet,
    num::IntErrorKind,
    time::{Duration, Instant},
};

use log::{debug, info};
use uuid::Uuid;

use crate::{config::GeneratorConfig, BatchError};

use super::{
    codec::{IdCodec, SpecimenId},
    listener::{GenerationEvent, GenerationListener, LogListener},
    store::{BatchRef, IdRecord, IdStore, StoreError},
};

/// Largest count a single batch request may ask for.
pub const MAX_BATCH_SIZE: usize = 10_000;

/// A batch of `n` aborts once more than `n * ATTEMPT_MULTIPLIER` attempts were made.
pub const ATTEMPT_MULTIPLIER: usize = 3;

static LOG_LISTENER: LogListener = LogListener {};

/// Outcome of the whole batch call, with per-candidate counts.
#[derive(Debug)]
pub struct BatchExecution {
    /// Unique identifier of this call, used to correlate log lines
    pub id: Uuid,
    /// Accepted identifiers in acceptance order
    pub ids: Vec<SpecimenId>,
    pub requested: usize,
    /// Every candidate tried, accepted or not
    pub attempts: usize,
    /// Candidates already issued, found by the existence check or within the batch
    pub collisions: usize,
    /// Candidates rejected by `save` as duplicates after passing the existence check
    pub races_lost: usize,
    /// Candidates discarded because the store failed
    pub store_failures: usize,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
}

/// Terminal state of one candidate.
#[derive(Debug, PartialEq)]
enum CandidateOutcome {
    Accepted,
    RejectedDuplicate,
    RejectedRace,
    RejectedError(String),
}

#[derive(Default)]
struct Counters {
    attempts: usize,
    collisions: usize,
    races_lost: usize,
    store_failures: usize,
}

/// Parses a user-supplied batch size.
///
/// This is where text such as `"-1"`, `"2.5"` or `"many"` is turned away; past this
/// point counts are `usize` and only zero or oversize values remain to be checked.
///
/// # Errors
///
/// Returns [`BatchError::InvalidBatchSize`] when the input is not a positive integer
/// or exceeds `max_batch_size`.
///
/// # Examples
///
/// ```
/// use specimen_id::core::generator::parse_batch_size;
///
/// assert_eq!(parse_batch_size(" 250 ", 10_000), Ok(250));
/// assert!(parse_batch_size("-1", 10_000).is_err());
/// assert!(parse_batch_size("invalid", 10_000).is_err());
/// ```
pub fn parse_batch_size(input: &str, max_batch_size: usize) -> Result<usize, BatchError> {
    let count = match input.trim().parse::<i64>() {
        Ok(count) => count,
        Err(error) if *error.kind() == IntErrorKind::PosOverflow => {
            return Err(exceeds_max(input.trim(), max_batch_size));
        }
        Err(_) => {
            return Err(BatchError::InvalidBatchSize(format!(
                "Count must be a positive number, got {:?}",
                input
            )));
        }
    };

    if count <= 0 {
        return Err(BatchError::InvalidBatchSize(format!(
            "Count must be a positive number, got {}",
            count
        )));
    }

    let count = usize::try_from(count).map_err(|_| exceeds_max(input.trim(), max_batch_size))?;
    check_batch_size(count, max_batch_size)?;
    Ok(count)
}

fn check_batch_size(count: usize, max_batch_size: usize) -> Result<(), BatchError> {
    if count == 0 {
        return Err(BatchError::InvalidBatchSize(
            "Count must be a positive number, got 0".to_owned(),
        ));
    }
    if count > max_batch_size {
        return Err(exceeds_max(&count.to_string(), max_batch_size));
    }
    Ok(())
}

fn exceeds_max(count: &str, max_batch_size: usize) -> BatchError {
    BatchError::InvalidBatchSize(format!(
        "Count {} exceeds maximum batch size of {}",
        count, max_batch_size
    ))
}

/// Produces batches of identifiers that are unique against a store.
///
/// Each call draws random candidates, skips any the store already knows, and saves the
/// rest one at a time. A `save` that loses a race to a concurrent writer is treated
/// like a collision; any other store failure is reported and the candidate dropped.
/// The call either returns exactly the requested number of persisted identifiers or
/// fails without a partial result.
///
/// Generators hold no state between calls. Several may run at once against the same
/// store, which is then responsible for rejecting duplicate writes.
///
/// # Example
///
/// ```
/// use specimen_id::core::generator::BatchGeneratorBuilder;
/// use specimen_id::store::memory::InMemoryStore;
///
/// let store = InMemoryStore::default();
/// let generator = BatchGeneratorBuilder::new().store(&store).build()?;
///
/// let ids = generator.generate_batch(5)?;
///
/// assert_eq!(ids.len(), 5);
/// assert_eq!(store.len(), 5);
/// # Ok::<(), specimen_id::BatchError>(())
/// ```
pub struct BatchGenerator<'a> {
    store: &'a dyn IdStore,
    listener: &'a dyn GenerationListener,
    codec: IdCodec,
    batch_ref: Option<BatchRef>,
    max_batch_size: usize,
    attempt_multiplier: usize,
}

impl<'a> BatchGenerator<'a> {
    pub fn codec(&self) -> &IdCodec {
        &self.codec
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Generates and persists `count` identifiers.
    ///
    /// # Errors
    ///
    /// - [`BatchError::InvalidBatchSize`] when `count` is zero or above the cap; the
    ///   store is not touched.
    /// - [`BatchError::GenerationExhausted`] when the attempt budget runs out.
    pub fn generate_batch(&self, count: usize) -> Result<Vec<SpecimenId>, BatchError> {
        self.execute(count).map(|execution| execution.ids)
    }

    /// Same as [`generate_batch`](Self::generate_batch), returning the execution report.
    pub fn execute(&self, count: usize) -> Result<BatchExecution, BatchError> {
        check_batch_size(count, self.max_batch_size)?;

        let start = Instant::now();
        let id = Uuid::new_v4();
        let budget = count.saturating_mul(self.attempt_multiplier);

        info!("Start of batch: {}, requested: {}", id, count);

        let mut rng = rand::rng();
        let mut ids: Vec<SpecimenId> = Vec::with_capacity(count);
        let mut accepted: HashSet<SpecimenId> = HashSet::with_capacity(count);
        let mut counters = Counters::default();

        while ids.len() < count {
            let candidate = self.codec.generate_with(&mut rng);
            counters.attempts += 1;

            let outcome = if accepted.contains(&candidate) {
                CandidateOutcome::RejectedDuplicate
            } else {
                self.try_candidate(&candidate)
            };

            match outcome {
                CandidateOutcome::Accepted => {
                    self.listener.record(&GenerationEvent::Accepted {
                        id: candidate.clone(),
                    });
                    accepted.insert(candidate.clone());
                    ids.push(candidate);
                }
                CandidateOutcome::RejectedDuplicate => {
                    counters.collisions += 1;
                    self.listener
                        .record(&GenerationEvent::Collision { id: candidate });
                }
                CandidateOutcome::RejectedRace => {
                    counters.races_lost += 1;
                    self.listener
                        .record(&GenerationEvent::RaceLost { id: candidate });
                }
                CandidateOutcome::RejectedError(cause) => {
                    counters.store_failures += 1;
                    self.listener.record(&GenerationEvent::StoreFailure {
                        id: candidate,
                        cause,
                    });
                }
            }

            if ids.len() < count && counters.attempts > budget {
                self.listener.record(&GenerationEvent::Exhausted {
                    requested: count,
                    accepted: ids.len(),
                    attempts: counters.attempts,
                });
                return Err(BatchError::GenerationExhausted {
                    requested: count,
                    accepted: ids.len(),
                    attempts: counters.attempts,
                });
            }
        }

        info!(
            "End of batch: {}, accepted: {}, attempts: {}",
            id, count, counters.attempts
        );

        Ok(BatchExecution {
            id,
            ids,
            requested: count,
            attempts: counters.attempts,
            collisions: counters.collisions,
            races_lost: counters.races_lost,
            store_failures: counters.store_failures,
            start,
            end: Instant::now(),
            duration: start.elapsed(),
        })
    }

    /// Runs one candidate through the existence check and the save.
    fn try_candidate(&self, candidate: &SpecimenId) -> CandidateOutcome {
        match self.store.exists(candidate) {
            Ok(false) => {}
            Ok(true) | Err(StoreError::UniquenessViolation(_)) => {
                return CandidateOutcome::RejectedDuplicate;
            }
            Err(StoreError::Other(cause)) => return CandidateOutcome::RejectedError(cause),
        }

        let record = IdRecord {
            id: candidate.clone(),
            batch_ref: self.batch_ref.clone(),
        };

        match self.store.save(&record) {
            Ok(()) => CandidateOutcome::Accepted,
            Err(StoreError::UniquenessViolation(_)) => CandidateOutcome::RejectedRace,
            Err(StoreError::Other(cause)) => CandidateOutcome::RejectedError(cause),
        }
    }
}

/// Builder for [`BatchGenerator`].
///
/// Only the store is required. Format and limits default to [`GeneratorConfig::default`]
/// and events go to [`LogListener`] unless another listener is set.
#[derive(Default)]
pub struct BatchGeneratorBuilder<'a> {
    store: Option<&'a dyn IdStore>,
    listener: Option<&'a dyn GenerationListener>,
    config: GeneratorConfig,
    batch_ref: Option<BatchRef>,
}

impl<'a> BatchGeneratorBuilder<'a> {
    pub fn new() -> BatchGeneratorBuilder<'a> {
        Self {
            store: None,
            listener: None,
            config: GeneratorConfig::default(),
            batch_ref: None,
        }
    }

    pub fn store(mut self, store: &'a dyn IdStore) -> BatchGeneratorBuilder<'a> {
        self.store = Some(store);
        self
    }

    pub fn listener(mut self, listener: &'a dyn GenerationListener) -> BatchGeneratorBuilder<'a> {
        self.listener = Some(listener);
        self
    }

    /// Replaces format and limits in one go.
    pub fn config(mut self, config: GeneratorConfig) -> BatchGeneratorBuilder<'a> {
        self.config = config;
        self
    }

    pub fn prefix(mut self, prefix: &str) -> BatchGeneratorBuilder<'a> {
        self.config.prefix = prefix.to_owned();
        self
    }

    pub fn digit_count(mut self, digit_count: u32) -> BatchGeneratorBuilder<'a> {
        self.config.digit_count = digit_count;
        self
    }

    pub fn max_batch_size(mut self, max_batch_size: usize) -> BatchGeneratorBuilder<'a> {
        self.config.max_batch_size = max_batch_size;
        self
    }

    pub fn attempt_multiplier(mut self, attempt_multiplier: usize) -> BatchGeneratorBuilder<'a> {
        self.config.attempt_multiplier = attempt_multiplier;
        self
    }

    /// Reference saved alongside every identifier of the batch.
    pub fn batch_ref(mut self, batch_ref: BatchRef) -> BatchGeneratorBuilder<'a> {
        self.batch_ref = Some(batch_ref);
        self
    }

    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfiguration`] when no store was set or the
    /// configuration does not validate.
    pub fn build(self) -> Result<BatchGenerator<'a>, BatchError> {
        let store = self.store.ok_or_else(|| {
            BatchError::InvalidConfiguration("a store is required".to_owned())
        })?;

        self.config.validate()?;
        let codec = self.config.codec()?;

        debug!(
            "Batch generator built: prefix {}, {} digits, max batch {}, multiplier {}",
            codec.prefix(),
            codec.digit_count(),
            self.config.max_batch_size,
            self.config.attempt_multiplier
        );

        Ok(BatchGenerator {
            store,
            listener: self.listener.unwrap_or(&LOG_LISTENER),
            codec,
            batch_ref: self.batch_ref,
            max_batch_size: self.config.max_batch_size,
            attempt_multiplier: self.config.attempt_multiplier,
        })
    }
}
