use serde::Deserialize;

use crate::{
    core::{
        codec::{DIGIT_COUNT, IdCodec, PREFIX},
        generator::{ATTEMPT_MULTIPLIER, MAX_BATCH_SIZE},
    },
    BatchError,
};

/// Tunable parameters of identifier generation.
///
/// Every field falls back to its default when absent, so a deployment only spells out
/// what it changes:
///
/// ```
/// use specimen_id::config::GeneratorConfig;
///
/// let config: GeneratorConfig = serde_json::from_str(r#"{ "digit_count": 10 }"#).unwrap();
///
/// assert_eq!(config.prefix, "ACME");
/// assert_eq!(config.digit_count, 10);
/// assert_eq!(config.max_batch_size, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Literal prefix of every identifier.
    pub prefix: String,
    /// Width of the random payload.
    pub digit_count: u32,
    /// Largest count accepted by a single batch request.
    pub max_batch_size: usize,
    /// A batch of `n` aborts once more than `n * attempt_multiplier` attempts were made.
    pub attempt_multiplier: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            prefix: PREFIX.to_owned(),
            digit_count: DIGIT_COUNT,
            max_batch_size: MAX_BATCH_SIZE,
            attempt_multiplier: ATTEMPT_MULTIPLIER,
        }
    }
}

impl GeneratorConfig {
    /// Builds the codec described by `prefix` and `digit_count`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfiguration`] for an unusable prefix or width.
    pub fn codec(&self) -> Result<IdCodec, BatchError> {
        IdCodec::new(&self.prefix, self.digit_count)
    }

    /// Checks every field without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidConfiguration`] naming the first rejected field.
    pub fn validate(&self) -> Result<(), BatchError> {
        self.codec()?;

        if self.max_batch_size == 0 {
            return Err(BatchError::InvalidConfiguration(
                "max_batch_size must be positive".to_owned(),
            ));
        }
        if self.attempt_multiplier == 0 {
            return Err(BatchError::InvalidConfiguration(
                "attempt_multiplier must be positive".to_owned(),
            ));
        }

        Ok(())
    }
}
