/// Identifier format, Luhn check digit and validation
pub mod codec;

/// Batch generation loop with collision handling and attempt budget
pub mod generator;

/// Observer interface for generation events
pub mod listener;

/// Persistence contract the generator writes through
pub mod store;

/// Downstream validation of keyed-in identifiers
pub mod verify;
