#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # Specimen ID

 Generates human-typeable identifiers for physical specimens such as blood tubes, in
 batches, and guarantees that no identifier is ever issued twice across all runs.

 An identifier is a fixed prefix, a fixed-width random payload and a Luhn check digit:

 ```text
 ACME 12345678 2
 |    |        +-- check digit, Luhn over the payload
 |    +----------- random payload, zero padded, 8 digits by default
 +---------------- prefix
 ```

 The check digit catches every single-digit typo and nearly every swap of adjacent
 digits when an operator keys an identifier in from a smudged label.

 ## Core Concepts

- **IdCodec:** Encodes payloads into identifiers and validates identifiers, including the check digit.
- **IdStore:** A persistent store that rejects duplicate identifiers atomically. The generator only needs `exists` and `save`.
- **BatchGenerator:** Draws random candidates, skips those already issued, saves the rest, and retries on collisions, lost races and transient store failures until the batch is complete or the attempt budget is spent.
- **GenerationListener:** Receives every collision, failure and acceptance. The default listener writes them to the `log` facade.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| rdbc-sqlite   | Enables a SQLite `IdStore` built on SQLx                      |
| full          | Enables all available features                                |

 ## Getting Started

```rust
use specimen_id::{
    core::{
        codec::IdCodec,
        generator::BatchGeneratorBuilder,
        store::BatchRef,
    },
    store::memory::InMemoryStore,
    BatchError,
};

fn main() -> Result<(), BatchError> {
    let store = InMemoryStore::default();

    let generator = BatchGeneratorBuilder::new()
        .store(&store) // set persistence
        .batch_ref(BatchRef::new("pharmacy-north")) // tag every saved ID
        .attempt_multiplier(3) // set attempt budget
        .build()?;

    let ids = generator.generate_batch(10)?;

    assert_eq!(ids.len(), 10);
    assert!(ids.iter().all(|id| IdCodec::default().is_well_formed(id.as_str())));
    assert!(IdCodec::default().is_well_formed("ACME123456782"));
    assert!(!IdCodec::default().is_well_formed("ACME123456789"));

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Configuration of identifier format and batch limits
pub mod config;

/// Core module for identifier generation
pub mod core;

/// Error types for identifier generation
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of store backends (for exemple: in-memory and SQLite)
pub mod store;
