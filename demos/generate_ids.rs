//! Generates a batch of specimen IDs into a SQLite database and prints them.
//!
//! ```text
//! cargo run --example generate_ids --features rdbc-sqlite -- <count> [database-url] [batch-ref]
//! ```
//!
//! `SPECIMEN_ID_CONFIG` may hold a JSON document overriding the defaults, for example
//! `{"digit_count": 10, "max_batch_size": 500}`. Set `RUST_LOG=debug` to follow every
//! candidate.
use std::env;

use anyhow::{Context, Result};
use log::info;
use specimen_id::{
    config::GeneratorConfig,
    core::{
        generator::{parse_batch_size, BatchGeneratorBuilder},
        store::BatchRef,
    },
    store::sqlite::SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let count = args
        .next()
        .context("usage: generate_ids <count> [database-url] [batch-ref]")?;
    let url = args
        .next()
        .unwrap_or_else(|| "sqlite://specimen_ids.db".to_owned());
    let batch_ref = args.next();

    let config: GeneratorConfig = match env::var("SPECIMEN_ID_CONFIG") {
        Ok(json) => serde_json::from_str(&json).context("SPECIMEN_ID_CONFIG is not valid JSON")?,
        Err(_) => GeneratorConfig::default(),
    };

    let count = parse_batch_size(&count, config.max_batch_size)?;
    let store = SqliteStore::connect(&url).await?;

    let mut builder = BatchGeneratorBuilder::new().store(&store).config(config);
    if let Some(batch_ref) = batch_ref {
        builder = builder.batch_ref(BatchRef::new(batch_ref));
    }
    let generator = builder.build()?;

    let execution = generator.execute(count)?;

    for id in &execution.ids {
        println!("{}", id);
    }

    info!(
        "Generated {} IDs in {:?} ({} attempts, {} collisions, {} lost races, {} store failures)",
        execution.ids.len(),
        execution.duration,
        execution.attempts,
        execution.collisions,
        execution.races_lost,
        execution.store_failures
    );

    Ok(())
}
