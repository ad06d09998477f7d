mod common;

use std::collections::HashSet;

use common::{BlindStore, MockListener, MockStore, seeded_memory_store};

use specimen_id::{
    BatchError,
    core::{
        codec::IdCodec,
        generator::{BatchGeneratorBuilder, MAX_BATCH_SIZE, parse_batch_size},
        listener::GenerationEvent,
        store::{BatchRef, IdStore, StoreError},
    },
    store::memory::InMemoryStore,
};

#[test]
fn returns_requested_count_of_distinct_valid_ids() {
    let mut store = MockStore::new();
    store.expect_exists().times(5).returning(|_| Ok(false));
    store.expect_save().times(5).returning(|_| Ok(()));

    let generator = BatchGeneratorBuilder::new().store(&store).build().unwrap();
    let ids = generator.generate_batch(5).unwrap();

    assert_eq!(ids.len(), 5);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
    for id in &ids {
        assert!(IdCodec::default().is_well_formed(id.as_str()), "{}", id);
        assert!(id.as_str().starts_with("ACME"));
        assert_eq!(id.as_str().len(), 13);
    }
}

#[test]
fn saves_the_batch_reference_with_every_id() {
    let mut store = MockStore::new();
    store.expect_exists().returning(|_| Ok(false));
    store
        .expect_save()
        .withf(|record| record.batch_ref == Some(BatchRef::new("pharmacy-east")))
        .times(3)
        .returning(|_| Ok(()));

    let generator = BatchGeneratorBuilder::new()
        .store(&store)
        .batch_ref(BatchRef::new("pharmacy-east"))
        .build()
        .unwrap();

    assert_eq!(generator.generate_batch(3).unwrap().len(), 3);
}

#[test]
fn skips_ids_that_already_exist() {
    let mut store = MockStore::new();
    let mut calls = 0;
    store.expect_exists().times(7).returning(move |_| {
        calls += 1;
        Ok(calls <= 2)
    });
    store.expect_save().times(5).returning(|_| Ok(()));

    let generator = BatchGeneratorBuilder::new().store(&store).build().unwrap();
    let execution = generator.execute(5).unwrap();

    assert_eq!(execution.ids.len(), 5);
    assert_eq!(execution.collisions, 2);
}

#[test]
fn retries_after_losing_a_save_race() {
    let mut store = MockStore::new();
    let mut calls = 0;
    store.expect_exists().times(3).returning(|_| Ok(false));
    store.expect_save().times(3).returning(move |record| {
        calls += 1;
        if calls == 1 {
            Err(StoreError::UniquenessViolation(record.id.to_string()))
        } else {
            Ok(())
        }
    });

    let generator = BatchGeneratorBuilder::new().store(&store).build().unwrap();
    let execution = generator.execute(2).unwrap();

    assert_eq!(execution.ids.len(), 2);
    assert_eq!(execution.races_lost, 1);
    assert_eq!(execution.attempts, 3);
}

#[test]
fn logs_and_gives_up_when_every_save_fails() {
    let mut store = MockStore::new();
    store.expect_exists().returning(|_| Ok(false));
    store
        .expect_save()
        .times(4)
        .returning(|_| Err(StoreError::Other("Database error".to_owned())));

    let mut listener = MockListener::new();
    listener
        .expect_record()
        .withf(|event| matches!(event, GenerationEvent::StoreFailure { .. }))
        .times(4)
        .return_const(());
    listener
        .expect_record()
        .withf(|event| matches!(event, GenerationEvent::Exhausted { .. }))
        .times(1)
        .return_const(());

    let generator = BatchGeneratorBuilder::new()
        .store(&store)
        .listener(&listener)
        .build()
        .unwrap();

    let result = generator.generate_batch(1);

    assert!(matches!(
        result,
        Err(BatchError::GenerationExhausted {
            requested: 1,
            accepted: 0,
            ..
        })
    ));
}

#[test]
fn invalid_sizes_fail_before_any_store_call() {
    let mut store = MockStore::new();
    store.expect_exists().never();
    store.expect_save().never();

    let generator = BatchGeneratorBuilder::new().store(&store).build().unwrap();

    assert!(matches!(
        generator.generate_batch(0),
        Err(BatchError::InvalidBatchSize(_))
    ));
    assert!(matches!(
        generator.generate_batch(MAX_BATCH_SIZE + 1),
        Err(BatchError::InvalidBatchSize(_))
    ));
    for input in ["0", "-1", "invalid", "2.5"] {
        assert!(matches!(
            parse_batch_size(input, generator.max_batch_size()),
            Err(BatchError::InvalidBatchSize(_))
        ));
    }
}

#[test]
fn lower_cap_is_enforced() {
    let store = InMemoryStore::new();
    let generator = BatchGeneratorBuilder::new()
        .store(&store)
        .max_batch_size(50)
        .build()
        .unwrap();

    assert!(generator.generate_batch(50).is_ok());
    assert!(matches!(
        generator.generate_batch(51),
        Err(BatchError::InvalidBatchSize(_))
    ));
    assert_eq!(store.len(), 50);
}

#[test]
fn works_with_maximum_allowed_batch_size() {
    let mut store = MockStore::new();
    store
        .expect_exists()
        .times(MAX_BATCH_SIZE..)
        .returning(|_| Ok(false));
    store
        .expect_save()
        .times(MAX_BATCH_SIZE..)
        .returning(|_| Ok(()));

    let generator = BatchGeneratorBuilder::new().store(&store).build().unwrap();
    let ids = generator.generate_batch(MAX_BATCH_SIZE).unwrap();

    assert_eq!(ids.len(), MAX_BATCH_SIZE);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), MAX_BATCH_SIZE);
}

#[test]
fn never_reissues_ids_from_earlier_runs() {
    let store = InMemoryStore::new();
    let generator = BatchGeneratorBuilder::new()
        .store(&store)
        .digit_count(3)
        .build()
        .unwrap();

    let first = generator.generate_batch(200).unwrap();
    let second = generator.generate_batch(200).unwrap();

    let all: HashSet<_> = first.iter().chain(second.iter()).collect();
    assert_eq!(all.len(), 400);
    assert_eq!(store.len(), 400);
}

#[test]
fn store_constraint_catches_what_the_existence_check_missed() {
    let codec = IdCodec::new("ACME", 1).unwrap();
    let taken: Vec<_> = ["0", "1", "2", "3", "4"]
        .iter()
        .map(|payload| codec.encode(payload).unwrap())
        .collect();
    let inner = seeded_memory_store(&taken);
    let blind = BlindStore { inner: &inner };

    let generator = BatchGeneratorBuilder::new()
        .store(&blind)
        .digit_count(1)
        .attempt_multiplier(50)
        .build()
        .unwrap();
    let execution = generator.execute(5).unwrap();

    let mut payloads: Vec<&str> = execution.ids.iter().map(|id| id.payload()).collect();
    payloads.sort_unstable();
    assert_eq!(payloads, vec!["5", "6", "7", "8", "9"]);
    assert_eq!(
        execution.attempts,
        5 + execution.collisions + execution.races_lost
    );
    assert_eq!(inner.len(), 10);
    for id in &taken {
        assert_eq!(inner.exists(id), Ok(true));
    }
}

#[test]
fn exhausted_space_surfaces_as_an_error() {
    let codec = IdCodec::new("ACME", 1).unwrap();
    let taken: Vec<_> = (0..10)
        .map(|payload| codec.encode(&payload.to_string()).unwrap())
        .collect();
    let store = seeded_memory_store(&taken);

    let generator = BatchGeneratorBuilder::new()
        .store(&store)
        .digit_count(1)
        .build()
        .unwrap();

    assert_eq!(
        generator.generate_batch(2),
        Err(BatchError::GenerationExhausted {
            requested: 2,
            accepted: 0,
            attempts: 7,
        })
    );
    assert_eq!(store.len(), 10);
}
