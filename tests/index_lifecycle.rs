//! End-to-end use of the public API the way an embedding host drives it

use memory_index::{
    Error, IndexConfig, IndexProvider, IndexState, IndexUpdate, Number, UpdateMode, Value,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn provider() -> IndexProvider {
    let config = IndexConfig::from_toml_str(
        r#"
        [sampling]
        buffer_size = 64

        [metrics]
        enabled = false
        "#,
    )
    .unwrap();
    IndexProvider::new(config)
}

#[test]
fn populate_go_online_then_update() {
    let provider = provider();
    let index = provider.populator(42);

    {
        let mut engine = index.write();
        let updater = engine.populating_updater();
        let batch = (0..100u64)
            .map(|id| IndexUpdate::added(id, format!("user-{:03}", id % 10)))
            .collect();
        updater.process_batch(batch).unwrap();
        engine.close(true);
    }

    let online = provider.online_accessor(42).unwrap();
    let reader = online.read().new_reader();
    assert_eq!(reader.count_for_value(&Value::from("user-003")), 10);
    assert_eq!(reader.range_by_prefix("user-00").count(), 100);
    assert_eq!(reader.distinct_values(), 10);

    {
        let mut engine = online.write();
        engine
            .updater()
            .process(IndexUpdate::changed(3, "user-003", 7))
            .unwrap();
        let gone: HashSet<u64> = [13, 23].into_iter().collect();
        engine.updater().remove(&gone);
    }

    // The old reader is a snapshot
    assert_eq!(reader.count_for_value(&Value::from("user-003")), 10);

    let fresh = online.read().new_reader();
    assert_eq!(fresh.count_for_value(&Value::from("user-003")), 7);
    assert_eq!(fresh.range_numeric(Some(Number::from(7)), Some(Number::from(7))).collect::<Vec<_>>(), vec![3]);
    assert_eq!(online.read().max_count(), 98);
}

#[test]
fn updates_rebuilt_from_parts() {
    let provider = provider();
    let index = provider.populator(1);
    index.write().close(true);

    let update = IndexUpdate::from_parts(UpdateMode::Added, 5, None, Some(Value::from(1.5))).unwrap();
    index.write().process_update(update).unwrap();

    let missing = IndexUpdate::from_parts(UpdateMode::Changed, 5, Some(Value::from(1.5)), None);
    assert!(matches!(missing, Err(Error::UnsupportedUpdate(_))));

    let reader = index.read().new_reader();
    assert_eq!(reader.range_numeric(Some(1.into()), Some(2.into())).collect::<Vec<_>>(), vec![5]);
}

#[test]
fn failed_population_is_not_queryable() {
    let provider = provider();
    let index = provider.populator(9);
    {
        let mut engine = index.write();
        engine.add(1, "partial").unwrap();
        engine.mark_failed("source scan aborted");
        engine.close(false);
    }

    let err = provider.online_accessor(9).err().unwrap();
    assert!(err.is_caller_error());
    assert_eq!(provider.initial_state(9), IndexState::Failed);
    assert_eq!(provider.population_failure(9).as_deref(), Some("source scan aborted"));

    // A retry replaces the failed engine
    let retry = provider.populator(9);
    retry.write().close(true);
    assert!(provider.online_accessor(9).is_ok());
    assert_eq!(provider.population_failure(9), None);
}

#[test]
fn readers_on_other_threads_keep_their_snapshot() {
    let provider = Arc::new(provider());
    let index = provider.populator(7);
    {
        let mut engine = index.write();
        for id in 0..1000u64 {
            engine.add(id, (id % 100) as i64).unwrap();
        }
        engine.close(true);
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let reader = index.read().new_reader();
            thread::spawn(move || {
                let mut total = 0;
                for _ in 0..50 {
                    total = reader.scan().count();
                    assert_eq!(total, 1000);
                }
                total
            })
        })
        .collect();

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for id in 1000..2000u64 {
                index.write().add(id, "late").unwrap();
            }
        })
    };

    for handle in readers {
        assert_eq!(handle.join().unwrap(), 1000);
    }
    writer.join().unwrap();

    assert_eq!(index.read().new_reader().scan().count(), 2000);
    provider.shutdown();
    assert!(index.read().is_empty());
}

#[test]
fn host_init_is_repeatable() {
    let config = IndexConfig::default();
    memory_index::init(&config).unwrap();
    memory_index::init(&config).unwrap();
    assert!(!memory_index::system::metrics::gather().is_empty());
}
