//! Integration tests against a live redis server
//!
//! Gated on `COUNTERD_INTEG` and `COUNTERD_REDIS_ADDR`; skipped otherwise.
//! The test namespace is shared with any running counterd, so point the
//! address at a scratch database.

use counterd_store::{CounterStore, RedisStore};

fn integ_addr() -> Option<String> {
    std::env::var("COUNTERD_INTEG").ok()?;
    std::env::var("COUNTERD_REDIS_ADDR").ok()
}

#[tokio::test]
async fn test_redis_round_trip() {
    let Some(addr) = integ_addr() else {
        eprintln!("skipping: COUNTERD_INTEG / COUNTERD_REDIS_ADDR not set");
        return;
    };

    let store = RedisStore::connect(&addr).unwrap();
    let keys = vec!["bar".to_string(), "baz".to_string(), "foo".to_string()];

    // Two distinct IDs per key
    store.update_keys(&keys, "1234").await.unwrap();
    store.update_keys(&keys, "2345").await.unwrap();

    // Keys come back sorted and unprefixed
    let listed = store.list_keys().await.unwrap();
    assert_eq!(listed, keys);

    // Counts are exact at this cardinality
    let counts = store.get_counts(&keys).await.unwrap();
    assert_eq!(counts, vec![2, 2, 2]);

    // Adding a known ID again must not change the estimate
    store.update_keys(&keys, "1234").await.unwrap();
    let counts = store.get_counts(&keys).await.unwrap();
    assert_eq!(counts, vec![2, 2, 2]);

    store.delete_keys(&keys).await.unwrap();
    assert!(store.list_keys().await.unwrap().is_empty());
}
